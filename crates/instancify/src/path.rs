//! Path expressions and best-effort assignment into a document.
//!
//! A path is a sequence of segments locating a value inside a JSON document.
//! Paths can be built with the [`path!`](crate::path) macro, from a vector of
//! segments, or parsed from `a.b[0].c` notation.
//!
//! Segments are coerced the way property keys are in a dynamic object model:
//! an index segment applied to an object addresses the key `"0"`, and a key
//! segment applied to an array is parsed as an index.

use crate::doc_cell::Doc;
use crate::error::value_type_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use tracing::debug;

/// A single segment in a path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seg {
    /// Object key access: `{"key": value}`
    Key(String),
    /// Array index access: `[index]`
    Index(usize),
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }

    /// The segment as an object key. Indices use their decimal form.
    pub fn object_key(&self) -> Cow<'_, str> {
        match self {
            Seg::Key(k) => Cow::Borrowed(k),
            Seg::Index(i) => Cow::Owned(i.to_string()),
        }
    }

    /// The segment as an array index, if it is one or is the canonical
    /// decimal form of one.
    pub fn array_index(&self) -> Option<usize> {
        match self {
            Seg::Key(k) => canonical_index(k),
            Seg::Index(i) => Some(*i),
        }
    }
}

/// Parse `s` as an index only when it round-trips: ASCII digits without a
/// leading zero, so `"01"` and `"+1"` stay keys.
fn canonical_index(s: &str) -> Option<usize> {
    let digits = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits || (s.len() > 1 && s.starts_with('0')) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, ".{}", k),
            Seg::Index(i) => write!(f, "[{}]", i),
        }
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A complete path into a JSON structure.
///
/// # Examples
///
/// ```
/// use instancify::{path, Path};
///
/// let parsed: Path = "users[0].name".into();
/// assert_eq!(parsed, path!("users", 0, "name"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<Seg>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a vector of segments.
    #[inline]
    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Push a segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for seg in &self.0 {
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromIterator<Seg> for Path {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<Vec<Seg>> for Path {
    fn from(segments: Vec<Seg>) -> Self {
        Path(segments)
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        parse_path(path)
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        parse_path(&path)
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

/// Construct a `Path` from a sequence of segments.
///
/// # Examples
///
/// ```
/// use instancify::path;
///
/// // String literals become Key segments, numbers become Index segments
/// let p = path!("b", "c", 0);
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($crate::path!(@seg $seg));
        )+
        p
    }};
    (@seg $seg:expr) => {
        $crate::Seg::from($seg)
    };
}

/// Parse a path expression in `a.b.c`, `a[0].c` or `a.b.[0].c` notation.
///
/// An opening bracket starts a new segment, closing brackets are dropped and
/// empty segments are skipped. Canonical decimal segments (`0`, `12`, not
/// `01`) become index segments; everything else keeps its text as a key.
pub fn parse_path(path: &str) -> Path {
    path.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match canonical_index(segment) {
            Some(i) => Seg::Index(i),
            None => Seg::key(segment),
        })
        .collect()
}

/// Read the value at `path`, if every segment resolves.
pub fn get_at_path<'a>(doc: &'a Value, path: &Path) -> Option<&'a Value> {
    path.iter().try_fold(doc, |current, seg| match current {
        Value::Object(map) => map.get(seg.object_key().as_ref()),
        Value::Array(arr) => seg.array_index().and_then(|i| arr.get(i)),
        _ => None,
    })
}

/// Result of a best-effort assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Assignment {
    /// The new value was written at the path.
    Applied,
    /// Nothing was written.
    Skipped(String),
}

impl Assignment {
    /// Returns true if the value was written.
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, Assignment::Applied)
    }
}

fn child_mut<'a>(current: &'a mut Value, seg: &Seg) -> Option<&'a mut Value> {
    match current {
        Value::Object(map) => map.get_mut(seg.object_key().as_ref()),
        Value::Array(arr) => seg.array_index().and_then(move |i| arr.get_mut(i)),
        _ => None,
    }
}

/// Largest number of `null` slots a single assignment may insert before the
/// target index of an array.
pub const MAX_ARRAY_PADDING: usize = 1 << 16;

/// Assign `new_data` at `path` inside `root`.
///
/// Every segment but the last must already exist. The last segment adds or
/// replaces an object key, or writes an array slot, padding with `null` past
/// the end up to [`MAX_ARRAY_PADDING`] slots. An empty path replaces the whole
/// document.
pub fn assign(root: &mut Value, path: &Path, new_data: Value) -> Assignment {
    let Some((last, rest)) = path.segments().split_last() else {
        *root = new_data;
        return Assignment::Applied;
    };

    let mut current = root;
    for seg in rest {
        current = match child_mut(current, seg) {
            Some(child) => child,
            None => return Assignment::Skipped(format!("no value at {seg} in {path}")),
        };
    }

    match current {
        Value::Object(map) => {
            map.insert(last.object_key().into_owned(), new_data);
            Assignment::Applied
        }
        Value::Array(arr) => match last.array_index() {
            Some(i) if i < arr.len() => {
                arr[i] = new_data;
                Assignment::Applied
            }
            Some(i) if i - arr.len() <= MAX_ARRAY_PADDING => {
                arr.resize(i, Value::Null);
                arr.push(new_data);
                Assignment::Applied
            }
            Some(i) => Assignment::Skipped(format!(
                "index {i} is too far past the end of a {} element array at {path}",
                arr.len()
            )),
            None => Assignment::Skipped(format!("{last} is not an array index in {path}")),
        },
        other => Assignment::Skipped(format!(
            "cannot assign into {} at {path}",
            value_type_name(other)
        )),
    }
}

/// Assign `new_data` at `path` inside a document, swallowing any failure.
///
/// A frozen document, a missing intermediate value or a primitive target
/// leave the document untouched. Returns the current top-level value.
pub fn set_at_path(doc: &Doc, new_data: Value, path: &Path) -> Value {
    let assignment = doc
        .update(|root| assign(root, path, new_data))
        .unwrap_or_else(|err| Assignment::Skipped(err.to_string()));
    if let Assignment::Skipped(reason) = &assignment {
        debug!(%path, %reason, "path assignment skipped");
    }
    doc.snapshot()
}
