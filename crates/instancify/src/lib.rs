//! Versioned, immutable instances with once-only writes.
//!
//! `instancify` wraps a JSON document in an [`Instance`]: a frozen value, a
//! version number and a set of write methods. The first write on an instance
//! deep-clones its data, applies the change, freezes the result and returns
//! the successor. Any later write on the same instance is rejected: the
//! lineage's error function is notified and the existing successor is handed
//! back instead.
//!
//! # Core Concepts
//!
//! - **Instance**: an immutable snapshot plus its version number and methods
//! - **Lineage**: the chain of instances derived from one [`wrap`] call,
//!   sharing configuration, custom methods and the instance counter
//! - **Write guard**: per-instance state allowing a single successor
//! - **Candidate**: what a write produces, data or a deferred function
//! - **Lift**: registering custom methods for the next instances
//!
//! # Quick Start
//!
//! ```
//! use instancify::{wrap_default, Transform};
//! use serde_json::json;
//!
//! let first = wrap_default(json!({"count": 0}));
//!
//! let second = first
//!     .write_new_instance_with_path("count", json!(1))
//!     .into_instance()
//!     .unwrap();
//! assert_eq!(second.value().get("count"), Some(json!(1)));
//! assert_eq!(second.instance_number(), 2);
//!
//! // `first` already has a successor: the write is rejected.
//! let rejected = first.write_new_instance_with_transformation(
//!     Transform::new(|mut data, _| {
//!         data["count"] = json!(99);
//!         data
//!     }),
//!     &[],
//! );
//! assert!(rejected.is_rejected());
//! assert_eq!(rejected.instance().unwrap().value().get("count"), Some(json!(1)));
//!
//! // Values are frozen.
//! assert!(second.value().update(|v| v["count"] = json!(2)).is_err());
//! ```
//!
//! # Custom methods
//!
//! ```
//! use instancify::{wrap_default, Methods};
//! use serde_json::json;
//!
//! let first = wrap_default(json!([1, 2]));
//! let second = first
//!     .lift(
//!         Methods::new()
//!             .with_setter("push", |mut data, args| {
//!                 if let Some(items) = data.as_array_mut() {
//!                     items.extend(args.iter().cloned());
//!                 }
//!                 data
//!             })
//!             .with_getter("len", |data, _| json!(data.as_array().map_or(0, Vec::len))),
//!     )
//!     .into_instance()
//!     .unwrap();
//!
//! assert!(!first.has_method("push"));
//! let third = second.call("push", &[json!(3)]).unwrap().into_instance().unwrap();
//! assert_eq!(third.get("len", &[]).unwrap(), json!(3));
//! ```

mod candidate;
mod clone;
mod config;
mod doc_cell;
mod error;
mod freeze;
mod guard;
mod instance;
mod methods;
mod path;

pub use candidate::{Candidate, Deferred, Transform, TransformFn};
pub use clone::{clone_doc, CloneFn};
pub use config::{Config, ErrorFn, Lineage};
pub use doc_cell::Doc;
pub use error::{value_type_name, InstancifyError, InstancifyResult};
pub use freeze::{deep_freeze, freeze_value};
pub use instance::{wrap, wrap_default, Instance, Outcome, PendingWrite};
pub use methods::{Getter, Methods, Setter};
pub use path::{
    assign, get_at_path, parse_path, set_at_path, Assignment, Path, Seg, MAX_ARRAY_PADDING,
};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
