//! Custom setters, getters and lifting.

use instancify::{wrap, wrap_default, Config, InstancifyError, Methods};
use serde_json::{json, Value};

fn data() -> Value {
    json!([{"a": 1}, {"b": {"c": 2}}])
}

#[test]
fn test_lift_custom_methods_for_future_instances() {
    let first = wrap_default(data());
    let second = first
        .lift(Methods::new().with_setter("replaceTheData", |_, _| {
            json!("completely replaced the data")
        }))
        .into_instance()
        .unwrap();
    let third = second
        .call("replaceTheData", &[])
        .unwrap()
        .into_instance()
        .unwrap();

    assert!(!first.has_method("replaceTheData"));
    assert!(second.has_method("replaceTheData"));
    assert_eq!(third.value(), &json!("completely replaced the data"));
}

#[test]
fn test_lift_is_a_write() {
    let first = wrap_default(data());
    let second = first.lift(Methods::new()).into_instance().unwrap();

    assert_eq!(second.value(), first.value());
    assert_eq!(second.instance_number(), 2);
    assert!(first.is_written());
    assert!(first.write_new_instance(json!(1)).is_rejected());
}

#[test]
fn test_lift_on_written_instance_is_rejected_but_registers() {
    let first = wrap_default(json!(0));
    let second = first.write_new_instance(json!(1)).into_instance().unwrap();

    let outcome = first.lift(Methods::new().with_getter("double", |data, _| {
        json!(data.as_i64().unwrap_or_default() * 2)
    }));
    assert!(outcome.is_rejected());
    assert!(!second.has_method("double"));

    // The lineage tables grew, so the next instance sees the getter.
    let third = second.write_new_instance(json!(5)).into_instance().unwrap();
    assert_eq!(third.get("double", &[]).unwrap(), json!(10));
}

#[test]
fn test_lifted_methods_reach_all_descendants() {
    let first = wrap_default(json!({"n": 0}));
    let second = first
        .lift(Methods::new().with_setter("inc", |mut data, _| {
            let n = data["n"].as_i64().unwrap_or_default();
            data["n"] = json!(n + 1);
            data
        }))
        .into_instance()
        .unwrap();

    let mut current = second;
    for _ in 0..3 {
        current = current.call("inc", &[]).unwrap().into_instance().unwrap();
        assert!(current.has_method("inc"));
    }

    assert_eq!(current.value().get("n"), Some(json!(3)));
    assert_eq!(current.instance_number(), 5);
}

#[test]
fn test_initialize_with_custom_setters() {
    let config = Config::default().with_setter("changePropertyAOfFirstElement", |mut data, args| {
        data[0]["a"] = args[0].clone();
        data
    });
    let first = wrap(data(), config);
    let second = first
        .call("changePropertyAOfFirstElement", &[json!(5)])
        .unwrap()
        .into_instance()
        .unwrap();
    let third = second
        .call("changePropertyAOfFirstElement", &[json!(6)])
        .unwrap()
        .into_instance()
        .unwrap();

    assert_eq!(second.value().get("[0].a"), Some(json!(5)));
    assert_eq!(third.value().get("[0].a"), Some(json!(6)));
}

#[test]
fn test_custom_setter_respects_write_guard() {
    let first = wrap(
        json!(0),
        Config::default().with_setter("set", |_, args| args[0].clone()),
    );

    assert!(first.call("set", &[json!(1)]).unwrap().is_created());
    let rejected = first.call("set", &[json!(2)]).unwrap();

    assert!(rejected.is_rejected());
    assert_eq!(rejected.instance().unwrap().value(), &json!(1));
}

#[test]
fn test_getters_read_without_versioning() {
    let first = wrap(
        data(),
        Config::default().with_getter("at", |data, args| {
            let key = args[0].as_str().unwrap_or_default();
            instancify::get_at_path(data, &key.into())
                .cloned()
                .unwrap_or(Value::Null)
        }),
    );

    assert_eq!(first.get("at", &[json!("[1].b.c")]).unwrap(), json!(2));
    assert_eq!(first.get("at", &[json!("[0].missing")]).unwrap(), Value::Null);
    assert!(!first.is_written());

    let second = first.write_new_instance(json!([{"a": 9}])).into_instance().unwrap();
    assert_eq!(second.get("at", &[json!("[0].a")]).unwrap(), json!(9));
}

#[test]
fn test_getter_sees_snapshot_after_path_write() {
    let first = wrap(
        json!({"a": 1}),
        Config::default().with_getter("a", |data, _| data["a"].clone()),
    );
    let second = first
        .write_new_instance_with_path("a", json!(2))
        .into_instance()
        .unwrap();

    assert_eq!(second.get("a", &[]).unwrap(), json!(2));
    assert_eq!(first.value().get("a"), Some(json!(1)));
}

#[test]
fn test_method_names() {
    let first = wrap(
        json!(null),
        Config::default()
            .with_setter("b", |d, _| d)
            .with_setter("a", |d, _| d)
            .with_getter("g", |d, _| d.clone()),
    );

    assert_eq!(first.setter_names(), vec!["a", "b"]);
    assert_eq!(first.getter_names(), vec!["g"]);
}

#[test]
fn test_unknown_method_errors() {
    let first = wrap_default(json!(null));

    let err = first.call("nope", &[]).unwrap_err();
    assert!(matches!(err, InstancifyError::UnknownSetter { ref name } if name == "nope"));
    assert!(!first.is_written());

    let err = first.get("nope", &[]).unwrap_err();
    assert_eq!(err.to_string(), "unknown custom getter: nope");
}
