//! Transformations that return functions instead of data.

use instancify::{wrap, wrap_default, Candidate, Config, Transform};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn data() -> Value {
    json!([{"a": 1}, {"b": {"c": 2}}])
}

#[test]
fn test_transformation_returning_function_is_pending() {
    let outcome = wrap_default(data()).write_new_instance_with_transformation(
        Transform::new(|data, _| {
            Candidate::deferred(move |_: &[Value]| data.clone())
        }),
        &[],
    );

    assert!(outcome.is_pending());
    assert!(outcome.instance().is_none());
}

#[test]
fn test_arguments_are_passed_to_transformation() {
    let second = wrap_default(data())
        .write_new_instance_with_transformation(
            Transform::new(|mut data, args| {
                let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
                data[1]["b"]["c"] = json!(sum);
                data
            }),
            &[json!(1), json!(2), json!(3)],
        )
        .into_instance()
        .unwrap();

    assert_eq!(second.value().get("[1].b.c"), Some(json!(6)));
}

#[test]
fn test_keep_passing_arguments_until_data() {
    let first = wrap_default(data());
    let need_more = first
        .write_new_instance_with_transformation(
            Transform::new(|data, _| {
                Candidate::deferred(move |more: &[Value]| {
                    let data = data.clone();
                    let more = more[0].clone();
                    Candidate::deferred(move |even_more: &[Value]| {
                        let data = data.clone();
                        let more = more.clone();
                        let even_more = even_more[0].clone();
                        Candidate::deferred(move |last: &[Value]| {
                            let mut data = data.clone();
                            data[1]["b"]["c"] = json!({
                                "moreData": more.clone(),
                                "evenMoreData": even_more.clone(),
                                "lastPieceOfData": last[0].clone(),
                            });
                            data
                        })
                    })
                })
            }),
            &[],
        )
        .into_pending()
        .unwrap();

    let need_even_more = need_more
        .call(&[json!("adding more data")])
        .into_pending()
        .unwrap();
    let need_last = need_even_more
        .call(&[json!("adding even more data!")])
        .into_pending()
        .unwrap();
    assert!(!first.is_written());

    let second = need_last
        .call(&[json!("adding last piece of data!")])
        .into_instance()
        .unwrap();

    assert_eq!(
        second.value().get("[1].b.c.moreData"),
        Some(json!("adding more data"))
    );
    assert_eq!(
        second.value().get("[1].b.c.evenMoreData"),
        Some(json!("adding even more data!"))
    );
    assert_eq!(
        second.value().get("[1].b.c.lastPieceOfData"),
        Some(json!("adding last piece of data!"))
    );
    assert_eq!(second.instance_number(), 2);
    assert!(first.is_written());
}

#[test]
fn test_pending_write_is_reinvokable_before_finalizing() {
    let first = wrap_default(json!(0));
    let pending = first
        .write_new_instance_with_transformation(
            Transform::new(|_, _| {
                Candidate::deferred(|args: &[Value]| match args.first() {
                    Some(value) if !value.is_null() => Candidate::data(value.clone()),
                    _ => Candidate::deferred(|args: &[Value]| args[0].clone()),
                })
            }),
            &[],
        )
        .into_pending()
        .unwrap();

    for _ in 0..3 {
        assert!(pending.call(&[Value::Null]).is_pending());
    }
    assert!(!first.is_written());

    let second = pending.call(&[json!(7)]).into_instance().unwrap();
    assert_eq!(second.value(), &json!(7));
    assert_eq!(second.instance_number(), 2);
}

#[test]
fn test_only_terminal_call_advances_counter() {
    let first = wrap_default(json!(0));
    let pending = first
        .write_new_instance(Candidate::deferred(|args: &[Value]| args[0].clone()))
        .into_pending()
        .unwrap();

    let other = first.write_new_instance(json!("direct")).into_instance().unwrap();
    assert_eq!(other.instance_number(), 2);

    // The chain started before the direct write, but the guard is now consumed.
    let late = pending.call(&[json!("late")]);
    assert!(late.is_rejected());
    assert_eq!(late.instance().unwrap().value(), &json!("direct"));

    let third = other.write_new_instance(json!(3)).into_instance().unwrap();
    assert_eq!(third.instance_number(), 3);
}

#[test]
fn test_pending_call_on_written_guard_notifies_error_function() {
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    let first = wrap(
        json!(0),
        Config::default().with_error_function(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    let pending = first
        .write_new_instance(Candidate::deferred(|args: &[Value]| args[0].clone()))
        .into_pending()
        .unwrap();

    assert!(pending.call(&[json!(1)]).is_created());
    assert!(pending.call(&[json!(2)]).is_rejected());
    assert!(pending.call(&[json!(3)]).is_rejected());
    assert_eq!(notified.load(Ordering::SeqCst), 2);
}
