//! Tests for the four-phase call interception protocol.

use pluggable::{
    ArgumentError, HandlerType, Phase, PluggableError, RegistryBuilder, Subject, Value,
    handler_fn,
    testing::{CallLog, FailingHandler, RecordingHandler, ValueHandler},
};
use serde_json::json;

mod common;
use common::{Discussion, discussion, text};

#[test]
fn test_normal_dispatch_runs_own_method() {
    let discussion = discussion(RegistryBuilder::new());

    let result = discussion.intercept("Render", vec![text("index")]).unwrap();

    assert_eq!(result, json!("<index>"));
    assert_eq!(discussion.handler_type(), HandlerType::Normal);
    assert_eq!(discussion.body_calls(), 1);
}

#[test]
fn test_override_never_runs_own_method() {
    let discussion = discussion(
        RegistryBuilder::new().override_method(
            "Discussion",
            "Render",
            "Theme",
            ValueHandler::new("themed"),
        ),
    );

    for _ in 0..3 {
        let result = discussion.intercept("Render", vec![text("index")]).unwrap();
        assert_eq!(result, json!("themed"));
    }

    assert_eq!(discussion.handler_type(), HandlerType::Override);
    assert_eq!(discussion.body_calls(), 0, "Own body must never run when overridden");
}

#[test]
fn test_new_method_supplies_undeclared_method() {
    let discussion = discussion(RegistryBuilder::new().new_method(
        "Discussion",
        "Archive",
        "Archiver",
        handler_fn(|subject| {
            let reason = subject.core().event_argument("0").unwrap_or(Value::Null);
            Ok(json!({ "archived": true, "reason": reason }))
        }),
    ));

    let result = discussion.intercept("Archive", vec![text("stale")]).unwrap();

    assert_eq!(result, json!({ "archived": true, "reason": "stale" }));
    assert_eq!(discussion.handler_type(), HandlerType::New);
}

#[test]
fn test_override_beats_new_method() {
    let discussion = discussion(
        RegistryBuilder::new()
            .new_method("Discussion", "Archive", "Archiver", ValueHandler::new("new"))
            .override_method("Discussion", "Archive", "Theme", ValueHandler::new("override")),
    );

    let result = discussion.intercept("Archive", vec![]).unwrap();

    assert_eq!(result, json!("override"));
    assert_eq!(discussion.handler_type(), HandlerType::Override);
}

#[test]
fn test_unknown_method_is_an_error() {
    let discussion = discussion(RegistryBuilder::new());

    let err = discussion.intercept("Archive", vec![]).unwrap_err();

    assert!(matches!(
        err,
        PluggableError::UnknownMethod { ref class, ref method }
            if class == "Discussion" && method == "xArchive"
    ));
}

#[test]
fn test_override_alone_does_not_resolve_missing_method() {
    let recorder = RecordingHandler::new();
    let discussion = discussion(
        RegistryBuilder::new()
            .override_method("Discussion", "Archive", "Theme", ValueHandler::new("x"))
            .before("Discussion", "Archive", "Spy", recorder.clone()),
    );

    let err = discussion.intercept("Archive", vec![]).unwrap_err();

    assert!(matches!(err, PluggableError::UnknownMethod { .. }));
    assert_eq!(recorder.count(), 0, "Resolution fails before any handler runs");
}

#[test]
fn test_before_and_after_wrap_the_body() {
    let log = CallLog::new();
    let discussion = discussion(
        RegistryBuilder::new()
            .after("Discussion", "Render", "Audit", log.handler("after"))
            .before("Discussion", "Render", "SpamGuard", log.handler("before:spam"))
            .before("Discussion", "Render", "Cache", log.handler("before:cache")),
    );

    discussion.intercept("Render", vec![text("index")]).unwrap();

    assert_eq!(log.entries(), vec!["before:spam", "before:cache", "after"]);
    assert_eq!(discussion.journal.entries(), vec!["render"]);
}

#[test]
fn test_handlers_see_call_arguments() {
    let recorder = RecordingHandler::new();
    let discussion = discussion(
        RegistryBuilder::new().before("Discussion", "Render", "Spy", recorder.clone()),
    );

    discussion
        .intercept("Render", vec![text("index"), json!(2)])
        .unwrap();

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].get("0"), Some(&json!("index")));
    assert_eq!(calls[0].get_index(1), Some(&json!(2)));
}

#[test]
fn test_before_rewrite_reaches_override_but_not_own_body() {
    let rewrite = handler_fn(|subject| {
        subject.core().set_event_argument("0", "rewritten");
        Ok(Value::Null)
    });
    let echo = handler_fn(|subject| Ok(subject.core().event_argument("0").unwrap_or(Value::Null)));

    let overridden = discussion(
        RegistryBuilder::new()
            .before("Discussion", "Render", "Rewriter", rewrite.clone())
            .override_method("Discussion", "Render", "Echo", echo),
    );
    let result = overridden.intercept("Render", vec![text("original")]).unwrap();
    assert_eq!(result, json!("rewritten"));

    let plain = discussion(
        RegistryBuilder::new().before("Discussion", "Render", "Rewriter", rewrite),
    );
    let result = plain.intercept("Render", vec![text("original")]).unwrap();
    assert_eq!(result, json!("<original>"), "Own body receives the original arguments");
}

#[test]
fn test_after_returns_do_not_alter_result() {
    let discussion = discussion(
        RegistryBuilder::new().after(
            "Discussion",
            "Render",
            "Mangler",
            ValueHandler::new("mangled"),
        ),
    );

    let result = discussion.intercept("Render", vec![text("index")]).unwrap();

    assert_eq!(result, json!("<index>"));
    assert_eq!(
        discussion.get_return("Mangler", "Render_After"),
        Some(json!("mangled"))
    );
}

#[test]
fn test_return_ledger_records_only_executed_handlers() {
    let discussion = discussion(
        RegistryBuilder::new()
            .before("Discussion", "Render", "SpamGuard", ValueHandler::new(true))
            .after("Discussion", "Publish", "Audit", ValueHandler::new("audited")),
    );

    discussion.intercept("Render", vec![text("index")]).unwrap();

    assert_eq!(discussion.get_return("SpamGuard", "Render_Before"), Some(json!(true)));
    assert_eq!(discussion.get_return("spamguard", "render_before"), Some(json!(true)));
    assert_eq!(discussion.get_return("SpamGuard", "Render_After"), None);
    assert_eq!(discussion.get_return("Other", "Render_Before"), None);
    assert_eq!(
        discussion.get_return("Audit", "Publish_After"),
        None,
        "Registered but never executed"
    );
}

#[test]
fn test_return_ledger_is_cumulative() {
    let discussion = discussion(
        RegistryBuilder::new()
            .before("Discussion", "Render", "SpamGuard", ValueHandler::new(1))
            .before("Discussion", "Publish", "SpamGuard", ValueHandler::new(2)),
    );

    discussion.intercept("Render", vec![text("a")]).unwrap();
    discussion.intercept("xPublish", vec![]).unwrap();

    let ledger = discussion.core().returns();
    assert_eq!(ledger.len(), 2);
    assert_eq!(discussion.get_return("SpamGuard", "Render_Before"), Some(json!(1)));
    assert_eq!(discussion.get_return("SpamGuard", "Publish_Before"), Some(json!(2)));
}

#[test]
fn test_before_failure_stops_the_call() {
    let discussion = discussion(
        RegistryBuilder::new()
            .before("Discussion", "Render", "Gatekeeper", FailingHandler::new("denied")),
    );

    let err = discussion.intercept("Render", vec![text("index")]).unwrap_err();

    match err {
        PluggableError::Handler { phase, ref source, .. } => {
            assert_eq!(phase, Phase::Before);
            assert_eq!(source.to_string(), "denied");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(discussion.body_calls(), 0);
}

#[test]
fn test_after_failure_propagates() {
    let discussion = discussion(
        RegistryBuilder::new().after(
            "Discussion",
            "Render",
            "Audit",
            FailingHandler::new("disk full"),
        ),
    );

    let err = discussion.intercept("Render", vec![text("index")]).unwrap_err();

    assert!(matches!(err, PluggableError::Handler { phase: Phase::After, .. }));
    assert_eq!(discussion.body_calls(), 1, "Body ran before the After failure");
}

#[test]
fn test_override_failure_propagates() {
    let discussion = discussion(
        RegistryBuilder::new().override_method(
            "Discussion",
            "Render",
            "Theme",
            FailingHandler::new("bad theme"),
        ),
    );

    let err = discussion.intercept("Render", vec![]).unwrap_err();

    assert!(matches!(err, PluggableError::Handler { phase: Phase::Override, .. }));
}

#[test]
fn test_method_failure_is_reported() {
    let recorder = RecordingHandler::new();
    let discussion = discussion(
        RegistryBuilder::new().after("Discussion", "Explode", "Spy", recorder.clone()),
    );

    let err = discussion.intercept("Explode", vec![]).unwrap_err();

    match err {
        PluggableError::Method { ref method, ref source } => {
            assert_eq!(method, "xExplode");
            assert_eq!(source.to_string(), "kaboom");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(recorder.count(), 0, "After handlers do not run when the body fails");
}

#[test]
fn test_bad_argument_type_is_a_method_error() {
    let discussion = discussion(RegistryBuilder::new());

    let err = discussion.intercept("Render", vec![json!(42)]).unwrap_err();

    let PluggableError::Method { source, .. } = err else {
        panic!("expected a method error");
    };
    let argument = source
        .downcast_ref::<ArgumentError>()
        .expect("source should be an ArgumentError");
    assert_eq!(argument.index(), 0);
}

#[test]
fn test_typed_struct_arguments() {
    let discussion = discussion(RegistryBuilder::new());
    let draft = json!({ "title": "Hello", "body": "World" });

    let result = discussion.intercept("Save", vec![draft.clone()]).unwrap();

    assert_eq!(result, draft);
}

#[test]
fn test_variadic_method_has_no_arity_cap() {
    let discussion = discussion(RegistryBuilder::new());
    let args: Vec<Value> = (1..=25).map(Value::from).collect();

    let result = discussion.intercept("Sum", args).unwrap();

    assert_eq!(result, json!(325));
}

#[test]
fn test_removed_capability_ignores_registered_handlers() {
    let recorder = RecordingHandler::new();
    let discussion = discussion(
        RegistryBuilder::new()
            .new_method("Discussion", "enableSlicing", "Slicer", ValueHandler::new(true))
            .override_method("Discussion", "enableSlicing", "Slicer", ValueHandler::new(true))
            .before("Discussion", "enableSlicing", "Spy", recorder.clone()),
    );

    for name in ["enableSlicing", "EnableSlicing", "slice", "addSliceAsset"] {
        let err = discussion.intercept(name, vec![]).unwrap_err();
        assert!(
            matches!(err, PluggableError::RemovedCapability { .. }),
            "{name} should be rejected"
        );
    }
    assert_eq!(recorder.count(), 0);
}

#[test]
fn test_intercept_requires_identity() {
    let discussion = Discussion::uninitialized(RegistryBuilder::new().build());

    let err = discussion.intercept("Render", vec![text("index")]).unwrap_err();
    assert!(matches!(err, PluggableError::NotInitialized));

    discussion.core().establish_identity("Discussion").unwrap();
    assert!(discussion.intercept("Render", vec![text("index")]).is_ok());
}
