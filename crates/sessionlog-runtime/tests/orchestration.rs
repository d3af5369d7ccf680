// Integration tests for logging, sweeps, resolution and teardown through DebugLog
mod common;

use common::recording;
use serde_json::json;
use sessionlog_runtime::{
    Config, DebugLog, Error, EventFilter, Origin, ProviderOperation, SessionScope,
};
use sessionlog_testing::fixtures::{event_at, names, provider_event_at, session};
use sessionlog_testing::providers::{
    FailingProvider, PanickingProvider, ResolvingProvider, ScriptedProvider, StaticProvider, Step,
};
use sessionlog_types::{DiagnosticEvent, LogLevel, ProviderEvent, ResolvedContent, SessionResource};
use std::sync::Arc;

#[test]
fn test_capacity_three_keeps_last_three() {
    let log = DebugLog::builder().capacity(3).build();
    let s = session("s");

    for (i, name) in ["e1", "e2", "e3", "e4"].iter().enumerate() {
        log.add_event(event_at(&s, name, i as i64));
    }

    assert_eq!(log.len(), 3);
    assert_eq!(names(&log.get_events(None)), ["e2", "e3", "e4"]);
}

#[test]
fn test_zero_capacity_stores_and_announces_nothing() {
    let log = DebugLog::builder().capacity(0).build();
    let s = session("s");
    let mut stream = log.subscribe();

    log.log(&s, "dropped", None, LogLevel::Info);
    log.add_provider_event(DiagnosticEvent::new(s.clone(), "also dropped"));

    assert!(log.is_empty());
    assert!(log.get_events(None).is_empty());
    assert!(stream.try_next().is_none());
}

#[test]
fn test_get_events_sorted_by_created() {
    let log = DebugLog::default();
    let s = session("s");

    log.add_event(event_at(&s, "third", 30));
    log.add_event(event_at(&s, "first", 10));
    log.add_event(event_at(&s, "second", 20));

    let events = log.get_events(None);
    assert_eq!(names(&events), ["first", "second", "third"]);
    assert!(events.windows(2).all(|pair| pair[0].created <= pair[1].created));
}

#[test]
fn test_log_ignores_sessions_outside_scope() {
    let log = DebugLog::default();
    let foreign = SessionResource::new("https://remote.example/s1");
    let local = session("s1");

    log.log(&foreign, "dropped", None, LogLevel::Info);
    log.log(&local, "kept", Some(json!({"step": 1})), LogLevel::Warning);

    let events = log.get_events(None);
    assert_eq!(names(&events), ["kept"]);
    assert_eq!(events[0].level, LogLevel::Warning);
    assert_eq!(events[0].details, Some(json!({"step": 1})));
    assert_eq!(log.origin_of(&events[0]), Some(Origin::Internal));
}

#[test]
fn test_custom_scope() {
    let log = DebugLog::builder()
        .scope(SessionScope::custom(|s| s.path().starts_with("keep")))
        .build();

    log.log(&session("keep-1"), "a", None, LogLevel::Info);
    log.log(&session("skip-1"), "b", None, LogLevel::Info);

    assert_eq!(log.get_session_resources(), vec![session("keep-1")]);
}

#[test]
fn test_log_with_options() {
    let log = DebugLog::default();
    let s = session("s");

    log.log_with(
        &s,
        "child",
        None,
        LogLevel::Debug,
        sessionlog_runtime::LogOptions::default()
            .id("evt-2")
            .category("build")
            .parent("evt-1"),
    );

    let event = &log.get_events(Some(&s))[0];
    assert_eq!(event.id.as_deref(), Some("evt-2"));
    assert_eq!(event.category.as_deref(), Some("build"));
    assert_eq!(event.parent_event_id.as_deref(), Some("evt-1"));
}

#[tokio::test]
async fn test_failing_provider_does_not_stop_siblings() {
    let (log, failures) = recording(DebugLog::builder());
    let s = session("s");

    log.register_provider(Arc::new(FailingProvider::new("a", "connection refused")))
        .unwrap();
    log.register_provider(Arc::new(StaticProvider::new(
        "b",
        vec![provider_event_at("x", 1), provider_event_at("y", 2)],
    )))
    .unwrap();

    let summary = log.invoke_providers(&s).await.unwrap();
    assert_eq!(summary.providers, 2);
    assert_eq!(summary.stored, 2);
    assert_eq!(summary.failed, 1);

    let events = log.get_events(Some(&s));
    assert_eq!(names(&events), ["x", "y"]);
    for event in &events {
        assert_eq!(event.session_resource, s);
        assert_eq!(log.origin_of(event), Some(Origin::Provider));
    }

    let reported = failures.all();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].provider, "a");
    assert_eq!(reported[0].operation, ProviderOperation::ProvideEvents);
    assert_eq!(reported[0].session, Some(s));
    assert!(reported[0].message.contains("connection refused"));
}

#[tokio::test]
async fn test_panicking_provider_is_reported() {
    let (log, failures) = recording(DebugLog::builder());
    let s = session("s");

    log.register_provider(Arc::new(PanickingProvider::new("boom")))
        .unwrap();
    log.register_provider(Arc::new(StaticProvider::new(
        "ok",
        vec![provider_event_at("x", 1)],
    )))
    .unwrap();

    let summary = log.invoke_providers(&s).await.unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(names(&log.get_events(Some(&s))), ["x"]);
    assert_eq!(failures.providers(), ["boom"]);
    assert!(failures.all()[0].message.starts_with("panicked"));
}

#[tokio::test]
async fn test_reinvoke_removes_only_own_provider_events() {
    let log = DebugLog::default();
    let s1 = session("s1");
    let s2 = session("s2");

    log.register_provider(Arc::new(StaticProvider::new(
        "p",
        vec![provider_event_at("provided", 5)],
    )))
    .unwrap();

    log.add_event(event_at(&s1, "s1-internal", 1));
    log.invoke_providers(&s1).await.unwrap();
    log.add_event(event_at(&s2, "s2-internal", 2));
    log.invoke_providers(&s2).await.unwrap();

    let before_s2 = log.get_events(Some(&s2));
    assert_eq!(names(&log.get_events(Some(&s1))), ["s1-internal", "provided"]);

    log.invoke_providers(&s1).await.unwrap();
    log.invoke_providers(&s1).await.unwrap();

    // No accumulation for s1, internal event kept
    assert_eq!(names(&log.get_events(Some(&s1))), ["s1-internal", "provided"]);
    // s2 untouched, provider-sourced event included
    let after_s2 = log.get_events(Some(&s2));
    assert_eq!(names(&after_s2), names(&before_s2));
    assert!(Arc::ptr_eq(&before_s2[1], &after_s2[1]));
    assert_eq!(log.len(), 4);
}

#[tokio::test]
async fn test_provider_event_keeps_explicit_session() {
    let log = DebugLog::default();
    let s = session("s");
    let other = session("other");

    log.register_provider(Arc::new(StaticProvider::new(
        "p",
        vec![ProviderEvent::new("elsewhere").with_session(other.clone())],
    )))
    .unwrap();

    log.invoke_providers(&s).await.unwrap();
    assert_eq!(names(&log.get_events(Some(&other))), ["elsewhere"]);
    assert!(log.get_events(Some(&s)).is_empty());
}

#[tokio::test]
async fn test_invoke_outside_scope_runs_nothing() {
    let log = DebugLog::default();
    let provider = ScriptedProvider::new("p").into_arc();
    log.register_provider(provider.clone()).unwrap();

    let summary = log
        .invoke_providers(&SessionResource::new("vscode-remote://host/s"))
        .await
        .unwrap();

    assert_eq!(summary.revision, None);
    assert_eq!(provider.call_count(), 0);
    assert!(log.active_sessions().is_empty());
}

#[tokio::test]
async fn test_resolve_first_match_in_registration_order() {
    let (log, failures) = recording(DebugLog::builder());

    log.register_provider(Arc::new(FailingProvider::new("broken", "offline")))
        .unwrap();
    log.register_provider(Arc::new(PanickingProvider::new("boom")))
        .unwrap();
    log.register_provider(Arc::new(ResolvingProvider::new("empty")))
        .unwrap();
    log.register_provider(Arc::new(
        ResolvingProvider::new("first").with("evt-1", ResolvedContent::text("from first")),
    ))
    .unwrap();
    log.register_provider(Arc::new(
        ResolvingProvider::new("second").with("evt-1", ResolvedContent::text("from second")),
    ))
    .unwrap();

    assert_eq!(
        log.resolve_event("evt-1").await,
        Some(ResolvedContent::text("from first"))
    );
    assert_eq!(failures.providers(), ["broken", "boom"]);
    assert!(
        failures
            .all()
            .iter()
            .all(|f| f.operation == ProviderOperation::ResolveEvent && f.session.is_none())
    );
}

#[tokio::test]
async fn test_resolve_unknown_id_is_none() {
    let (log, failures) = recording(DebugLog::builder());

    assert_eq!(log.resolve_event("evt-1").await, None);

    log.register_provider(Arc::new(FailingProvider::new("broken", "offline")))
        .unwrap();
    log.register_provider(Arc::new(ResolvingProvider::new("empty")))
        .unwrap();

    assert_eq!(log.resolve_event("evt-1").await, None);
    assert_eq!(failures.providers(), ["broken"]);
}

#[tokio::test]
async fn test_unregister_removes_provider() {
    let log = DebugLog::default();
    let kept = ScriptedProvider::new("kept").into_arc();
    let removed = ScriptedProvider::new("removed").into_arc();

    log.register_provider(kept.clone()).unwrap();
    let registration = log.register_provider(removed.clone()).unwrap();
    let id = registration.id();
    assert_eq!(log.provider_count(), 2);

    assert!(registration.unregister());
    assert!(!log.unregister_provider(id));
    assert_eq!(log.provider_count(), 1);

    log.invoke_providers(&session("s")).await.unwrap();
    assert_eq!(kept.call_count(), 1);
    assert_eq!(removed.call_count(), 0);
}

#[tokio::test]
async fn test_registration_outlives_dropped_log() {
    let log = DebugLog::default();
    let registration = log
        .register_provider(Arc::new(StaticProvider::new("p", Vec::new())))
        .unwrap();
    drop(log);

    assert!(!registration.unregister());
}

#[tokio::test]
async fn test_dispose_rejects_further_work() {
    let log = DebugLog::default();
    let s = session("s");
    let provider = ScriptedProvider::new("p").into_arc();
    log.register_provider(provider.clone()).unwrap();

    log.log(&s, "before", None, LogLevel::Info);
    log.invoke_providers(&s).await.unwrap();
    let token = provider.calls()[0].token.clone();

    log.dispose();
    log.dispose();

    assert!(log.is_disposed());
    assert!(token.is_cancelled());
    assert!(log.active_sessions().is_empty());
    assert!(matches!(log.invoke_providers(&s).await, Err(Error::Disposed)));
    assert!(matches!(
        log.register_provider(Arc::new(StaticProvider::new("late", Vec::new()))),
        Err(Error::Disposed)
    ));

    log.log(&s, "after", None, LogLevel::Info);
    log.add_provider_event(DiagnosticEvent::new(s.clone(), "after-provider"));
    assert_eq!(names(&log.get_events(None)), ["before"]);
}

#[test]
fn test_query_with_min_level() {
    let log = DebugLog::default();
    let s1 = session("s1");
    let s2 = session("s2");

    log.add_event(event_at(&s1, "debug", 1).with_level(LogLevel::Debug));
    log.add_event(event_at(&s1, "warning", 2).with_level(LogLevel::Warning));
    log.add_event(event_at(&s2, "error", 3).with_level(LogLevel::Error));

    let warnings = log.query(&EventFilter::all().min_level(LogLevel::Warning));
    assert_eq!(names(&warnings), ["warning", "error"]);

    let s1_warnings = log.query(
        &EventFilter::all()
            .session(s1)
            .min_level(LogLevel::Warning),
    );
    assert_eq!(names(&s1_warnings), ["warning"]);
}

#[test]
fn test_session_resources_first_seen_order() {
    let log = DebugLog::default();
    for key in ["b", "a", "b", "c"] {
        log.add_event(DiagnosticEvent::new(session(key), "x"));
    }

    assert_eq!(
        log.get_session_resources(),
        vec![session("b"), session("a"), session("c")]
    );
}

#[tokio::test]
async fn test_clear_keeps_pipelines() {
    let log = DebugLog::default();
    let s = session("s");
    log.register_provider(Arc::new(StaticProvider::new(
        "p",
        vec![provider_event_at("x", 1)],
    )))
    .unwrap();

    log.invoke_providers(&s).await.unwrap();
    log.clear();

    assert!(log.is_empty());
    assert!(log.get_session_resources().is_empty());
    assert_eq!(log.active_sessions(), vec![s]);
}

#[test]
fn test_config_drives_capacity_and_scope() {
    let config = Config {
        capacity: 2,
        local_schemes: Vec::new(),
        ..Config::default()
    };
    let log = DebugLog::new(config);

    log.log(&SessionResource::new("https://remote/s"), "a", None, LogLevel::Info);
    log.log(&SessionResource::new("untitled"), "b", None, LogLevel::Info);
    log.log(&session("s"), "c", None, LogLevel::Info);

    assert_eq!(log.capacity(), 2);
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn test_scripted_failure_is_counted() {
    let (log, failures) = recording(DebugLog::builder());
    let provider = ScriptedProvider::new("flaky")
        .then(Step::Fail("first sweep fails".to_string()))
        .then(Step::Return(vec![provider_event_at("recovered", 1)]))
        .into_arc();
    log.register_provider(provider).unwrap();
    let s = session("s");

    let first = log.invoke_providers(&s).await.unwrap();
    let second = log.invoke_providers(&s).await.unwrap();

    assert_eq!((first.failed, first.stored), (1, 0));
    assert_eq!((second.failed, second.stored), (0, 1));
    assert_eq!(failures.all().len(), 1);
    assert_eq!(names(&log.get_events(Some(&s))), ["recovered"]);
}
