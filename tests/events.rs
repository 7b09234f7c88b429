//! Trace events emitted with the `tracing` feature.
//!
//! This target is declared with `required-features = ["tracing"]`; run it with
//! `cargo test --features tracing`.

use errchain::{Error, release};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

// ============================================================================
// Capturing layer
// ============================================================================

#[derive(Debug, Default)]
struct Captured {
    level: Option<Level>,
    fields: BTreeMap<&'static str, String>,
}

impl Captured {
    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_else(|| {
            panic!("event has no `{}` field: {:?}", name, self.fields)
        })
    }
}

impl Visit for Captured {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name(), value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields.insert(field.name(), format!("{:?}", value));
    }
}

#[derive(Clone, Default)]
struct Capture {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl<S: tracing::Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut captured = Captured {
            level: Some(*event.metadata().level()),
            ..Captured::default()
        };
        event.record(&mut captured);
        self.events.lock().unwrap().push(captured);
    }
}

/// Run `f` with a capturing subscriber and return what it recorded.
fn capture(f: impl FnOnce()) -> Vec<Captured> {
    let layer = Capture::default();
    let events = Arc::clone(&layer.events);
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let mut events = events.lock().unwrap();
    std::mem::take(&mut *events)
}

fn ours(events: &[Captured]) -> Vec<&Captured> {
    events
        .iter()
        .filter(|e| e.fields.get("message").is_some_and(|m| m.starts_with("error ")))
        .collect()
}

// ============================================================================
// Create / Wrap / Release
// ============================================================================

#[test]
fn create_wrap_release_each_emit_one_event() {
    let mut sites = Vec::new();
    let events = capture(|| {
        let err = Error::new(7, "disk full");
        sites.push(*err.site());
        let err = err.wrap();
        sites.push(*err.site());
        err.release();
    });
    let events = ours(&events);

    let messages: Vec<&str> = events.iter().map(|e| e.field("message")).collect();
    assert_eq!(messages, ["error created", "error wrapped", "error released"]);
    assert!(events.iter().all(|e| e.level == Some(Level::TRACE)));

    // Release reports the outermost node's site.
    let expected_sites = [sites[0], sites[1], sites[1]];
    for (event, site) in events.iter().zip(expected_sites) {
        assert_eq!(event.field("code"), "7");
        assert_eq!(event.field("file"), site.file());
        assert_eq!(event.field("line"), site.line().to_string());
    }

    assert_eq!(events[0].field("msg"), "disk full");
    assert_eq!(events[2].field("depth"), "2");
}

#[test]
fn macros_emit_the_same_events() {
    let events = capture(|| {
        let err = errchain::wrap!(errchain::error!(3, "slot {} busy", 4));
        release(Some(err));
    });
    let events = ours(&events);

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].field("msg"), "slot 4 busy");
    assert!(events.iter().all(|e| e.field("file").ends_with("events.rs")));
    assert!(events.iter().all(|e| e.field("code") == "3"));
}

#[test]
fn plain_drop_is_silent() {
    let events = capture(|| {
        let err = Error::new(1, "dropped").wrap().wrap();
        drop(err);
        release(None);
    });
    let events = ours(&events);
    let messages: Vec<&str> = events.iter().map(|e| e.field("message")).collect();
    assert_eq!(messages, ["error created", "error wrapped", "error wrapped"]);
}

#[test]
fn no_events_without_a_failure() {
    let events = capture(|| {
        let ok: errchain::Result<u8> = Ok(1);
        let _ = errchain::ResultExt::wrap(ok);
    });
    assert!(ours(&events).is_empty());
}
