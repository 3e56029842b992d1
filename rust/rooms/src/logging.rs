use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::field::{Field, Visit};
use tracing::Level;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info,holdem_rooms=debug";

/// Structured log entry captured by [`TestLogSubscriber`]
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Captures log entries so tests can assert on what the manager reported
#[derive(Debug, Clone, Default)]
pub struct TestLogSubscriber {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries whose message contains `needle`.
    pub fn find(&self, needle: &str) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.message.contains(needle))
            .collect()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn into_layer<S>(self) -> TestLayer<S>
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        TestLayer {
            entries: self.entries,
            _subscriber: PhantomData,
        }
    }
}

/// Layer half of [`TestLogSubscriber`]; shares its entry buffer.
pub struct TestLayer<S> {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    _subscriber: PhantomData<S>,
}

impl<S> Layer<S> for TestLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let entry = LogEntry::from_event(event);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

impl LogEntry {
    fn from_event(event: &tracing::Event<'_>) -> Self {
        let metadata = event.metadata();
        let mut entry = LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut entry);
        entry
    }

    fn store(&mut self, name: &str, value: String) {
        if name == "message" {
            self.message = value;
        } else {
            self.fields.push((name.to_string(), value));
        }
    }
}

impl Visit for LogEntry {
    // strings arrive unquoted here; everything else goes through Debug
    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.store(field.name(), format!("{value:?}"));
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a human-readable fmt subscriber filtered by `RUST_LOG`.
///
/// Fails instead of panicking when a global subscriber is already set.
pub fn init_logging() -> Result<(), TryInitError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::util::SubscriberInitExt;

    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish()
        .try_init()
}

/// Same as [`init_logging`] with one JSON object per event.
pub fn init_json_logging() -> Result<(), TryInitError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::util::SubscriberInitExt;

    fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(false)
        .finish()
        .try_init()
}
