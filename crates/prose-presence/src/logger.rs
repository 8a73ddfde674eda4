// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::BTreeMap;
use std::fmt::Debug;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// A log sink provided by the host application.
pub trait Logger: Send {
    fn log(&self, level: LogLevel, message: String);
}

/// Routes all log output of the engine into `logger`. Fails if a global subscriber has been
/// installed already.
pub fn set_logger(logger: Box<dyn Logger>, max_level: LogLevel) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(CustomLogger::new(logger).with_filter(LevelFilter::from_level(max_level.into())))
        .try_init()?;
    Ok(())
}

impl From<&Level> for LogLevel {
    fn from(value: &Level) -> Self {
        match *value {
            Level::TRACE => LogLevel::Trace,
            Level::DEBUG => LogLevel::Debug,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warn,
            Level::ERROR => LogLevel::Error,
        }
    }
}

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

pub struct CustomLogger {
    logger: Mutex<Box<dyn Logger>>,
}

impl CustomLogger {
    pub fn new(logger: Box<dyn Logger>) -> Self {
        CustomLogger {
            logger: Mutex::new(logger),
        }
    }
}

impl<S> Layer<S> for CustomLogger
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut attributes = AttributeMap::default();
        event.record(&mut FieldVisitor::new(&mut attributes));

        self.logger
            .lock()
            .log(event.metadata().level().into(), format_message(attributes));
    }
}

type AttributeMap = BTreeMap<String, String>;

/// "message  key=value key=value"
fn format_message(mut attributes: AttributeMap) -> String {
    let mut message = String::new();
    if let Some(value) = attributes.remove("message") {
        message = value;
        if !attributes.is_empty() {
            message.push_str("  ");
        }
    }
    message.push_str(
        &attributes
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" "),
    );
    message
}

struct FieldVisitor<'a> {
    output: &'a mut AttributeMap,
}

impl<'a> FieldVisitor<'a> {
    fn new(output: &'a mut AttributeMap) -> Self {
        FieldVisitor { output }
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.output
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.output
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.output
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.output
            .insert(field.name().to_string(), format!("\"{}\"", value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.output
            .insert(field.name().to_string(), format!("{:?}", value));
    }
}
