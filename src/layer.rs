use crate::level::LogLevel;
use crate::logger::Logger;
use crate::tokenize::placeholder_names;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that writes `tracing` events as records
/// through a [`Logger`].
///
/// For every event the logger is derived with the event target as context
/// and the event fields as scope overlay. The event message is used as the
/// template and each placeholder is bound to the event field of the same
/// name, so `info!(user = 5, "login {{user}}")` yields
/// `"message":"login 5"`. Placeholders naming no field render as `null`.
/// Events emitted by this crate itself are skipped.
#[derive(Debug, Clone)]
pub struct RecordLayer {
    logger: Logger,
}

impl RecordLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for RecordLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target().starts_with(env!("CARGO_CRATE_NAME")) {
            return;
        }

        let mut fields = Map::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let template = message.unwrap_or_default();
        let args: Vec<Value> = placeholder_names(&template)
            .into_iter()
            .map(|name| fields.get(name).cloned().unwrap_or(Value::Null))
            .collect();
        let logger = self.logger.scope_to(meta.target(), &Value::Object(fields));

        if let Err(e) = logger.log(LogLevel::from(meta.level()), &template, &args) {
            tracing::warn!(error = %e, "record layer could not write event");
        }
    }
}

struct FieldVisitor<'a> {
    fields: &'a mut Map<String, Value>,
    message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }
}
