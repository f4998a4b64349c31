use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Span field shown in its own column by the pretty formatter
const ORDER_FIELD: &str = "order_id";

/// Fields recorded on a span, kept in the span's extensions so formatters can read them.
#[derive(Debug, Clone, Default)]
pub struct SpanFields {
    pub raw_fields: HashMap<String, String>,
}

struct SpanFieldCollector {
    fields: SpanFields,
}

impl Visit for SpanFieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let formatted_value = format!("{:?}", value).trim_matches('"').to_string();
        self.fields.raw_fields.insert(field.name().to_string(), formatted_value);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.raw_fields.insert(field.name().to_string(), value.to_string());
    }
}

pub struct FieldCollectorLayer;

impl<S> Layer<S> for FieldCollectorLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &tracing::span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut collector = SpanFieldCollector { fields: SpanFields::default() };
        attrs.record(&mut collector);
        span.extensions_mut().insert(collector.fields);
    }

    fn on_record(&self, id: &tracing::span::Id, values: &tracing::span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut extensions = span.extensions_mut();
        let existing = extensions.remove::<SpanFields>().unwrap_or_default();
        let mut collector = SpanFieldCollector { fields: existing };
        values.record(&mut collector);
        extensions.insert(collector.fields);
    }
}

/// Collects span fields from the innermost span outwards, inner values win.
fn collect_span_fields<S, N>(ctx: &FmtContext<'_, S, N>) -> HashMap<String, String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let mut fields = HashMap::new();
    if let Some(scope) = ctx.event_scope() {
        for span in scope {
            if let Some(span_fields) = span.extensions().get::<SpanFields>() {
                for (key, value) in &span_fields.raw_fields {
                    fields.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
    }
    fields
}

// Pretty formatter is formatted for console readability
pub struct PrettyFormatter;

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let now = Utc::now().format("%y-%m-%d %H:%M:%S").to_string();

        let ts_color = "\x1b[96m";
        let level_color = match *meta.level() {
            Level::TRACE => "\x1b[90m",
            Level::DEBUG => "\x1b[34m",
            Level::INFO => "\x1b[32m",
            Level::WARN => "\x1b[33m",
            Level::ERROR => "\x1b[31m",
        };
        let msg_color = "\x1b[97m";
        let column_color = "\x1b[92m";
        let field_color = "\x1b[90m";
        let reset = "\x1b[0m";

        let mut visitor = FieldExtractor::default();
        event.record(&mut visitor);

        // Event fields take precedence over the ones inherited from spans
        let span_fields = collect_span_fields(ctx);
        let order = visitor
            .order
            .clone()
            .or_else(|| span_fields.get(ORDER_FIELD).cloned())
            .unwrap_or_else(|| "-".to_string());

        // Timestamp | Level | Order | Service | Message and fields
        write!(writer, "{}{}{} ", ts_color, now, reset)?;
        write!(writer, "{}|{} ", field_color, reset)?;
        write!(writer, "{}{:<5}{} ", level_color, *meta.level(), reset)?;
        write!(writer, "{}|{} ", field_color, reset)?;
        write!(writer, "{}{:<10}{} ", column_color, order, reset)?;
        write!(writer, "{}|{} ", field_color, reset)?;
        write!(writer, "{}{:<13}{} ", column_color, extract_service_name(meta.target()), reset)?;
        write!(writer, "{}|{} ", field_color, reset)?;
        write!(writer, "{}{}{}", msg_color, visitor.message, reset)?;

        if !visitor.fields.is_empty() {
            let fields: Vec<String> = visitor
                .fields
                .iter()
                .map(|(name, value)| format!("{}{}={}{}", field_color, name, value, reset))
                .collect();
            write!(writer, " ({})", fields.join(", "))?;
        }

        writeln!(writer)
    }
}

#[derive(Default)]
struct FieldExtractor {
    message: String,
    order: Option<String>,
    fields: Vec<(String, String)>,
}

impl Visit for FieldExtractor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let formatted_value = format!("{:?}", value).trim_matches('"').to_string();
        match field.name() {
            "message" => self.message = formatted_value,
            ORDER_FIELD => self.order = Some(formatted_value),
            name => self.fields.push((name.to_string(), formatted_value)),
        }
    }
}

// JSON formatter for structured logs suitable for Loki/Grafana
pub struct JsonEventFormatter;

#[derive(Default)]
struct JsonFieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl Visit for JsonFieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let v = format!("{:?}", value).trim_matches('"').to_string();
        if field.name() == "message" {
            self.message = Some(v);
        } else {
            self.fields.insert(field.name().to_string(), Value::String(v));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let ts = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);

        let mut root = Map::new();
        root.insert("timestamp".to_string(), Value::String(ts));
        root.insert("level".to_string(), Value::String(meta.level().to_string()));
        root.insert("target".to_string(), Value::String(meta.target().to_string()));
        root.insert("service".to_string(), Value::String(extract_service_name(meta.target()).to_string()));
        if let Some(message) = visitor.message.take() {
            root.insert("message".to_string(), Value::String(message));
        }

        let mut all_fields = visitor.fields;
        if let Some(span) = ctx.lookup_current() {
            all_fields.insert("span_name".to_string(), Value::String(span.metadata().name().to_string()));
        }
        for (key, value) in collect_span_fields(ctx) {
            all_fields.entry(key).or_insert(Value::String(value));
        }
        if !all_fields.is_empty() {
            root.insert("fields".to_string(), Value::Object(all_fields));
        }

        let line = serde_json::to_string(&Value::Object(root)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Initialize the tracing subscriber with
/// - PrettyFormatter for console readability (when LOG_FORMAT != "json")
/// - JsonEventFormatter for json logging (when LOG_FORMAT = "json")
///
/// This will also install color_eyre to handle the panic in the application
pub fn init_logging() {
    color_eyre::install().expect("Unable to install color_eyre");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .parse("lilypad_bridge=info,lilypad_bacalhau_service=info")
            .expect("Invalid filter directive and Logger control")
    });

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let fmt_layer = if log_format == "json" {
        fmt::layer().event_format(JsonEventFormatter).boxed()
    } else {
        fmt::layer().event_format(PrettyFormatter).boxed()
    };

    let subscriber =
        Registry::default().with(env_filter).with(FieldCollectorLayer).with(fmt_layer).with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global default subscriber");
}

/// Maps crate names to short display names for the service column
fn extract_service_name(target: &str) -> &'static str {
    if target.starts_with("lilypad_bacalhau_service") {
        "BACALHAU"
    } else if target.starts_with("lilypad_compute_client") {
        "COMPUTE_IFACE"
    } else if target.starts_with("lilypad_bridge::worker") {
        "WORKER"
    } else if target.starts_with("lilypad_bridge::runner") {
        "RUNNER"
    } else if target.starts_with("lilypad_bridge") {
        "-"
    } else {
        "EXTERNAL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_names_follow_crate_and_module() {
        assert_eq!(extract_service_name("lilypad_bacalhau_service::client"), "BACALHAU");
        assert_eq!(extract_service_name("lilypad_bridge::runner::bacalhau"), "RUNNER");
        assert_eq!(extract_service_name("lilypad_bridge::worker"), "WORKER");
        assert_eq!(extract_service_name("lilypad_bridge::config"), "-");
        assert_eq!(extract_service_name("hyper::client"), "EXTERNAL");
    }
}
