//! Logging and optional OpenTelemetry export

use anyhow::Result;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "reportflow=info,tower_http=info";

/// Install the global subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: filter directives (default: `reportflow=info,tower_http=info`)
/// - `REPORTFLOW_LOG_FORMAT`: `json` for structured output, anything else is pretty
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: enables span export (needs the `telemetry` feature)
///
/// The returned guard flushes buffered log lines on drop; keep it alive in `main`.
pub fn init() -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let log_format =
        std::env::var("REPORTFLOW_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let fmt_layer = match log_format.as_str() {
        // Production: JSON structured logging
        "json" => fmt::layer().json().with_writer(writer).boxed(),
        // Development: pretty formatting with colors
        _ => fmt::layer().pretty().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer()?)
        .try_init()?;

    Ok(guard)
}

/// Span exporter layer, when configured
fn otel_layer<S>() -> Result<Option<Box<dyn Layer<S> + Send + Sync + 'static>>>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
{
    // Check if OpenTelemetry is configured
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return Ok(None);
    };

    #[cfg(feature = "telemetry")]
    let layer = Some(otel_layer_impl(&endpoint)?);

    #[cfg(not(feature = "telemetry"))]
    let layer = {
        eprintln!(
            "OTEL_EXPORTER_OTLP_ENDPOINT={} set but feature 'telemetry' not enabled; rebuild with --features telemetry",
            endpoint
        );
        None
    };

    Ok(layer)
}

#[cfg(feature = "telemetry")]
fn otel_layer_impl<S>(endpoint: &str) -> Result<Box<dyn Layer<S> + Send + Sync + 'static>>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
{
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use opentelemetry_sdk::Resource;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "reportflow".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.clone(),
        )]))
        .build();

    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
}
