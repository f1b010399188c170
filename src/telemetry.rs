use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::Layer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

const SERVICE_NAME: &str = "wayfarer";

/// Traces are exported only when this variable points at a collector
const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

fn get_resource() -> Resource {
    static RESOURCE: OnceLock<Resource> = OnceLock::new();
    RESOURCE
        .get_or_init(|| Resource::builder().with_service_name(SERVICE_NAME).build())
        .clone()
}

fn init_traces() -> anyhow::Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder().with_http().build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(get_resource())
        .build())
}

/// The configured collector endpoint, ignoring blank values
fn otlp_endpoint(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    lookup(OTLP_ENDPOINT_VAR).filter(|endpoint| !endpoint.trim().is_empty())
}

// Events from the exporter's own HTTP stack must not be exported again, or
// every export produces more telemetry.
// https://github.com/open-telemetry/opentelemetry-rust/issues/761
fn otel_filter() -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::new("info")
        .add_directive("hyper=off".parse()?)
        .add_directive("opentelemetry=off".parse()?)
        .add_directive("tonic=off".parse()?)
        .add_directive("h2=off".parse()?)
        .add_directive("reqwest=off".parse()?))
}

/// Initialize tracing-subscriber, returning the guard that flushes spans on drop
///
/// Logs go to stderr filtered by `RUST_LOG` (default `info`), so stdout stays
/// clean for the itinerary output. Call after `.env` has been loaded.
pub fn init_tracing_subscriber() -> anyhow::Result<OtelGuard> {
    let tracer_provider = match otlp_endpoint(|key| std::env::var(key).ok()) {
        Some(_) => Some(init_traces()?),
        None => None,
    };

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let otel_layer = match tracer_provider.as_ref() {
        Some(provider) => Some(
            OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME)).with_filter(otel_filter()?),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(OtelGuard { tracer_provider })
}

pub struct OtelGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("{err:?}");
            }
        }
    }
}
