use anyhow::Context;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::Tracer;
use secrecy::ExposeSecret;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue, MetadataMap};
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::configuration::TelemetrySettings;

/// Installs the global subscriber: env filter, formatted output to `sink`,
/// and an OTLP exporter when telemetry is enabled.
///
/// Must be called once per process.
pub fn init_subscriber<Sink>(
    env_filter: String,
    sink: Sink,
    settings: &TelemetrySettings,
) -> anyhow::Result<()>
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    LogTracer::init().context("Failed to set logger")?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = fmt::layer().with_writer(sink);
    let telemetry_layer = telemetry_tracer(settings)?
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let subscriber = Registry::default()
        .with(env_filter)
        .with(formatting_layer)
        .with(telemetry_layer);
    set_global_default(subscriber).context("Failed to set subscriber")
}

fn telemetry_tracer(settings: &TelemetrySettings) -> anyhow::Result<Option<Tracer>> {
    if !settings.enabled {
        return Ok(None);
    }
    let mut metadata = MetadataMap::new();
    let key = AsciiMetadataKey::from_bytes(settings.api_key_header.as_bytes())
        .context("Failed to parse telemetry api key header")?;
    let value: AsciiMetadataValue = settings
        .api_key
        .expose_secret()
        .parse()
        .context("Failed to parse telemetry api key")?;
    metadata.insert(key, value);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_metadata(metadata)
                .with_endpoint(&settings.endpoint)
                .with_tls_config(Default::default()),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)
        .context("Failed to install the OpenTelemetry tracer")?;
    Ok(Some(tracer))
}
