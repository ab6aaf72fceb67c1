use opentelemetry::{
    global::{self, BoxedSpan},
    trace::{SpanKind, Tracer},
    KeyValue,
};
use shared_types::AppError;
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Instrumentation scope for engine spans.
pub const TRACER_NAME: &str = "timetable-engine";

/// Keep the LoggerProvider alive for the process lifetime.
static LOGGER_PROVIDER: OnceLock<opentelemetry_sdk::logs::SdkLoggerProvider> = OnceLock::new();

/// Tokio runtime for the OTLP gRPC exporters. Tonic's `connect_lazy()`
/// calls `tokio::spawn`, and the host service may initialise telemetry
/// before entering its own runtime.
static OTEL_RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

/// OTLP exporter settings resolved from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySettings {
    pub endpoint: String,
    pub service_name: String,
    pub environment: String,
    pub ingestion_key: Option<String>,
}

impl TelemetrySettings {
    /// Read settings from `.env` and the process environment.
    pub fn from_env() -> Option<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary lookup. `None` when no collector
    /// endpoint is configured.
    ///
    ///   - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector gRPC address
    ///   - `OTEL_SERVICE_NAME`: service name tag (default: `timetable-engine`)
    ///   - `SIGNOZ_INGESTION_KEY`: SigNoz Cloud access token (optional for local)
    ///   - `DEPLOY_ENV`: deployment environment tag (default: `development`)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|e| !e.is_empty())?;
        Some(Self {
            endpoint,
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or_else(|| TRACER_NAME.to_string()),
            environment: lookup("DEPLOY_ENV").unwrap_or_else(|| "development".to_string()),
            ingestion_key: lookup("SIGNOZ_INGESTION_KEY").filter(|k| !k.is_empty()),
        })
    }

    pub fn uses_tls(&self) -> bool {
        self.endpoint.starts_with("https://")
    }

    pub fn mode(&self) -> &'static str {
        if self.ingestion_key.is_some() {
            "cloud"
        } else {
            "local"
        }
    }

    fn metadata(
        &self,
    ) -> Result<Option<opentelemetry_otlp::tonic_types::metadata::MetadataMap>, AppError> {
        let Some(key) = &self.ingestion_key else {
            return Ok(None);
        };
        let mut metadata = opentelemetry_otlp::tonic_types::metadata::MetadataMap::new();
        metadata.insert(
            "signoz-ingestion-key",
            key.parse()
                .map_err(|_| AppError::configuration("Invalid SIGNOZ_INGESTION_KEY value"))?,
        );
        Ok(Some(metadata))
    }
}

/// Install the `tracing` subscriber. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("timetable_engine=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init();
}

/// Set up the OpenTelemetry TracerProvider and log bridge when a collector
/// endpoint is configured. Returns `Ok(false)` when telemetry is disabled.
pub fn init_telemetry() -> Result<bool, AppError> {
    let Some(settings) = TelemetrySettings::from_env() else {
        tracing::info!("OTEL_EXPORTER_OTLP_ENDPOINT not set, skipping OTLP telemetry");
        return Ok(false);
    };

    let rt = match OTEL_RUNTIME.get() {
        Some(rt) => rt,
        None => {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .worker_threads(1)
                .build()
                .map_err(|e| AppError::internal(format!("Failed to create OTEL runtime: {}", e)))?;
            OTEL_RUNTIME.get_or_init(|| rt)
        }
    };
    let _guard = rt.enter();

    use opentelemetry_otlp::{WithExportConfig, WithTonicConfig};

    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&settings.endpoint);
    if settings.uses_tls() {
        builder = builder.with_tls_config(
            opentelemetry_otlp::tonic_types::transport::ClientTlsConfig::new().with_native_roots(),
        );
    }
    if let Some(metadata) = settings.metadata()? {
        builder = builder.with_metadata(metadata);
    }
    let exporter = builder
        .build()
        .map_err(|e| AppError::internal(format!("Failed to create OTLP exporter: {}", e)))?;

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(settings.service_name.clone())
        .with_attribute(KeyValue::new("service.version", APP_VERSION))
        .with_attribute(KeyValue::new(
            "deployment.environment",
            settings.environment.clone(),
        ))
        .build();

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource.clone())
        .build();
    global::set_tracer_provider(provider);

    // -- Log exporter (uses the `log` crate, not the `tracing` subscriber) --
    let mut log_builder = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(&settings.endpoint);
    if settings.uses_tls() {
        log_builder = log_builder.with_tls_config(
            opentelemetry_otlp::tonic_types::transport::ClientTlsConfig::new().with_native_roots(),
        );
    }
    if let Some(metadata) = settings.metadata()? {
        log_builder = log_builder.with_metadata(metadata);
    }
    let log_exporter = log_builder
        .build()
        .map_err(|e| AppError::internal(format!("Failed to create OTLP log exporter: {}", e)))?;

    let logger_provider = LOGGER_PROVIDER.get_or_init(|| {
        opentelemetry_sdk::logs::SdkLoggerProvider::builder()
            .with_batch_exporter(log_exporter)
            .with_resource(resource)
            .build()
    });

    let bridge = opentelemetry_appender_log::OpenTelemetryLogBridge::new(logger_provider);
    match log::set_boxed_logger(Box::new(bridge)) {
        Ok(()) => log::set_max_level(log::LevelFilter::Info),
        Err(_) => tracing::warn!("Log bridge skipped, log crate logger already set"),
    }

    tracing::info!(
        endpoint = %settings.endpoint,
        mode = settings.mode(),
        version = APP_VERSION,
        "Telemetry initialized"
    );
    Ok(true)
}

/// Start an internal span for one timetable computation on the global
/// tracer. A no-op span when telemetry is not initialised.
pub fn timetable_span(case_type: &str, procedure_type: Option<&str>) -> BoxedSpan {
    let tracer = global::tracer(TRACER_NAME);
    tracer
        .span_builder("calculate_timetable")
        .with_kind(SpanKind::Internal)
        .with_attributes(vec![
            KeyValue::new("timetable.case_type", case_type.to_string()),
            KeyValue::new(
                "timetable.procedure_type",
                procedure_type.unwrap_or("").to_string(),
            ),
        ])
        .start(&tracer)
}
