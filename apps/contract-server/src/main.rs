//! Contract analysis server
//!
//! Thin HTTP boundary over the clause-engine pipeline. Provides REST API
//! endpoints for:
//!
//! - Document analysis (PDF, images, Word) via multipart upload
//! - Plain-text analysis
//! - Rule taxonomy listing
//!
//! ## Architecture
//!
//! Extraction and OCR are blocking, so every analysis runs on the blocking
//! pool under a per-request deadline. The analyzer holds no per-document
//! state and is shared across requests.
//!
//! - Rate limiting via tower-governor
//! - Upload size limit via tower-http
//! - Request tracing via tower-http

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clause_engine::{RiskAnalyzer, RuleSet};
use doc_extract::ExtractionConfig;

mod api;
mod error;

use api::{handle_analyze_document, handle_analyze_text, handle_health, handle_list_rules};

/// Command-line arguments for the contract analysis server
#[derive(Parser, Debug)]
#[command(name = "contract-server")]
#[command(about = "Contract clause risk analysis server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Analysis timeout in milliseconds
    #[arg(long, env = "ANALYSIS_TIMEOUT_MS", default_value = "60000")]
    timeout_ms: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, env = "RATE_LIMIT", default_value = "10")]
    rate_limit: u32,

    /// Maximum upload size in megabytes
    #[arg(long, env = "MAX_UPLOAD_MB", default_value = "50")]
    max_upload_mb: usize,

    /// JSON rule table replacing the built-in taxonomy
    #[arg(long, env = "RULES_FILE")]
    rules: Option<PathBuf>,

    /// Tesseract executable
    #[arg(long, env = "TESSERACT_BIN", default_value = "tesseract")]
    tesseract_bin: String,

    /// OCR language pack(s)
    #[arg(long, env = "OCR_LANGUAGE", default_value = "eng")]
    ocr_language: String,

    /// Rasterisation DPI for scanned PDFs
    #[arg(long, env = "OCR_DPI", default_value = "300")]
    ocr_dpi: u32,

    /// Poppler pdftoppm executable
    #[arg(long, env = "PDFTOPPM_BIN", default_value = "pdftoppm")]
    pdftoppm_bin: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn extraction_config(&self) -> ExtractionConfig {
        let mut config = ExtractionConfig::default();
        config.ocr.tesseract_bin = self.tesseract_bin.clone();
        config.ocr.language = self.ocr_language.clone();
        config.ocr.dpi = self.ocr_dpi;
        config.ocr.pdftoppm_bin = self.pdftoppm_bin.clone();
        config
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<RiskAnalyzer>,
    /// Analysis timeout in milliseconds
    pub timeout_ms: u64,
}

/// Routes and per-request middleware shared by the binary and the tests.
/// Rate limiting needs peer addresses and is layered on in `main`.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/rules", get(handle_list_rules))
        .route("/api/analysis", post(handle_analyze_document))
        .route("/api/analysis/text", post(handle_analyze_text))
        // Apply middleware
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}

fn load_rules(path: Option<&Path>) -> anyhow::Result<RuleSet> {
    let Some(path) = path else {
        return Ok(RuleSet::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule file {}", path.display()))?;
    RuleSet::from_json(&json).with_context(|| format!("Invalid rule file {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting contract server on {}:{}", args.host, args.port);

    let rules = load_rules(args.rules.as_deref())?;
    info!(
        rules = rules.len(),
        custom = args.rules.is_some(),
        "Rule taxonomy loaded"
    );

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Failed to create rate limiter config")?,
    );

    // Create shared state
    let state = AppState {
        analyzer: Arc::new(RiskAnalyzer::new(args.extraction_config(), rules)),
        timeout_ms: args.timeout_ms,
    };

    let extraction = state.analyzer.dispatcher().config();
    info!(
        min_embedded_chars = extraction.min_embedded_chars,
        ocr_language = %extraction.ocr.language,
        ocr_dpi = extraction.ocr.dpi,
        "Extraction configured"
    );

    let max_upload_bytes = args.max_upload_mb * 1024 * 1024;
    let app = build_router(state, max_upload_bytes).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Analysis timeout: {}ms", args.timeout_ms);
    info!("Upload limit: {} MB", args.max_upload_mb);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
