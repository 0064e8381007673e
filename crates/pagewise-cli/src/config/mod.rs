//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── pagination: PaginationConfig  # Page size bounds, timestamp fields
//! └── request: RequestArgs          # Data file and connection arguments
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod request;

use clap::Parser;
use pagewise::PaginationConfig;
pub use request::RequestArgs;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "pagewise")]
#[command(about = "Page through JSON documents with opaque cursors")]
#[command(version)]
pub struct Cli {
    /// Page size bounds and row post-processing.
    #[clap(flatten)]
    pub pagination: PaginationConfig,

    /// Data source and connection arguments.
    #[clap(flatten)]
    pub request: RequestArgs,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so that its
    /// variables can be used as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so stdout only carries the connection.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Logs the effective configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = std::process::id(),
            dotenv = cfg!(feature = "dotenv"),
            "starting pagewise"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            data = %self.request.data.display(),
            default_limit = self.pagination.default_limit,
            max_limit = self.pagination.max_limit,
            require_limit = self.pagination.require_limit,
            raw = self.request.raw_sql.is_some(),
            "configuration"
        );
    }
}
