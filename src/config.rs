use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Student grade tracker sidecar. Speaks line-delimited JSON on stdin/stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "gradetrackd", version)]
pub struct Config {
    /// Workspace directory to open at startup
    #[arg(long, env = "GRADETRACK_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Directory for text exports (defaults to <workspace>/exports)
    #[arg(long, env = "GRADETRACK_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "GRADETRACK_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Logs go to stderr; stdout carries responses.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init();
    }
}
