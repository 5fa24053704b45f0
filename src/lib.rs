pub mod config;
pub mod models;
pub mod report; // schema classification + normalization
pub mod dispatch; // variant → template/action table
pub mod feedback; // per-report rating state machine
pub mod transport; // seams toward the backend collaborator
pub mod export; // PDF download trigger
pub mod conversation; // turn types + render pipeline

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the embedding application. Safe to call more
/// than once; later calls are ignored.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
