use tracing_subscriber::fmt::format::{Format, Full};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "site_visit_export=info";
const VERBOSE_DIRECTIVE: &str = "site_visit_export=debug,info";

/// `RUST_LOG` wins over the built-in directive.
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn base_layer<S>() -> fmt::Layer<S, fmt::format::DefaultFields, Format<Full>> {
    fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

pub fn init_cli_logger(verbose: bool) {
    let directive = if verbose {
        VERBOSE_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    };

    tracing_subscriber::registry()
        .with(env_filter(directive))
        .with(base_layer().compact())
        .init();
}

/// JSON lines for the scheduler, whose output usually ends up in a log file.
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_DIRECTIVE))
        .with(base_layer().json())
        .init();
}
