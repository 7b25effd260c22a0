use std::path::Path;
use tally::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
fn default_filter(level: &str) -> String {
    if level.eq_ignore_ascii_case("info") {
        "info,tally=debug".to_string()
    } else {
        level.to_string()
    }
}

pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)));

    // Prefer TALLY_LOG_DIR, fall back to the configured directory; console only otherwise.
    let log_dir = std::env::var("TALLY_LOG_DIR")
        .ok()
        .map(std::path::PathBuf::from)
        .or_else(|| config.dir.clone());

    // `tracing_appender::rolling::daily` panics if it can't create the initial
    // log file, so writability is checked first.
    let file_layer = log_dir.as_deref().and_then(|dir| match preflight(dir) {
        Ok(()) => {
            // Daily rotating file appender
            let file_appender = tracing_appender::rolling::daily(dir, "tally.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keep the guard alive for the whole process
            Box::leak(Box::new(guard));

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false) // No color codes in file
                    .with_target(true),
            )
        }
        Err(e) => {
            eprintln!(
                "Warning: Could not write to log directory {} ({}), file logging disabled",
                dir.display(),
                e
            );
            None
        }
    });

    // Console layer
    let console_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let file_logging_enabled = file_layer.is_some();
    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(filter)
        .init();

    if let (true, Some(dir)) = (file_logging_enabled, &log_dir) {
        eprintln!("Logging to: {}/tally.log", dir.display());
    }
}

fn preflight(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let test_path = dir.join(".tally_write_test");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&test_path)?;
    let _ = std::fs::remove_file(&test_path);
    Ok(())
}
