use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;
use std::fs;

// Define where to store logs
const LOG_DIR: &str = "logs";
const LOG_DIR_ENV: &str = "PBS_LINT_LOG_DIR";
const LOG_FILE: &str = "pbs_lint.log";

/// Initializes the global logger.
///
/// This function should be called once at the very beginning of the
/// application's `main` function.
///
/// Log level is controlled by the `RUST_LOG` environment variable
/// (`RUST_LOG=debug pbs_lint job.pbs`), defaulting to `info`.
/// Logs go to stderr and to `logs/pbs_lint.log`; the directory can be
/// moved with `PBS_LINT_LOG_DIR`.
pub fn init() {
    let log_dir = std::env::var(LOG_DIR_ENV).unwrap_or_else(|_| LOG_DIR.to_string());

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory at '{}': {}", log_dir, e);
    }

    let log_file_path = format!("{}/{}", log_dir, LOG_FILE);

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let log_level_filter = log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);

    let base_config = Dispatch::new().level(log_level_filter).level_for("serde", LevelFilter::Warn);

    let console_config = Dispatch::new()
        .format(|out, message, record| {
            let colors = fern::colors::ColoredLevelConfig::new()
                .error(fern::colors::Color::Red)
                .warn(fern::colors::Color::Yellow)
                .info(fern::colors::Color::Green)
                .debug(fern::colors::Color::Blue)
                .trace(fern::colors::Color::BrightBlack);

            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let base_config = base_config.chain(console_config);

    // A missing log file only costs the file sink, the console keeps working.
    let base_config = match fern::log_file(&log_file_path) {
        Ok(file) => base_config.chain(
            Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!("[{} {} {}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), record.level(), record.target(), message))
                })
                .chain(file),
        ),
        Err(e) => {
            eprintln!("Failed to open log file '{}': {}", log_file_path, e);
            base_config
        }
    };

    base_config.apply().unwrap_or_else(|e| {
        eprintln!("Failed to apply logger configuration: {}", e);
    });

    log::debug!("Logger initialized. Logging to console and '{}'.", log_file_path);
}
