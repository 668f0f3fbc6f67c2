use colored::Colorize;
use log::Level;
use std::io::Write;

/// Install the colored `[timestamp] [LEVEL] message` logger.
///
/// `verbose` lowers the crate's own level to debug; `RUST_LOG` wins when set.
/// Calling this twice is harmless.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = format!("warn,registry_qa={}", level);

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format(|buf, record| {
            let line = format_line(
                record.level(),
                &chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                &record.args().to_string(),
            );
            writeln!(buf, "{}", line)
        })
        .try_init();
}

fn format_line(level: Level, timestamp: &str, message: &str) -> String {
    let line = format!("[{}] [{}] {}", timestamp, level, message);
    match level {
        Level::Error => line.red().to_string(),
        Level::Warn => line.yellow().to_string(),
        Level::Info => line.cyan().to_string(),
        Level::Debug | Level::Trace => line.dimmed().to_string(),
    }
}
