use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initializes `env_logger` with a level parsed from the config/CLI, falling
/// back to whatever `RUST_LOG` already says (`RUST_LOG` always wins, the way
/// `env_logger` itself prioritizes it).
pub fn initialize_logging(level: &str) {
    let filter: LevelFilter = level.parse().unwrap_or(LevelFilter::Info);

    let mut builder = Builder::new();
    builder
        .filter_level(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono_like_timestamp(),
                record.level(),
                record.target(),
                record.args()
            )
        });

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.init();
}

/// A dependency-free timestamp good enough for log lines; the teacher pulls
/// in `chrono` for this, but the Monetary System node has no other use for
/// it, so this stays on `std::time`.
fn chrono_like_timestamp() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}
