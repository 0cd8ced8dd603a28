//! Log setup for the CLI.

use chrono::Local;
use env_logger::{Builder, Env, Target};
use std::io::Write;

/// Route `log` records to stderr, keeping stdout free for JSON output.
///
/// `YIELDSENSE_LOG` takes precedence over `level`. Later calls are ignored.
pub fn init_logging(level: &str) {
    let env = Env::default().filter_or("YIELDSENSE_LOG", level).write_style("YIELDSENSE_LOG_STYLE");

    let installed = Builder::from_env(env)
        .target(Target::Stderr)
        .format(|buf, record| {
            let level = buf.default_styled_level(record.level());
            writeln!(
                buf,
                "{} {} [{}] {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                level,
                record.target(),
                record.args()
            )
        })
        .try_init()
        .is_ok();

    if installed {
        log::debug!("logging at {}", level);
    }
}
