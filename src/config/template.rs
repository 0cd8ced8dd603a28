//! Configuration template generation

use crate::config::Config;
use crate::utils::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Generate a default configuration file at the specified path
pub fn generate_config_template<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = Config::default();
    config.save(path).map_err(|e| Error::ConfigError(e.to_string()))
}

/// Generate a configuration file with comments explaining each field
pub fn generate_commented_config_template<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    let toml_str = r#"# YieldSense Configuration
# Uncomment and modify the values as needed.

version = "0.1.0"

[app]
# Log level (error, warn, info, debug, trace); YIELDSENSE_LOG overrides it
log_level = "info"

# Directory with one <symbol>.csv price history per asset
# (columns: timestamp, price, optional tvl_change_7d, apy_cv)
data_dir = "data"

[engine]
# Confidence level used when none is given (0.68, 0.80, 0.90 or 0.95)
default_confidence = 0.80

# History points requested per asset
history_points = 30

[sources]
# Deadline for each price, history and news call, in seconds
request_timeout_secs = 5

dexscreener_base_url = "https://api.dexscreener.com"
cryptopanic_base_url = "https://cryptopanic.com"

# CryptoPanic developer token; CRYPTOPANIC_API_KEY overrides it
# cryptopanic_api_key = ""

[calibration]
# Optional TOML file with [[assets]] rows extending the built-in table:
#
#   [[assets]]
#   symbol = "bonk"
#   sentiment_impact_cap = 0.03
#   range_multiplier = 0.35
#   max_range_fraction = 0.15
#
# file = "calibration.toml"
"#;

    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, toml_str)?;
    Ok(())
}
