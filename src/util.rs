use std::path::Path;

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

pub const VAR_BASE_URL: &str = "EXPO_BASE_URL";
pub const VAR_ACCESS_TOKEN: &str = "EXPO_ACCESS_TOKEN";
pub const VAR_MAX_CONCURRENT_REQUESTS: &str = "EXPO_MAX_CONCURRENT_REQUESTS";

pub const LOG_CONFIG_PATH: &str = "log4rs.yaml";

/// Last few characters of a token, enough to tell tokens apart in logs
pub fn get_short_token(token: &str) -> &str {
    let start = token
        .char_indices()
        .rev()
        .nth(7)
        .map_or(0, |(index, _)| index);
    &token[start..]
}

/// Uses `log4rs.yaml` when present, else logs `info` and above to stderr.
pub fn init_logging() {
    if Path::new(LOG_CONFIG_PATH).exists() {
        if let Err(e) = log4rs::init_file(LOG_CONFIG_PATH, Default::default()) {
            eprintln!("Failed to load {LOG_CONFIG_PATH}: {e}");
        }
        return;
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info));

    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("Failed to initialize logging: {e}");
            }
        }
        Err(e) => eprintln!("Invalid logging config: {e}"),
    }
}
