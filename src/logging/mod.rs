use env_logger::{Builder, Env, Target};
use log::LevelFilter;

use crate::config;

/// Build the stderr logger.
///
/// The level comes from the payload document unless debug mode raises it.
/// `RUST_LOG` still overrides both.
pub fn logger_builder(config: &config::Log, debug: bool) -> Builder {
    let level = if debug {
        LevelFilter::Debug
    } else {
        config.level_filter()
    };

    let mut builder = Builder::new();
    builder
        .filter(None, level)
        .target(Target::Stderr)
        .parse_env(Env::default());
    builder
}

pub fn init_env_logger(config: &config::Log, debug: bool) {
    if let Err(e) = logger_builder(config, debug).try_init() {
        eprintln!("Logger already initialized: {e}");
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_raises_level() {
        let conf = config::Log::default();
        let logger = logger_builder(&conf, true).build();
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(logger.filter(), LevelFilter::Debug);
        }
    }

    #[test]
    fn test_level_from_config() {
        let conf = config::Log {
            level: "error".to_string(),
        };
        let logger = logger_builder(&conf, false).build();
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(logger.filter(), LevelFilter::Error);
        }
    }
}
