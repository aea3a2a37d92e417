use crate::common::timestamp_utils;
use crate::config_loader::MasterConfig;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Level from `--debug`, then the config's `log_level`, then info.
pub fn resolve_level(debug_flag: bool, config: Option<&MasterConfig>) -> (LevelFilter, Option<String>) {
    let log_level_str = if debug_flag {
        "debug".to_string()
    } else {
        config
            .and_then(|c| c.app_settings.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    };

    match log_level_str.trim().to_lowercase().as_str() {
        "error" => (LevelFilter::Error, None),
        "warn" => (LevelFilter::Warn, None),
        "info" => (LevelFilter::Info, None),
        "debug" => (LevelFilter::Debug, None),
        "trace" => (LevelFilter::Trace, None),
        "off" => (LevelFilter::Off, None),
        s => (LevelFilter::Info, Some(s.to_string())),
    }
}

pub fn initialize_logging(config: Option<&MasterConfig>, cli_matches: &clap::ArgMatches) {
    let (level, unrecognized) = resolve_level(cli_matches.get_flag("debug"), config);
    let timestamp_format = config
        .map(|c| c.app_settings.log_timestamp_format.clone())
        .unwrap_or_else(|| DEFAULT_TIMESTAMP_FORMAT.to_string());

    let mut builder = Builder::new();
    builder.filter_level(level);
    // RUST_LOG still refines per-module levels.
    builder.parse_env("RUST_LOG");
    builder.format(move |buf, record| {
        writeln!(
            buf,
            "{} [{}] {} - {}",
            timestamp_utils::current_local_timestamp_str(&timestamp_format),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Err(e) = builder.try_init() {
        eprintln!("Failed to initialize logger: {}. Logging might not work as expected.", e);
        return;
    }
    if let Some(s) = unrecognized {
        log::warn!("Unrecognized log level '{}', defaulting to info.", s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_loader::parse_ini_str;

    #[test]
    fn debug_flag_wins_over_config() {
        let config = parse_ini_str("[resources]\nc = rtsp://u:p@h\n[application]\nlog_level = warn\n").unwrap();
        assert_eq!(resolve_level(true, Some(&config)).0, LevelFilter::Debug);
        assert_eq!(resolve_level(false, Some(&config)).0, LevelFilter::Warn);
        assert_eq!(resolve_level(false, None).0, LevelFilter::Info);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = parse_ini_str("[resources]\nc = rtsp://u:p@h\n[application]\nlog_level = chatty\n").unwrap();
        assert_eq!(resolve_level(false, Some(&config)), (LevelFilter::Info, Some("chatty".to_string())));
    }
}
