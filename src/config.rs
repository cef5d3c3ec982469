use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::rate_limit::RateLimitConfig;

pub const DEFAULT_PORT: u16 = 3000;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "readym-launcher")]
#[command(about = "ReadyM Launcher server: static launcher page plus status API")]
pub struct Args {
    // Port to listen on. Falls back to 3000 when unset or not a port number,
    // so this stays a raw string until `listen_port` looks at it.
    #[arg(short, long, env = "PORT")]
    pub port: Option<String>,

    // Directory the launcher page and its assets are served from
    #[arg(short, long, default_value = "public")]
    pub static_dir: PathBuf,

    // Turn on per-IP rate limiting
    #[arg(long)]
    pub rate_limit: bool,

    // Rate limit window in milliseconds
    #[arg(long, default_value_t = 900_000, value_parser = clap::value_parser!(u64).range(1..))]
    pub rate_window_ms: u64,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 100)]
    pub rate_max: u32,

    // Don't send the RateLimit-* headers
    #[arg(long)]
    pub no_standard_headers: bool,
}

impl Args {
    pub fn listen_port(&self) -> u16 {
        parse_port(self.port.as_deref())
    }

    // None when rate limiting is switched off
    pub fn rate_limit_config(&self) -> Option<RateLimitConfig> {
        if !self.rate_limit {
            return None;
        }
        Some(RateLimitConfig {
            window: Duration::from_millis(self.rate_window_ms),
            max_requests: self.rate_max,
            standard_headers: !self.no_standard_headers,
        })
    }
}

pub fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_unset() {
        assert_eq!(parse_port(None), 3000);
    }

    #[test]
    fn port_defaults_when_not_numeric() {
        assert_eq!(parse_port(Some("abc")), 3000);
        assert_eq!(parse_port(Some("")), 3000);
        assert_eq!(parse_port(Some("70000")), 3000);
    }

    #[test]
    fn port_parses_numeric_value() {
        assert_eq!(parse_port(Some("8080")), 8080);
        assert_eq!(parse_port(Some(" 4000 ")), 4000);
    }

    #[test]
    fn rate_limit_is_off_by_default() {
        let args = Args::try_parse_from(["readym-launcher"]).unwrap();
        assert!(args.rate_limit_config().is_none());
        assert_eq!(args.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn rate_limit_flags_build_config() {
        let args = Args::try_parse_from([
            "readym-launcher",
            "--rate-limit",
            "--rate-window-ms",
            "1000",
            "--rate-max",
            "2",
            "--no-standard-headers",
        ])
        .unwrap();

        let cfg = args.rate_limit_config().unwrap();
        assert_eq!(cfg.window, Duration::from_millis(1000));
        assert_eq!(cfg.max_requests, 2);
        assert!(!cfg.standard_headers);
    }

    #[test]
    fn rate_limit_defaults_match_fifteen_minutes_and_100() {
        let args = Args::try_parse_from(["readym-launcher", "--rate-limit"]).unwrap();
        let cfg = args.rate_limit_config().unwrap();
        assert_eq!(cfg.window, Duration::from_secs(15 * 60));
        assert_eq!(cfg.max_requests, 100);
        assert!(cfg.standard_headers);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(Args::try_parse_from(["readym-launcher", "--rate-window-ms", "0"]).is_err());
    }
}
