//! Launch configuration: environment first, then command-line flags.

use std::fmt;
use std::time::Duration;

use pd_core::model::{SchoolId, TeacherId};
use services::ServicesConfig;
use services::app_services::ContentBackend;
use services::content::HttpContentConfig;
use ui::Role;

pub const DEFAULT_DB_URL: &str = "sqlite://dev.sqlite3";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, PartialEq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownSubcommand(String),
    InvalidDbUrl { raw: String },
    InvalidRole { raw: String },
    InvalidUserId { raw: String },
    MissingUserId { role: &'static str },
    InvalidFailureRate { raw: String },
    InvalidLatency { raw: String },
    /// `--help` was passed; not a failure.
    HelpRequested,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownSubcommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidRole { raw } => {
                write!(f, "invalid --role value (admin|school-admin|teacher): {raw}")
            }
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user-id value: {raw}"),
            ArgsError::MissingUserId { role } => write!(f, "--role {role} requires --user-id"),
            ArgsError::InvalidFailureRate { raw } => {
                write!(f, "invalid --failure-rate value (0..=1): {raw}")
            }
            ArgsError::InvalidLatency { raw } => write!(f, "invalid --latency-ms value: {raw}"),
            ArgsError::HelpRequested => write!(f, "help requested"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleKind {
    Admin,
    SchoolAdmin,
    Teacher,
}

impl RoleKind {
    fn parse(raw: &str) -> Result<Self, ArgsError> {
        match raw.trim() {
            "admin" => Ok(Self::Admin),
            "school-admin" => Ok(Self::SchoolAdmin),
            "teacher" => Ok(Self::Teacher),
            _ => Err(ArgsError::InvalidRole {
                raw: raw.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub command: Command,
    pub db_url: String,
    pub role: Role,
    pub failure_rate: f64,
    pub latency: Duration,
    pub content_url: Option<String>,
    pub content_token: Option<String>,
    pub log_filter: String,
}

impl AppConfig {
    /// Reads `PD_*` variables through `env`, then applies `args` (argv
    /// without the program name) on top.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown flags and malformed values, and
    /// `HelpRequested` for `--help`.
    pub fn parse(
        env: impl Fn(&str) -> Option<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut args = args.into_iter().peekable();
        let command = match args.peek().map(String::as_str) {
            None => Command::Ui,
            Some(first) if first.starts_with('-') => Command::Ui,
            Some(first) => {
                let command = Command::from_arg(first)
                    .ok_or_else(|| ArgsError::UnknownSubcommand(first.to_owned()))?;
                args.next();
                command
            }
        };

        let mut db_url = env("PD_DB_URL").map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut role = env("PD_ROLE").map(|raw| RoleKind::parse(&raw)).transpose()?;
        let mut user_id = env("PD_USER_ID");
        let mut failure_rate = env("PD_FAILURE_RATE")
            .map(|raw| parse_failure_rate(&raw))
            .transpose()?;
        let mut latency = env("PD_LATENCY_MS")
            .map(|raw| parse_latency(&raw))
            .transpose()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--role" => role = Some(RoleKind::parse(&require_value(&mut args, "--role")?)?),
                "--user-id" => user_id = Some(require_value(&mut args, "--user-id")?),
                "--failure-rate" => {
                    failure_rate = Some(parse_failure_rate(&require_value(
                        &mut args,
                        "--failure-rate",
                    )?)?);
                }
                "--latency-ms" => {
                    latency = Some(parse_latency(&require_value(&mut args, "--latency-ms")?)?);
                }
                "--help" | "-h" => return Err(ArgsError::HelpRequested),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let defaults = ServicesConfig::default();
        Ok(Self {
            command,
            db_url,
            role: resolve_role(role.unwrap_or(RoleKind::Admin), user_id.as_deref())?,
            failure_rate: failure_rate.unwrap_or(defaults.failure_rate),
            latency: latency.unwrap_or(defaults.latency),
            content_url: env("PD_CONTENT_URL").filter(|url| !url.trim().is_empty()),
            content_token: env("PD_CONTENT_TOKEN").filter(|token| !token.trim().is_empty()),
            log_filter: env("PD_LOG")
                .or_else(|| env("RUST_LOG"))
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }

    /// Parses the real process environment and argv.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::parse`].
    pub fn from_process() -> Result<Self, ArgsError> {
        Self::parse(|key| std::env::var(key).ok(), std::env::args().skip(1))
    }

    #[must_use]
    pub fn services_config(&self) -> ServicesConfig {
        let content = match &self.content_url {
            Some(base_url) => ContentBackend::Http(HttpContentConfig {
                base_url: base_url.clone(),
                token: self.content_token.clone(),
            }),
            None => ContentBackend::Stored,
        };
        ServicesConfig {
            failure_rate: self.failure_rate,
            latency: self.latency,
            content,
            ..ServicesConfig::default()
        }
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn resolve_role(kind: RoleKind, user_id: Option<&str>) -> Result<Role, ArgsError> {
    let id = |role: &'static str| -> Result<u64, ArgsError> {
        let raw = user_id.ok_or(ArgsError::MissingUserId { role })?;
        raw.trim().parse().map_err(|_| ArgsError::InvalidUserId {
            raw: raw.to_owned(),
        })
    };
    Ok(match kind {
        RoleKind::Admin => Role::Admin,
        RoleKind::SchoolAdmin => Role::SchoolAdmin(SchoolId::new(id("school-admin")?)),
        RoleKind::Teacher => Role::Teacher(TeacherId::new(id("teacher")?)),
    })
}

fn parse_failure_rate(raw: &str) -> Result<f64, ArgsError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| (0.0..=1.0).contains(rate))
        .ok_or_else(|| ArgsError::InvalidFailureRate {
            raw: raw.to_owned(),
        })
}

fn parse_latency(raw: &str) -> Result<Duration, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ArgsError::InvalidLatency {
            raw: raw.to_owned(),
        })
}

/// Turns relative or `sqlite:`-prefixed paths into absolute `sqlite://` URLs.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(env: &[(&str, &str)], args: &[&str]) -> Result<AppConfig, ArgsError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::parse(
            |key| env.get(key).cloned(),
            args.iter().map(|a| (*a).to_owned()),
        )
    }

    #[test]
    fn defaults_launch_the_admin_ui() {
        let config = parse(&[], &[]).unwrap();
        assert_eq!(config.command, Command::Ui);
        assert_eq!(config.role, Role::Admin);
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert!((config.failure_rate - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.latency, Duration::from_millis(400));
        assert_eq!(config.log_filter, "info");
        assert!(matches!(config.services_config().content, ContentBackend::Stored));
    }

    #[test]
    fn flags_override_environment() {
        let config = parse(
            &[("PD_ROLE", "admin"), ("PD_FAILURE_RATE", "0.5"), ("PD_LOG", "debug")],
            &["seed", "--role", "teacher", "--user-id", "4", "--failure-rate", "0"],
        )
        .unwrap();
        assert_eq!(config.command, Command::Seed);
        assert_eq!(config.role, Role::Teacher(TeacherId::new(4)));
        assert!(config.failure_rate.abs() < f64::EPSILON);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn scoped_roles_need_a_user_id() {
        assert_eq!(
            parse(&[], &["--role", "school-admin"]).unwrap_err(),
            ArgsError::MissingUserId {
                role: "school-admin"
            }
        );
        assert_eq!(
            parse(&[("PD_USER_ID", "x")], &["--role", "teacher"]).unwrap_err(),
            ArgsError::InvalidUserId { raw: "x".into() }
        );
        let config = parse(&[("PD_ROLE", "school-admin"), ("PD_USER_ID", "1")], &[]).unwrap();
        assert_eq!(config.role, Role::SchoolAdmin(SchoolId::new(1)));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            parse(&[], &["--failure-rate", "1.5"]),
            Err(ArgsError::InvalidFailureRate { .. })
        ));
        assert!(matches!(
            parse(&[], &["--latency-ms", "-3"]),
            Err(ArgsError::InvalidLatency { .. })
        ));
        assert!(matches!(parse(&[], &["--role", "owner"]), Err(ArgsError::InvalidRole { .. })));
        assert_eq!(
            parse(&[], &["--db"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        );
        assert_eq!(
            parse(&[], &["serve"]).unwrap_err(),
            ArgsError::UnknownSubcommand("serve".into())
        );
        assert_eq!(parse(&[], &["--help"]).unwrap_err(), ArgsError::HelpRequested);
    }

    #[test]
    fn content_url_switches_to_http_backend() {
        let config = parse(
            &[("PD_CONTENT_URL", "https://content.example.org"), ("PD_CONTENT_TOKEN", "t0k")],
            &[],
        )
        .unwrap();
        match config.services_config().content {
            ContentBackend::Http(http) => {
                assert_eq!(http.base_url, "https://content.example.org");
                assert_eq!(http.token.as_deref(), Some("t0k"));
            }
            ContentBackend::Stored => panic!("expected http backend"),
        }
    }

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/pd.db".into()),
            "sqlite:///tmp/pd.db"
        );
        assert_eq!(normalize_sqlite_url("sqlite:/var/pd.db".into()), "sqlite:///var/pd.db");
        assert!(normalize_sqlite_url("pd.db".into()).starts_with("sqlite:///"));
    }
}
