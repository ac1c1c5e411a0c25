mod config;

use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{AppServices, Clock};
use storage::repository::Storage;
use storage::seed::seed_demo;
use tracing_subscriber::EnvFilter;
use ui::{App, Role, UiApp, build_app_context};

use crate::config::{AppConfig, ArgsError, Command};

struct DesktopApp {
    role: Role,
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn role(&self) -> Role {
        self.role
    }

    fn services(&self) -> AppServices {
        self.services.clone()
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui   [--db <sqlite_url>] [--role <role>] [--user-id <id>]");
    eprintln!("                           [--failure-rate <0..1>] [--latency-ms <ms>]");
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Roles: admin (default), school-admin, teacher. Scoped roles need --user-id.");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://dev.sqlite3");
    eprintln!("  --failure-rate 0.1 --latency-ms 400");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PD_DB_URL, PD_ROLE, PD_USER_ID, PD_FAILURE_RATE, PD_LATENCY_MS,");
    eprintln!("  PD_CONTENT_URL, PD_CONTENT_TOKEN, PD_LOG");
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match AppConfig::from_process() {
        Ok(config) => config,
        Err(ArgsError::HelpRequested) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };
    init_tracing(&config.log_filter);

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&config.db_url)?;
    let storage = Storage::sqlite(&config.db_url).await?;
    tracing::info!(db = %config.db_url, command = ?config.command, "storage ready");

    match config.command {
        Command::Ui => {
            let services = AppServices::new(
                &storage,
                Clock::default_clock(),
                &config.services_config(),
            );
            tracing::info!(
                role = config.role.label(),
                failure_rate = config.failure_rate,
                latency_ms = u64::try_from(config.latency.as_millis()).unwrap_or(u64::MAX),
                http_content = config.content_url.is_some(),
                "launching dashboard"
            );

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                role: config.role,
                services,
            });
            let context = build_app_context(&app);

            // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("PD Dashboard")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Seed => {
            let report = seed_demo(&storage, Clock::default_clock().now()).await?;
            tracing::info!(
                schools = report.schools,
                teachers = report.teachers,
                modules = report.modules,
                assignments = report.assignments,
                questions = report.questions,
                "demo data seeded"
            );
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
