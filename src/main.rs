//! wakegate binary entry point.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};

use wakegate::backends::BackendRegistry;
use wakegate::config::ConfigLoader;
use wakegate::frontends::FrontendRegistry;

/// Wake-on-LAN aware TCP reverse proxy.
#[derive(Parser)]
#[command(name = "wakegate", version, about)]
struct Args {
    /// Path to the TOML configuration file.
    config: PathBuf,
}

/// Map the `LOG_LEVEL` environment variable to a tracing level.
fn log_level() -> Level {
    match std::env::var("LOG_LEVEL")
        .unwrap_or_default()
        .to_uppercase()
        .as_str()
    {
        "DEBUG" => Level::DEBUG,
        "WARN" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        },
        Err(e) => {
            error!(error = %e, "could not register SIGTERM handler");
            std::future::pending::<()>().await;
        },
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(log_level())
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Help and version print to stdout and exit cleanly; anything
            // else is a usage error.
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            process::exit(code);
        },
    };

    let config_path = match std::fs::canonicalize(&args.config) {
        Ok(path) => path,
        Err(e) => {
            error!(
                path = %args.config.display(),
                error = %e,
                "could not resolve config file path"
            );
            process::exit(1);
        },
    };

    info!(path = %config_path.display(), "loading config");

    let config = match ConfigLoader::new().load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "could not load config");
            process::exit(1);
        },
    };

    let backends = match BackendRegistry::from_config(&config.backends) {
        Ok(backends) => backends,
        Err(e) => {
            error!(error = %e, "could not create backends");
            process::exit(1);
        },
    };

    let frontends = match FrontendRegistry::from_config(&config.frontends, &backends) {
        Ok(frontends) => Arc::new(frontends),
        Err(e) => {
            error!(error = %e, "could not create frontends");
            process::exit(1);
        },
    };

    frontends.listen_all();
    info!("started successfully");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT, stopping..."),
        _ = wait_for_sigterm() => info!("received SIGTERM, stopping..."),
    }

    frontends.close_all();
}
