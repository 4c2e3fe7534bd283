//! automater CLI and HTTP trigger entry point.
//!
//! Binary name: `automater`
//!
//! Parses CLI arguments, initializes tracing, loads the configuration once,
//! then runs the requested command or starts the HTTP service.

mod cli;
mod http;
mod state;

use clap::Parser;

use automater_infra::config::{load_config, process_env, validate};
use automater_observe::tracing_setup::{init_tracing, shutdown_tracing, TracingOptions};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        json: cli.log_json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let vars = process_env();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = load_config(cli.config.as_deref(), &vars).await?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            validate(&config)?;

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = AppState::new(config)?;
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(%addr, service = %state.service_name, "trigger service listening");
            if !cli.quiet && !cli.json {
                println!(
                    "  {} automater listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("trigger service stopped");
        }

        Commands::Sign(args) => {
            cli::sign::run(args, &vars, cli.json).await?;
        }

        Commands::Config => {
            let config = load_config(cli.config.as_deref(), &vars).await?;
            cli::config::show(&config, cli.json)?;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
