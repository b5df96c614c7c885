use anyhow::Context;
use postboard::cli::{
    init::{self, InitConfig, InitResult},
    output::Output,
    show_config, Cli, Commands,
};
use postboard::{build_app, AppState, DatabaseProvider, PostboardConfig};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // .env must be loaded before the secret is resolved
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = Output::detect(cli.no_color);

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => {
            let config = InitConfig {
                path,
                force,
                host,
                port,
            };
            match init::run(config, &output) {
                InitResult::Success => ExitCode::SUCCESS,
                InitResult::AlreadyExists | InitResult::Error(_) => ExitCode::FAILURE,
            }
        }
        Some(Commands::Config { validate }) => match show_config(&cli.config, validate, &output) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                output.error(&e.to_string());
                ExitCode::FAILURE
            }
        },
        None => match serve(&cli).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                output.error(&format!("{:#}", e));
                ExitCode::FAILURE
            }
        },
    }
}

fn init_tracing(default_level: &str, verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { default_level };
        EnvFilter::new(format!("{level},tower_http={level}"))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    let config = PostboardConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    init_tracing(&config.server.log_level, cli.verbose, cli.json_logs);

    let store = DatabaseProvider::from_url(&config.database.url)
        .create_store()
        .await
        .context("Failed to open database")?;
    tracing::info!(database = %config.database.url, "store ready");

    let secret = config.jwt_secret()?;
    let addr = config.bind_addr();
    let state = AppState::new(config, store, &secret)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "postboard listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "shutdown listener failed");
            }
        })
        .await
        .context("Server error")?;

    tracing::info!("server shutdown completed");
    Ok(())
}
