use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use kalem_ai::{AnalysisClient, Provider, ProviderConfig};
use kalem_core::repositories::{
    PostgresAnalysisRepository, PostgresExerciseRepository, PostgresMistakeStatRepository,
};
use kalem_core::routes::{router, AppState};
use kalem_core::services::{AnalysisService, ExerciseService, IdiomLibrary, MistakeTracker};
use kalem_core::{Database, Error};

const DEFAULT_DB_URL: &str = "postgres://kalem@localhost:5432/kalem";

#[derive(Parser, Debug, Clone)]
#[command(name = "kalem")]
#[command(author, version, about = "Kalem - Turkish writing analysis and mistake tracking")]
struct Args {
    /// Address to which the HTTP server will bind
    #[arg(long, default_value = "0.0.0.0:8787")]
    server_addr: String,

    /// Postgres connection URL. Falls back to DATABASE_URL.
    #[arg(long)]
    db_url: Option<String>,

    /// Model provider: "anthropic" or "openai"
    #[arg(long, default_value = "anthropic")]
    provider: String,

    #[arg(long, default_value = "claude-sonnet-4-20250514")]
    model: String,

    #[arg(long, default_value_t = AnalysisClient::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Run pending migrations before serving
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    migrate: bool,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("kalem=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "Kalem starting. addr={}, provider={}, model={}",
        args.server_addr, args.provider, args.model
    );

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

fn provider_config(args: &Args) -> Result<ProviderConfig, Error> {
    let key_var = match args.provider.as_str() {
        "anthropic" => "ANTHROPIC_API_KEY",
        "openai" => "OPENAI_API_KEY",
        other => return Err(Error::Config(format!("Unknown provider type: {}", other))),
    };
    let api_key = env::var(key_var)
        .map_err(|_| Error::Config(format!("{} is not set", key_var)))?;

    Ok(ProviderConfig {
        provider_type: args.provider.clone(),
        api_base: env::var("KALEM_API_BASE").ok(),
        api_key,
        default_model: args.model.clone(),
        max_tokens: args.max_tokens,
        options: HashMap::new(),
    })
}

async fn run_server(args: Args) -> Result<(), Error> {
    let addr: SocketAddr = args.server_addr.parse()?;
    let config = provider_config(&args)?;

    let db_url = args
        .db_url
        .clone()
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DB_URL.to_string());
    let db = Database::new(&db_url).await?;
    if args.migrate {
        db.migrate().await?;
    } else {
        warn!("Skipping migrations (--migrate false)");
    }

    let providers = Provider::new();
    providers.register_from_config(config).await?;
    let provider = providers
        .get(&args.provider)
        .await
        .ok_or_else(|| Error::Config(format!("provider '{}' not registered", args.provider)))?;
    let client = AnalysisClient::new(provider, args.model.clone()).with_max_tokens(args.max_tokens);

    let exercises = Arc::new(PostgresExerciseRepository::new(db.pool().clone()));
    let analyses = Arc::new(PostgresAnalysisRepository::new(db.pool().clone()));
    let mistakes = MistakeTracker::new(Arc::new(PostgresMistakeStatRepository::new(db.pool().clone())));

    let state = AppState {
        analysis: Arc::new(AnalysisService::new(
            client,
            exercises.clone(),
            analyses.clone(),
            mistakes.clone(),
        )),
        exercises: ExerciseService::new(exercises),
        mistakes,
        idioms: IdiomLibrary::new(analyses),
    };

    let listener = TcpListener::bind(addr).await?;
    info!("Kalem HTTP server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, shutting down.");
}
