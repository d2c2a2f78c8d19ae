use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use waypoint_gateway::check::run_check;
use waypoint_gateway::cli::{AccountArgs, Command, ServeArgs, CLI};
use waypoint_gateway::{App, AppState};
use waypoint_generator::{CollisionGuard, EncoderSettings, GuardSettings, ShortcodeEncoder};
use waypoint_identity::{AgentManager, HttpFetch, IdentitySettings};
use waypoint_links::{LinkService, LinkServiceSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    waypoint_telemetry::init(config.log_format)?;

    let manager = Arc::new(agent_manager(&config.account));

    match config.command {
        Command::Serve(args) => serve(config.account, args, manager).await,
        Command::Check => check(config.account, &manager).await,
    }
}

fn agent_manager(account: &AccountArgs) -> AgentManager<HttpFetch> {
    AgentManager::new(
        Arc::new(HttpFetch::default()),
        IdentitySettings::builder()
            .resolver_endpoint(account.resolver_endpoint.clone())
            .public_endpoint(account.public_api.clone())
            .build(),
    )
}

async fn serve(
    account: AccountArgs,
    args: ServeArgs,
    manager: Arc<AgentManager<HttpFetch>>,
) -> anyhow::Result<()> {
    let did = account.did.filter(|did| !did.trim().is_empty());

    let state = match did {
        Some(did) => {
            let settings = LinkServiceSettings::builder()
                .did(did)
                .cache_ttl(Duration::from_secs(args.cache_ttl_secs))
                .encoder(
                    EncoderSettings::builder()
                        .default_length(args.code_length)
                        .build(),
                )
                .build();
            AppState::new(Arc::new(LinkService::new(manager, settings)))
        }
        None => {
            warn!("ATPROTO_DID is not set, serving without links");
            AppState::unconfigured()
        }
    };

    let listener = tokio::net::TcpListener::bind(args.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", args.listen_addr))?;
    info!(
        listen_addr = %listener.local_addr()?,
        resolver = %account.resolver_endpoint,
        public_api = %account.public_api,
        "starting gateway server"
    );

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn check(account: AccountArgs, manager: &AgentManager<HttpFetch>) -> anyhow::Result<()> {
    let guard = CollisionGuard::new(ShortcodeEncoder::default(), GuardSettings::default());

    let report = run_check(account.did.as_deref(), manager, &guard)
        .await
        .context("configuration check failed")?;

    print!("{}", report);
    println!("Configuration check completed successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
