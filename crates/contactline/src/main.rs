//! contactline - contact-form email notification service

use anyhow::Result;
use clap::Parser;
use contactline::{AppState, Config, CredentialSource, HttpServer};
use contactline_smtp::{Connector, Mailer, PlainConnector, TlsConnector};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // A .env file is optional; hosted deployments inject the variables directly.
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        return Err(e.into());
    }

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "contactline=info,contactline_smtp=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    tracing::info!(
        relay = %config.relay.smtp_host,
        port = config.relay.smtp_port,
        plaintext = config.relay.plaintext,
        "Starting contactline"
    );

    if config.relay.plaintext {
        serve(&config, PlainConnector).await
    } else {
        serve(&config, TlsConnector::new()).await
    }
}

async fn serve<C>(config: &Config, connector: C) -> Result<()>
where
    C: Connector + Send + Sync + 'static,
{
    let mailer = Mailer::new(connector, config.relay.relay_config());
    let state = AppState::new(mailer, CredentialSource::env(), &config.relay.sender_name);

    HttpServer::new(&config.server, state).await?.run().await
}
