use std::{net::SocketAddr, sync::Arc};

use mongodb::Client;

use pricewatch::{
    config, routes,
    services::{
        db_init,
        finnhub::FinnhubClient,
        notifier::TelegramNotifier,
        scheduler::{PassRunner, Scheduler},
        store::MongoStore,
    },
    templates, AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let settings = config::load()?;

    // one pooled client shared by the API and the scheduler
    let client = Client::with_uri_str(&settings.mongodb_uri).await?;
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!("could not ensure indexes: {}", e);
    }

    let store = Arc::new(MongoStore::new(db.clone()));
    let quotes = Arc::new(FinnhubClient::new(
        settings.finnhub_api_key.clone(),
        settings.call_timeout,
    )?);
    let notifier = Arc::new(TelegramNotifier::new(settings.call_timeout)?);

    let runner = PassRunner::new(store.clone(), store, quotes, notifier, settings.call_timeout);
    let scheduler = Scheduler::new(
        settings.timezone,
        settings.check_times.clone(),
        settings.wake_interval,
        runner,
    )
    .spawn();

    let state = AppState {
        hbs: templates::build_handlebars()?,
        db,
        settings: settings.clone(),
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("could not listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
