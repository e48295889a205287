use clap::Parser;
use log::info;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use studio::{
    build_router,
    config::{
        Cli, Settings
    },
    store,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli)?;
    info!("<-> Model studio API <->");

    let store = store::open(&settings.store, settings.in_memory).await;
    info!("Database: `{}`",
        store.as_ref().map_or("unavailable", |s| s.backend_tag())
    );
    let app = build_router(
        AppState::new(store, settings.store.clone())
    );

    let addr = settings.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on `{addr}`");
    axum::serve(listener, app).await?;
    Ok(())
}
