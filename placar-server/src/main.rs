use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = placar_server::config::load();
    let host = config.get("http.host").unwrap_or("127.0.0.1").to_string();
    let port = config.get("http.port").unwrap_or("3030").to_string();

    let app = placar_server::build_with(config).await?;

    let addr = format!("{host}:{port}");
    tracing::info!("[placar] listening on http://{addr}");

    app.listen(addr).await?;

    Ok(())
}
