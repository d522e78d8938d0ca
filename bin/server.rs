// Office Coverage - Web Server
// Loads the dataset once, then serves the dashboard and REST API with Axum

use anyhow::Context;
use office_coverage::server::{app_router, AppState};
use office_coverage::{init_logging, AppContext, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info");

    println!("🌐 Office Coverage - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::discover()?;

    // Load + join off the async runtime
    let data_config = config.data.clone();
    let context = tokio::task::spawn_blocking(move || AppContext::load(&data_config))
        .await
        .context("Data loading task failed")?;

    if let Some(warning) = &context.warning {
        tracing::warn!(warning = %warning, "serving built-in sample data");
    } else {
        println!(
            "✓ Joined {} departments ({} offices)",
            context.regions.len(),
            context.office_rows
        );
    }

    let app = app_router(AppState::new(context, config.data.clone()));

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.listen))?;
    let addr = listener.local_addr()?;

    tracing::info!(%addr, "server listening");
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/summary", addr);
    println!("   UI:  http://{}", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
