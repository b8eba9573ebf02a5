use attend_api::services::AppState;
use attend_api::{app, config, database};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("starting attend-api in {:?} mode", config.environment);

    let pool = match database::connect_pool(config) {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("failed to initialize database pool: {err}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(pool);
    let router = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("ATTEND_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("attend-api listening on http://{}", bind_addr);

    axum::serve(listener, router).await.expect("server");
}
