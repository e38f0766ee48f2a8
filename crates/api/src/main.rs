use campus_api::config::AppConfig;
use campus_store::MemoryStore;

#[tokio::main]
async fn main() {
    campus_observability::init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let store = std::sync::Arc::new(MemoryStore::new());
    seed_first_admin(store.as_ref());

    let app = campus_api::app::build_app_with_store(config, store);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

/// Make a fresh deployment loginable: when the store starts empty, create an
/// admin identity from `ADMIN_EMAIL`/`ADMIN_PASSWORD` (dev defaults).
fn seed_first_admin(store: &MemoryStore) {
    let email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@campus.local".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!("ADMIN_PASSWORD not set; using insecure dev default");
        "admin123".to_string()
    });

    let hash = match campus_auth::hash_password(&password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "could not hash seed admin password");
            return;
        }
    };
    match store.seed_admin(&email, &hash, "Administrator") {
        Ok(true) => tracing::info!(%email, "seeded initial admin identity"),
        Ok(false) => {}
        Err(e) => tracing::error!(error = %e, "could not seed admin identity"),
    }
}
