//! Recipehaven server entry point.

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{Router, middleware};
use recipehaven_api::{middleware::AppState, router as api_router};
use recipehaven_common::{Config, LocalStorage};
use recipehaven_core::{
    AccountService, AdminService, CatalogService, InteractionService, RecipeService,
};
use recipehaven_db::repositories::{
    CategoryRepository, CommentRepository, FavoriteRepository, LikeRepository, RatingRepository,
    RecipeRepository, SessionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Resolves the configured host and port into a socket address.
fn bind_addr(host: &str, port: u16) -> Result<SocketAddr, AddrParseError> {
    Ok(SocketAddr::new(host.parse::<IpAddr>()?, port))
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipehaven=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting recipehaven server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(recipehaven_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    recipehaven_db::migrate(&db).await?;
    info!("Migrations completed");

    // Seed categories and the admin account
    recipehaven_db::seed::run(&db, &config).await?;
    info!("Seed data verified");

    // Repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let recipe_repo = RecipeRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let rating_repo = RatingRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));

    // Services
    let storage = LocalStorage::new(
        config.storage.image_dir.clone(),
        config.storage.image_base_url.clone(),
    );

    let account_service = AccountService::new(
        user_repo.clone(),
        session_repo.clone(),
        config.session.idle_minutes,
    );
    let catalog_service = CatalogService::new(
        recipe_repo.clone(),
        category_repo.clone(),
        comment_repo.clone(),
        favorite_repo.clone(),
        like_repo.clone(),
        rating_repo.clone(),
        user_repo.clone(),
    );
    let recipe_service = RecipeService::new(
        recipe_repo.clone(),
        category_repo.clone(),
        storage.clone(),
    );
    let interaction_service = InteractionService::new(
        recipe_repo.clone(),
        favorite_repo,
        like_repo,
        rating_repo.clone(),
        comment_repo.clone(),
    );
    let admin_service = AdminService::new(
        user_repo,
        recipe_repo,
        comment_repo,
        category_repo,
        rating_repo,
        session_repo,
    );

    let state = AppState {
        account_service,
        catalog_service,
        recipe_service,
        interaction_service,
        admin_service,
        session_cookie: config.session.cookie_name.clone(),
    };

    // Router
    let app = Router::new()
        .nest("/api", api_router())
        .nest_service("/images", ServeDir::new(&config.storage.image_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            recipehaven_api::middleware::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = bind_addr(&config.server.host, config.server.port)?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr_uses_configured_host() {
        let addr = bind_addr("127.0.0.1", 8080).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");

        let addr = bind_addr("0.0.0.0", 3000).unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_bind_addr_rejects_non_ip_host() {
        assert!(bind_addr("localhost", 8080).is_err());
    }
}
