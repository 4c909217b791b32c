//! Restaurant and review API over a shared Redis Stack store.
//!
//! Every piece of restaurant state lives in the store as an independently
//! addressable projection: the record hash, a rating-ordered index, a
//! per-restaurant review ledger, cuisine membership sets, a probabilistic
//! duplicate filter over (name, location), and a whole-document detail
//! record. A mutation updates each projection it touches as a sequence of
//! individually atomic store calls; there is no cross-structure transaction,
//! and a failed step leaves drift that is logged rather than rolled back.
//!
//! The store is reached through the [`store::DataStore`] trait so the
//! composition root decides the backend; [`state::AppState`] owns the single
//! reusable handle for the lifetime of the process.

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::{delete, get},
    Router,
};
use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod cuisines;
pub mod database;
pub mod error;
pub mod keys;
pub mod pagination;
pub mod restaurants;
pub mod reviews;
pub mod routes;
pub mod search;
pub mod state;
pub mod store;
pub mod weather;

use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    // Everything under /restaurants/:restaurantId goes through the existence
    // check first, so the core operations receive a confirmed id.
    let per_restaurant = Router::new()
        .route("/restaurants/:restaurantId", get(routes::get_restaurant))
        .route("/restaurants/:restaurantId/weather", get(routes::get_weather))
        .route(
            "/restaurants/:restaurantId/details",
            get(routes::get_details).post(routes::set_details),
        )
        .route(
            "/restaurants/:restaurantId/reviews",
            get(routes::list_reviews).post(routes::add_review),
        )
        .route(
            "/restaurants/:restaurantId/reviews/:reviewId",
            delete(routes::delete_review),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::check_restaurant_exists,
        ));

    Router::new()
        .route(
            "/restaurants",
            get(routes::list_restaurants).post(routes::create_restaurant),
        )
        .route("/restaurants/search", get(routes::search_restaurants))
        .merge(per_restaurant)
        .route("/cuisines", get(routes::list_cuisines))
        .route("/cuisines/:cuisine", get(routes::cuisine_members))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await.expect("Failed to initialize state");

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.expect("Failed to bind");
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
