pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use services::AppState;

/// Assemble the full route tree around a shared [`AppState`].
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http());

    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/info", get(handlers::info))
        .merge(auth_routes())
        .merge(public_routes())
        .merge(protected_routes())
}

fn auth_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/refresh", post(auth::refresh))
}

fn public_routes() -> Router<AppState> {
    use handlers::public::{assignments, classrooms, profile, reference, schools};

    Router::new()
        // Profiles (public projection)
        .route("/profile/:id", get(profile::get_by_id))
        // Reference data
        .route("/genders", get(reference::list_genders))
        .route("/genders/:id", get(reference::get_gender))
        .route("/prefixes", get(reference::list_prefixes))
        .route("/prefixes/:id", get(reference::get_prefix))
        .route(
            "/prefixes/by-gender/:code",
            get(reference::list_prefixes_by_gender),
        )
        // Schools
        .route("/schools", get(schools::list))
        .route("/schools/:id", get(schools::get))
        // Classrooms
        .route("/classrooms", get(classrooms::list))
        .route("/classrooms/:id", get(classrooms::get))
        .route("/classrooms/code/:code", get(classrooms::get_by_code))
        // Assignments
        .route("/assignments", get(assignments::list))
        .route("/assignments/:id", get(assignments::get))
}

fn protected_routes() -> Router<AppState> {
    use handlers::protected::{assignments, classrooms, profile, schools};
    use middleware::auth::jwt_auth_middleware;

    Router::new()
        // Profile
        .route("/profile", get(profile::get).patch(profile::update))
        // Schools
        .route("/schools", post(schools::create))
        .route(
            "/schools/:id",
            patch(schools::update).delete(schools::delete),
        )
        // Classrooms
        .route("/classrooms", post(classrooms::create))
        .route(
            "/classrooms/:id",
            patch(classrooms::update).delete(classrooms::delete),
        )
        // Assignments
        .route("/assignments", post(assignments::create))
        .route(
            "/assignments/:id",
            patch(assignments::update).delete(assignments::delete),
        )
        .route("/assignments/:id/publish", post(assignments::publish))
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
}
