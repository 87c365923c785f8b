//! Liveness, readiness and build version.

use crate::state::AppState;
use crate::store::INITIAL_STATES;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize)]
struct Readiness {
    status: &'static str,
    database: &'static str,
    /// Seeded states found; the schema is usable once every initial state is present.
    states: i64,
}

#[derive(Serialize)]
struct Version {
    name: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Ready when the database answers and `ensure_tables` has seeded the states.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let seeded = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM states")
        .fetch_one(&state.pool)
        .await;
    match seeded {
        Ok(states) if states >= INITIAL_STATES.len() as i64 => (
            StatusCode::OK,
            Json(Readiness {
                status: "ready",
                database: "ok",
                states,
            }),
        ),
        Ok(states) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Readiness {
                status: "not_ready",
                database: "unseeded",
                states,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness {
                    status: "not_ready",
                    database: "unavailable",
                    states: 0,
                }),
            )
        }
    }
}

async fn version() -> Json<Version> {
    Json(Version {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health, /ready and /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
