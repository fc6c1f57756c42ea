use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use complaint_desk_core::{Complaint, ComplaintError, NewComplaint};
use complaint_desk_store_sqlite::ComplaintStore;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct AppState {
    store: ComplaintStore,
}

#[derive(Debug, Clone, Serialize)]
struct ApiError {
    error: ApiErrorPayload,
}

#[derive(Debug, Clone, Serialize)]
struct ApiErrorPayload {
    code: &'static str,
    message: String,
}

#[derive(Debug, Clone)]
struct ApiFailure {
    status: StatusCode,
    code: &'static str,
    message: String,
}

/// Fields default to empty strings so an absent field and an empty field
/// take the same validation path and produce the same 400.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CreateComplaintRequest {
    name: String,
    phone_number: String,
    email: String,
    complaint_details: String,
}

#[derive(Debug, Clone, Serialize)]
struct CreateComplaintResponse {
    complaint_id: String,
    message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Parser)]
#[command(name = "complaint-desk-service")]
#[command(about = "HTTP service for complaint records")]
struct Args {
    #[arg(long, default_value = "./complaints.sqlite3")]
    db: PathBuf,
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let payload = ApiError {
            error: ApiErrorPayload {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(payload)).into_response()
    }
}

impl ApiFailure {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn invalid_json(rejection: &JsonRejection) -> Self {
        Self::new(rejection.status(), "invalid_json", rejection.body_text())
    }

    fn from_store_error(err: &ComplaintError) -> Self {
        match err {
            ComplaintError::Validation(_) => {
                Self::new(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
            }
            ComplaintError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "not_found", err.to_string())
            }
            ComplaintError::Storage(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                err.to_string(),
            ),
        }
    }
}

impl AppState {
    /// Runs one store operation on the blocking pool; rusqlite is
    /// synchronous. No timeout wraps the call; operations either complete
    /// or fail, there is no cancellation path.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T, ApiFailure>
    where
        T: Send + 'static,
        F: FnOnce(ComplaintStore) -> Result<T, ComplaintError> + Send + 'static,
    {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || op(store)).await {
            Ok(result) => result.map_err(|err| ApiFailure::from_store_error(&err)),
            Err(err) => Err(ApiFailure::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                format!("blocking task join failure: {err}"),
            )),
        }
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/complaints", post(create_complaint))
        .route("/complaints/:complaint_id", get(get_complaint))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let store = ComplaintStore::new(&args.db);
    store.initialize()?;
    info!(db = %args.db.display(), "complaints store initialized");

    let state = AppState { store };
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(addr = %args.bind, "complaint service listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn create_complaint(
    State(state): State<AppState>,
    payload: Result<Json<CreateComplaintRequest>, JsonRejection>,
) -> Result<Json<CreateComplaintResponse>, ApiFailure> {
    let Json(request) = payload.map_err(|rejection| ApiFailure::invalid_json(&rejection))?;
    let input = NewComplaint {
        name: request.name,
        phone_number: request.phone_number,
        email: request.email,
        complaint_details: request.complaint_details,
    };

    let complaint_id = state.run_blocking(move |store| store.create(&input)).await?;
    info!(%complaint_id, "complaint created");
    Ok(Json(CreateComplaintResponse {
        complaint_id,
        message: "Complaint created successfully",
    }))
}

async fn get_complaint(
    State(state): State<AppState>,
    Path(complaint_id): Path<String>,
) -> Result<Json<Complaint>, ApiFailure> {
    let record = state
        .run_blocking(move |store| store.get(&complaint_id))
        .await?;
    Ok(Json(record))
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Complaint Management API is running",
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
