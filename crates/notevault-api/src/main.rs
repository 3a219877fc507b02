//! notevault-api - HTTP API server for notevault

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse},
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use notevault_assist::{GeminiBackend, GenerationBackend};
use notevault_core::TokenService;
use notevault_db::Database;

use handlers::{accounts, assist, categories, notes};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging production incidents.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenService>,
    /// Absent when no provider API key is configured; the assist endpoints
    /// then answer 503 while everything else keeps working.
    pub assist: Option<Arc<dyn GenerationBackend>>,
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Extractor for endpoints that require a valid bearer access token.
///
/// Rejections carry the `detail` key, matching what token-auth clients
/// expect on 401 responses.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::Unauthorized("Authentication credentials were not provided.".to_string())
        })?;

        let id = state.tokens.verify_access(token).map_err(|err| match err {
            notevault_core::Error::Auth(msg) => ApiError::Unauthorized(msg),
            other => other.into(),
        })?;

        Ok(CurrentUser { id })
    }
}

/// Pull the token out of an `Authorization: Bearer …` header.
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

/// API-level error with both a status code and the JSON key the message is
/// delivered under. The key varies per endpoint (`error`, `message`,
/// `detail`) and is part of the wire contract, so the variants encode it
/// rather than unifying on one shape.
#[derive(Debug)]
pub enum ApiError {
    Database(notevault_core::Error),
    /// 400 `{"error": …}`
    BadRequest(String),
    /// 400 `{"message": …}`
    BadRequestMessage(String),
    /// 401 `{"detail": …}`
    Unauthorized(String),
    /// 401 `{"error": "Authentication required"}`
    AuthRequired,
    /// 403 `{"detail": …}`
    Forbidden(String),
    /// 404 `{"error": …}`
    NotFound(String),
    /// 404 `{"detail": …}`
    NotFoundDetail(String),
    /// 404 `{"message": …}`
    NotFoundMessage(String),
    /// 503 `{"error": …}`
    ServiceUnavailable(String),
}

impl From<notevault_core::Error> for ApiError {
    fn from(err: notevault_core::Error) -> Self {
        match err {
            notevault_core::Error::Validation(msg) => ApiError::BadRequest(msg),
            notevault_core::Error::Auth(msg) => ApiError::Unauthorized(msg),
            notevault_core::Error::Forbidden(msg) => ApiError::Forbidden(msg),
            notevault_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            notevault_core::Error::Assist(msg) => ApiError::ServiceUnavailable(msg),
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, key, message) = match self {
            ApiError::Database(err) => {
                tracing::error!(error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "error",
                    "Internal server error".to_string(),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "error", msg),
            ApiError::BadRequestMessage(msg) => (StatusCode::BAD_REQUEST, "message", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "detail", msg),
            ApiError::AuthRequired => (
                StatusCode::UNAUTHORIZED,
                "error",
                "Authentication required".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "detail", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "error", msg),
            ApiError::NotFoundDetail(msg) => (StatusCode::NOT_FOUND, "detail", msg),
            ApiError::NotFoundMessage(msg) => (StatusCode::NOT_FOUND, "message", msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "error", msg),
        };

        let body = Json(serde_json::json!({ key: message }));
        (status, body).into_response()
    }
}

// =============================================================================
// LANDING PAGE
// =============================================================================

async fn index() -> Html<String> {
    let now = chrono::Local::now();
    Html(format!(
        "<html>\n  <body>\n    <h1>Hello from NoteVault!</h1>\n    <p>The current time is {}.</p>\n  </body>\n</html>\n",
        now.format("%Y-%m-%d %H:%M:%S")
    ))
}

// =============================================================================
// STARTUP
// =============================================================================

fn parse_allowed_origins() -> Option<Vec<HeaderValue>> {
    let raw = std::env::var("CORS_ALLOWED_ORIGINS").ok()?;
    let origins: Vec<HeaderValue> = raw
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();
    Some(origins)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "notevault_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notevault_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notevault-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/notevault".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let jwt_secret = std::env::var("JWT_SECRET")
        .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
    let tokens = match (
        std::env::var("ACCESS_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok()),
        std::env::var("REFRESH_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok()),
    ) {
        (Some(access), Some(refresh)) => TokenService::with_ttls(
            &jwt_secret,
            chrono::Duration::seconds(access),
            chrono::Duration::seconds(refresh),
        ),
        _ => TokenService::new(&jwt_secret),
    };

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Text-assist backend is optional; without an API key the two assist
    // endpoints answer 503 and everything else works normally.
    let assist: Option<Arc<dyn GenerationBackend>> = match GeminiBackend::from_env() {
        Ok(backend) => {
            info!("Text-assist backend initialized");
            Some(Arc::new(backend))
        }
        Err(err) => {
            warn!(error = %err, "Text-assist backend disabled");
            None
        }
    };

    let state = AppState {
        db,
        tokens: Arc::new(tokens),
        assist,
    };

    // Build router
    let app = Router::new()
        // Landing page
        .route("/", get(index))
        // Accounts
        .route("/register/", post(accounts::register))
        .route("/login/", post(accounts::login))
        .route("/refresh/", post(accounts::refresh))
        .route(
            "/profile/",
            get(accounts::profile).put(accounts::update_profile),
        )
        .route("/reset-password/", post(accounts::reset_password))
        .route("/reset-new-password/", post(accounts::recover_password))
        .route("/api/getFirstname/", get(accounts::get_firstname))
        // Categories
        .route("/categories/", get(categories::list_categories))
        .route("/categories/create/", post(categories::create_category))
        .route(
            "/categories/update/:category_id/",
            put(categories::update_category),
        )
        .route(
            "/categories/delete/:category_id/",
            delete(categories::delete_category),
        )
        // Notes
        .route("/notes/", get(notes::list_notes))
        .route("/notes/create/", post(notes::create_note))
        .route("/notes/search/", get(notes::search_notes))
        .route("/notes/category/:category_id/", get(notes::notes_by_category))
        .route("/notes/:note_id/", get(notes::get_note))
        .route("/notes/update/:note_id/", put(notes::update_note))
        .route("/notes/delete/:note_id/", delete(notes::delete_note))
        .route("/notes/toggle-pin/:note_id/", post(notes::toggle_pin))
        // Text assist
        .route("/summarize/", post(assist::summarize_text))
        .route("/check_grammar/", post(assist::check_text))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);
            match parse_allowed_origins() {
                Some(origins) => cors
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_credentials(true),
                None => cors.allow_origin(AllowOrigin::any()),
            }
        })
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
