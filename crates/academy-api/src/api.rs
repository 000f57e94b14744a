//! HTTP API endpoints for the Academy content graph.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Liveness probe
//! - `GET|POST /api/courses` - List or create courses
//! - `GET /api/courses/:id` - Get one course
//! - `GET /api/courses/:id/modules` - Modules of a course
//! - `POST /api/courses/update-categories` - Re-list courses under their categories
//! - `GET|POST /api/category` - List or create categories
//! - `GET /api/category/:id` - Get one category
//! - `POST /api/topics` - Create a topic
//! - `POST /api/modules` - Create a module
//! - `GET /api/modules/:id/lessons` - Lessons of a module
//! - `POST /api/lessons` - Create a lesson
//! - `POST /api/users` - Create a user
//! - `POST /api/instructors` - Create an instructor profile
//! - `GET /api/instructors/:id` - Get one instructor
//!
//! Every response body has the shape `{ "success": bool, "message"?: string, "data"?: any }`.
//!
//! # Example
//!
//! ```no_run
//! use academy_api::{create_router, AppState, Config};
//!
//! # async fn example() {
//! let state = AppState::new(Config::default());
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::catalog::{
    Catalog, CategoryInput, CategoryView, CourseInput, CourseView, CreatedCourse, InstructorInput,
    InstructorView, LessonInput, ModuleInput, RepairReport, TopicInput, UserInput,
};
use crate::model::{Category, Lesson, Module, Topic, User};
use crate::store::Store;
use crate::{AcademyError, Config};

// ============================================================================
// Response Envelope
// ============================================================================

/// Body of every API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable note, present on errors and some successes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wraps a successful payload.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Wraps a successful payload with a message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

/// Liveness payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `"ok"`.
    pub status: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Catalog over the shared store.
    pub catalog: Catalog,
}

impl AppState {
    /// Creates state over an empty in-memory store.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Arc::new(Store::in_memory()))
    }

    /// Creates state over an existing store.
    ///
    /// Useful for serving a catalog loaded from a snapshot file.
    #[must_use]
    pub fn with_store(config: Config, store: Arc<Store>) -> Self {
        let catalog = Catalog::new(store, config.required_languages.clone());
        Self { config, catalog }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// An error raised by the catalog.
    Catalog(AcademyError),
    /// The request body or path could not be parsed.
    BadRequest(String),
}

impl From<AcademyError> for ApiError {
    fn from(err: AcademyError) -> Self {
        Self::Catalog(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Catalog(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if err.is_client_error() {
                    (status, err.to_string())
                } else {
                    error!(error = %err, "Request failed");
                    (status, "Internal server error".to_string())
                }
            }
        };

        let body = Json(ApiResponse::<()> {
            success: false,
            message: Some(message),
            data: None,
        });
        (status, body).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints.
///
/// The router carries:
/// - All API routes under `/api`
/// - Bearer-token check on non-GET requests when `authToken` is configured
/// - Permissive CORS for the browser frontend
/// - Tracing middleware for request logging
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(handle_health))
        .route("/courses", get(handle_list_courses).post(handle_create_course))
        .route("/courses/update-categories", post(handle_update_categories))
        .route("/courses/:id", get(handle_get_course))
        .route("/courses/:id/modules", get(handle_course_modules))
        .route(
            "/category",
            get(handle_list_categories).post(handle_create_category),
        )
        .route("/category/:id", get(handle_get_category))
        .route("/topics", post(handle_create_topic))
        .route("/modules", post(handle_create_module))
        .route("/modules/:id/lessons", get(handle_module_lessons))
        .route("/lessons", post(handle_create_lesson))
        .route("/users", post(handle_create_user))
        .route("/instructors", post(handle_create_instructor))
        .route("/instructors/:id", get(handle_get_instructor));

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_bearer_token,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Rejects mutating requests that lack the configured bearer token.
async fn require_bearer_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.auth_token.as_deref() else {
        return next.run(request).await;
    };
    let method = request.method();
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if presented == Some(expected) {
        next.run(request).await
    } else {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected request without valid bearer token"
        );
        ApiError::Catalog(AcademyError::Unauthorized).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `GET /api/health`.
async fn handle_health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::ok(HealthStatus {
        status: "ok".to_string(),
    }))
}

/// Handler for `GET /api/courses`.
async fn handle_list_courses(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<CourseView>>> {
    Json(ApiResponse::ok(state.catalog.list_courses().await))
}

/// Handler for `GET /api/courses/:id`.
async fn handle_get_course(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CourseView> {
    let Path(id) = id?;
    Ok(Json(ApiResponse::ok(state.catalog.get_course(id).await?)))
}

/// Handler for `POST /api/courses`.
///
/// Responds 201 for a new course and 200 when the submission id was seen before.
async fn handle_create_course(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CourseInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedCourse>>), ApiError> {
    let Json(input) = body?;
    let created = state.catalog.create_course(input).await?;

    let (status, message) = if created.replayed {
        (StatusCode::OK, "Course already created for this submission")
    } else {
        (StatusCode::CREATED, "Course created successfully")
    };
    Ok((status, Json(ApiResponse::ok_with_message(created, message))))
}

/// Handler for `POST /api/courses/update-categories`.
async fn handle_update_categories(State(state): State<Arc<AppState>>) -> ApiResult<RepairReport> {
    let report = state.catalog.repair_course_categories().await?;
    let message = format!(
        "Listed {} course(s) under {} categor{}",
        report.courses_appended,
        report.categories_updated,
        if report.categories_updated == 1 { "y" } else { "ies" }
    );
    Ok(Json(ApiResponse::ok_with_message(report, message)))
}

/// Handler for `GET /api/courses/:id/modules`.
async fn handle_course_modules(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<Module>> {
    let Path(id) = id?;
    Ok(Json(ApiResponse::ok(state.catalog.course_modules(id).await?)))
}

/// Handler for `GET /api/category`.
async fn handle_list_categories(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<CategoryView>>> {
    Json(ApiResponse::ok(state.catalog.list_categories().await))
}

/// Handler for `GET /api/category/:id`.
async fn handle_get_category(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CategoryView> {
    let Path(id) = id?;
    Ok(Json(ApiResponse::ok(state.catalog.get_category(id).await?)))
}

/// Handler for `POST /api/category`.
async fn handle_create_category(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), ApiError> {
    let Json(input) = body?;
    let category = state.catalog.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(category))))
}

/// Handler for `POST /api/topics`.
async fn handle_create_topic(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TopicInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Topic>>), ApiError> {
    let Json(input) = body?;
    let topic = state.catalog.create_topic(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(topic))))
}

/// Handler for `POST /api/modules`.
async fn handle_create_module(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ModuleInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Module>>), ApiError> {
    let Json(input) = body?;
    let module = state.catalog.create_module(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(module))))
}

/// Handler for `GET /api/modules/:id/lessons`.
async fn handle_module_lessons(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<Lesson>> {
    let Path(id) = id?;
    Ok(Json(ApiResponse::ok(state.catalog.module_lessons(id).await?)))
}

/// Handler for `POST /api/lessons`.
async fn handle_create_lesson(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LessonInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Lesson>>), ApiError> {
    let Json(input) = body?;
    let lesson = state.catalog.create_lesson(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(lesson))))
}

/// Handler for `POST /api/users`.
async fn handle_create_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let Json(input) = body?;
    let user = state.catalog.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// Handler for `POST /api/instructors`.
async fn handle_create_instructor(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InstructorInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<InstructorView>>), ApiError> {
    let Json(input) = body?;
    let instructor = state.catalog.create_instructor(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(instructor))))
}

/// Handler for `GET /api/instructors/:id`.
async fn handle_get_instructor(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<InstructorView> {
    let Path(id) = id?;
    Ok(Json(ApiResponse::ok(state.catalog.get_instructor(id).await?)))
}

// ============================================================================
// Tests
// ============================================================================
