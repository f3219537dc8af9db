use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::crisis::lifecycle::{self, CreateCrisisEventInput, UpdateCrisisEventInput};
use crate::entities::crisis_event::{self, Severity};
use crate::entities::crisis_event_change::{self, ChangeType};
use crate::entities::user;
use crate::paging::PageParams;

#[derive(Deserialize)]
pub struct CreateCrisisEventRequest {
    pub name: String,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: Option<f64>,
    pub start_time: chrono::NaiveDateTime,
    pub scenario_theme_id: Option<i32>,
}

/// Start time is intentionally absent: it is fixed at creation and any value
/// sent here would be ignored anyway.
#[derive(Deserialize)]
pub struct UpdateCrisisEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub scenario_theme_id: Option<i32>,
}

#[derive(Serialize)]
pub struct CrisisEventDetailsResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub epicenter_latitude: f64,
    pub epicenter_longitude: f64,
    pub radius: Option<f64>,
    pub start_time: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    pub active: bool,
    pub created_by_user_id: i32,
    pub scenario_theme_id: Option<i32>,
}

impl From<crisis_event::Model> for CrisisEventDetailsResponse {
    fn from(event: crisis_event::Model) -> Self {
        Self {
            id: event.id,
            name: event.name,
            description: event.description,
            severity: event.severity,
            epicenter_latitude: event.epicenter_latitude,
            epicenter_longitude: event.epicenter_longitude,
            radius: event.radius,
            start_time: event.start_time,
            updated_at: event.updated_at,
            active: event.active,
            created_by_user_id: event.created_by_user_id,
            scenario_theme_id: event.scenario_theme_id,
        }
    }
}

#[derive(Serialize)]
pub struct CrisisEventChangeResponse {
    pub id: i32,
    pub crisis_event_id: i32,
    pub change_type: ChangeType,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_by_user_id: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl From<crisis_event_change::Model> for CrisisEventChangeResponse {
    fn from(change: crisis_event_change::Model) -> Self {
        Self {
            id: change.id,
            crisis_event_id: change.crisis_event_id,
            change_type: change.change_type,
            old_value: change.old_value,
            new_value: change.new_value,
            created_by_user_id: change.created_by_user_id,
            created_at: change.created_at,
        }
    }
}

// POST /admin/crisis-events
pub async fn create_crisis_event(
    Extension(db): Extension<DatabaseConnection>,
    Extension(admin): Extension<user::Model>,
    Json(payload): Json<CreateCrisisEventRequest>,
) -> Response {
    let input = CreateCrisisEventInput {
        name: payload.name,
        description: payload.description,
        severity: payload.severity,
        latitude: payload.latitude,
        longitude: payload.longitude,
        radius: payload.radius,
        start_time: payload.start_time,
        scenario_theme_id: payload.scenario_theme_id,
    };

    match lifecycle::create_event(&db, input, admin.id).await {
        Ok(event) => {
            tracing::Span::current()
                .record("table", "crisis_events")
                .record("action", "create_crisis_event")
                .record("event_id", event.id)
                .record("business_event", "Crisis event created");

            (
                StatusCode::CREATED,
                Json(CrisisEventDetailsResponse::from(event)),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to create crisis event: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to create crisis event"})),
            )
                .into_response()
        }
    }
}

// PUT /admin/crisis-events/:id
pub async fn update_crisis_event(
    Extension(db): Extension<DatabaseConnection>,
    Path(event_id): Path<i32>,
    Json(payload): Json<UpdateCrisisEventRequest>,
) -> Response {
    let input = UpdateCrisisEventInput {
        name: payload.name,
        description: payload.description,
        severity: payload.severity,
        latitude: payload.latitude,
        longitude: payload.longitude,
        radius: payload.radius,
        scenario_theme_id: payload.scenario_theme_id,
    };

    match lifecycle::update_event(&db, event_id, input).await {
        Ok(Some(event)) => (
            StatusCode::OK,
            Json(CrisisEventDetailsResponse::from(event)),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Crisis event not found"})),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to update crisis event {}: {}", event_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to update crisis event"})),
            )
                .into_response()
        }
    }
}

// PUT /admin/crisis-events/deactivate/:id
pub async fn deactivate_crisis_event(
    Extension(db): Extension<DatabaseConnection>,
    Path(event_id): Path<i32>,
) -> Response {
    match lifecycle::deactivate_event(&db, event_id).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(json!({"message": "Crisis event deactivated"})),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Crisis event not found"})),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to deactivate crisis event {}: {}", event_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to deactivate crisis event"})),
            )
                .into_response()
        }
    }
}

// GET /public/crisis-events/:id
pub async fn get_crisis_event(
    Extension(db): Extension<DatabaseConnection>,
    Path(event_id): Path<i32>,
) -> Response {
    match lifecycle::get_event(&db, event_id).await {
        Ok(Some(event)) => (
            StatusCode::OK,
            Json(CrisisEventDetailsResponse::from(event)),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Crisis event not found"})),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to fetch crisis event {}: {}", event_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Database error"})),
            )
                .into_response()
        }
    }
}

// GET /public/crisis-events/all
pub async fn list_crisis_events(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<PageParams>,
) -> Response {
    match lifecycle::list_events(&db, &params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            error!("Failed to list crisis events: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to list crisis events"})),
            )
                .into_response()
        }
    }
}

// GET /public/crisis-events/all/previews
pub async fn list_active_previews(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<PageParams>,
) -> Response {
    match lifecycle::active_event_previews(&db, &params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            error!("Failed to list crisis event previews: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to list crisis event previews"})),
            )
                .into_response()
        }
    }
}

// GET /public/crisis-events/inactive/previews
pub async fn list_inactive_previews(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<PageParams>,
) -> Response {
    match lifecycle::inactive_event_previews(&db, &params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            error!("Failed to list inactive crisis event previews: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to list crisis event previews"})),
            )
                .into_response()
        }
    }
}

// GET /public/crisis-events/:id/changes
pub async fn list_crisis_event_changes(
    Extension(db): Extension<DatabaseConnection>,
    Path(event_id): Path<i32>,
    Query(params): Query<PageParams>,
) -> Response {
    match lifecycle::event_changes(&db, event_id, &params).await {
        Ok(Some(page)) => {
            let page = page.map(CrisisEventChangeResponse::from);
            (StatusCode::OK, Json(page)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Crisis event not found"})),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to fetch change history for event {}: {}", event_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch change history"})),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
}

fn default_is_active() -> bool {
    true
}

fn default_page_size() -> u64 {
    20
}

// GET /public/crisis-events/search
pub async fn search_crisis_events(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<SearchParams>,
) -> Response {
    let page_params = PageParams {
        page: params.page,
        size: params.size,
    };
    match lifecycle::search_events(&db, &params.q, params.is_active, &page_params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            error!("Failed to search crisis events: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to search crisis events"})),
            )
                .into_response()
        }
    }
}

// GET /crisis-events/affecting-me
pub async fn list_events_affecting_me(
    Extension(db): Extension<DatabaseConnection>,
    Extension(user_id): Extension<i32>,
    Query(params): Query<PageParams>,
) -> Response {
    let caller = match user::Entity::find_by_id(user_id).one(&db).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "User not found"})),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    match lifecycle::events_affecting_user(&db, &caller, &params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            error!("Failed to list events affecting user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to list crisis events"})),
            )
                .into_response()
        }
    }
}

// GET /crisis-events/affecting-me/previews
pub async fn list_event_previews_affecting_me(
    Extension(db): Extension<DatabaseConnection>,
    Extension(user_id): Extension<i32>,
    Query(params): Query<PageParams>,
) -> Response {
    let caller = match user::Entity::find_by_id(user_id).one(&db).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "User not found"})),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    match lifecycle::event_previews_affecting_user(&db, &caller, &params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            error!(
                "Failed to list event previews affecting user {}: {}",
                user_id, e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to list crisis event previews"})),
            )
                .into_response()
        }
    }
}
