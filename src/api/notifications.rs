use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::entities::notification;
use crate::notifications::dispatcher;
use crate::paging::{PageParams, PageResponse};

// GET /notifications
pub async fn list_notifications(
    Extension(db): Extension<DatabaseConnection>,
    Extension(user_id): Extension<i32>,
    Query(params): Query<PageParams>,
) -> Response {
    let paginator = notification::Entity::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::NotifyAt)
        .paginate(&db, params.effective_size());

    let total = match paginator.num_items().await {
        Ok(total) => total,
        Err(e) => {
            error!("Failed to count notifications for user {}: {}", user_id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to list notifications"})),
            )
                .into_response();
        }
    };

    match paginator.fetch_page(params.page).await {
        Ok(content) => (
            StatusCode::OK,
            Json(PageResponse::new(content, &params, total)),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to list notifications for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to list notifications"})),
            )
                .into_response()
        }
    }
}

// POST /notifications/:id/read
pub async fn mark_notification_read(
    Extension(db): Extension<DatabaseConnection>,
    Extension(user_id): Extension<i32>,
    Path(notification_id): Path<Uuid>,
) -> Response {
    match dispatcher::mark_as_read(&db, notification_id, user_id).await {
        Ok(Some(n)) => (StatusCode::OK, Json(n)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Notification not found"})),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to mark notification {} read: {}", notification_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to update notification"})),
            )
                .into_response()
        }
    }
}
