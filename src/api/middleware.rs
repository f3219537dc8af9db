use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::json;
use tower_cookies::Cookies;

use crate::entities::user::{self, Role};

pub const SESSION_COOKIE: &str = "crisispulse_user";

fn session_user_id(cookies: &Cookies) -> Option<i32> {
    cookies
        .get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse::<i32>().ok())
}

pub async fn auth_middleware(cookies: Cookies, mut request: Request, next: Next) -> Response {
    if let Some(user_id) = session_user_id(&cookies) {
        request.extensions_mut().insert(user_id);
        return next.run(request).await;
    }
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Unauthorized"})),
    )
        .into_response()
}

/// Gate for the admin-only crisis-event mutations. Resolves the session to a
/// user row and requires the `admin` role; the lifecycle core itself never
/// checks roles.
pub async fn admin_middleware(
    Extension(db): Extension<DatabaseConnection>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(user_id) = session_user_id(&cookies) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        )
            .into_response();
    };

    match user::Entity::find_by_id(user_id).one(&db).await {
        Ok(Some(u)) if u.role == Role::Admin => {
            request.extensions_mut().insert(u.id);
            request.extensions_mut().insert(u);
            next.run(request).await
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Only administrators can manage crisis events"})),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}
