//! Persists notifications and hands them to the push transport.
//!
//! The transport itself (websocket/push fan-out) lives outside this service;
//! dispatch here means writing the row, stamping `sent_at`, and emitting the
//! delivery event for the push relay to pick up. Delivery is best-effort and
//! independently retryable downstream.

use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use tracing::info;
use uuid::Uuid;

use crate::entities::notification::{self, PreferenceType, TargetType};

/// Creates an unsent notification row for a user.
pub async fn create_notification(
    db: &DatabaseConnection,
    user_id: i32,
    preference_type: PreferenceType,
    target_type: Option<TargetType>,
    target_id: Option<i32>,
    description: String,
) -> Result<notification::Model, DbErr> {
    let notification = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        preference_type: Set(preference_type),
        target_type: Set(target_type),
        target_id: Set(target_id),
        description: Set(description),
        notify_at: Set(chrono::Utc::now().naive_utc()),
        sent_at: Set(None),
        read_at: Set(None),
    };
    notification.insert(db).await
}

/// Marks a notification as sent and emits the delivery event for the push
/// transport.
pub async fn send_notification(
    db: &DatabaseConnection,
    notification: notification::Model,
) -> Result<notification::Model, DbErr> {
    let user_id = notification.user_id;
    let mut active: notification::ActiveModel = notification.into();
    active.sent_at = Set(Some(chrono::Utc::now().naive_utc()));
    let sent = active.update(db).await?;

    info!(
        notification_id = %sent.id,
        user_id,
        "dispatched notification to /topic/notifications/{user_id}"
    );
    metrics::counter!("crisispulse_notifications_sent_total").increment(1);
    Ok(sent)
}

/// Create-and-send for a crisis alert targeting one event.
pub async fn dispatch_crisis_alert(
    db: &DatabaseConnection,
    user_id: i32,
    event_id: i32,
    description: String,
) -> Result<notification::Model, DbErr> {
    let notification = create_notification(
        db,
        user_id,
        PreferenceType::CrisisAlert,
        Some(TargetType::Event),
        Some(event_id),
        description,
    )
    .await?;
    send_notification(db, notification).await
}

/// Stamps `read_at` on a notification owned by the given user.
/// Returns `None` when the notification does not exist or belongs to someone
/// else.
pub async fn mark_as_read(
    db: &DatabaseConnection,
    notification_id: Uuid,
    user_id: i32,
) -> Result<Option<notification::Model>, DbErr> {
    let Some(notification) = notification::Entity::find_by_id(notification_id)
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    if notification.user_id != user_id {
        return Ok(None);
    }

    let mut active: notification::ActiveModel = notification.into();
    active.read_at = Set(Some(chrono::Utc::now().naive_utc()));
    active.update(db).await.map(Some)
}
