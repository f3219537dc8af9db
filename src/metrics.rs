use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::crisis_event::{self, Severity};
use crate::entities::{notification, user};

pub async fn init_metrics(db: &DatabaseConnection) {
    // Total Counts
    let user_count = user::Entity::find().count(db).await.unwrap_or(0);
    metrics::gauge!("crisispulse_users_total").set(user_count as f64);

    let event_count = crisis_event::Entity::find().count(db).await.unwrap_or(0);
    metrics::gauge!("crisispulse_crisis_events_total").set(event_count as f64);

    let notification_count = notification::Entity::find().count(db).await.unwrap_or(0);
    metrics::gauge!("crisispulse_notifications_total").set(notification_count as f64);

    // Active events broken down by severity, for the dashboard's top row.
    for severity in [Severity::Red, Severity::Yellow, Severity::Green] {
        let count = crisis_event::Entity::find()
            .filter(crisis_event::Column::Active.eq(true))
            .filter(crisis_event::Column::Severity.eq(severity))
            .count(db)
            .await
            .unwrap_or(0);
        metrics::gauge!("crisispulse_active_events_total", "severity" => severity.as_str())
            .set(count as f64);
    }

    tracing::info!(
        "Initialized metrics: Users={}, CrisisEvents={}, Notifications={}",
        user_count,
        event_count,
        notification_count
    );
}
