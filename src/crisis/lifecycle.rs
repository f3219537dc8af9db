//! Crisis-event lifecycle: create, update, deactivate, and the query views.
//!
//! Mutations write the event and its audit records in one transaction;
//! notification fan-out runs after the commit and is best-effort, so a
//! delivery problem never rolls back the mutation. Not-found outcomes are
//! `Ok(None)`, mapped to a 404 at the API boundary.

use chrono::{NaiveDateTime, Utc};
use futures::future::join_all;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{error, info};

use crate::crisis::audit::{self, EventSnapshot};
use crate::crisis::resolver::{resolve_affected_users, AffectedUser, UserLocation};
use crate::entities::crisis_event::{self, Severity};
use crate::entities::crisis_event_change::{self, ChangeType};
use crate::entities::{CrisisEvent, CrisisEventChange, Household, ScenarioTheme, User};
use crate::entities::{household, user};
use crate::notifications::{dispatcher, messages};
use crate::paging::{PageParams, PageResponse};

pub struct CreateCrisisEventInput {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to the lowest severity when omitted.
    pub severity: Option<Severity>,
    pub latitude: f64,
    pub longitude: f64,
    /// Kilometers.
    pub radius: Option<f64>,
    /// Fixed forever at creation.
    pub start_time: NaiveDateTime,
    pub scenario_theme_id: Option<i32>,
}

/// Partial update payload. Start time is deliberately absent: the field is
/// not writable after creation.
#[derive(Default)]
pub struct UpdateCrisisEventInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub scenario_theme_id: Option<i32>,
}

/// Reduced projection used by list views.
#[derive(Debug, Serialize)]
pub struct EventPreview {
    pub id: i32,
    pub name: String,
    pub severity: Severity,
    pub start_time: NaiveDateTime,
}

impl From<crisis_event::Model> for EventPreview {
    fn from(event: crisis_event::Model) -> Self {
        Self {
            id: event.id,
            name: event.name,
            severity: event.severity,
            start_time: event.start_time,
        }
    }
}

/// Creates the event, records the `creation` audit entry, then fans out
/// new-event alerts to everyone within the radius. An unknown scenario theme
/// id is silently dropped.
pub async fn create_event(
    db: &DatabaseConnection,
    input: CreateCrisisEventInput,
    acting_user_id: i32,
) -> Result<crisis_event::Model, DbErr> {
    let scenario_theme_id = match input.scenario_theme_id {
        Some(theme_id) => ScenarioTheme::find_by_id(theme_id)
            .one(db)
            .await?
            .map(|theme| theme.id),
        None => None,
    };

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;

    let event = crisis_event::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        severity: Set(input.severity.unwrap_or(Severity::Green)),
        epicenter_latitude: Set(input.latitude),
        epicenter_longitude: Set(input.longitude),
        radius: Set(input.radius),
        start_time: Set(input.start_time),
        updated_at: Set(now),
        created_by_user_id: Set(acting_user_id),
        active: Set(true),
        scenario_theme_id: Set(scenario_theme_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    insert_change(
        &txn,
        event.id,
        ChangeType::Creation,
        None,
        Some(format!("Created crisis event: {}", event.name)),
        acting_user_id,
        now,
    )
    .await?;

    txn.commit().await?;
    metrics::counter!("crisispulse_crisis_events_created_total").increment(1);
    metrics::gauge!("crisispulse_crisis_events_total").increment(1.0);

    let template = messages::new_event_template(&EventSnapshot::from(&event), event.start_time);
    notify_affected(db, &event, &template).await;

    Ok(event)
}

/// Updates an event in one of two modes.
///
/// When name, description, severity, both coordinates and radius are all
/// supplied, every field is overwritten and five audit records are written
/// against the pre-update snapshot, changed or not. Otherwise each supplied
/// field is applied only if it differs, and only actual changes are audited.
/// Returns `Ok(None)` when the event is missing, or when a supplied scenario
/// theme id does not resolve (in which case nothing is persisted).
pub async fn update_event(
    db: &DatabaseConnection,
    id: i32,
    input: UpdateCrisisEventInput,
) -> Result<Option<crisis_event::Model>, DbErr> {
    let Some(current) = CrisisEvent::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let previous = EventSnapshot::from(&current);

    let scenario_theme_id = match input.scenario_theme_id {
        Some(theme_id) => match ScenarioTheme::find_by_id(theme_id).one(db).await? {
            Some(theme) => Some(theme.id),
            None => return Ok(None),
        },
        None => None,
    };

    let mut active: crisis_event::ActiveModel = current.clone().into();

    if let (Some(name), Some(description), Some(severity), Some(latitude), Some(longitude), Some(radius)) = (
        input.name.clone(),
        input.description.clone(),
        input.severity,
        input.latitude,
        input.longitude,
        input.radius,
    ) {
        // Full-field mode: unconditional overwrite, no no-op suppression.
        active.name = Set(name);
        active.description = Set(Some(description));
        active.severity = Set(severity);
        active.epicenter_latitude = Set(latitude);
        active.epicenter_longitude = Set(longitude);
        active.radius = Set(Some(radius));
        if let Some(theme_id) = scenario_theme_id {
            active.scenario_theme_id = Set(Some(theme_id));
        }

        let now = Utc::now().naive_utc();
        active.updated_at = Set(now);

        let txn = db.begin().await?;
        let updated = active.update(&txn).await?;
        let next = EventSnapshot::from(&updated);
        for change in audit::full_update_changes(&previous, &next) {
            insert_change(
                &txn,
                id,
                change.change_type,
                Some(change.old_value),
                Some(change.new_value),
                updated.created_by_user_id,
                now,
            )
            .await?;
        }
        txn.commit().await?;

        if let Some(template) = messages::update_template(&next, &previous) {
            notify_affected(db, &updated, &template).await;
        }
        return Ok(Some(updated));
    }

    // Partial mode: apply a field only when supplied and different.
    let mut has_changes = false;
    if let Some(name) = input.name {
        if name != previous.name {
            active.name = Set(name);
            has_changes = true;
        }
    }
    if let Some(description) = input.description {
        if previous.description.as_deref() != Some(description.as_str()) {
            active.description = Set(Some(description));
            has_changes = true;
        }
    }
    if let Some(severity) = input.severity {
        if severity != previous.severity {
            active.severity = Set(severity);
            has_changes = true;
        }
    }
    if let Some(latitude) = input.latitude {
        if latitude != previous.epicenter_latitude {
            active.epicenter_latitude = Set(latitude);
            has_changes = true;
        }
    }
    if let Some(longitude) = input.longitude {
        if longitude != previous.epicenter_longitude {
            active.epicenter_longitude = Set(longitude);
            has_changes = true;
        }
    }
    if let Some(radius) = input.radius {
        if previous.radius != Some(radius) {
            active.radius = Set(Some(radius));
            has_changes = true;
        }
    }
    if let Some(theme_id) = scenario_theme_id {
        active.scenario_theme_id = Set(Some(theme_id));
        has_changes = true;
    }

    if !has_changes {
        return Ok(Some(current));
    }

    let now = Utc::now().naive_utc();
    active.updated_at = Set(now);

    let txn = db.begin().await?;
    let updated = active.update(&txn).await?;
    let next = EventSnapshot::from(&updated);
    for change in audit::diff_events(&previous, &next) {
        insert_change(
            &txn,
            id,
            change.change_type,
            Some(change.old_value),
            Some(change.new_value),
            updated.created_by_user_id,
            now,
        )
        .await?;
    }
    txn.commit().await?;

    if let Some(template) = messages::update_template(&next, &previous) {
        notify_affected(db, &updated, &template).await;
    }
    Ok(Some(updated))
}

/// Flips an event inactive, keeping the row for history. The audit entry
/// records the `active` transition, and everyone currently inside the
/// event's own radius receives a deactivation notice.
pub async fn deactivate_event(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<crisis_event::Model>, DbErr> {
    let Some(event) = CrisisEvent::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    // Resolve the affected set before the flip so the notice reaches the
    // users the event covered while it was live.
    let users = load_user_locations(db).await?;
    let affected = resolve_affected_users(
        Some(event.epicenter_latitude),
        Some(event.epicenter_longitude),
        event.radius,
        &users,
    );

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;
    insert_change(
        &txn,
        event.id,
        ChangeType::LevelChange,
        Some("active: true".to_string()),
        Some("active: false".to_string()),
        event.created_by_user_id,
        now,
    )
    .await?;

    let mut active: crisis_event::ActiveModel = event.clone().into();
    active.active = Set(false);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    let template = messages::deactivation_template(&updated.name);
    fan_out(db, updated.id, &template, &affected).await;

    Ok(Some(updated))
}

pub async fn get_event(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<crisis_event::Model>, DbErr> {
    CrisisEvent::find_by_id(id).one(db).await
}

/// All events, storage-level paging, no ordering guarantee.
pub async fn list_events(
    db: &DatabaseConnection,
    params: &PageParams,
) -> Result<PageResponse<crisis_event::Model>, DbErr> {
    let paginator = CrisisEvent::find().paginate(db, params.effective_size());
    let total = paginator.num_items().await?;
    let content = paginator.fetch_page(params.page).await?;
    Ok(PageResponse::new(content, params, total))
}

/// Active-event previews, severity-descending. The full active set is sorted
/// in memory and sliced; acceptable at this domain's event counts.
pub async fn active_event_previews(
    db: &DatabaseConnection,
    params: &PageParams,
) -> Result<PageResponse<EventPreview>, DbErr> {
    previews_by_active_flag(db, true, params).await
}

pub async fn inactive_event_previews(
    db: &DatabaseConnection,
    params: &PageParams,
) -> Result<PageResponse<EventPreview>, DbErr> {
    previews_by_active_flag(db, false, params).await
}

async fn previews_by_active_flag(
    db: &DatabaseConnection,
    active: bool,
    params: &PageParams,
) -> Result<PageResponse<EventPreview>, DbErr> {
    let mut events = CrisisEvent::find()
        .filter(crisis_event::Column::Active.eq(active))
        .all(db)
        .await?;
    sort_by_severity_desc(&mut events);
    let previews = events.into_iter().map(EventPreview::from).collect();
    Ok(PageResponse::from_sorted(previews, params))
}

/// Active events whose radius covers the user's home or household position,
/// severity-descending.
pub async fn events_affecting_user(
    db: &DatabaseConnection,
    user: &user::Model,
    params: &PageParams,
) -> Result<PageResponse<crisis_event::Model>, DbErr> {
    let mut events = active_events_covering(db, user).await?;
    sort_by_severity_desc(&mut events);
    Ok(PageResponse::from_sorted(events, params))
}

pub async fn event_previews_affecting_user(
    db: &DatabaseConnection,
    user: &user::Model,
    params: &PageParams,
) -> Result<PageResponse<EventPreview>, DbErr> {
    let mut events = active_events_covering(db, user).await?;
    sort_by_severity_desc(&mut events);
    let previews = events.into_iter().map(EventPreview::from).collect();
    Ok(PageResponse::from_sorted(previews, params))
}

async fn active_events_covering(
    db: &DatabaseConnection,
    user: &user::Model,
) -> Result<Vec<crisis_event::Model>, DbErr> {
    let location = user_location_of(db, user).await?;
    let events = CrisisEvent::find()
        .filter(crisis_event::Column::Active.eq(true))
        .all(db)
        .await?;
    Ok(events
        .into_iter()
        .filter(|event| {
            !resolve_affected_users(
                Some(event.epicenter_latitude),
                Some(event.epicenter_longitude),
                event.radius,
                std::slice::from_ref(&location),
            )
            .is_empty()
        })
        .collect())
}

/// Name substring search filtered by active flag, severity-descending.
/// Matching is case-insensitive; a blank term yields an empty page rather
/// than matching everything.
pub async fn search_events(
    db: &DatabaseConnection,
    term: &str,
    is_active: bool,
    params: &PageParams,
) -> Result<PageResponse<crisis_event::Model>, DbErr> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(PageResponse::new(Vec::new(), params, 0));
    }

    let pattern = format!("%{}%", term.to_lowercase());
    let mut events: Vec<crisis_event::Model> = CrisisEvent::find()
        .filter(Expr::expr(Func::lower(Expr::col(crisis_event::Column::Name))).like(pattern))
        .all(db)
        .await?
        .into_iter()
        .filter(|event| event.active == is_active)
        .collect();
    sort_by_severity_desc(&mut events);
    Ok(PageResponse::from_sorted(events, params))
}

/// Change history for one event, newest first, paged at the storage layer.
/// `Ok(None)` when the event does not exist.
pub async fn event_changes(
    db: &DatabaseConnection,
    event_id: i32,
    params: &PageParams,
) -> Result<Option<PageResponse<crisis_event_change::Model>>, DbErr> {
    if CrisisEvent::find_by_id(event_id).one(db).await?.is_none() {
        return Ok(None);
    }

    let paginator = CrisisEventChange::find()
        .filter(crisis_event_change::Column::CrisisEventId.eq(event_id))
        .order_by_desc(crisis_event_change::Column::CreatedAt)
        .paginate(db, params.effective_size());
    let total = paginator.num_items().await?;
    let content = paginator.fetch_page(params.page).await?;
    Ok(Some(PageResponse::new(content, params, total)))
}

/// Snapshot of every user's stored coordinates, households joined in.
/// This is the naive full-population source the resolver scans.
pub async fn load_user_locations(db: &DatabaseConnection) -> Result<Vec<UserLocation>, DbErr> {
    let rows = User::find().find_also_related(Household).all(db).await?;
    Ok(rows
        .into_iter()
        .map(|(user, household)| UserLocation {
            user_id: user.id,
            home: coordinate_pair(user.home_latitude, user.home_longitude),
            household: household
                .and_then(|household| coordinate_pair(household.latitude, household.longitude)),
        })
        .collect())
}

async fn user_location_of(
    db: &DatabaseConnection,
    user: &user::Model,
) -> Result<UserLocation, DbErr> {
    let household: Option<household::Model> = match user.household_id {
        Some(household_id) => Household::find_by_id(household_id).one(db).await?,
        None => None,
    };
    Ok(UserLocation {
        user_id: user.id,
        home: coordinate_pair(user.home_latitude, user.home_longitude),
        household: household.and_then(|h| coordinate_pair(h.latitude, h.longitude)),
    })
}

fn coordinate_pair(latitude: Option<f64>, longitude: Option<f64>) -> Option<(f64, f64)> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some((latitude, longitude)),
        _ => None,
    }
}

fn sort_by_severity_desc(events: &mut [crisis_event::Model]) {
    // Stable sort keeps the tie-break deterministic for equal severities.
    events.sort_by_key(|event| std::cmp::Reverse(event.severity.weight()));
}

async fn insert_change<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
    change_type: ChangeType,
    old_value: Option<String>,
    new_value: Option<String>,
    acting_user_id: i32,
    at: NaiveDateTime,
) -> Result<(), DbErr> {
    crisis_event_change::ActiveModel {
        crisis_event_id: Set(event_id),
        change_type: Set(change_type),
        old_value: Set(old_value),
        new_value: Set(new_value),
        created_by_user_id: Set(acting_user_id),
        created_at: Set(at),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Post-commit fan-out: scans the population and delivers individualized
/// alerts. Errors are logged and swallowed so a delivery problem cannot fail
/// an already-committed mutation.
async fn notify_affected(db: &DatabaseConnection, event: &crisis_event::Model, template: &str) {
    let users = match load_user_locations(db).await {
        Ok(users) => users,
        Err(e) => {
            error!(event_id = event.id, "failed to load users for fan-out: {e}");
            return;
        }
    };
    let affected = resolve_affected_users(
        Some(event.epicenter_latitude),
        Some(event.epicenter_longitude),
        event.radius,
        &users,
    );
    fan_out(db, event.id, template, &affected).await;
}

/// Delivers one rendered message per affected user. Each recipient is
/// independent: a failed send is counted and logged without touching the
/// rest of the loop.
async fn fan_out(
    db: &DatabaseConnection,
    event_id: i32,
    template: &str,
    affected: &[AffectedUser],
) -> usize {
    let sends = affected.iter().map(|affected_user| {
        let message = messages::render(template, affected_user.reason.phrase());
        let user_id = affected_user.user_id;
        async move {
            match dispatcher::dispatch_crisis_alert(db, user_id, event_id, message).await {
                Ok(_) => true,
                Err(e) => {
                    error!(user_id, event_id, "failed to dispatch crisis alert: {e}");
                    metrics::counter!("crisispulse_notifications_failed_total").increment(1);
                    false
                }
            }
        }
    });

    let sent = join_all(sends).await.into_iter().filter(|ok| *ok).count();
    info!(event_id, sent, affected = affected.len(), "crisis alert fan-out complete");
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::scenario_theme;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn event(id: i32, active: bool) -> crisis_event::Model {
        crisis_event::Model {
            id,
            name: "Flood A".to_string(),
            description: Some("River rising".to_string()),
            severity: Severity::Red,
            epicenter_latitude: 63.43,
            epicenter_longitude: 10.40,
            radius: Some(5.0),
            start_time: timestamp(),
            updated_at: timestamp(),
            created_by_user_id: 7,
            active,
            scenario_theme_id: None,
        }
    }

    fn change(
        id: i32,
        change_type: ChangeType,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> crisis_event_change::Model {
        crisis_event_change::Model {
            id,
            crisis_event_id: 1,
            change_type,
            old_value: old_value.map(str::to_string),
            new_value: new_value.map(str::to_string),
            created_by_user_id: 7,
            created_at: timestamp(),
        }
    }

    fn params() -> PageParams {
        PageParams { page: 0, size: 20 }
    }

    #[tokio::test]
    async fn test_create_emits_exactly_one_creation_record() {
        let created = event(1, true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![created.clone()]])
            .append_query_results([vec![change(
                1,
                ChangeType::Creation,
                None,
                Some("Created crisis event: Flood A"),
            )]])
            // Empty user directory, so the fan-out delivers nothing.
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let input = CreateCrisisEventInput {
            name: "Flood A".to_string(),
            description: Some("River rising".to_string()),
            severity: Some(Severity::Red),
            latitude: 63.43,
            longitude: 10.40,
            radius: Some(5.0),
            start_time: timestamp(),
            scenario_theme_id: None,
        };
        let result = create_event(&db, input, 7).await.unwrap();
        assert_eq!(result.id, created.id);
        assert!(result.active);

        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(
            log.matches("INSERT INTO \\\"crisis_event_changes\\\"").count(),
            1
        );
        assert!(log.contains("Created crisis event: Flood A"));
    }

    #[tokio::test]
    async fn test_update_with_unknown_theme_is_not_found_and_writes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![event(1, true)]])
            .append_query_results([Vec::<scenario_theme::Model>::new()])
            .into_connection();

        let input = UpdateCrisisEventInput {
            name: Some("Flood B".to_string()),
            scenario_theme_id: Some(99),
            ..Default::default()
        };
        let result = update_event(&db, 1, input).await.unwrap();
        assert!(result.is_none());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("UPDATE"));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_deactivate_appends_one_level_change_and_flips_active() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![event(1, true)]])
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([vec![change(
                1,
                ChangeType::LevelChange,
                Some("active: true"),
                Some("active: false"),
            )]])
            .append_query_results([vec![event(1, false)]])
            .into_connection();

        let updated = deactivate_event(&db, 1).await.unwrap().expect("event exists");
        assert!(!updated.active);

        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(
            log.matches("INSERT INTO \\\"crisis_event_changes\\\"").count(),
            1
        );
        assert!(log.contains("active: true"));
        assert!(log.contains("active: false"));
    }

    #[tokio::test]
    async fn test_deactivate_unknown_event_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<crisis_event::Model>::new()])
            .into_connection();

        assert!(deactivate_event(&db, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_lowercases_both_sides_of_the_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![event(1, true)]])
            .into_connection();

        let page = search_events(&db, "FLOOD", true, &params()).await.unwrap();
        assert_eq!(page.content.len(), 1);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("LOWER"), "expected LOWER in: {log}");
        assert!(log.contains("%flood%"), "expected lowercased term in: {log}");
    }

    #[tokio::test]
    async fn test_blank_search_term_returns_empty_page_without_querying() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let page = search_events(&db, "   ", true, &params()).await.unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 0);
        assert!(db.into_transaction_log().is_empty());
    }
}
