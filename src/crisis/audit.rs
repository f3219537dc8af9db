//! Field-level diffing of crisis events into audit records.
//!
//! Each changed field becomes exactly one change record with human-readable
//! old/new values; there is no composite diff. Two entry points exist because
//! the update endpoint has two modes: partial updates suppress no-op fields,
//! full-field updates record every field against the pre-update snapshot
//! whether or not it actually differs.

use crate::entities::crisis_event::{self, Severity};
use crate::entities::crisis_event_change::ChangeType;

/// Coordinates within this absolute tolerance are considered equal, so float
/// round-trips through storage do not produce phantom audit records.
pub const COORDINATE_EPSILON: f64 = 0.00001;

/// The mutable fields of a crisis event, captured before and after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSnapshot {
    pub name: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub epicenter_latitude: f64,
    pub epicenter_longitude: f64,
    /// Kilometers.
    pub radius: Option<f64>,
    pub active: bool,
}

impl From<&crisis_event::Model> for EventSnapshot {
    fn from(event: &crisis_event::Model) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            severity: event.severity,
            epicenter_latitude: event.epicenter_latitude,
            epicenter_longitude: event.epicenter_longitude,
            radius: event.radius,
            active: event.active,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub change_type: ChangeType,
    pub old_value: String,
    pub new_value: String,
}

pub fn coordinate_changed(old: f64, new: f64) -> bool {
    (new - old).abs() > COORDINATE_EPSILON
}

fn fmt_text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("null")
}

fn fmt_radius(value: Option<f64>) -> String {
    match value {
        Some(radius) => radius.to_string(),
        None => "null".to_string(),
    }
}

fn name_change(old: &EventSnapshot, new: &EventSnapshot) -> FieldChange {
    FieldChange {
        change_type: ChangeType::DescriptionUpdate,
        old_value: format!("name: {}", old.name),
        new_value: format!("name: {}", new.name),
    }
}

fn description_change(old: &EventSnapshot, new: &EventSnapshot) -> FieldChange {
    FieldChange {
        change_type: ChangeType::DescriptionUpdate,
        old_value: format!("description: {}", fmt_text(&old.description)),
        new_value: format!("description: {}", fmt_text(&new.description)),
    }
}

fn severity_change(old: &EventSnapshot, new: &EventSnapshot) -> FieldChange {
    FieldChange {
        change_type: ChangeType::LevelChange,
        old_value: format!("severity: {}", old.severity.as_str()),
        new_value: format!("severity: {}", new.severity.as_str()),
    }
}

fn location_change(old: &EventSnapshot, new: &EventSnapshot) -> FieldChange {
    FieldChange {
        change_type: ChangeType::EpicenterMoved,
        old_value: format!(
            "location: [{}, {}]",
            old.epicenter_latitude, old.epicenter_longitude
        ),
        new_value: format!(
            "location: [{}, {}]",
            new.epicenter_latitude, new.epicenter_longitude
        ),
    }
}

fn radius_change(old: &EventSnapshot, new: &EventSnapshot) -> FieldChange {
    FieldChange {
        change_type: ChangeType::EpicenterMoved,
        old_value: format!("radius: {}", fmt_radius(old.radius)),
        new_value: format!("radius: {}", fmt_radius(new.radius)),
    }
}

/// Diff for partial updates: one record per field that actually changed.
/// Nulls count as distinct from any concrete value; coordinates compare with
/// [`COORDINATE_EPSILON`].
pub fn diff_events(old: &EventSnapshot, new: &EventSnapshot) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if old.name != new.name {
        changes.push(name_change(old, new));
    }
    if old.description != new.description {
        changes.push(description_change(old, new));
    }
    if old.severity != new.severity {
        changes.push(severity_change(old, new));
    }
    if coordinate_changed(old.epicenter_latitude, new.epicenter_latitude)
        || coordinate_changed(old.epicenter_longitude, new.epicenter_longitude)
    {
        changes.push(location_change(old, new));
    }
    if old.radius != new.radius {
        changes.push(radius_change(old, new));
    }

    changes
}

/// Records for a full-field update: all five field records (name, description,
/// severity, location, radius) against the pre-update snapshot, with no no-op
/// suppression.
pub fn full_update_changes(old: &EventSnapshot, new: &EventSnapshot) -> Vec<FieldChange> {
    vec![
        name_change(old, new),
        description_change(old, new),
        severity_change(old, new),
        location_change(old, new),
        radius_change(old, new),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> EventSnapshot {
        EventSnapshot {
            name: "Flood A".to_string(),
            description: Some("River rising".to_string()),
            severity: Severity::Red,
            epicenter_latitude: 63.43,
            epicenter_longitude: 10.40,
            radius: Some(5.0),
            active: true,
        }
    }

    #[test]
    fn test_no_changes_yields_no_records() {
        let old = snapshot();
        let new = snapshot();
        assert!(diff_events(&old, &new).is_empty());
    }

    #[test]
    fn test_description_only_change() {
        let old = snapshot();
        let mut new = snapshot();
        new.description = Some("River receding".to_string());

        let changes = diff_events(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeType::DescriptionUpdate);
        assert_eq!(changes[0].old_value, "description: River rising");
        assert_eq!(changes[0].new_value, "description: River receding");
    }

    #[test]
    fn test_null_description_renders_as_null() {
        let mut old = snapshot();
        old.description = None;
        let new = snapshot();

        let changes = diff_events(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].old_value, "description: null");
    }

    #[test]
    fn test_severity_change_is_level_change() {
        let old = snapshot();
        let mut new = snapshot();
        new.severity = Severity::Yellow;

        let changes = diff_events(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeType::LevelChange);
        assert_eq!(changes[0].old_value, "severity: red");
        assert_eq!(changes[0].new_value, "severity: yellow");
    }

    #[test]
    fn test_coordinate_jitter_below_epsilon_is_ignored() {
        let old = snapshot();
        let mut new = snapshot();
        new.epicenter_latitude += 0.000001;
        assert!(diff_events(&old, &new).is_empty());
    }

    #[test]
    fn test_epicenter_move_emits_single_location_record() {
        let old = snapshot();
        let mut new = snapshot();
        new.epicenter_latitude = 63.50;
        new.epicenter_longitude = 10.50;

        let changes = diff_events(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeType::EpicenterMoved);
        assert_eq!(changes[0].old_value, "location: [63.43, 10.4]");
        assert_eq!(changes[0].new_value, "location: [63.5, 10.5]");
    }

    #[test]
    fn test_radius_set_from_null() {
        let mut old = snapshot();
        old.radius = None;
        let new = snapshot();

        let changes = diff_events(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeType::EpicenterMoved);
        assert_eq!(changes[0].old_value, "radius: null");
        assert_eq!(changes[0].new_value, "radius: 5");
    }

    #[test]
    fn test_simultaneous_changes_emit_independent_records() {
        let old = snapshot();
        let mut new = snapshot();
        new.name = "Flood B".to_string();
        new.severity = Severity::Green;
        new.radius = Some(8.0);

        let changes = diff_events(&old, &new);
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn test_full_update_always_emits_five_records() {
        let old = snapshot();
        let new = snapshot();

        let changes = full_update_changes(&old, &new);
        assert_eq!(changes.len(), 5);
        // Unchanged values are still recorded verbatim.
        assert_eq!(changes[0].old_value, changes[0].new_value);
    }
}
