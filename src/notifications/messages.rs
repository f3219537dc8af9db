//! Notification text for crisis events.
//!
//! Every template carries a `{reason}` placeholder that is substituted
//! per-recipient with the Affected-User Resolver's phrasing, so one rendered
//! template fans out to many users with individualized wording.

use chrono::NaiveDateTime;

use crate::crisis::audit::{coordinate_changed, EventSnapshot};
use crate::entities::crisis_event::Severity;

pub const REASON_PLACEHOLDER: &str = "{reason}";

const MAX_DESCRIPTION_CHARS: usize = 100;

/// Substitutes the per-recipient reason clause into a rendered template.
pub fn render(template: &str, reason: &str) -> String {
    template.replace(REASON_PLACEHOLDER, reason)
}

/// Alert wording for the severity ladder.
pub fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Red => "high",
        Severity::Yellow => "medium",
        Severity::Green => "low",
    }
}

fn format_start_time(start_time: NaiveDateTime) -> String {
    start_time.format("%d.%m.%Y %H:%M").to_string()
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_CHARS {
        return description.to_string();
    }
    let truncated: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
    format!("{truncated}...")
}

/// Template announcing a newly created crisis event.
pub fn new_event_template(event: &EventSnapshot, start_time: NaiveDateTime) -> String {
    let mut message = format!(
        "🚨 Crisis alert: '{}' ({} severity). You are being notified because {{reason}} is within the danger zone",
        event.name,
        severity_label(event.severity)
    );

    if let Some(description) = event.description.as_deref() {
        if !description.trim().is_empty() {
            message.push_str(". Description: ");
            message.push_str(&truncate_description(description));
        }
    }

    message.push_str(&format!(". Started {}.", format_start_time(start_time)));
    message
}

/// Template summarizing an update, one short clause per changed field
/// category. Returns `None` when no watched field differs, which suppresses
/// the whole fan-out.
pub fn update_template(new: &EventSnapshot, old: &EventSnapshot) -> Option<String> {
    let mut changes = String::new();

    if new.name != old.name {
        changes.push_str(&format!("Name changed to '{}'. ", new.name));
    }
    if new.description != old.description {
        changes.push_str("Description updated. ");
    }
    if new.severity != old.severity {
        changes.push_str(&format!(
            "Severity changed to {}. ",
            severity_label(new.severity)
        ));
    }
    if coordinate_changed(old.epicenter_latitude, new.epicenter_latitude)
        || coordinate_changed(old.epicenter_longitude, new.epicenter_longitude)
    {
        changes.push_str("Position updated. ");
    }
    if new.radius != old.radius {
        match new.radius {
            Some(radius) => changes.push_str(&format!("Radius changed to {radius} km. ")),
            None => changes.push_str("Radius removed. "),
        }
    }
    if new.active != old.active {
        changes.push_str(if new.active {
            "The event is active again. "
        } else {
            "The event is now marked as inactive. "
        });
    }

    if changes.is_empty() {
        return None;
    }

    Some(format!(
        "🔄 Update for '{}': {}You are being notified because {{reason}} is within the affected area.",
        new.name, changes
    ))
}

/// Fixed deactivation notice, still individualized by the reason clause.
pub fn deactivation_template(event_name: &str) -> String {
    format!(
        "Crisis event '{event_name}' has been deactivated and is no longer considered a danger. You were notified because {{reason}} was within the affected area."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

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

    fn start_time() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 29)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_new_event_template_contains_severity_and_reason_placeholder() {
        let message = new_event_template(&snapshot(), start_time());
        assert!(message.contains("'Flood A' (high severity)"));
        assert!(message.contains("{reason}"));
        assert!(message.contains("Description: River rising"));
        assert!(message.ends_with("Started 29.08.2026 10:30."));
    }

    #[test]
    fn test_new_event_template_skips_blank_description() {
        let mut event = snapshot();
        event.description = Some("   ".to_string());
        let message = new_event_template(&event, start_time());
        assert!(!message.contains("Description:"));
    }

    #[test]
    fn test_long_description_is_truncated_with_ellipsis() {
        let mut event = snapshot();
        event.description = Some("x".repeat(150));
        let message = new_event_template(&event, start_time());
        let expected = format!("{}...", "x".repeat(100));
        assert!(message.contains(&expected));
        assert!(!message.contains(&"x".repeat(101)));
    }

    #[test]
    fn test_severity_labels() {
        assert_eq!(severity_label(Severity::Red), "high");
        assert_eq!(severity_label(Severity::Yellow), "medium");
        assert_eq!(severity_label(Severity::Green), "low");
    }

    #[test]
    fn test_render_substitutes_reason() {
        let rendered = render("Alert because {reason} is nearby.", "your position");
        assert_eq!(rendered, "Alert because your position is nearby.");
    }

    #[test]
    fn test_update_template_none_when_nothing_changed() {
        assert_eq!(update_template(&snapshot(), &snapshot()), None);
    }

    #[test]
    fn test_update_template_lists_changed_fields() {
        let old = snapshot();
        let mut new = snapshot();
        new.severity = Severity::Yellow;
        new.radius = Some(8.0);

        let message = update_template(&new, &old).expect("changes should produce a template");
        assert!(message.contains("Severity changed to medium. "));
        assert!(message.contains("Radius changed to 8 km. "));
        assert!(!message.contains("Name changed"));
        assert!(message.contains("{reason}"));
    }

    #[test]
    fn test_update_template_reports_deactivation_clause() {
        let old = snapshot();
        let mut new = snapshot();
        new.active = false;

        let message = update_template(&new, &old).expect("active flip is a watched change");
        assert!(message.contains("The event is now marked as inactive. "));
    }

    #[test]
    fn test_update_template_ignores_coordinate_jitter() {
        let old = snapshot();
        let mut new = snapshot();
        new.epicenter_longitude += 0.000001;
        assert_eq!(update_template(&new, &old), None);
    }

    #[test]
    fn test_deactivation_template_keeps_reason_placeholder() {
        let message = deactivation_template("Flood A");
        assert!(message.contains("'Flood A'"));
        assert!(message.contains("{reason}"));
    }
}
