pub mod crisis_event;
pub mod crisis_event_change;
pub mod household;
pub mod notification;
pub mod scenario_theme;
pub mod user;

pub use crisis_event::Entity as CrisisEvent;
pub use crisis_event_change::Entity as CrisisEventChange;
pub use household::Entity as Household;
pub use notification::Entity as Notification;
pub use scenario_theme::Entity as ScenarioTheme;
pub use user::Entity as User;
