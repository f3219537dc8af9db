pub mod auth;
pub mod crisis_events;
pub mod middleware;
pub mod notifications;
