pub mod api;
pub mod crisis;
pub mod entities;
pub mod geo;
pub mod metrics;
pub mod migrator;
pub mod notifications;
pub mod paging;
pub mod telemetry;

pub use sea_orm;
