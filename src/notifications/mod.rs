pub mod dispatcher;
pub mod messages;
