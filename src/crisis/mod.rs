pub mod audit;
pub mod lifecycle;
pub mod resolver;
