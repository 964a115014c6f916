/// Health check handler.
pub mod health;
/// User account endpoints.
pub mod users;
