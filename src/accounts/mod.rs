//! Account workflows.
//!
//! - [`validation`] turns raw profile forms into validated registrations and
//!   partial updates
//! - [`service`] runs registration, login, profile update, deletion and reads

pub mod service;
pub mod validation;

pub use service::{AccountService, IssuedToken};
pub use validation::{ProfileChanges, ProfileForm, Registration};
