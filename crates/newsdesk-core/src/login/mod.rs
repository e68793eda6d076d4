//! Two-factor login flow: email/password, emailed code, session handoff.

pub mod model;
pub mod store;

pub use model::{LoginFlow, LoginOutcome, LoginStep};
pub use store::LoginStore;
