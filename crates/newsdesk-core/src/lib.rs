//! Newsdesk core: the state layer of an editorial dashboard backed by a
//! remote CMS.
//!
//! Three cooperating state containers, constructed once per application
//! session and shared via `Arc`:
//!
//! - [`session::SessionStore`] owns the authenticated identity, bearer
//!   token, inactivity lock and publication permissions.
//! - [`login::LoginStore`] drives the two-factor login handshake and hands
//!   the verified user to the session store.
//! - [`content::ContentStore`] caches publications, categories, authors and
//!   articles and submits create/update requests.
//!
//! The remote CMS is reached through the [`api::CmsApi`] trait and the
//! persisted session snapshot through [`session::SnapshotRepository`];
//! production implementations of both live in `newsdesk-infrastructure`.

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod login;
pub mod session;

// Re-export common error type
pub use error::{NewsdeskError, Result};
