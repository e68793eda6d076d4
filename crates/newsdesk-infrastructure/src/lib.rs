//! Newsdesk infrastructure: production implementations of the seams
//! declared in `newsdesk-core`.
//!
//! - [`HttpCmsClient`] talks to the remote CMS over HTTP (reqwest).
//! - [`FileSnapshotRepository`] persists the session snapshot to the
//!   platform config directory.

pub mod http_client;
pub mod paths;
pub mod snapshot_repository;

pub use http_client::HttpCmsClient;
pub use paths::NewsdeskPaths;
pub use snapshot_repository::FileSnapshotRepository;
