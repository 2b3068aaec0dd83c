//! Session facade for revisekit.
//!
//! Sends text to the analysis and optimization services and commits their
//! results into a [`revisekit_engine::RevisionEngine`], one request of each
//! kind at a time.

pub mod services;
pub mod session;
pub mod wire;

pub use services::*;
pub use session::*;
