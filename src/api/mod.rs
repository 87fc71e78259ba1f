//! # API Module
//!
//! HTTP endpoints served by the local callback server during `receiptify auth`.
//!
//! - [`callback`] - receives Spotify's redirect, checks the `state`
//!   parameter and exchanges the authorization code for a credential.
//! - [`health`] - liveness probe returning status and version.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use receiptify::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
