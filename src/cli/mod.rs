//! # CLI Module
//!
//! User-facing commands. Each command builds a [`TokenManager`] over the
//! on-disk session store (see [`session`]), delegates to the Spotify client and
//! receipt loader, and turns the result into terminal output.
//!
//! ## Commands
//!
//! - [`auth`] - interactive OAuth login through the local callback server
//! - [`logout`] - forget the stored credential
//! - [`status`] - show the session state and token expiry
//! - [`receipt`] - load and print a listening receipt
//! - [`playlist`] - save the top tracks as a private playlist
//!
//! ## Failure reporting
//!
//! Session failures have already cleared the stored credential by the time
//! they reach this layer, so the user is sent back to `receiptify auth`.
//! Anything else is reported as a failed load that can simply be retried.
//!
//! ```bash
//! receiptify auth
//! receiptify receipt --metric top-tracks --range short-term --limit 10
//! receiptify receipt --metric stats --watch 60
//! receiptify playlist --range long-term --name "All Time Favorites"
//! ```
//!
//! [`TokenManager`]: crate::management::TokenManager

mod auth;
mod playlist;
mod receipt;
pub mod session;

pub use auth::auth;
pub use auth::logout;
pub use auth::status;
pub use playlist::playlist;
pub use receipt::receipt;
pub use receipt::render_receipt;

use crate::{error, error::Error};

/// Prints a failed command's error and exits with status 1.
pub(crate) fn report_failure(err: &Error) -> ! {
    if err.is_session_failure() {
        error!("Session expired. Please run receiptify auth. ({})", err);
    } else {
        error!("Failed to load data. Please try again. Err: {}", err);
    }
}
