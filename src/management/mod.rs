mod auth;
mod receipt;
mod state;
mod store;

pub use auth::Clock;
pub use auth::REFRESH_MARGIN_MS;
pub use auth::SystemClock;
pub use auth::TokenManager;
pub use receipt::ReceiptLoader;
pub use state::LoadTicket;
pub use state::LoadTracker;
pub use state::ReceiptView;
pub use state::SessionState;
pub use store::ACCESS_TOKEN_KEY;
pub use store::EXPIRATION_KEY;
pub use store::FileSessionStore;
pub use store::MemorySessionStore;
pub use store::REFRESH_TOKEN_KEY;
pub use store::SessionStore;
pub use store::TokenStore;
