//! Web layer for the KidMap route core.
//!
//! JSON endpoints the mobile client uses for route queries, favorites,
//! recent searches and preferences.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
