//! KidMap navigation server.
//!
//! Plans routes between places a child cares about, caches them per travel
//! mode, and keeps favorites, recent searches and preferences across
//! restarts.

pub mod config;
pub mod directions;
pub mod domain;
pub mod query;
pub mod routing;
pub mod store;
pub mod web;
