//! Route service.
//!
//! Turns a directions provider's baseline routes into candidates for each
//! travel mode: walking is slower than the baseline, biking and driving are
//! faster, and every route id carries its mode's prefix.

mod service;

pub use service::RouteService;
