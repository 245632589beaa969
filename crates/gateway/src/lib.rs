//! HTTP gateway: `/generate` streaming relay, voice listing, health.

pub mod server;
pub mod speech_routes;

pub use server::{AppState, build_gateway_app, build_relay, start_gateway};
