//! # Docent Gateway
//! Thin HTTP surface over the assistant engine: chat, health, and
//! knowledge administration. The transport maps the engine's structured
//! results onto JSON and status codes; all pipeline logic lives below.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
