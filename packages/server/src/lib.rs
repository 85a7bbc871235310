//! Engagement pipeline server.
//!
//! Wires the pipeline library to its real collaborators: NATS JetStream
//! for the event streams, Postgres for tasks and short links, and an
//! axum HTTP surface for the task review operations.

pub mod app;
pub mod config;
pub mod nats;
pub mod routes;
pub mod workers;

pub use app::{build_app, AppState};
pub use config::Config;
