//! HTTP API over a single shared session.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
