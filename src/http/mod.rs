//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, serve loop)
//!     → access_log.rs (timing, log line, metrics)
//!     → handlers.rs (route → phase, snapshot capture, render)
//!     → text/html or plaintext error response
//! ```

pub mod access_log;
pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
