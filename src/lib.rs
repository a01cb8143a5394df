//! HTTP Reflector Library
//!
//! Shows a client everything the server can observe about its request,
//! then enriches the page with metadata posted back by the browser.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET/any /                        POST /collect (JSON from the page script)
//!      │                                  │
//!      ▼                                  ▼
//!  ┌────────┐   ┌────────────┐   ┌─────────────────┐   ┌────────┐
//!  │  http  │──▶│ reflection │──▶│ render::model   │──▶│ render │──▶ text/html
//!  │handlers│   │  snapshot  │   │ phase + banner  │   │  html  │
//!  └────────┘   └────────────┘   └─────────────────┘   └────────┘
//!      ▲
//!      │ TlsSession extension (net::tls), ConnectInfo peer address
//! ```
//!
//! Forwarding headers are reflected as sent. Nothing here is suitable for
//! access-control decisions.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod reflection;
pub mod render;

pub use config::ReflectorConfig;
pub use error::ReflectError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
