//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plain: axum::serve hands the stream to the router
//!     → TLS:   tls.rs (rustls handshake, TlsSession capture)
//!              → router with the session attached to each request
//! ```
//!
//! # Design Decisions
//! - TLS is optional and terminated in-process
//! - Session parameters travel as a request extension, never as headers

pub mod tls;

pub use tls::{load_tls_config, TlsInfoAcceptor};
