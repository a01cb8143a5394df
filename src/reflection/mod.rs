//! Request reflection subsystem.
//!
//! # Data Flow
//! ```text
//! Request<Body> (+ ConnectInfo, + TlsSession from the TLS acceptor)
//!     → extract.rs (scheme, client IP/port, header/query/cookie copies)
//!     → tls.rs (numeric codes → standard names)
//!     → snapshot.rs (bounded body read, RequestSnapshot assembly)
//!     → render subsystem
//! ```
//!
//! # Design Decisions
//! - Snapshots are built fresh per request and never shared
//! - Header and query maps are `BTreeMap`, so iteration is sorted
//! - The body is read once, never past the capture limit

pub mod extract;
pub mod snapshot;
pub mod tls;

pub use extract::{CookiePair, MultiMap};
pub use snapshot::{ClientData, RequestSnapshot};
pub use tls::{TlsSession, TlsSummary};
