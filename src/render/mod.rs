//! Rendering subsystem.
//!
//! # Data Flow
//! ```text
//! RequestSnapshot
//!     → model.rs (sorted projections, phase, status banner)
//!     → html.rs (escaped markup + collector script from assets.rs)
//!     → text/html response body
//! ```
//!
//! # Design Decisions
//! - The renderer holds only static assets and is shared read-only
//! - Rendering goes to a `String` first, so a failure can still become a 500

pub mod assets;
pub mod html;
pub mod model;

pub use html::{HtmlRenderer, Renderer};
pub use model::{CollectionPhase, KeyValues, RenderModel, Severity, StatusBanner};
