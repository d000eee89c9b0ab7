//! HTML response transformation.
//!
//! # Data Flow
//! ```text
//! file chunks ──▶ stream.rs (InjectingStream, pull-driven)
//!                     │
//!                     ▼
//!                 injector.rs (buffer + injected flag, one per response)
//!                     │
//!                     ▼
//!                 chunks with snippet.rs spliced in before </body>
//! ```
//!
//! # Design Decisions
//! - One `Injector` per response; no shared state between requests
//! - Exactly one snippet per stream, appended at EOF if `</body>` never shows
//! - Memory bounded by the high-water mark, not the document size

pub mod injector;
pub mod snippet;
pub mod stream;

pub use injector::{Injector, MARKER};
pub use snippet::{Snippet, RELOAD_MESSAGE};
pub use stream::InjectingStream;
