//! Severity subsystem.
//!
//! # Data Flow
//! ```text
//! event tags ["info", "error", "debug"]
//!     → map.rs (tag → Severity, defaults + overrides)
//!     → most severe mapped entry, else default level
//!     → severity.rs (threshold check by rank)
//! ```
//!
//! # Design Decisions
//! - Severity set is closed and ranked at compile time
//! - Overrides distinguish "unset" from "not present"
//! - Unknown tags are skipped, never an error

pub mod map;
pub mod severity;

pub use map::{LevelMap, LevelOverride, DEFAULT_LEVEL_MAP};
pub use severity::{LogMethod, Severity, UnknownLevel};
