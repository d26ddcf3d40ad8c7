//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware fills them from
//! its embedded `device.toml`; every field has a working default.

pub mod hardware;
pub mod toml;
pub mod topics;
pub mod types;

pub use hardware::*;
pub use topics::Topics;
pub use toml::{parse_config, ConfigFile, ParseError, ParseErrorKind};
pub use types::*;
