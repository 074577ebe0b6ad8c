//! Infrastructure Layer
//!
//! Cross-cutting concerns and infrastructure components.

pub mod cleanup;
pub mod shutdown;

pub use cleanup::TemporalBlockSweeper;
pub use shutdown::{shutdown_signal, ShutdownController};
