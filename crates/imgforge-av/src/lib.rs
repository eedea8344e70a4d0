//! # imgforge-av
//!
//! Image conversion primitives for imgforge.
//!
//! This crate provides:
//! - Image format descriptors and extension matching
//! - External tool detection and subprocess execution with timeouts
//! - Staging workspaces with atomic finalization
//! - Conversion backends (native `sips`, in-process `image` library) and
//!   capability-based backend selection
//!
//! ## Features
//!
//! - `heif` - Decode HEIC/HEIF in-process through libheif
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use imgforge_av::{select_backend, BackendKind, ImageFormat};
//! use std::time::Duration;
//!
//! let backend = select_backend(
//!     BackendKind::Auto,
//!     ImageFormat::Heic,
//!     ImageFormat::Png,
//!     Duration::from_secs(60),
//! )?;
//! backend.convert("photo.heic".as_ref(), "photo.png".as_ref(), ImageFormat::Png)?;
//! # Ok::<(), imgforge_av::Error>(())
//! ```

pub mod backend;
pub mod command;
mod error;
pub mod format;
pub mod tools;
pub mod workspace;

// Re-exports
pub use backend::{select_backend, BackendKind, ConversionBackend, ImageLibraryBackend, SipsBackend};
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use format::ImageFormat;
pub use tools::{check_tool, check_tools, require_tool, ToolInfo};
pub use workspace::Workspace;
