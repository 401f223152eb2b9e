//! Interactive crop/pan/zoom editor.
//!
//! The pure core ([`geometry`], [`clamp`], [`zoom`], [`interaction`],
//! [`export`]) is driven through [`session::CropSession`]; [`app`] is the
//! eframe shell on top of it.

pub mod app;
pub mod aspect;
pub mod clamp;
pub mod config;
pub mod export;
pub mod geometry;
pub mod handle;
pub mod interaction;
pub mod session;
pub mod source;
pub mod zoom;

pub use clamp::CropConstraints;
pub use geometry::{ImageSpec, Transform, ViewportSpec};
pub use handle::{DragMode, ResizeHandle};
pub use interaction::PointerCapture;
pub use session::CropSession;
