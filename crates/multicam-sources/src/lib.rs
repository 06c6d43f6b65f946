#![forbid(unsafe_code)]

//! Camera configuration and media source resolution.
//!
//! Everything in this crate is pure: a camera's stable filename is mapped to
//! the direct file URL, the preview thumbnail URL and the adaptive-stream
//! manifest URLs. The `{base}` location is supplied by the caller.

mod camera;
mod error;
mod resolver;
mod slug;

pub use camera::{Camera, CameraFile, build_camera_list, default_camera_files};
pub use error::{SourceError, SourceResult};
pub use resolver::{CAMERAS_DIR, CameraSources, DEFAULT_PREVIEW_VARIANT, SourceResolver};
pub use slug::{preview_filename, slug_from_filename};
