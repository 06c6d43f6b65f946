//! Configured camera angles.

use serde::{Deserialize, Serialize};

use crate::slug::slug_from_filename;

/// One configured angle as it appears in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraFile {
    pub label: String,
    pub filename: String,
}

impl CameraFile {
    pub fn new(label: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            filename: filename.into(),
        }
    }
}

/// A camera with its derived identifier. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Camera {
    name: String,
    filename: String,
    slug: String,
}

impl Camera {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            name: name.into(),
            slug: slug_from_filename(&filename),
            filename,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

impl From<&CameraFile> for Camera {
    fn from(file: &CameraFile) -> Self {
        Self::new(file.label.clone(), file.filename.clone())
    }
}

/// Build the session's camera list, preserving configuration order.
#[must_use]
pub fn build_camera_list(files: &[CameraFile]) -> Vec<Camera> {
    files.iter().map(Camera::from).collect()
}

/// The eight mat-side angles shipped by default.
#[must_use]
pub fn default_camera_files() -> Vec<CameraFile> {
    let mut files = vec![CameraFile::new("Câmera 1 · Teto", "Cam1 (teto).mp4")];
    files.extend((2..=8).map(|n| CameraFile::new(format!("Câmera {n}"), format!("Cam{n}.mp4"))));
    files
}
