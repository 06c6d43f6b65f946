//! URL conventions for direct files, previews and HLS manifests.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::{
    camera::Camera,
    error::{SourceError, SourceResult},
    slug::{preview_filename, slug_from_filename},
};

/// Directory holding the camera assets under the media origin.
pub const CAMERAS_DIR: &str = "available_cameras";

/// Quality variant used for thumbnail-grade playback.
pub const DEFAULT_PREVIEW_VARIANT: &str = "480p";

/// Characters left untouched by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Every URL a single camera needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraSources {
    pub direct: Url,
    pub preview: Url,
    pub hls_master: Url,
    pub hls_preview: Url,
}

/// Maps camera filenames to playable URLs below a `{base}` location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceResolver {
    base: String,
    preview_variant: String,
}

impl SourceResolver {
    /// Resolver rooted at `base`. A trailing `/` is ignored.
    pub fn new(base: &Url) -> SourceResult<Self> {
        if base.cannot_be_a_base() {
            return Err(SourceError::CannotBeABase(base.to_string()));
        }
        Ok(Self {
            base: base.as_str().trim_end_matches('/').to_owned(),
            preview_variant: DEFAULT_PREVIEW_VARIANT.to_owned(),
        })
    }

    /// Parse `base` and build a resolver from it.
    pub fn parse(base: &str) -> SourceResult<Self> {
        let url = Url::parse(base.trim()).map_err(|e| SourceError::InvalidBase(e.to_string()))?;
        Self::new(&url)
    }

    /// Assets served by the application itself, `{origin}/available_cameras`.
    pub fn local(origin: &Url) -> SourceResult<Self> {
        let origin = origin.as_str().trim_end_matches('/');
        Self::parse(&format!("{origin}/{CAMERAS_DIR}"))
    }

    /// Assets in an S3 bucket, `https://{bucket}.s3.{region}.amazonaws.com/available_cameras`.
    pub fn s3(bucket: &str, region: &str) -> SourceResult<Self> {
        Self::parse(&format!(
            "https://{bucket}.s3.{region}.amazonaws.com/{CAMERAS_DIR}"
        ))
    }

    /// Override the variant used by [`Self::hls_preview_src`].
    #[must_use]
    pub fn with_preview_variant(mut self, variant: impl Into<String>) -> Self {
        self.preview_variant = variant.into();
        self
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn preview_variant(&self) -> &str {
        &self.preview_variant
    }

    /// `{base}/{url-encoded filename}`
    pub fn video_src(&self, filename: &str) -> SourceResult<Url> {
        let encoded = utf8_percent_encode(filename, COMPONENT);
        self.join(&format!("{}/{encoded}", self.base))
    }

    /// Direct URL of the `.preview` asset for `filename`.
    pub fn preview_src(&self, filename: &str) -> SourceResult<Url> {
        self.video_src(&preview_filename(filename))
    }

    /// `{base}/hls/{slug}/master.m3u8`
    pub fn hls_master_src(&self, filename: &str) -> SourceResult<Url> {
        let slug = slug_from_filename(filename);
        self.join(&format!("{}/hls/{slug}/master.m3u8", self.base))
    }

    /// `{base}/hls/{slug}/{slug}_{variant}.m3u8`
    pub fn hls_variant_src(&self, filename: &str, variant: &str) -> SourceResult<Url> {
        let slug = slug_from_filename(filename);
        self.join(&format!("{}/hls/{slug}/{slug}_{variant}.m3u8", self.base))
    }

    /// Variant manifest at the configured preview quality.
    pub fn hls_preview_src(&self, filename: &str) -> SourceResult<Url> {
        self.hls_variant_src(filename, &self.preview_variant)
    }

    /// All sources of `camera` at once.
    pub fn sources_for(&self, camera: &Camera) -> SourceResult<CameraSources> {
        let filename = camera.filename();
        Ok(CameraSources {
            direct: self.video_src(filename)?,
            preview: self.preview_src(filename)?,
            hls_master: self.hls_master_src(filename)?,
            hls_preview: self.hls_preview_src(filename)?,
        })
    }

    fn join(&self, input: &str) -> SourceResult<Url> {
        Url::parse(input).map_err(|e| SourceError::Join {
            input: input.to_owned(),
            reason: e.to_string(),
        })
    }
}
