use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage, RgbaImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wardrobe_common::{Category, RenditionVariant, Result, WardrobeError};

use crate::paths::{StaticRoot, strip_static_prefix};

/// Sub-tree mirroring the category layout for transparent renditions
pub const TRANSPARENT_DIR: &str = "transparent";

/// Same default as most JPEG writers
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Identity of a rendition pair; both files are addressed from it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RenditionId {
    pub uuid: String,
    pub category: Category,
}

impl RenditionId {
    pub fn new(uuid: impl Into<String>, category: Category) -> Self {
        Self {
            uuid: uuid.into(),
            category,
        }
    }

    /// Fresh identifier with a random, hyphen-less v4 uuid
    pub fn generate(category: Category) -> Self {
        Self::new(Uuid::new_v4().simple().to_string(), category)
    }

    /// Parse `/static/<category>/<uuid>_processed.jpg`
    pub fn from_opaque_url(url: &str) -> Result<Self> {
        let malformed =
            || WardrobeError::validation("image_url", format!("'{}' is not an opaque rendition url", url));

        let relative = strip_static_prefix(url).ok_or_else(malformed)?;
        let (category, file) = relative.split_once('/').ok_or_else(malformed)?;
        let uuid = file
            .strip_suffix(RenditionVariant::Opaque.file_suffix())
            .filter(|uuid| !uuid.is_empty() && !uuid.contains('/'))
            .ok_or_else(malformed)?;

        let parsed = Category::from_label(category)?;
        if parsed.as_str() != category {
            return Err(malformed());
        }
        Ok(Self::new(uuid, parsed))
    }

    /// `/`-separated location relative to the store root
    pub fn relative_path(&self, variant: RenditionVariant) -> String {
        let file = format!("{}{}", self.uuid, variant.file_suffix());
        match variant {
            RenditionVariant::Opaque => format!("{}/{}", self.category, file),
            RenditionVariant::Transparent => format!("{}/{}/{}", TRANSPARENT_DIR, self.category, file),
        }
    }

    pub fn url(&self, variant: RenditionVariant) -> String {
        format!("/static/{}", self.relative_path(variant))
    }
}

/// Explicit record linking an opaque rendition to its transparent twin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenditionPair {
    pub id: RenditionId,
    pub opaque_url: String,
    pub transparent_url: String,
}

impl From<RenditionId> for RenditionPair {
    fn from(id: RenditionId) -> Self {
        Self {
            opaque_url: id.url(RenditionVariant::Opaque),
            transparent_url: id.url(RenditionVariant::Transparent),
            id,
        }
    }
}

/// Outcome of deleting a rendition by its opaque url
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedRendition {
    pub opaque_url: String,
    /// Set when the transparent twin was found and removed
    pub transparent_url: Option<String>,
}

/// Transparent twin of a `..._processed.jpg` url, for callers holding only a
/// url (possibly absolute, e.g. `http://host/static/...`). Store operations go
/// through [`RenditionId`] instead.
///
/// Returns `None` when the url does not carry the `_processed.jpg` marker or
/// lives outside `/static/`.
pub fn derive_transparent_url(opaque_url: &str) -> Option<String> {
    let stem = opaque_url.strip_suffix(RenditionVariant::Opaque.file_suffix())?;
    if !stem.contains("/static/") {
        return None;
    }
    let stem = stem.replacen("/static/", &format!("/static/{}/", TRANSPARENT_DIR), 1);
    Some(format!("{}{}", stem, RenditionVariant::Transparent.file_suffix()))
}

/// Filesystem layout of the rendition files
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: StaticRoot,
    jpeg_quality: u8,
}

impl AssetStore {
    pub fn new(root: StaticRoot) -> Self {
        Self {
            root,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn root(&self) -> &StaticRoot {
        &self.root
    }

    pub fn path_of(&self, id: &RenditionId, variant: RenditionVariant) -> PathBuf {
        let mut path = self.root.path().to_path_buf();
        path.extend(id.relative_path(variant).split('/'));
        path
    }

    /// Write both renditions into their category directories
    pub fn place(&self, id: &RenditionId, opaque: &RgbImage, transparent: &RgbaImage) -> Result<RenditionPair> {
        let opaque_path = self.path_of(id, RenditionVariant::Opaque);
        let transparent_path = self.path_of(id, RenditionVariant::Transparent);

        for path in [&opaque_path, &transparent_path] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        if let Err(e) = self.write_jpeg(&opaque_path, opaque) {
            let _ = fs::remove_file(&opaque_path);
            return Err(e);
        }
        if let Err(e) = transparent
            .save_with_format(&transparent_path, ImageFormat::Png)
            .map_err(|e| WardrobeError::Encode(e.to_string()))
        {
            // Never leave half a pair behind on failure
            let _ = fs::remove_file(&opaque_path);
            return Err(e);
        }

        info!(uuid = %id.uuid, category = %id.category, "renditions placed");
        Ok(RenditionPair::from(id.clone()))
    }

    fn write_jpeg(&self, path: &Path, image: &RgbImage) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let encoder = JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality);
        image
            .write_with_encoder(encoder)
            .map_err(|e| WardrobeError::Encode(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    /// Remove an opaque rendition and, best-effort, its transparent twin.
    ///
    /// Only `/static/<category>/<uuid>_processed.jpg` urls are accepted; anything
    /// else under the root is a validation error and is left untouched.
    pub fn delete(&self, opaque_url: &str) -> Result<DeletedRendition> {
        let id = RenditionId::from_opaque_url(opaque_url)?;
        let opaque_path = self.path_of(&id, RenditionVariant::Opaque);
        if !opaque_path.is_file() {
            return Err(WardrobeError::not_found(opaque_path));
        }
        fs::remove_file(&opaque_path)?;
        debug!(path = %opaque_path.display(), "opaque rendition removed");

        let twin = self.path_of(&id, RenditionVariant::Transparent);
        let transparent_url = match fs::remove_file(&twin) {
            Ok(()) => Some(id.url(RenditionVariant::Transparent)),
            Err(e) => {
                warn!(path = %twin.display(), error = %e, "transparent twin not removed");
                None
            }
        };

        Ok(DeletedRendition {
            opaque_url: opaque_url.to_string(),
            transparent_url,
        })
    }

    /// Stage raw upload bytes under the store root; the file is removed on drop
    pub fn stage_upload(&self, bytes: &[u8]) -> Result<NamedTempFile> {
        fs::create_dir_all(self.root.path())?;
        let extension = image::guess_format(bytes)
            .ok()
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("bin");
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&format!(".{}", extension))
            .tempfile_in(self.root.path())?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file)
    }
}
