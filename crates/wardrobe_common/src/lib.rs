//! # Wardrobe Common - Shared Types and Error Taxonomy
//!
//! Data structures shared by the rendition pipeline, the asset store and the
//! service facade, plus the error taxonomy every boundary operation reports.
//!
//! ## Example
//!
//! ```rust
//! use wardrobe_common::{Category, CatalogEntry};
//!
//! let category = Category::from_label("Short Sleeve").unwrap();
//! assert_eq!(category.as_str(), "shortsleeve");
//!
//! let entry = CatalogEntry::new("/static/shortsleeve/a_processed.jpg", category.as_str(), "black");
//! assert_eq!(entry.color, "black");
//! ```

use std::fmt;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Result type for wardrobe operations
pub type Result<T> = std::result::Result<T, WardrobeError>;

/// Standard error type for wardrobe operations
#[derive(Error, Debug)]
pub enum WardrobeError {
    #[error("Missing or invalid field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl WardrobeError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing(message.into())
    }

    /// Coarse classification used when surfacing the error to a caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Processing(_) => ErrorKind::Processing,
            Self::Io(_) | Self::Encode(_) | Self::Catalog(_) => ErrorKind::Io,
        }
    }

    /// Structured payload for the outer layer
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            kind: self.kind(),
            status: self.kind().status_code(),
            error: self.to_string(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Processing,
    Io,
}

impl ErrorKind {
    /// HTTP-style status code for the error class
    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Processing | Self::Io => 500,
        }
    }
}

/// Error body returned across the service boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub status: u16,
    pub error: String,
}

/// Normalized garment category, used verbatim as a directory name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Labels the client offers for manual categorisation
    pub const KNOWN: &'static [&'static str] = &[
        "hat",
        "shortsleeve",
        "longsleeve",
        "outerwear",
        "pants",
        "shorts",
        "shoes",
    ];

    /// Directory names under the store root that belong to other trees
    pub const RESERVED: &'static [&'static str] = &["transparent", "saved_outfits"];

    /// Normalize a raw classifier label (strip spaces, lower-case) into a category
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = utils::normalize_label(label);
        if normalized.is_empty()
            || normalized == "."
            || normalized == ".."
            || normalized.contains(['/', '\\'])
            || Self::RESERVED.contains(&normalized.as_str())
        {
            return Err(WardrobeError::validation(
                "category",
                format!("'{}' cannot be used as a category directory", label),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.0.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integer pixel offset; negative values shift up/left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The two physical files produced for every upload
#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RenditionVariant {
    /// Shadow and cutout flattened onto white, stored as JPEG
    Opaque,
    /// Shadow and cutout on an alpha canvas, stored as PNG
    Transparent,
}

impl RenditionVariant {
    /// Filename suffix appended to the rendition uuid
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Opaque => "_processed.jpg",
            Self::Transparent => "_transparent.png",
        }
    }
}

/// A row of the wardrobe catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub image_url: String,
    pub category: String,
    pub color: String,
}

impl CatalogEntry {
    pub fn new(
        image_url: impl Into<String>,
        category: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            category: category.into(),
            color: color.into(),
        }
    }
}

/// A saved outfit folder as seen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutfitBundle {
    pub name: String,
    pub top_url: String,
    pub bottom_url: String,
}

/// Response of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedUpload {
    pub opaque_url: String,
    pub transparent_url: String,
    pub category: String,
}

/// Response of a successful outfit save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedOutfit {
    pub folder_url: String,
}

/// A candidate outfit built from two catalogued items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutfitPairing {
    pub base: CatalogEntry,
    pub pair: CatalogEntry,
}

pub mod utils {
    /// Strip spaces and lower-case a classifier label
    pub fn normalize_label(label: &str) -> String {
        label.replace(' ', "").to_lowercase()
    }
}
