//! # Wardrobe Store
//!
//! Filesystem persistence for the wardrobe: rendition files laid out by
//! category, the CSV catalog of saved items and the named outfit bundles.
//!
//! Everything lives under a single root which is served as `/static/`:
//!
//! ```text
//! <root>/<category>/<uuid>_processed.jpg
//! <root>/transparent/<category>/<uuid>_transparent.png
//! <root>/clothing_items.csv
//! <root>/saved_outfits/<name>/top.<ext>
//! <root>/saved_outfits/<name>/bottom.<ext>
//! ```
//!
//! ```rust,no_run
//! use wardrobe_store::{AssetStore, Catalog, StaticRoot};
//!
//! let root = StaticRoot::new("static");
//! let assets = AssetStore::new(root.clone());
//! let catalog = Catalog::in_root(&root);
//!
//! let deleted = assets.delete("/static/pants/0f3c_processed.jpg")?;
//! catalog.remove_by_url(&deleted.opaque_url)?;
//! # Ok::<(), wardrobe_common::WardrobeError>(())
//! ```

pub mod assets;
pub mod catalog;
pub mod outfits;
pub mod paths;

pub use assets::{
    AssetStore, DEFAULT_JPEG_QUALITY, DeletedRendition, RenditionId, RenditionPair, TRANSPARENT_DIR,
    derive_transparent_url,
};
pub use catalog::{CATALOG_FILE, Catalog};
pub use outfits::{OUTFITS_DIR, OutfitStore, sanitize_name};
pub use paths::{STATIC_URL_PREFIX, StaticRoot, strip_static_prefix};
