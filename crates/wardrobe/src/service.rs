use std::path::{Path, PathBuf};
use std::sync::Arc;

use rendition::{GarmentClassifier, RenditionGenerator, SourceImage};
use serde::Serialize;
use tokio::task::{JoinError, spawn_blocking};
use tracing::{info, warn};
use wardrobe_common::{
    CatalogEntry, Category, OutfitBundle, OutfitPairing, ProcessedUpload, Result, SavedOutfit,
    WardrobeError,
};
use wardrobe_store::{AssetStore, Catalog, DeletedRendition, OutfitStore, RenditionId, StaticRoot};

/// Result of deleting an uploaded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedImage {
    #[serde(flatten)]
    pub rendition: DeletedRendition,
    pub catalog_rows_removed: usize,
}

/// The wardrobe backend: upload pipeline, catalog and outfit bundles over one store root
#[derive(Clone)]
pub struct Wardrobe {
    generator: Arc<RenditionGenerator>,
    classifier: Arc<dyn GarmentClassifier>,
    assets: AssetStore,
    catalog: Arc<Catalog>,
    outfits: OutfitStore,
}

impl Wardrobe {
    pub fn new(
        static_dir: impl Into<PathBuf>,
        generator: RenditionGenerator,
        classifier: Arc<dyn GarmentClassifier>,
    ) -> Self {
        let root = StaticRoot::new(static_dir);
        Self {
            generator: Arc::new(generator),
            classifier,
            assets: AssetStore::new(root.clone()),
            catalog: Arc::new(Catalog::in_root(&root)),
            outfits: OutfitStore::new(root),
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.assets = self.assets.with_jpeg_quality(quality);
        self
    }

    pub fn root(&self) -> &StaticRoot {
        self.assets.root()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Turn an uploaded photograph into both renditions and file them under the classified category
    pub async fn process_upload(&self, bytes: Vec<u8>) -> Result<ProcessedUpload> {
        if bytes.is_empty() {
            return Err(WardrobeError::validation("file", "no file uploaded"));
        }

        let source = SourceImage::from_bytes(&bytes)?;
        let (width, height) = source.dimensions();
        info!(width, height, bytes = bytes.len(), "processing upload");

        // File-based classifiers read the staged copy; it is removed when `staged` drops
        let staged = self.assets.stage_upload(&bytes)?;
        let source = Arc::new(source.with_path(staged.path()));

        let generate = {
            let generator = Arc::clone(&self.generator);
            let source = Arc::clone(&source);
            async move {
                spawn_blocking(move || generator.generate(&source.image))
                    .await
                    .map_err(join_error)?
                    .map_err(WardrobeError::from)
            }
        };
        let classify = {
            let classifier = Arc::clone(&self.classifier);
            let source = Arc::clone(&source);
            async move {
                spawn_blocking(move || classifier.classify(&source))
                    .await
                    .map_err(join_error)?
                    .map_err(WardrobeError::from)
            }
        };
        let (renditions, label) = tokio::try_join!(generate, classify)?;

        let category = Category::from_label(&label).map_err(|e| {
            WardrobeError::processing(format!("unusable classifier label '{}': {}", label, e))
        })?;
        if !category.is_known() {
            warn!(category = %category, "classifier returned an unfamiliar category");
        }

        let id = RenditionId::generate(category);
        let pair = self.assets.place(&id, &renditions.opaque, &renditions.transparent)?;
        drop(staged);

        info!(url = %pair.opaque_url, "upload processed");
        Ok(ProcessedUpload {
            opaque_url: pair.opaque_url,
            transparent_url: pair.transparent_url,
            category: id.category.to_string(),
        })
    }

    /// Read an image from disk and run it through [`process_upload`](Self::process_upload)
    pub async fn process_file(&self, path: impl AsRef<Path>) -> Result<ProcessedUpload> {
        let bytes = tokio::fs::read(path.as_ref()).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => WardrobeError::not_found(path.as_ref()),
            _ => WardrobeError::Io(e),
        })?;
        self.process_upload(bytes).await
    }

    /// Delete both renditions, then every catalog row pointing at the opaque url
    pub fn delete_image(&self, image_url: &str) -> Result<DeletedImage> {
        let image_url = require("image_url", image_url)?;

        let rendition = self.assets.delete(image_url)?;
        let catalog_rows_removed = self.catalog.remove_by_url(image_url)?;

        info!(url = image_url, catalog_rows_removed, "image deleted");
        Ok(DeletedImage {
            rendition,
            catalog_rows_removed,
        })
    }

    /// Record an item in the catalog
    pub fn add_item(&self, image_url: &str, category: &str, color: &str) -> Result<CatalogEntry> {
        let image_url = require("image_url", image_url)?;
        self.root().resolve(image_url, "image_url")?;

        let entry = CatalogEntry::new(image_url, require("category", category)?, require("color", color)?);
        self.catalog.append(&entry)?;
        info!(url = %entry.image_url, category = %entry.category, "item added");
        Ok(entry)
    }

    pub fn list_items(&self, category: Option<&str>, color: Option<&str>) -> Result<Vec<CatalogEntry>> {
        self.catalog.filter(category, color)
    }

    /// Candidate outfits pairing a catalogued item with every item of `pair_category`
    pub fn suggest_outfits(&self, base_url: &str, pair_category: &str) -> Result<Vec<OutfitPairing>> {
        self.catalog
            .suggest_pairings(require("base_url", base_url)?, require("pair_category", pair_category)?)
    }

    pub fn save_outfit(&self, name: &str, top_url: &str, bottom_url: &str) -> Result<SavedOutfit> {
        self.outfits
            .save(name, require("top_url", top_url)?, require("bottom_url", bottom_url)?)
    }

    pub fn list_outfits(&self) -> Result<Vec<OutfitBundle>> {
        self.outfits.list()
    }

    /// Remove a bundle; returns whether it existed
    pub fn delete_outfit(&self, name: &str) -> Result<bool> {
        self.outfits.delete(name)
    }
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WardrobeError::validation(field, "must not be empty"));
    }
    Ok(value)
}

fn join_error(err: JoinError) -> WardrobeError {
    WardrobeError::processing(format!("model task did not complete: {}", err))
}
