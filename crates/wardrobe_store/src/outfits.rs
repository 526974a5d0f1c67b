use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};
use wardrobe_common::{OutfitBundle, Result, SavedOutfit, WardrobeError};

use crate::paths::StaticRoot;

/// Bundle directory inside the store root
pub const OUTFITS_DIR: &str = "saved_outfits";

const FALLBACK_NAME: &str = "untitled";
const FALLBACK_EXTENSION: &str = "jpg";

/// The two garment slots of a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Top,
    Bottom,
}

impl Slot {
    fn stem(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Keep `[A-Za-z0-9_ -]`, trim, and fall back to `untitled`
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();

    match kept.trim() {
        "" => FALLBACK_NAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Named folders each holding a copied top and bottom image
#[derive(Debug, Clone)]
pub struct OutfitStore {
    root: StaticRoot,
}

impl OutfitStore {
    pub fn new(root: StaticRoot) -> Self {
        Self { root }
    }

    pub fn dir(&self) -> PathBuf {
        self.root.path().join(OUTFITS_DIR)
    }

    /// Copy both images into `saved_outfits/<sanitized name>/`, replacing an existing bundle's images
    pub fn save(&self, name: &str, top_url: &str, bottom_url: &str) -> Result<SavedOutfit> {
        let top = self.root.resolve_existing(top_url, "top_url")?;
        let bottom = self.root.resolve_existing(bottom_url, "bottom_url")?;

        let name = sanitize_name(name);
        let folder = self.dir().join(&name);
        fs::create_dir_all(&folder)?;

        copy_into_slot(&folder, Slot::Top, &top)?;
        copy_into_slot(&folder, Slot::Bottom, &bottom)?;

        info!(name = %name, "outfit saved");
        Ok(SavedOutfit {
            folder_url: self.root.url_for(&format!("{}/{}", OUTFITS_DIR, name)),
        })
    }

    /// Every bundle, sorted by name
    pub fn list(&self) -> Result<Vec<OutfitBundle>> {
        let dir = self.dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        let mut bundles = Vec::with_capacity(names.len());
        for name in names {
            let folder = dir.join(&name);
            let slot_url = |slot: Slot| -> Result<String> {
                let file = find_slot(&folder, slot)?
                    .unwrap_or_else(|| format!("{}.{}", slot.stem(), FALLBACK_EXTENSION));
                Ok(self.root.url_for(&format!("{}/{}/{}", OUTFITS_DIR, name, file)))
            };
            bundles.push(OutfitBundle {
                top_url: slot_url(Slot::Top)?,
                bottom_url: slot_url(Slot::Bottom)?,
                name: name.clone(),
            });
        }
        Ok(bundles)
    }

    /// Remove a bundle; returns whether it existed
    pub fn delete(&self, name: &str) -> Result<bool> {
        let folder = self.dir().join(sanitize_name(name));
        if !folder.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(&folder)?;
        info!(path = %folder.display(), "outfit deleted");
        Ok(true)
    }
}

fn copy_into_slot(folder: &Path, slot: Slot, source: &Path) -> Result<()> {
    let extension = source
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(FALLBACK_EXTENSION);
    let file_name = format!("{}.{}", slot.stem(), extension);

    // The source may be this very slot, so copy aside before replacing anything
    let mut staged = NamedTempFile::new_in(folder)?;
    io::copy(&mut File::open(source)?, staged.as_file_mut())?;
    staged
        .persist(folder.join(&file_name))
        .map_err(|e| WardrobeError::Io(e.error))?;

    // A re-save may switch extension; drop what the slot held before
    for stale in slot_files(folder, slot)? {
        if stale != file_name {
            fs::remove_file(folder.join(stale))?;
        }
    }
    Ok(())
}

/// File name of the first `<stem>.*` file in the folder
fn find_slot(folder: &Path, slot: Slot) -> Result<Option<String>> {
    let files = slot_files(folder, slot)?;
    if files.len() > 1 {
        warn!(folder = %folder.display(), slot = slot.stem(), "several files for one outfit slot");
    }
    Ok(files.into_iter().next())
}

/// Sorted names of every `<stem>.*` file in the folder
fn slot_files(folder: &Path, slot: Slot) -> Result<Vec<String>> {
    let mut matches = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.file_stem().and_then(|s| s.to_str()) == Some(slot.stem()) {
            matches.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    matches.sort();
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wardrobe_common::ErrorKind;

    fn create_store() -> (TempDir, OutfitStore) {
        let dir = TempDir::new().expect("Should create temp dir");
        let store = OutfitStore::new(StaticRoot::new(dir.path()));
        (dir, store)
    }

    fn seed(store: &OutfitStore, relative: &str, bytes: &[u8]) -> String {
        let path = store.root.path().join(relative);
        fs::create_dir_all(path.parent().expect("Should have parent")).expect("Should create dirs");
        fs::write(&path, bytes).expect("Should seed file");
        store.root.url_for(relative)
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Airport Look!"), "Airport Look");
        assert_eq!(sanitize_name("../../etc"), "etc");
        assert_eq!(sanitize_name("  spaced_out-1  "), "spaced_out-1");
        assert_eq!(sanitize_name(""), "untitled");
        assert_eq!(sanitize_name("!!!"), "untitled");
        assert_eq!(sanitize_name("café"), "caf");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for input in ["Airport Look!", "", "  a b  ", "///", "Date Night #2", "ünïcödé", "x\ty"] {
            let once = sanitize_name(input);
            assert_eq!(sanitize_name(&once), once, "input {:?}", input);
            assert!(once.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-')));
        }
    }

    #[test]
    fn test_save_copies_sources() {
        let (_dir, store) = create_store();
        let top = seed(&store, "shortsleeve/t_processed.jpg", b"top-bytes");
        let bottom = seed(&store, "pants/b_processed.jpg", b"bottom-bytes");

        let saved = store.save("Airport Look!", &top, &bottom).expect("Should save outfit");
        assert_eq!(saved.folder_url, "/static/saved_outfits/Airport Look");

        let folder = store.dir().join("Airport Look");
        assert_eq!(fs::read(folder.join("top.jpg")).expect("Should read top"), b"top-bytes");
        assert_eq!(fs::read(folder.join("bottom.jpg")).expect("Should read bottom"), b"bottom-bytes");

        // Sources stay owned by the asset store
        assert!(store.root.resolve_existing(&top, "top_url").is_ok());
    }

    #[test]
    fn test_save_missing_source_is_not_found() {
        let (_dir, store) = create_store();
        let top = seed(&store, "shortsleeve/t_processed.jpg", b"top");

        let err = store.save("x", &top, "/static/pants/missing_processed.jpg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!store.dir().join("x").exists());
    }

    #[test]
    fn test_list_reports_actual_extensions() {
        let (_dir, store) = create_store();
        let top = seed(&store, "transparent/shortsleeve/t_transparent.png", b"png");
        let bottom = seed(&store, "pants/b_processed.jpg", b"jpg");
        store.save("Beach", &top, &bottom).expect("Should save outfit");
        store.save("Airport", &bottom, &bottom).expect("Should save outfit");

        let bundles = store.list().expect("Should list outfits");
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].name, "Airport");
        assert_eq!(bundles[1].top_url, "/static/saved_outfits/Beach/top.png");
        assert_eq!(bundles[1].bottom_url, "/static/saved_outfits/Beach/bottom.jpg");
    }

    #[test]
    fn test_resave_replaces_slot() {
        let (_dir, store) = create_store();
        let png = seed(&store, "transparent/hat/h_transparent.png", b"png");
        let jpg = seed(&store, "hat/h_processed.jpg", b"jpg");

        store.save("Swap", &png, &jpg).expect("Should save outfit");
        store.save("Swap", &jpg, &jpg).expect("Should re-save outfit");

        let folder = store.dir().join("Swap");
        assert!(!folder.join("top.png").exists());
        assert!(folder.join("top.jpg").exists());
    }

    #[test]
    fn test_resave_from_own_listing() {
        let (_dir, store) = create_store();
        let top = seed(&store, "shortsleeve/t_processed.jpg", b"top-bytes");
        let bottom = seed(&store, "pants/b_processed.jpg", b"bottom-bytes");
        store.save("Look", &top, &bottom).expect("Should save outfit");

        let listed = store.list().expect("Should list outfits");
        store
            .save("Look", &listed[0].top_url, &listed[0].bottom_url)
            .expect("Should re-save from the bundle's own files");

        let folder = store.dir().join("Look");
        assert_eq!(fs::read(folder.join("top.jpg")).expect("Should read top"), b"top-bytes");
        assert_eq!(fs::read(folder.join("bottom.jpg")).expect("Should read bottom"), b"bottom-bytes");
        assert_eq!(fs::read_dir(&folder).expect("Should list bundle").count(), 2);
    }

    #[test]
    fn test_list_falls_back_to_jpg() {
        let (_dir, store) = create_store();
        fs::create_dir_all(store.dir().join("Empty")).expect("Should create bundle dir");

        let bundles = store.list().expect("Should list outfits");
        assert_eq!(bundles[0].top_url, "/static/saved_outfits/Empty/top.jpg");
        assert_eq!(bundles[0].bottom_url, "/static/saved_outfits/Empty/bottom.jpg");
    }

    #[test]
    fn test_list_without_root() {
        let (_dir, store) = create_store();
        assert!(store.list().expect("Should list outfits").is_empty());
    }

    #[test]
    fn test_delete_bundle() {
        let (_dir, store) = create_store();
        let top = seed(&store, "hat/a_processed.jpg", b"a");
        store.save("Gone Soon", &top, &top).expect("Should save outfit");

        assert!(store.delete("Gone Soon").expect("Should delete"));
        assert!(!store.dir().join("Gone Soon").exists());
        assert!(!store.delete("Gone Soon").expect("Should no-op"));
    }
}
