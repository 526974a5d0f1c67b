use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use wardrobe_common::{CatalogEntry, OutfitPairing, Result, WardrobeError};

use crate::paths::StaticRoot;

/// Catalog file name inside the store root
pub const CATALOG_FILE: &str = "clothing_items.csv";

/// Headerless `image_url,category,color` table of saved items.
///
/// Mutations are serialized through an internal lock; rewrites go through a
/// temporary file that replaces the table in one rename.
#[derive(Debug)]
pub struct Catalog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Catalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The catalog stored at `<root>/clothing_items.csv`
    pub fn in_root(root: &StaticRoot) -> Self {
        Self::new(root.path().join(CATALOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row; an existing row with the same url is left in place
    pub fn append(&self, entry: &CatalogEntry) -> Result<()> {
        let _guard = self.guard();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut writer = writer_builder().from_writer(file);
        writer
            .write_record([&entry.image_url, &entry.category, &entry.color])
            .map_err(catalog_error)?;
        writer.flush()?;

        debug!(url = %entry.image_url, "catalog row appended");
        Ok(())
    }

    /// Drop every row for `image_url`, returning how many were removed.
    ///
    /// The file is only rewritten when something matched.
    pub fn remove_by_url(&self, image_url: &str) -> Result<usize> {
        let _guard = self.guard();

        if !self.path.exists() {
            return Ok(0);
        }

        let rows = self.read_rows()?;
        let before = rows.len();
        let kept: Vec<CatalogEntry> = rows.into_iter().filter(|row| row.image_url != image_url).collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.write_rows(&kept)?;
            info!(url = image_url, removed, "catalog rows removed");
        }
        Ok(removed)
    }

    /// All rows in file order
    pub fn entries(&self) -> Result<Vec<CatalogEntry>> {
        let _guard = self.guard();
        self.read_rows()
    }

    pub fn contains(&self, image_url: &str) -> Result<bool> {
        Ok(self.entries()?.iter().any(|row| row.image_url == image_url))
    }

    /// Rows matching every filter that is set
    pub fn filter(&self, category: Option<&str>, color: Option<&str>) -> Result<Vec<CatalogEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|row| category.is_none_or(|c| row.category == c))
            .filter(|row| color.is_none_or(|c| row.color == c))
            .collect())
    }

    /// Pair a catalogued item with every item of another category
    pub fn suggest_pairings(&self, base_url: &str, pair_category: &str) -> Result<Vec<OutfitPairing>> {
        let rows = self.entries()?;
        let base = rows
            .iter()
            .find(|row| row.image_url == base_url)
            .cloned()
            .ok_or_else(|| WardrobeError::not_found(base_url))?;

        Ok(rows
            .into_iter()
            .filter(|row| row.category == pair_category && row.image_url != base_url)
            .map(|pair| OutfitPairing {
                base: base.clone(),
                pair,
            })
            .collect())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The lock only orders file access, a poisoned guard is still usable
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_rows(&self) -> Result<Vec<CatalogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(catalog_error)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(catalog_error)?;
            let field = |i: usize| record.get(i).unwrap_or_default().to_string();
            rows.push(CatalogEntry {
                image_url: field(0),
                category: field(1),
                color: field(2),
            });
        }
        Ok(rows)
    }

    fn write_rows(&self, rows: &[CatalogEntry]) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;

        {
            let mut writer = writer_builder().from_writer(temp.as_file_mut());
            for row in rows {
                writer
                    .write_record([&row.image_url, &row.category, &row.color])
                    .map_err(catalog_error)?;
            }
            writer.flush()?;
        }

        temp.as_file_mut().flush()?;
        temp.persist(&self.path).map_err(|e| WardrobeError::Io(e.error))?;
        Ok(())
    }
}

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.has_headers(false).terminator(Terminator::CRLF);
    builder
}

fn catalog_error(err: csv::Error) -> WardrobeError {
    WardrobeError::Catalog(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_catalog() -> (TempDir, Catalog) {
        let dir = TempDir::new().expect("Should create temp dir");
        let catalog = Catalog::in_root(&StaticRoot::new(dir.path()));
        (dir, catalog)
    }

    fn entry(url: &str, category: &str, color: &str) -> CatalogEntry {
        CatalogEntry::new(url, category, color)
    }

    #[test]
    fn test_append_writes_headerless_rows() {
        let (_dir, catalog) = create_catalog();
        catalog
            .append(&entry("/static/shortsleeve/a_processed.jpg", "shortsleeve", "black"))
            .expect("Should append");
        catalog
            .append(&entry("/static/pants/b_processed.jpg", "pants", "light, blue"))
            .expect("Should append");

        let raw = fs::read_to_string(catalog.path()).expect("Should read catalog");
        assert_eq!(
            raw,
            "/static/shortsleeve/a_processed.jpg,shortsleeve,black\r\n/static/pants/b_processed.jpg,pants,\"light, blue\"\r\n"
        );

        let rows = catalog.entries().expect("Should read rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].color, "light, blue");
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let (_dir, catalog) = create_catalog();
        let row = entry("/static/hat/a_processed.jpg", "hat", "red");
        catalog.append(&row).expect("Should append");
        catalog.append(&row).expect("Should append again");
        assert_eq!(catalog.entries().expect("Should read rows").len(), 2);
    }

    #[test]
    fn test_remove_by_url() {
        let (_dir, catalog) = create_catalog();
        catalog.append(&entry("/static/hat/a_processed.jpg", "hat", "red")).expect("Should append");
        catalog.append(&entry("/static/hat/b_processed.jpg", "hat", "blue")).expect("Should append");
        catalog.append(&entry("/static/hat/a_processed.jpg", "hat", "red")).expect("Should append");

        let removed = catalog.remove_by_url("/static/hat/a_processed.jpg").expect("Should remove");
        assert_eq!(removed, 2);

        let rows = catalog.entries().expect("Should read rows");
        assert_eq!(rows, vec![entry("/static/hat/b_processed.jpg", "hat", "blue")]);
    }

    #[test]
    fn test_remove_by_url_is_idempotent() {
        let (_dir, catalog) = create_catalog();
        catalog.append(&entry("/static/hat/a_processed.jpg", "hat", "red")).expect("Should append");
        catalog.append(&entry("/static/hat/b_processed.jpg", "hat", "blue")).expect("Should append");

        catalog.remove_by_url("/static/hat/a_processed.jpg").expect("Should remove");
        let once = fs::read(catalog.path()).expect("Should read catalog");

        let removed = catalog.remove_by_url("/static/hat/a_processed.jpg").expect("Should remove again");
        let twice = fs::read(catalog.path()).expect("Should read catalog");

        assert_eq!(removed, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_without_table_is_noop() {
        let (_dir, catalog) = create_catalog();
        assert_eq!(catalog.remove_by_url("/static/hat/x_processed.jpg").expect("Should no-op"), 0);
        assert!(!catalog.path().exists());
        assert!(catalog.entries().expect("Should read rows").is_empty());
    }

    #[test]
    fn test_filter_rows() {
        let (_dir, catalog) = create_catalog();
        catalog.append(&entry("/static/hat/a_processed.jpg", "hat", "red")).expect("Should append");
        catalog.append(&entry("/static/hat/b_processed.jpg", "hat", "blue")).expect("Should append");
        catalog.append(&entry("/static/pants/c_processed.jpg", "pants", "blue")).expect("Should append");

        assert_eq!(catalog.filter(Some("hat"), None).expect("Should filter").len(), 2);
        assert_eq!(catalog.filter(None, Some("blue")).expect("Should filter").len(), 2);
        assert_eq!(catalog.filter(Some("hat"), Some("blue")).expect("Should filter").len(), 1);
        assert_eq!(catalog.filter(None, None).expect("Should filter").len(), 3);
    }

    #[test]
    fn test_suggest_pairings() {
        let (_dir, catalog) = create_catalog();
        catalog.append(&entry("/static/shortsleeve/t_processed.jpg", "shortsleeve", "white")).expect("Should append");
        catalog.append(&entry("/static/pants/p1_processed.jpg", "pants", "black")).expect("Should append");
        catalog.append(&entry("/static/pants/p2_processed.jpg", "pants", "blue")).expect("Should append");
        catalog.append(&entry("/static/shoes/s_processed.jpg", "shoes", "white")).expect("Should append");

        let pairings = catalog
            .suggest_pairings("/static/shortsleeve/t_processed.jpg", "pants")
            .expect("Should suggest");
        assert_eq!(pairings.len(), 2);
        assert!(pairings.iter().all(|p| p.base.category == "shortsleeve" && p.pair.category == "pants"));

        let err = catalog.suggest_pairings("/static/hat/none_processed.jpg", "pants").unwrap_err();
        assert_eq!(err.kind(), wardrobe_common::ErrorKind::NotFound);
    }

    #[test]
    fn test_reads_short_rows() {
        let (_dir, catalog) = create_catalog();
        fs::write(catalog.path(), "/static/hat/a_processed.jpg,hat\n").expect("Should seed catalog");
        let rows = catalog.entries().expect("Should read rows");
        assert_eq!(rows, vec![entry("/static/hat/a_processed.jpg", "hat", "")]);
    }

    #[test]
    fn test_concurrent_appends_keep_every_row() {
        let (_dir, catalog) = create_catalog();
        let catalog = std::sync::Arc::new(catalog);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let catalog = catalog.clone();
                std::thread::spawn(move || {
                    catalog
                        .append(&entry(&format!("/static/hat/{}_processed.jpg", i), "hat", "red"))
                        .expect("Should append");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Should join");
        }

        assert_eq!(catalog.entries().expect("Should read rows").len(), 8);
    }
}
