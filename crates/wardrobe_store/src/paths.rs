use std::path::{Path, PathBuf};

use wardrobe_common::{Result, WardrobeError};

/// URL prefix under which the store root is served
pub const STATIC_URL_PREFIX: &str = "/static/";

/// The on-disk store root and its mapping to `/static/...` URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRoot {
    root: PathBuf,
}

impl StaticRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// URL of a `/`-separated path relative to the root
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}{}", STATIC_URL_PREFIX, relative.trim_start_matches('/'))
    }

    /// Map a `/static/...` URL onto the filesystem without touching it
    pub fn resolve(&self, url: &str, field: &str) -> Result<PathBuf> {
        let relative = strip_static_prefix(url).ok_or_else(|| {
            WardrobeError::validation(field, format!("'{}' is not a /static/ url", url))
        })?;

        let mut path = self.root.clone();
        let mut depth = 0;
        for part in relative.split('/') {
            match part {
                "" | "." => continue,
                ".." => {
                    return Err(WardrobeError::validation(
                        field,
                        format!("'{}' escapes the static root", url),
                    ));
                }
                part => {
                    path.push(part);
                    depth += 1;
                }
            }
        }

        if depth == 0 {
            return Err(WardrobeError::validation(field, "url names no file"));
        }
        Ok(path)
    }

    /// Like [`resolve`](Self::resolve) but fails with `NotFound` unless a file exists there
    pub fn resolve_existing(&self, url: &str, field: &str) -> Result<PathBuf> {
        let path = self.resolve(url, field)?;
        if !path.is_file() {
            return Err(WardrobeError::not_found(path));
        }
        Ok(path)
    }
}

/// Relative part of a static URL; the leading slash is optional
pub fn strip_static_prefix(url: &str) -> Option<&str> {
    url.strip_prefix(STATIC_URL_PREFIX)
        .or_else(|| url.strip_prefix(&STATIC_URL_PREFIX[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardrobe_common::ErrorKind;

    #[test]
    fn test_resolve_static_url() {
        let root = StaticRoot::new("/srv/static");
        let path = root
            .resolve("/static/shortsleeve/a_processed.jpg", "image_url")
            .expect("Should resolve url");
        assert_eq!(path, PathBuf::from("/srv/static/shortsleeve/a_processed.jpg"));

        let path = root.resolve("static/hat/b.jpg", "image_url").expect("Should resolve url");
        assert_eq!(path, PathBuf::from("/srv/static/hat/b.jpg"));
    }

    #[test]
    fn test_resolve_rejects_foreign_and_traversal() {
        let root = StaticRoot::new("static");
        let err = root.resolve("/uploads/a.jpg", "image_url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = root.resolve("/static/../secret.txt", "image_url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = root.resolve("/static/", "image_url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_resolve_existing_reports_path() {
        let root = StaticRoot::new("/definitely/not/here");
        let err = root.resolve_existing("/static/hat/x.jpg", "top_url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("hat/x.jpg"));
    }

    #[test]
    fn test_url_for() {
        let root = StaticRoot::new("static");
        assert_eq!(root.url_for("hat/a.jpg"), "/static/hat/a.jpg");
        assert_eq!(root.url_for("/hat/a.jpg"), "/static/hat/a.jpg");
    }
}
