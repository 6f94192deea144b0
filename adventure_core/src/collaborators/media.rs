//! Media lookup for node images.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// A resolved, renderable image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaHandle {
    /// The reference as written in the story data.
    pub reference: String,
    /// Where the media can be read from.
    pub path: PathBuf,
}

/// Maps an opaque image reference from the story data to renderable media.
pub trait MediaResolver {
    /// Resolve a reference, or `None` if it cannot be rendered.
    fn resolve(&self, reference: &str) -> Option<MediaHandle>;
}

impl<T: MediaResolver + ?Sized> MediaResolver for &T {
    fn resolve(&self, reference: &str) -> Option<MediaHandle> {
        (**self).resolve(reference)
    }
}

impl<T: MediaResolver + ?Sized> MediaResolver for std::sync::Arc<T> {
    fn resolve(&self, reference: &str) -> Option<MediaHandle> {
        (**self).resolve(reference)
    }
}

/// Resolves nothing. For text-only deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaResolver for NoMedia {
    fn resolve(&self, _reference: &str) -> Option<MediaHandle> {
        None
    }
}

/// Resolves references to files inside one image directory.
#[derive(Debug, Clone)]
pub struct DirectoryMediaResolver {
    root: PathBuf,
}

impl DirectoryMediaResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MediaResolver for DirectoryMediaResolver {
    fn resolve(&self, reference: &str) -> Option<MediaHandle> {
        let relative = Path::new(reference);
        let contained = !reference.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            tracing::warn!(reference, "Image reference escapes the image directory");
            return None;
        }

        let path = self.root.join(relative);
        if path.is_file() {
            Some(MediaHandle {
                reference: reference.to_string(),
                path,
            })
        } else {
            tracing::warn!(reference, path = %path.display(), "Image not found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_resolves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doro.png"), b"png").unwrap();

        let resolver = DirectoryMediaResolver::new(dir.path());
        let handle = resolver.resolve("doro.png").unwrap();

        assert_eq!(handle.reference, "doro.png");
        assert_eq!(handle.path, dir.path().join("doro.png"));
    }

    #[test]
    fn test_directory_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DirectoryMediaResolver::new(dir.path());
        assert!(resolver.resolve("missing.png").is_none());
    }

    #[test]
    fn test_directory_rejects_escaping_references() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("images");
        std::fs::create_dir(&inner).unwrap();
        std::fs::write(dir.path().join("secret.png"), b"png").unwrap();

        let resolver = DirectoryMediaResolver::new(&inner);
        assert!(resolver.resolve("../secret.png").is_none());
        assert!(resolver.resolve("").is_none());
        assert!(resolver.resolve("/etc/passwd").is_none());
    }

    #[test]
    fn test_directory_is_not_media() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let resolver = DirectoryMediaResolver::new(dir.path());
        assert!(resolver.resolve("sub").is_none());
    }

    #[test]
    fn test_no_media() {
        assert!(NoMedia.resolve("anything.png").is_none());
    }
}
