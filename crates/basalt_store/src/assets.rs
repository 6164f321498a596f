//! Directory-backed asset source.

use std::path::{Component, Path, PathBuf};

use futures_util::future::BoxFuture;

use basalt_codec::{AssetError, AssetSource};

/// Resolves locators as paths relative to a root directory. Locators
/// that escape the root are rejected.
pub struct DirectoryAssetSource {
    root: PathBuf,
}

impl DirectoryAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, locator: &str) -> Option<PathBuf> {
        let path = Path::new(locator);
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return None;
        }
        Some(self.root.join(path))
    }
}

impl AssetSource for DirectoryAssetSource {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>, AssetError>> {
        Box::pin(async move {
            let Some(path) = self.resolve(locator) else {
                return Err(AssetError::NotFound(locator.to_string()));
            };
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(AssetError::NotFound(locator.to_string()))
                }
                Err(e) => Err(AssetError::Transport(locator.to_string(), e.to_string())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping_locators_are_rejected() {
        let source = DirectoryAssetSource::new("/srv/assets");
        assert!(source.resolve("../etc/passwd").is_none());
        assert!(source.resolve("/etc/passwd").is_none());
        assert_eq!(
            source.resolve("textures/skin.png"),
            Some(PathBuf::from("/srv/assets/textures/skin.png"))
        );
    }
}
