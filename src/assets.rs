//! Read-only render assets: background templates and the render font.
//!
//! Templates live on disk as `{unit}-{certtype}.png` in the template
//! directory and are decoded once per process; assets never change while the
//! service is running, so the caches have no invalidation.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbaImage;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use rusttype::Font;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no template image for {0}")]
    TemplateMissing(String),
    #[error("template image for {0} is unreadable: {1}")]
    TemplateCorrupt(String, String),
    #[error("failed to load font {}: {}", .path.display(), .message)]
    Font { path: PathBuf, message: String },
}

pub struct TemplateStore {
    dir: PathBuf,
    font_path: PathBuf,
    cache: RwLock<HashMap<String, Arc<RgbaImage>>>,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>, font_path: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            font_path: font_path.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn template_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.png"))
    }

    /// Decoded background for a composite key, cached for the process
    /// lifetime and shared read-only across requests.
    pub fn load(&self, key: &str) -> Result<Arc<RgbaImage>, AssetError> {
        if let Some(img) = self.cache.read().get(key) {
            return Ok(Arc::clone(img));
        }

        let bytes = std::fs::read(self.template_path(key))
            .map_err(|_| AssetError::TemplateMissing(key.to_string()))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| AssetError::TemplateCorrupt(key.to_string(), e.to_string()))?
            .to_rgba8();

        let img = Arc::new(img);
        self.cache
            .write()
            .insert(key.to_string(), Arc::clone(&img));
        Ok(img)
    }

    pub fn font(&self) -> Result<Arc<Font<'static>>, AssetError> {
        load_font_cached(&self.font_path)
    }
}

static FONT_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<Font<'static>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

pub fn load_font_cached(path: &Path) -> Result<Arc<Font<'static>>, AssetError> {
    if let Some(f) = FONT_CACHE.lock().get(path) {
        return Ok(Arc::clone(f));
    }

    let bytes = std::fs::read(path).map_err(|e| AssetError::Font {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let font = Font::try_from_vec(bytes).ok_or_else(|| AssetError::Font {
        path: path.to_path_buf(),
        message: "not a valid truetype font".to_string(),
    })?;

    let font = Arc::new(font);
    FONT_CACHE
        .lock()
        .insert(path.to_path_buf(), Arc::clone(&font));
    Ok(font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn missing_template_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path(), "unused.ttf");
        assert!(matches!(
            store.load("naval-merit"),
            Err(AssetError::TemplateMissing(_))
        ));
    }

    #[test]
    fn corrupt_template_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("naval-merit.png"), b"not a png").unwrap();
        let store = TemplateStore::new(dir.path(), "unused.ttf");
        assert!(matches!(
            store.load("naval-merit"),
            Err(AssetError::TemplateCorrupt(..))
        ));
    }

    #[test]
    fn templates_are_cached_after_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("air-merit.png");
        RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]))
            .save(&path)
            .unwrap();

        let store = TemplateStore::new(dir.path(), "unused.ttf");
        let first = store.load("air-merit").unwrap();

        // Deleting the backing file must not matter once the decode is cached.
        std::fs::remove_file(&path).unwrap();
        let second = store.load("air-merit").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_font_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path(), dir.path().join("no-such.ttf"));
        assert!(matches!(store.font(), Err(AssetError::Font { .. })));
    }
}
