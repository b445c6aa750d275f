//! Decoded image resources for image-based presets.
//!
//! Images are keyed by the path string a preset carries, resolved against a
//! root directory, decoded once and kept for the life of the cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageError, RgbaImage};
use tracing::{debug, instrument};

use crate::error::{LeafletError, LeafletResult};
use crate::preset::{Preset, PresetCatalog};

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    root: PathBuf,
    images: HashMap<String, Arc<RgbaImage>>,
}

impl ImageCache {
    /// A cache resolving keys relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a cache key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn get(&self, key: &str) -> Option<Arc<RgbaImage>> {
        self.images.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.images.contains_key(key)
    }

    /// Returns true if every image the preset draws is decoded.
    pub fn is_resident(&self, preset: &Preset) -> bool {
        preset.image_refs().into_iter().all(|key| self.contains(key))
    }

    /// Keys the preset needs that are not decoded yet.
    pub fn missing(&self, preset: &Preset) -> Vec<String> {
        preset
            .image_refs()
            .into_iter()
            .filter(|key| !self.contains(key))
            .map(str::to_string)
            .collect()
    }

    /// Stores an already decoded image under `key`.
    pub fn insert(&mut self, key: impl Into<String>, image: RgbaImage) -> Arc<RgbaImage> {
        let image = Arc::new(image);
        self.images.insert(key.into(), Arc::clone(&image));
        image
    }

    /// A resident image, or a not-found resource error.
    pub fn require(&self, key: &str) -> LeafletResult<Arc<RgbaImage>> {
        self.get(key).ok_or_else(|| {
            let io = std::io::Error::new(std::io::ErrorKind::NotFound, "image not loaded");
            LeafletError::resource(self.path_for(key), ImageError::IoError(io))
        })
    }

    /// Decodes `key` from disk unless it is already resident.
    #[instrument(skip(self))]
    pub fn load(&mut self, key: &str) -> LeafletResult<Arc<RgbaImage>> {
        if let Some(image) = self.get(key) {
            return Ok(image);
        }
        let path = self.path_for(key);
        let image = image::open(&path)
            .map_err(|err| LeafletError::resource(&path, err))?
            .to_rgba8();
        debug!(width = image.width(), height = image.height(), "decoded image");
        Ok(self.insert(key, image))
    }

    /// Reads and decodes `key` without blocking the async runtime.
    #[instrument(skip(self))]
    pub async fn load_async(&mut self, key: &str) -> LeafletResult<Arc<RgbaImage>> {
        if let Some(image) = self.get(key) {
            return Ok(image);
        }
        let path = self.path_for(key);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|err| LeafletError::resource(&path, ImageError::IoError(err)))?;
        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).map(|img| img.to_rgba8()))
            .await
            .map_err(|err| LeafletError::resource(&path, ImageError::IoError(std::io::Error::other(err))))?
            .map_err(|err| LeafletError::resource(&path, err))?;
        debug!(width = image.width(), height = image.height(), "decoded image");
        Ok(self.insert(key, image))
    }

    /// Loads every image a preset draws.
    pub fn load_preset(&mut self, preset: &Preset) -> LeafletResult<()> {
        for key in self.missing(preset) {
            self.load(&key)?;
        }
        Ok(())
    }

    pub async fn load_preset_async(&mut self, preset: &Preset) -> LeafletResult<()> {
        for key in self.missing(preset) {
            self.load_async(&key).await?;
        }
        Ok(())
    }

    /// Loads every image referenced by a catalog. Returns how many were
    /// decoded by this call.
    #[instrument(skip_all, fields(presets = catalog.len()))]
    pub fn preload(&mut self, catalog: &PresetCatalog) -> LeafletResult<usize> {
        let before = self.images.len();
        for preset in catalog.iter() {
            self.load_preset(preset)?;
        }
        Ok(self.images.len() - before)
    }

    #[instrument(skip_all, fields(presets = catalog.len()))]
    pub async fn preload_async(&mut self, catalog: &PresetCatalog) -> LeafletResult<usize> {
        let before = self.images.len();
        for preset in catalog.iter() {
            self.load_preset_async(preset).await?;
        }
        Ok(self.images.len() - before)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
