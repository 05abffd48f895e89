//! Active shape selection and the cached custom shape listing.

use super::{BuiltinShape, ShapeId, is_built_in};
use crate::remote::{RemoteResult, ShapeStore};

/// Tracks the selected shape and mirrors the remote custom shape listing.
///
/// The listing is only a name cache: it is replaced wholesale on every
/// successful refresh and left untouched when a refresh fails.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    selected: ShapeId,
    custom_names: Vec<String>,
}

impl ShapeRegistry {
    /// Create a registry with the default built-in shape selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected shape.
    pub fn selected(&self) -> &ShapeId {
        &self.selected
    }

    /// Select a shape. Custom names are not checked against the listing.
    ///
    /// Returns `true` if the selection changed.
    pub fn select(&mut self, id: ShapeId) -> bool {
        if self.selected == id {
            return false;
        }
        log::debug!("Selected shape: {}", id);
        self.selected = id;
        true
    }

    /// Cached custom shape names.
    pub fn custom_names(&self) -> &[String] {
        &self.custom_names
    }

    /// Whether `name` appears in the cached custom listing.
    pub fn has_custom(&self, name: &str) -> bool {
        self.custom_names.iter().any(|n| n == name)
    }

    /// Membership test against the built-in set.
    pub fn is_built_in(&self, name: &str) -> bool {
        is_built_in(name)
    }

    /// Replace the cached listing.
    pub fn set_custom_names(&mut self, names: Vec<String>) {
        self.custom_names = names;
    }

    /// Record a newly created custom shape in the cache.
    pub fn add_custom(&mut self, name: &str) {
        if !self.has_custom(name) {
            self.custom_names.push(name.to_string());
        }
    }

    /// Drop a deleted custom shape from the cache.
    pub fn remove_custom(&mut self, name: &str) {
        self.custom_names.retain(|n| n != name);
    }

    /// Re-fetch the custom listing from the store.
    ///
    /// On failure the previous cache is kept and the error is returned.
    pub async fn refresh_custom_list<S: ShapeStore + ?Sized>(&mut self, store: &S) -> RemoteResult<&[String]> {
        match store.list().await {
            Ok(names) => {
                log::debug!("Custom shape listing refreshed: {} shapes", names.len());
                self.custom_names = names;
                Ok(&self.custom_names)
            }
            Err(e) => {
                log::warn!("Failed to refresh custom shapes, keeping cached listing: {}", e);
                Err(e)
            }
        }
    }

    /// Fall back to the default shape if `deleted` is currently selected.
    ///
    /// Returns `true` if the selection changed.
    pub fn fall_back_if_selected(&mut self, deleted: &str) -> bool {
        if self.selected.custom_name() == Some(deleted) {
            self.fall_back()
        } else {
            false
        }
    }

    /// Fall back to the default shape if any custom shape is selected.
    pub fn fall_back_if_custom(&mut self) -> bool {
        if self.selected.is_built_in() {
            false
        } else {
            self.fall_back()
        }
    }

    /// Fall back to the default shape if the selected custom shape is not in
    /// the cached listing.
    pub fn fall_back_if_unlisted(&mut self) -> bool {
        let unlisted = matches!(self.selected.custom_name(), Some(name) if !self.has_custom(name));
        if unlisted { self.fall_back() } else { false }
    }

    fn fall_back(&mut self) -> bool {
        log::info!("Selected shape '{}' no longer exists, using {}", self.selected, BuiltinShape::default().name());
        self.select(ShapeId::default())
    }
}
