//! Name-keyed sprite lookups
//!
//! The simulation never loads image data. It only needs stable handles the
//! renderer can resolve, so sheets and textures are registered once and
//! looked up by name or path afterwards.

use std::collections::HashMap;

use enjon_ecs::SpriteHandle;
use tracing::{debug, warn};

/// Registry of sprite sheets and textures handed to [`SpriteHandle`]s.
///
/// Handle 0 is reserved for the placeholder returned on a miss.
pub struct SpriteCatalog {
    sheets: HashMap<String, SpriteHandle>,
    textures: HashMap<String, SpriteHandle>,
    next_handle: u32,
}

impl SpriteCatalog {
    pub fn new() -> Self {
        Self {
            sheets: HashMap::new(),
            textures: HashMap::new(),
            next_handle: SpriteHandle::PLACEHOLDER.0 + 1,
        }
    }

    fn allocate(&mut self) -> SpriteHandle {
        let handle = SpriteHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Register a sprite sheet. Registering an existing name returns the cached handle.
    pub fn register_sheet(&mut self, name: &str) -> SpriteHandle {
        if let Some(&handle) = self.sheets.get(name) {
            return handle;
        }
        let handle = self.allocate();
        debug!("Registered sprite sheet '{}' as {:?}", name, handle);
        self.sheets.insert(name.to_string(), handle);
        handle
    }

    pub fn register_texture(&mut self, path: &str) -> SpriteHandle {
        if let Some(&handle) = self.textures.get(path) {
            return handle;
        }
        let handle = self.allocate();
        self.textures.insert(path.to_string(), handle);
        handle
    }

    pub fn sheet(&self, name: &str) -> SpriteHandle {
        match self.sheets.get(name) {
            Some(&handle) => handle,
            None => {
                warn!("Sprite sheet '{}' not found, using placeholder", name);
                SpriteHandle::PLACEHOLDER
            }
        }
    }

    pub fn texture(&self, path: &str) -> SpriteHandle {
        match self.textures.get(path) {
            Some(&handle) => handle,
            None => {
                warn!("Texture '{}' not found, using placeholder", path);
                SpriteHandle::PLACEHOLDER
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sheets.len() + self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SpriteCatalog {
    fn default() -> Self {
        Self::new()
    }
}
