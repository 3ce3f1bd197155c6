use std::collections::HashMap;
use std::ops::Deref;

/// Opaque reference to a texture owned by the resource layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(usize);

impl TextureHandle {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

impl Deref for TextureHandle {
    type Target = usize;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Looks textures up by name.
pub trait TextureSource {
    fn texture(&self, name: &str) -> Option<TextureHandle>;
}

/// In-memory name table, enough for tools and tests that don't load images.
#[derive(Debug, Default)]
pub struct TextureTable {
    textures: HashMap<String, TextureHandle>,
}

impl TextureTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) -> TextureHandle {
        let next = TextureHandle::new(self.textures.len());
        *self.textures.entry(name.to_string()).or_insert(next)
    }
}

impl TextureSource for TextureTable {
    fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).copied()
    }
}
