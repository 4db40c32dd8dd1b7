//! Texture indexer
//!
//! Maps texture identity to its position in the project's texture list. A
//! fresh indexer is built for every compilation.

use hashbrown::HashMap;
use hephaestus_shared::formats::Texture;

use crate::scene::{SourceTexture, TextureId};

#[derive(Debug, Clone, Default)]
pub struct TextureIndexer {
    indices: HashMap<TextureId, u32>,
}

impl TextureIndexer {
    /// Index `textures` by declaration order
    ///
    /// If an id is declared twice the first position wins.
    pub fn new(textures: &[SourceTexture]) -> Self {
        let mut indices = HashMap::with_capacity(textures.len());
        for (index, texture) in textures.iter().enumerate() {
            indices.entry(texture.id.clone()).or_insert(index as u32);
        }
        Self { indices }
    }

    /// Position of `id` in the texture list, `None` if it was never declared
    pub fn index_of(&self, id: &TextureId) -> Option<u32> {
        self.indices.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Document texture list, same order as the indexer
pub fn collect_textures(textures: &[SourceTexture]) -> Vec<Texture> {
    textures
        .iter()
        .map(|texture| Texture {
            name: texture.name.clone(),
            source: texture.source.clone(),
        })
        .collect()
}
