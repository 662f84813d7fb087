use quartz_nbt::{NbtCompound, NbtTag};
use serde::{Deserialize, Serialize};

use crate::bounding_box::BoundingBox;
use crate::document::{self, Document, DocumentError, POSITION, SIZE};

pub const METADATA: &str = "Metadata";

/// The litematic `Metadata` compound fields that describe the region layout.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct Metadata {
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub region_count: Option<i32>,
    pub total_volume: Option<i32>,
    pub enclosing_size: Option<(i32, i32, i32)>,
    pub created: Option<i64>,
    pub modified: Option<i64>,
}

impl Metadata {
    pub fn from_nbt(nbt: &NbtCompound) -> Self {
        let string = |key: &str| nbt.get::<_, &str>(key).ok().map(|s| s.to_string());
        let enclosing_size = nbt
            .get::<_, &NbtCompound>("EnclosingSize")
            .ok()
            .and_then(|size| crate::BlockPosition::from_nbt(size).ok())
            .map(|size| size.to_tuple());

        Metadata {
            name: string("Name"),
            author: string("Author"),
            description: string("Description"),
            region_count: nbt.get::<_, i32>("RegionCount").ok(),
            total_volume: nbt.get::<_, i32>("TotalVolume").ok(),
            enclosing_size,
            created: nbt.get::<_, i64>("TimeCreated").ok(),
            modified: nbt.get::<_, i64>("TimeModified").ok(),
        }
    }

    /// Writes the known fields into `compound`, leaving any other entries
    /// (preview images, block counts) in place.
    pub fn write_into(&self, compound: &mut NbtCompound) {
        if let Some(name) = &self.name {
            compound.insert("Name", NbtTag::String(name.clone()));
        }
        if let Some(author) = &self.author {
            compound.insert("Author", NbtTag::String(author.clone()));
        }
        if let Some(description) = &self.description {
            compound.insert("Description", NbtTag::String(description.clone()));
        }
        if let Some(region_count) = self.region_count {
            compound.insert("RegionCount", NbtTag::Int(region_count));
        }
        if let Some(total_volume) = self.total_volume {
            compound.insert("TotalVolume", NbtTag::Int(total_volume));
        }
        if let Some(size) = self.enclosing_size {
            compound.insert(
                "EnclosingSize",
                NbtTag::Compound(crate::BlockPosition::from_tuple(size).to_nbt()),
            );
        }
        if let Some(created) = self.created {
            compound.insert("TimeCreated", NbtTag::Long(created));
        }
        if let Some(modified) = self.modified {
            compound.insert("TimeModified", NbtTag::Long(modified));
        }
    }
}

/// Recomputes region count, enclosing size and volume of `document` and stamps the
/// modification time, creating the `Metadata` compound if it is absent.
pub fn refresh_metadata(document: &mut Document, modified: chrono::DateTime<chrono::Utc>) -> Result<(), DocumentError> {
    let names = document.region_names()?;
    let mut enclosing: Option<BoundingBox> = None;
    let mut total_volume: u64 = 0;

    for name in &names {
        let region = document.region(name)?;
        let position = document::read_block_position(region, name, POSITION)?;
        let size = document::read_block_position(region, name, SIZE)?;
        let bounds = BoundingBox::from_position_and_size(position.to_tuple(), size.to_tuple());
        if size.x != 0 && size.y != 0 && size.z != 0 {
            total_volume = total_volume.saturating_add(bounds.volume());
        }
        enclosing = Some(match enclosing {
            Some(current) => current.union(&bounds),
            None => bounds,
        });
    }

    let mut metadata = match document.root().get::<_, &NbtCompound>(METADATA) {
        Ok(existing) => Metadata::from_nbt(existing),
        Err(_) => Metadata::default(),
    };
    metadata.region_count = Some(names.len() as i32);
    metadata.total_volume = Some(total_volume.min(i32::MAX as u64) as i32);
    metadata.enclosing_size = Some(enclosing.map_or((0, 0, 0), |bounds| bounds.get_dimensions()));
    metadata.modified = Some(modified.timestamp_millis());

    let root = document.root_mut();
    if !matches!(root.inner().get(METADATA), Some(NbtTag::Compound(_))) {
        root.insert(METADATA, NbtTag::Compound(NbtCompound::new()));
    }
    if let Some(NbtTag::Compound(compound)) = root.inner_mut().get_mut(METADATA) {
        metadata.write_into(compound);
    }
    Ok(())
}
