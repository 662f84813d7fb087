use quartz_nbt::{NbtCompound, NbtTag};
use thiserror::Error;

use crate::block_position::BlockPosition;

pub const REGIONS: &str = "Regions";
pub const POSITION: &str = "Position";
pub const SIZE: &str = "Size";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("document has no 'Regions' compound")]
    MissingRegions,
    #[error("region '{0}' not found")]
    MissingRegion(String),
    #[error("region '{0}' is not a compound")]
    NotACompound(String),
    #[error("region '{region}' has an invalid '{field}': {reason}")]
    InvalidField {
        region: String,
        field: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, DocumentError>;

/// A schematic tree as produced by the codec.
///
/// The root compound is kept as-is; only `Regions` and the `Position`/`Size` of
/// individual regions are ever interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root_name: String,
    root: NbtCompound,
}

impl Default for Document {
    fn default() -> Self {
        let mut root = NbtCompound::new();
        root.insert(REGIONS, NbtTag::Compound(NbtCompound::new()));
        Document::new(root)
    }
}

impl Document {
    pub fn new(root: NbtCompound) -> Self {
        Document::with_root_name(String::new(), root)
    }

    pub fn with_root_name(root_name: String, root: NbtCompound) -> Self {
        Document { root_name, root }
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn root(&self) -> &NbtCompound {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut NbtCompound {
        &mut self.root
    }

    pub fn into_parts(self) -> (String, NbtCompound) {
        (self.root_name, self.root)
    }

    pub fn regions(&self) -> Result<&NbtCompound> {
        match self.root.inner().get(REGIONS) {
            Some(NbtTag::Compound(regions)) => Ok(regions),
            _ => Err(DocumentError::MissingRegions),
        }
    }

    pub fn regions_mut(&mut self) -> Result<&mut NbtCompound> {
        match self.root.inner_mut().get_mut(REGIONS) {
            Some(NbtTag::Compound(regions)) => Ok(regions),
            _ => Err(DocumentError::MissingRegions),
        }
    }

    pub fn region(&self, name: &str) -> Result<&NbtCompound> {
        match self.regions()?.inner().get(name) {
            Some(NbtTag::Compound(region)) => Ok(region),
            Some(_) => Err(DocumentError::NotACompound(name.to_string())),
            None => Err(DocumentError::MissingRegion(name.to_string())),
        }
    }

    pub fn has_region(&self, name: &str) -> bool {
        self.region(name).is_ok()
    }

    /// Region names in lexical order, independent of the map's iteration order.
    pub fn region_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.regions()?.inner().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub fn region_count(&self) -> Result<usize> {
        Ok(self.regions()?.inner().len())
    }

    pub fn insert_region(&mut self, name: &str, region: NbtCompound) -> Result<()> {
        self.regions_mut()?.insert(name, NbtTag::Compound(region));
        Ok(())
    }

    pub fn remove_region(&mut self, name: &str) -> Result<Option<NbtCompound>> {
        match self.regions_mut()?.inner_mut().remove(name) {
            Some(NbtTag::Compound(region)) => Ok(Some(region)),
            Some(_) | None => Ok(None),
        }
    }

    /// Copies everything but `Regions` from this document and attaches `regions` instead.
    pub fn with_regions(&self, regions: NbtCompound) -> Document {
        let mut root = NbtCompound::new();
        for (key, value) in self.root.inner().iter() {
            if key != REGIONS {
                root.insert(key, value.clone());
            }
        }
        root.insert(REGIONS, NbtTag::Compound(regions));
        Document::with_root_name(self.root_name.clone(), root)
    }

    pub fn region_position(&self, name: &str) -> Result<BlockPosition> {
        read_block_position(self.region(name)?, name, POSITION)
    }

    pub fn region_size(&self, name: &str) -> Result<BlockPosition> {
        read_block_position(self.region(name)?, name, SIZE)
    }
}

/// Reads the `{x, y, z}` child `field` of a region compound.
pub fn read_block_position(region: &NbtCompound, region_name: &str, field: &'static str) -> Result<BlockPosition> {
    let invalid = |reason: String| DocumentError::InvalidField {
        region: region_name.to_string(),
        field,
        reason,
    };

    match region.inner().get(field) {
        Some(NbtTag::Compound(compound)) => BlockPosition::from_nbt(compound).map_err(invalid),
        Some(_) => Err(invalid("not a compound".to_string())),
        None => Err(invalid("missing".to_string())),
    }
}

/// Replaces the `{x, y, z}` child `field` of a region compound.
pub fn write_block_position(region: &mut NbtCompound, field: &'static str, position: BlockPosition) {
    region.insert(field, NbtTag::Compound(position.to_nbt()));
}


#[cfg(test)]
mod tests {
    use super::test_support::{document, region};
    use super::*;

    #[test]
    fn test_region_lookup() {
        let doc = document(&[("unit", region((1, 2, 3), (16, 8, -16)))]);

        assert!(doc.has_region("unit"));
        assert_eq!(doc.region_position("unit").unwrap(), BlockPosition::new(1, 2, 3));
        assert_eq!(doc.region_size("unit").unwrap(), BlockPosition::new(16, 8, -16));
        assert_eq!(
            doc.region("missing").unwrap_err(),
            DocumentError::MissingRegion("missing".to_string())
        );
    }

    #[test]
    fn test_missing_regions_compound() {
        let doc = Document::new(NbtCompound::new());
        assert_eq!(doc.regions().unwrap_err(), DocumentError::MissingRegions);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut doc = Document::default();
        doc.insert_region("b", region((0, 0, 0), (1, 1, 1))).unwrap();
        doc.insert_region("a", region((0, 0, 0), (1, 1, 1))).unwrap();
        assert_eq!(doc.region_names().unwrap(), vec!["a".to_string(), "b".to_string()]);

        assert!(doc.remove_region("a").unwrap().is_some());
        assert!(doc.remove_region("a").unwrap().is_none());
        assert_eq!(doc.region_count().unwrap(), 1);
    }

    #[test]
    fn test_with_regions_keeps_other_root_fields() {
        let doc = document(&[("unit", region((0, 0, 0), (2, 2, 2)))]);
        let replaced = doc.with_regions(NbtCompound::new());

        assert_eq!(replaced.region_count().unwrap(), 0);
        assert_eq!(replaced.root().get::<_, i32>("Version").unwrap(), 6);
        assert!(replaced.root().get::<_, &NbtCompound>("Metadata").is_ok());
        assert!(doc.has_region("unit"));
    }

    #[test]
    fn test_invalid_size_field() {
        let mut unit = region((0, 0, 0), (1, 1, 1));
        unit.insert(SIZE, NbtTag::Int(4));
        let doc = document(&[("unit", unit)]);

        assert!(matches!(
            doc.region_size("unit"),
            Err(DocumentError::InvalidField { field: SIZE, .. })
        ));
    }
}
