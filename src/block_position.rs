use wasm_bindgen::prelude::*;
use serde::{Serialize, Deserialize};
use quartz_nbt::{NbtCompound, NbtTag};

use crate::placement::Axis;

#[wasm_bindgen]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[wasm_bindgen]
impl BlockPosition {
    #[wasm_bindgen(constructor)]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        BlockPosition { x, y, z }
    }
}

impl BlockPosition {
    pub fn to_tuple(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }

    pub fn from_tuple(tuple: (i32, i32, i32)) -> Self {
        BlockPosition::new(tuple.0, tuple.1, tuple.2)
    }

    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Z => self.z,
        }
    }

    /// Reads an `{x, y, z}` compound. Byte and short components are widened like ints.
    pub fn from_nbt(compound: &NbtCompound) -> Result<Self, String> {
        let component = |name: &str| match compound.inner().get(name) {
            Some(NbtTag::Int(v)) => Ok(*v),
            Some(NbtTag::Short(v)) => Ok(*v as i32),
            Some(NbtTag::Byte(v)) => Ok(*v as i32),
            Some(_) => Err(format!("Component '{}' is not an integer", name)),
            None => Err(format!("Missing component '{}'", name)),
        };

        Ok(BlockPosition {
            x: component("x")?,
            y: component("y")?,
            z: component("z")?,
        })
    }

    pub fn to_nbt(&self) -> NbtCompound {
        let mut compound = NbtCompound::new();
        compound.insert("x", NbtTag::Int(self.x));
        compound.insert("y", NbtTag::Int(self.y));
        compound.insert("z", NbtTag::Int(self.z));
        compound
    }
}
