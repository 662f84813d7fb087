mod block_position;
mod bounding_box;
mod print_utils;
mod wasm;
pub mod assembly;
pub mod config;
pub mod document;
pub mod error;
pub mod expression;
pub mod formats;
pub mod metadata;
pub mod placement;

// Public re-exports
pub use assembly::{assemble, assemble_with_limits, AssemblyError, AssemblyLimits};
pub use block_position::BlockPosition;
pub use bounding_box::BoundingBox;
pub use config::{ConfigError, GenerationConfig, GenerationType};
pub use document::{Document, DocumentError};
pub use error::{Error, Result};
pub use expression::{evaluate, Expression, ExpressionError, Variables};
pub use formats::litematic;
pub use placement::{Direction, Placement, PlacementRule};
pub use print_utils::format_document as print_document;
pub use wasm::LitematicWrapper;

/// Decodes a litematic, applies `config` for the requested footprint and encodes the result.
pub fn generate_litematic(data: &[u8], config: &GenerationConfig, target_x: i32, target_z: i32) -> Result<Vec<u8>> {
    let document = litematic::from_litematic(data)?;
    let generated = config.apply(&document, target_x, target_z)?;
    Ok(litematic::to_litematic(&generated)?)
}
