use thiserror::Error;

use crate::assembly::AssemblyError;
use crate::config::ConfigError;
use crate::document::DocumentError;
use crate::expression::ExpressionError;
use crate::formats::litematic::FormatError;

/// Unified error for the bytes-to-bytes generation pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("target footprint must be positive, got {target_x}x{target_z}")]
    InvalidFootprint { target_x: i32, target_z: i32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

pub type Result<T> = std::result::Result<T, Error>;
