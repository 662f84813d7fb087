//! The generation configuration stored alongside a shared schematic.
//!
//! ```json
//! {
//!   "type": 1,
//!   "config": [
//!     { "sourceName": "unit", "position": ["0", "0", "0"], "generate": true, "direction": "+x" },
//!     { "sourceName": "cap", "position": ["targetX", "0", 0], "generate": false }
//!   ],
//!   "limits": { "maxTilesPerRule": 256 }
//! }
//! ```
//!
//! Rules are validated when the configuration is loaded: directions become
//! [`Direction`] values and position expressions are parsed up front.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assembly::{self, AssemblyLimits};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::expression::{Expression, ExpressionError};
use crate::metadata;
use crate::placement::{Direction, Placement, PlacementRule};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid generation config: {0}")]
    Invalid(String),
    #[error("unknown generation type {0}, expected 0 or 1")]
    UnknownType(i64),
    #[error("rule {rule}: position needs 3 components, got {found}")]
    PositionArity { rule: usize, found: usize },
    #[error("rule {rule}: {source}")]
    Expression {
        rule: usize,
        #[source]
        source: ExpressionError,
    },
    #[error("rule {rule}: generated rules need a direction")]
    MissingDirection { rule: usize },
    #[error("rule {rule}: {reason}")]
    InvalidDirection { rule: usize, reason: String },
    #[error("rule {rule}: empty source region name")]
    EmptySourceName { rule: usize },
}

/// Whether a schematic supports resizing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationType {
    /// Served as uploaded.
    Static,
    /// Regions are tiled to a requested footprint.
    Tiling,
}

impl TryFrom<i64> for GenerationType {
    type Error = ConfigError;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(GenerationType::Static),
            1 => Ok(GenerationType::Tiling),
            other => Err(ConfigError::UnknownType(other)),
        }
    }
}

/// A position component: an expression or a plain number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    Number(f64),
    Expression(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlacementRule {
    source_name: String,
    position: Vec<RawCoordinate>,
    #[serde(default)]
    generate: bool,
    #[serde(default)]
    direction: Option<String>,
}

/// Unvalidated form of [`GenerationConfig`] as it appears in JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGenerationConfig {
    #[serde(rename = "type")]
    kind: i64,
    #[serde(default)]
    config: Vec<RawPlacementRule>,
    #[serde(default)]
    limits: Option<AssemblyLimits>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawGenerationConfig")]
pub struct GenerationConfig {
    pub kind: GenerationType,
    pub rules: Vec<PlacementRule>,
    pub limits: AssemblyLimits,
}

impl TryFrom<RawGenerationConfig> for GenerationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawGenerationConfig) -> std::result::Result<Self, Self::Error> {
        let kind = GenerationType::try_from(raw.kind)?;
        let rules = raw
            .config
            .into_iter()
            .enumerate()
            .map(|(index, rule)| rule_from_raw(index, rule))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(GenerationConfig {
            kind,
            rules,
            limits: raw.limits.unwrap_or_default(),
        })
    }
}

fn rule_from_raw(index: usize, raw: RawPlacementRule) -> std::result::Result<PlacementRule, ConfigError> {
    if raw.source_name.is_empty() {
        return Err(ConfigError::EmptySourceName { rule: index });
    }

    let components = raw
        .position
        .iter()
        .map(|coordinate| match coordinate {
            RawCoordinate::Number(value) => Ok(Expression::constant(*value)),
            RawCoordinate::Expression(source) => Expression::parse(source),
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| ConfigError::Expression { rule: index, source })?;
    let position: [Expression; 3] = components
        .try_into()
        .map_err(|found: Vec<Expression>| ConfigError::PositionArity {
            rule: index,
            found: found.len(),
        })?;

    let placement = if raw.generate {
        let token = raw
            .direction
            .ok_or(ConfigError::MissingDirection { rule: index })?;
        let direction = token
            .parse::<Direction>()
            .map_err(|reason| ConfigError::InvalidDirection { rule: index, reason })?;
        Placement::Tiled(direction)
    } else {
        Placement::Single
    };

    Ok(PlacementRule {
        source_name: raw.source_name,
        position,
        placement,
    })
}

impl GenerationConfig {
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> std::result::Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn is_generative(&self) -> bool {
        self.kind == GenerationType::Tiling
    }

    /// Produces the document to serve for a requested footprint.
    ///
    /// Static schematics come back unchanged. Generative ones are assembled under
    /// the configured limits and get their metadata refreshed.
    pub fn apply(&self, document: &Document, target_x: i32, target_z: i32) -> Result<Document> {
        if !self.is_generative() {
            debug!("generation disabled, serving document unmodified");
            return Ok(document.clone());
        }
        if target_x <= 0 || target_z <= 0 {
            return Err(Error::InvalidFootprint { target_x, target_z });
        }

        let mut generated = assembly::assemble_with_limits(document, &self.rules, target_x, target_z, &self.limits)?;
        metadata::refresh_metadata(&mut generated, chrono::Utc::now())?;
        info!(target_x, target_z, rules = self.rules.len(), "generated schematic");
        Ok(generated)
    }
}
