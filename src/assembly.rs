//! Region assembly: builds an enlarged schematic by cloning unit regions of a base
//! document according to a list of [`PlacementRule`]s.
//!
//! The base document is only ever borrowed. Every placed region is a deep copy of
//! the untouched template, so no generated region shares state with another one or
//! with the base.

use quartz_nbt::{NbtCompound, NbtTag};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::document::{self, Document, DocumentError, POSITION, SIZE};
use crate::expression::{ExpressionError, Variables};
use crate::placement::{Axis, Cursor, Placement, PlacementRule};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("rule {rule}: position expression failed: {source}")]
    Expression {
        rule: usize,
        #[source]
        source: ExpressionError,
    },
    #[error("rule {rule}: region '{region}' has zero size along {axis}, cannot tile")]
    ZeroStep {
        rule: usize,
        region: String,
        axis: Axis,
    },
    #[error("rule {rule}: {count} tiles exceed the limit of {limit} per rule")]
    TileLimitExceeded { rule: usize, count: u64, limit: u64 },
    #[error("generated region count exceeds the limit of {limit}")]
    RegionLimitExceeded { limit: u64 },
    #[error("rule {rule}: region '{key}' would be placed outside the block coordinate range")]
    PositionOutOfRange { rule: usize, key: String },
}

pub type Result<T> = std::result::Result<T, AssemblyError>;

/// Upper bounds on the work a single assembly may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssemblyLimits {
    pub max_tiles_per_rule: Option<u64>,
    pub max_regions: Option<u64>,
}

impl Default for AssemblyLimits {
    fn default() -> Self {
        AssemblyLimits {
            max_tiles_per_rule: Some(1024),
            max_regions: Some(16384),
        }
    }
}

impl AssemblyLimits {
    pub fn unbounded() -> Self {
        AssemblyLimits {
            max_tiles_per_rule: None,
            max_regions: None,
        }
    }

    fn check_tiles(&self, rule: usize, count: u64) -> Result<()> {
        match self.max_tiles_per_rule {
            Some(limit) if count > limit => Err(AssemblyError::TileLimitExceeded { rule, count, limit }),
            _ => Ok(()),
        }
    }

    fn check_regions(&self, count: u64) -> Result<()> {
        match self.max_regions {
            Some(limit) if count > limit => Err(AssemblyError::RegionLimitExceeded { limit }),
            _ => Ok(()),
        }
    }
}

/// Generates a new document from `base` with no limits on the amount of tiles.
///
/// `target_x` and `target_z` are expected to be positive; non-positive values are
/// not rejected here and simply lead to the minimum of one tile per tiled rule.
pub fn assemble(base: &Document, rules: &[PlacementRule], target_x: i32, target_z: i32) -> Result<Document> {
    assemble_with_limits(base, rules, target_x, target_z, &AssemblyLimits::unbounded())
}

pub fn assemble_with_limits(
    base: &Document,
    rules: &[PlacementRule],
    target_x: i32,
    target_z: i32,
    limits: &AssemblyLimits,
) -> Result<Document> {
    let variables = Variables::new(target_x, target_z);
    let mut generated = Generated::new(limits);

    for (index, rule) in rules.iter().enumerate() {
        let template = base.region(&rule.source_name)?;
        let mut cursor = rule
            .evaluate_position(&variables)
            .map_err(|source| AssemblyError::Expression { rule: index, source })?;

        match rule.placement {
            Placement::Single => {
                let key = generated.next_sequence_key();
                generated.place(index, key, template, &cursor)?;
            }
            Placement::Tiled(direction) => {
                let axis = direction.axis();
                let step = tile_step(template, index, &rule.source_name, axis)?;
                let target = match axis {
                    Axis::X => variables.target_x,
                    Axis::Z => variables.target_z,
                };
                let count = tile_count(target, cursor.get(axis), step);
                limits.check_tiles(index, count)?;
                debug!(
                    rule = index,
                    source = %rule.source_name,
                    %direction,
                    step,
                    count,
                    "tiling region"
                );

                for iteration in 0..count {
                    generated.place(index, format!("{}_{}", index, iteration), template, &cursor)?;
                    cursor.advance(direction, step as f64);
                }
            }
        }
    }

    let regions = generated.finish();
    info!(
        rules = rules.len(),
        regions = regions.inner().len(),
        target_x,
        target_z,
        "assembled document"
    );
    // Only generated regions are attached, so none of the base templates survive.
    Ok(base.with_regions(regions))
}

/// Number of clones a tiled rule places: how many whole steps fit between the
/// cursor and the target, but never less than one.
pub fn tile_count(target: f64, cursor: f64, step: u32) -> u64 {
    let fitting = ((target - cursor) / step as f64).floor();
    if fitting >= 1.0 {
        fitting as u64
    } else {
        if fitting < 0.0 {
            warn!(target_axis = target, cursor, step, "cursor lies beyond the target, placing a single tile");
        }
        1
    }
}

fn tile_step(template: &NbtCompound, rule: usize, region: &str, axis: Axis) -> Result<u32> {
    let size = document::read_block_position(template, region, SIZE)?;
    match size.get(axis).unsigned_abs() {
        0 => Err(AssemblyError::ZeroStep {
            rule,
            region: region.to_string(),
            axis,
        }),
        step => Ok(step),
    }
}

struct Generated<'a> {
    regions: NbtCompound,
    sequence: u64,
    placed: u64,
    limits: &'a AssemblyLimits,
}

impl<'a> Generated<'a> {
    fn new(limits: &'a AssemblyLimits) -> Self {
        Generated {
            regions: NbtCompound::new(),
            sequence: 0,
            placed: 0,
            limits,
        }
    }

    fn next_sequence_key(&mut self) -> String {
        let key = self.sequence.to_string();
        self.sequence += 1;
        key
    }

    fn place(&mut self, rule: usize, key: String, template: &NbtCompound, cursor: &Cursor) -> Result<()> {
        self.placed += 1;
        self.limits.check_regions(self.placed)?;

        let position = match cursor.to_block_position() {
            Some(position) => position,
            None => return Err(AssemblyError::PositionOutOfRange { rule, key }),
        };
        let mut region = template.clone();
        document::write_block_position(&mut region, POSITION, position);
        debug!(key = %key, x = position.x, y = position.y, z = position.z, "placed region");
        self.regions.insert(key, NbtTag::Compound(region));
        Ok(())
    }

    fn finish(self) -> NbtCompound {
        self.regions
    }
}
