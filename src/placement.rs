use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::expression::{self, Expression, Variables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Z => f.write_str("z"),
        }
    }
}

/// Axis and sign along which a tiled rule advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    PositiveX,
    NegativeX,
    PositiveZ,
    NegativeZ,
}

impl Direction {
    pub fn axis(&self) -> Axis {
        match self {
            Direction::PositiveX | Direction::NegativeX => Axis::X,
            Direction::PositiveZ | Direction::NegativeZ => Axis::Z,
        }
    }

    pub fn sign(&self) -> f64 {
        match self {
            Direction::PositiveX | Direction::PositiveZ => 1.0,
            Direction::NegativeX | Direction::NegativeZ => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::PositiveX => "+x",
            Direction::NegativeX => "-x",
            Direction::PositiveZ => "+z",
            Direction::NegativeZ => "-z",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+x" => Ok(Direction::PositiveX),
            "-x" => Ok(Direction::NegativeX),
            "+z" => Ok(Direction::PositiveZ),
            "-z" => Ok(Direction::NegativeZ),
            other => Err(format!("Unknown direction '{}', expected one of +x, -x, +z, -z", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Exactly one clone at the evaluated position.
    Single,
    /// Clones repeated along the direction until the target footprint is covered.
    Tiled(Direction),
}

/// How one source region is cloned and positioned in the generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRule {
    pub source_name: String,
    pub position: [Expression; 3],
    pub placement: Placement,
}

impl PlacementRule {
    pub fn new(source_name: &str, position: [&str; 3], placement: Placement) -> expression::Result<Self> {
        Ok(PlacementRule {
            source_name: source_name.to_string(),
            position: [
                Expression::parse(position[0])?,
                Expression::parse(position[1])?,
                Expression::parse(position[2])?,
            ],
            placement,
        })
    }

    pub fn single(source_name: &str, position: [&str; 3]) -> expression::Result<Self> {
        Self::new(source_name, position, Placement::Single)
    }

    pub fn tiled(source_name: &str, position: [&str; 3], direction: Direction) -> expression::Result<Self> {
        Self::new(source_name, position, Placement::Tiled(direction))
    }

    /// Evaluates the anchor of this rule. The returned cursor belongs to the caller.
    pub fn evaluate_position(&self, variables: &Variables) -> expression::Result<Cursor> {
        Ok(Cursor([
            self.position[0].evaluate(variables)?,
            self.position[1].evaluate(variables)?,
            self.position[2].evaluate(variables)?,
        ]))
    }
}

/// Live coordinate of a rule while its clones are being placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor(pub [f64; 3]);

impl Cursor {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.0[0],
            Axis::Z => self.0[2],
        }
    }

    pub fn advance(&mut self, direction: Direction, step: f64) {
        let index = match direction.axis() {
            Axis::X => 0,
            Axis::Z => 2,
        };
        self.0[index] += direction.sign() * step;
    }

    /// Block coordinates of the cursor, truncated toward zero. `None` when a
    /// component does not fit in an `i32`.
    pub fn to_block_position(&self) -> Option<crate::BlockPosition> {
        fn block(value: f64) -> Option<i32> {
            let value = value.trunc();
            if value >= i32::MIN as f64 && value <= i32::MAX as f64 {
                Some(value as i32)
            } else {
                None
            }
        }

        Some(crate::BlockPosition::new(block(self.0[0])?, block(self.0[1])?, block(self.0[2])?))
    }
}
