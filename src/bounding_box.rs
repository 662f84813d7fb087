use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: (i32, i32, i32),
    pub max: (i32, i32, i32),
}

impl BoundingBox {
    pub fn new(min: (i32, i32, i32), max: (i32, i32, i32)) -> Self {
        BoundingBox { min, max }
    }

    /// Box covered by a litematic region. A negative size extends from the
    /// position toward smaller coordinates.
    pub fn from_position_and_size(position: (i32, i32, i32), size: (i32, i32, i32)) -> Self {
        fn span(start: i32, extent: i32) -> (i32, i32) {
            let end = match extent {
                0 => start,
                e if e > 0 => start.saturating_add(e - 1),
                e => start.saturating_add(e + 1),
            };
            (start.min(end), start.max(end))
        }

        let (min_x, max_x) = span(position.0, size.0);
        let (min_y, max_y) = span(position.1, size.1);
        let (min_z, max_z) = span(position.2, size.2);
        BoundingBox::new((min_x, min_y, min_z), (max_x, max_y, max_z))
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: (
                self.min.0.min(other.min.0),
                self.min.1.min(other.min.1),
                self.min.2.min(other.min.2),
            ),
            max: (
                self.max.0.max(other.max.0),
                self.max.1.max(other.max.1),
                self.max.2.max(other.max.2),
            ),
        }
    }

    /// Extent along each axis, saturating at `i32::MAX` for boxes wider than an
    /// NBT int can describe.
    pub fn get_dimensions(&self) -> (i32, i32, i32) {
        fn extent(min: i32, max: i32) -> i32 {
            (max as i64 - min as i64 + 1).min(i32::MAX as i64) as i32
        }

        (
            extent(self.min.0, self.max.0),
            extent(self.min.1, self.max.1),
            extent(self.min.2, self.max.2),
        )
    }

    pub fn volume(&self) -> u64 {
        let (width, height, length) = self.get_dimensions();
        (width as u64).saturating_mul(height as u64).saturating_mul(length as u64)
    }
}
