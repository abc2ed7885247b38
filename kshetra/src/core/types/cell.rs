//! Cell identifiers, binary occupancy values and occupancy assignments.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Row-major index of a grid cell.
///
/// `index = row * width + col`, row 0 at the top of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub usize);

impl CellId {
    /// Raw row-major index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for CellId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Binary occupancy state of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Occupancy {
    /// Empty space (0)
    #[default]
    Free,
    /// Contains an obstacle (1)
    Occupied,
}

impl Occupancy {
    /// Both values in domain order (free first).
    pub const ALL: [Occupancy; 2] = [Occupancy::Free, Occupancy::Occupied];

    /// Numeric value: 0 for free, 1 for occupied.
    #[inline]
    pub fn value(self) -> u8 {
        match self {
            Occupancy::Free => 0,
            Occupancy::Occupied => 1,
        }
    }

    /// The opposite state.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Occupancy::Free => Occupancy::Occupied,
            Occupancy::Occupied => Occupancy::Free,
        }
    }

    #[inline]
    pub fn is_occupied(self) -> bool {
        self == Occupancy::Occupied
    }
}

impl From<bool> for Occupancy {
    fn from(occupied: bool) -> Self {
        if occupied {
            Occupancy::Occupied
        } else {
            Occupancy::Free
        }
    }
}

/// Mapping from cell to occupancy.
///
/// May be partial: cells that were never set read as [`Occupancy::Free`].
/// Factors only look at their own cells, so a partial assignment covering
/// a factor's cells is enough to evaluate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    values: HashMap<CellId, Occupancy>,
}

impl Assignment {
    /// Create an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty assignment with room for `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: HashMap::with_capacity(capacity),
        }
    }

    /// Value of `cell`, free if unset.
    #[inline]
    pub fn get(&self, cell: CellId) -> Occupancy {
        self.values.get(&cell).copied().unwrap_or_default()
    }

    /// Set the value of `cell`.
    #[inline]
    pub fn set(&mut self, cell: CellId, value: Occupancy) {
        self.values.insert(cell, value);
    }

    /// Flip `cell` and return its new value.
    #[inline]
    pub fn flip(&mut self, cell: CellId) -> Occupancy {
        let value = self.get(cell).flipped();
        self.set(cell, value);
        value
    }

    /// Whether `cell` has an explicit value.
    pub fn contains(&self, cell: CellId) -> bool {
        self.values.contains_key(&cell)
    }

    /// Number of explicitly assigned cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of cells assigned [`Occupancy::Occupied`].
    pub fn occupied_count(&self) -> usize {
        self.values.values().filter(|v| v.is_occupied()).count()
    }
}

impl FromIterator<(CellId, Occupancy)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (CellId, Occupancy)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<CellId, Occupancy>> for Assignment {
    fn from(values: HashMap<CellId, Occupancy>) -> Self {
        Self { values }
    }
}
