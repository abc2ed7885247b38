//! Per-cell occupancy estimates.

use serde::{Deserialize, Serialize};

use crate::core::{Assignment, CellId, Occupancy};
use crate::error::{GridError, Result};

/// Row-major `width × height` occupancy probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marginals {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Marginals {
    /// Wrap `values`; the length must be `width * height`.
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != width * height {
            return Err(GridError::InvalidConfig(format!(
                "{} marginals for a {}x{} grid",
                values.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Probability that `cell` is occupied.
    pub fn get(&self, cell: CellId) -> Option<f64> {
        self.values.get(cell.index()).copied()
    }

    /// Values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn set(&mut self, cell: CellId, value: f64) {
        if let Some(slot) = self.values.get_mut(cell.index()) {
            *slot = value;
        }
    }

    /// Threshold at `threshold`: cells at or above it are occupied.
    pub fn to_assignment(&self, threshold: f64) -> Assignment {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &p)| (CellId(i), Occupancy::from(p >= threshold)))
            .collect()
    }

    /// Mean absolute difference to `other`, `None` if the shapes differ.
    pub fn mean_abs_diff(&self, other: &Marginals) -> Option<f64> {
        if self.width != other.width || self.height != other.height || self.values.is_empty() {
            return None;
        }
        let sum: f64 = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (a - b).abs())
            .sum();
        Some(sum / self.values.len() as f64)
    }

    /// Export as grayscale image data.
    ///
    /// Returns (width, height, pixels) where pixels are 0-255 grayscale values.
    /// 0 = occupied, 255 = free
    pub fn to_grayscale(&self) -> (usize, usize, Vec<u8>) {
        let pixels = self
            .values
            .iter()
            .map(|&p| ((1.0 - p.clamp(0.0, 1.0)) * 255.0).round() as u8)
            .collect();
        (self.width, self.height, pixels)
    }
}
