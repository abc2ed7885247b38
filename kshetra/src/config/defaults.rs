//! Default value functions for serde deserialization.

pub fn extent() -> f64 {
    20.0
}

pub fn resolution() -> f64 {
    0.2
}
