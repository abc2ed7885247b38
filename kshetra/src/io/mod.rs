//! File persistence: laser logs, heat map images and marginals.
//!
//! | File | Format |
//! |------|--------|
//! | laser log | one `x y theta range` line per accepted beam |
//! | heat map | plain PPM (`P3`), red terminal cells on blue |
//! | marginals | `width height` line, then row-major values |
//! | marginals image | binary PGM (`P5`), 0 = occupied, 255 = free |

mod heat_map;
mod laser_log;

pub use heat_map::{
    save_heat_map, save_marginals, save_marginals_pgm, write_heat_map, write_marginals,
};
pub use laser_log::{load_laser_log, read_laser_log, save_laser_log, write_laser_log};

use thiserror::Error;

/// Errors from reading or writing persisted data.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}
