//! Plain-text laser log.
//!
//! One accepted beam per line, whitespace separated:
//!
//! ```text
//! x y theta range
//! ```
//!
//! Blank lines and lines starting with `#` are ignored when reading.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::grid::BeamRecord;

use super::PersistenceError;

/// Write `beams` to `writer`.
pub fn write_laser_log<W: Write>(
    writer: &mut W,
    beams: &[BeamRecord],
) -> Result<(), PersistenceError> {
    for beam in beams {
        writeln!(
            writer,
            "{} {} {} {}",
            beam.x, beam.y, beam.heading, beam.range
        )?;
    }
    Ok(())
}

/// Save `beams` to a file, replacing it.
pub fn save_laser_log(path: &Path, beams: &[BeamRecord]) -> Result<(), PersistenceError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_laser_log(&mut writer, beams)?;
    writer.flush()?;
    log::info!("Saved {} beams to {}", beams.len(), path.display());
    Ok(())
}

/// Parse a laser log.
pub fn read_laser_log<R: BufRead>(reader: R) -> Result<Vec<BeamRecord>, PersistenceError> {
    let mut beams = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields = trimmed
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PersistenceError::Parse {
                line: i + 1,
                message: e.to_string(),
            })?;

        let [x, y, heading, range] = fields[..] else {
            return Err(PersistenceError::Parse {
                line: i + 1,
                message: format!("expected 4 fields, got {}", fields.len()),
            });
        };
        beams.push(BeamRecord {
            x,
            y,
            heading,
            range,
        });
    }

    Ok(beams)
}

/// Load a laser log file.
pub fn load_laser_log(path: &Path) -> Result<Vec<BeamRecord>, PersistenceError> {
    let beams = read_laser_log(BufReader::new(File::open(path)?))?;
    log::debug!("Loaded {} beams from {}", beams.len(), path.display());
    Ok(beams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pose2D;
    use crate::grid::OccupancyGrid;

    #[test]
    fn test_write_format() {
        let beams = [BeamRecord {
            x: 1.5,
            y: -2.0,
            heading: 0.25,
            range: 4.0,
        }];
        let mut out = Vec::new();
        write_laser_log(&mut out, &beams).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1.5 -2 0.25 4\n");
    }

    #[test]
    fn test_grid_beams_survive_file() {
        let mut grid = OccupancyGrid::with_geometry(20.0, 20.0, 0.2).unwrap();
        grid.add_laser(&Pose2D::new(0.1, 0.2, 0.3), 4.5);
        grid.add_laser(&Pose2D::new(-3.0, 1.0, -2.5), 2.25);
        // Dropped: never reaches the log
        grid.add_laser(&Pose2D::new(50.0, 0.0, 0.0), 1.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lasers.lsr");
        save_laser_log(&path, &grid.beams()).unwrap();

        let loaded = load_laser_log(&path).unwrap();
        assert_eq!(loaded, grid.beams());
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = "# x y theta range\n\n0 0 0 1\n  \n1 1 1 2\n";
        let beams = read_laser_log(text.as_bytes()).unwrap();
        assert_eq!(beams.len(), 2);
        assert_eq!(beams[1].range, 2.0);
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = read_laser_log("0 0 0 1\n0 0 x 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { line: 2, .. }));

        let err = read_laser_log("0 0 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_laser_log(Path::new("/nonexistent/lasers.lsr")),
            Err(PersistenceError::Io(_))
        ));
    }
}
