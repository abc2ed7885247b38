//! Image and text export of heat maps and marginals.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::grid::OccupancyGrid;
use crate::inference::Marginals;

use super::PersistenceError;

/// Write the grid's heat map as a plain PPM image.
pub fn write_heat_map<W: Write>(
    writer: &mut W,
    grid: &OccupancyGrid,
) -> Result<(), PersistenceError> {
    let (width, height, pixels) = grid.to_heat_rgb();

    writeln!(writer, "P3 {} {} 255", width, height)?;
    for row in pixels.chunks(width.max(1)) {
        let line: Vec<String> = row
            .iter()
            .map(|[r, g, b]| format!("{} {} {}", r, g, b))
            .collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    Ok(())
}

/// Save the grid's heat map as a plain PPM file.
pub fn save_heat_map(path: &Path, grid: &OccupancyGrid) -> Result<(), PersistenceError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_heat_map(&mut writer, grid)?;
    writer.flush()?;
    log::info!("Saved heat map to {}", path.display());
    Ok(())
}

/// Write marginals as text: `width height`, then one row per line.
pub fn write_marginals<W: Write>(
    writer: &mut W,
    marginals: &Marginals,
) -> Result<(), PersistenceError> {
    writeln!(writer, "{} {}", marginals.width(), marginals.height())?;
    for row in marginals.values().chunks(marginals.width().max(1)) {
        let line: Vec<String> = row.iter().map(|p| p.to_string()).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    Ok(())
}

/// Save marginals as text.
pub fn save_marginals(path: &Path, marginals: &Marginals) -> Result<(), PersistenceError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_marginals(&mut writer, marginals)?;
    writer.flush()?;
    log::info!("Saved marginals to {}", path.display());
    Ok(())
}

/// Save marginals as a binary PGM image (0 = occupied, 255 = free).
pub fn save_marginals_pgm(path: &Path, marginals: &Marginals) -> Result<(), PersistenceError> {
    let (width, height, pixels) = marginals.to_grayscale();

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "P5")?;
    writeln!(writer, "{} {}", width, height)?;
    writeln!(writer, "255")?;
    writer.write_all(&pixels)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pose2D;

    #[test]
    fn test_heat_map_ppm() {
        let mut grid = OccupancyGrid::with_geometry(2.0, 2.0, 1.0).unwrap();
        // Single-cell beam in the center cell (row 1, col 1)
        grid.add_laser(&Pose2D::identity(), 0.5);

        let mut out = Vec::new();
        write_heat_map(&mut out, &grid).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "P3 2 2 255");
        assert_eq!(lines[1], "0 0 255 0 0 255");
        assert_eq!(lines[2], "0 0 255 255 0 0");
    }

    #[test]
    fn test_marginals_text() {
        let marginals = Marginals::new(2, 2, vec![0.0, 0.25, 0.5, 1.0]).unwrap();
        let mut out = Vec::new();
        write_marginals(&mut out, &marginals).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2 2\n0 0.25\n0.5 1\n");
    }

    #[test]
    fn test_save_files() {
        let dir = tempfile::tempdir().unwrap();
        let grid = OccupancyGrid::with_geometry(2.0, 2.0, 1.0).unwrap();
        let marginals = Marginals::filled(2, 2, 0.5);

        let ppm = dir.path().join("heat.ppm");
        let txt = dir.path().join("marginals.txt");
        let pgm = dir.path().join("marginals.pgm");
        save_heat_map(&ppm, &grid).unwrap();
        save_marginals(&txt, &marginals).unwrap();
        save_marginals_pgm(&pgm, &marginals).unwrap();

        let bytes = std::fs::read(&pgm).unwrap();
        assert!(bytes.starts_with(b"P5\n2 2\n255\n"));
        assert_eq!(bytes.len(), b"P5\n2 2\n255\n".len() + 4);
        assert!(std::fs::read_to_string(&ppm).unwrap().starts_with("P3 2 2 255\n"));
    }
}
