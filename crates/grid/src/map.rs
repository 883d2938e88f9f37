use std::path::{Path, PathBuf};

use blocky_common::CellCoord;
use image::RgbaImage;

use crate::palette::MapPalette;

/// Classification of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Solid,
    /// Walkable cell where the player starts.
    SpawnMarker,
}

impl Cell {
    pub fn is_solid(self) -> bool {
        matches!(self, Cell::Solid)
    }
}

/// Errors from loading a map. All of them are fatal to startup.
#[derive(Debug, thiserror::Error)]
pub enum MapLoadError {
    #[error("failed to load map image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to read map file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("map has no cells")]
    Empty,
    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// What a source pixel (or text glyph) stands for.
enum Marker {
    Wall,
    Spawn,
    Floor,
}

/// Immutable occupancy grid, stored row-major (`[z][x]`).
///
/// World coordinates map one-to-one onto cells: the cell `(x, z)` covers
/// `[x, x + 1) × [z, z + 1)` on the XZ plane.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    spawn: Option<CellCoord>,
}

impl GridMap {
    /// Load a map from disk.
    ///
    /// `.txt` files are read as text maps (see [`GridMap::from_ascii`]);
    /// anything else is decoded as an image.
    pub fn load(path: impl AsRef<Path>, palette: &MapPalette) -> Result<Self, MapLoadError> {
        let path = path.as_ref();
        let is_text = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

        let grid = if is_text {
            let text = std::fs::read_to_string(path).map_err(|source| MapLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let rows: Vec<&str> = text
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .collect();
            Self::from_ascii(&rows)?
        } else {
            let img = image::open(path).map_err(|source| MapLoadError::Image {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_image(&img.to_rgba8(), palette)?
        };

        tracing::info!(
            path = %path.display(),
            width = grid.width,
            height = grid.height,
            solid = grid.solid_count(),
            spawn = ?grid.spawn_point(),
            "map loaded"
        );
        Ok(grid)
    }

    /// Build a grid from decoded pixels.
    ///
    /// Pixel `(x, y)` of the image becomes cell `(x, z = y)`.
    pub fn from_image(image: &RgbaImage, palette: &MapPalette) -> Result<Self, MapLoadError> {
        let (width, height) = image.dimensions();
        Self::from_markers(width as usize, height as usize, |x, z| {
            let pixel = image.get_pixel(x as u32, z as u32).0;
            if pixel == palette.wall {
                Marker::Wall
            } else if pixel == palette.spawn {
                Marker::Spawn
            } else {
                Marker::Floor
            }
        })
    }

    /// Build a grid from text rows: `#` is a wall, `S` the spawn, anything
    /// else floor. Every row must have the same number of characters.
    pub fn from_ascii<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapLoadError> {
        let grid: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
        let width = grid.first().map_or(0, Vec::len);
        if let Some((row, line)) = grid.iter().enumerate().find(|(_, l)| l.len() != width) {
            return Err(MapLoadError::RaggedRow {
                row,
                expected: width,
                found: line.len(),
            });
        }

        Self::from_markers(width, grid.len(), |x, z| match grid[z][x] {
            '#' => Marker::Wall,
            'S' => Marker::Spawn,
            _ => Marker::Floor,
        })
    }

    fn from_markers(
        width: usize,
        height: usize,
        marker_at: impl Fn(usize, usize) -> Marker,
    ) -> Result<Self, MapLoadError> {
        if width == 0 || height == 0 {
            return Err(MapLoadError::Empty);
        }

        let mut cells = vec![Cell::Empty; width * height];
        let mut spawn = None;
        for z in 0..height {
            for x in 0..width {
                match marker_at(x, z) {
                    Marker::Wall => cells[z * width + x] = Cell::Solid,
                    // Last spawn pixel in scan order wins.
                    Marker::Spawn => spawn = Some(CellCoord::new(x as i32, z as i32)),
                    Marker::Floor => {}
                }
            }
        }

        match spawn {
            Some(s) => cells[s.z as usize * width + s.x as usize] = Cell::SpawnMarker,
            None => tracing::warn!("map has no spawn marker, spawning in cell (0, 0)"),
        }

        Ok(Self {
            width,
            height,
            cells,
            spawn,
        })
    }

    /// Number of columns (X extent).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows (Z extent).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw cell lookup. `None` outside the map.
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        if coord.x < 0 || coord.z < 0 {
            return None;
        }
        let (x, z) = (coord.x as usize, coord.z as usize);
        if x >= self.width || z >= self.height {
            return None;
        }
        Some(self.cells[z * self.width + x])
    }

    /// Whether the world-space point `(x, z)` lies in a solid cell.
    ///
    /// Coordinates are floored to cell indices. Everything outside the map
    /// counts as solid.
    pub fn is_solid(&self, x: f32, z: f32) -> bool {
        self.is_solid_cell(CellCoord::containing(x, z))
    }

    pub fn is_solid_cell(&self, coord: CellCoord) -> bool {
        self.cell(coord).is_none_or(Cell::is_solid)
    }

    /// Spawn cell, `(0, 0)` when the map has no marker.
    pub fn spawn_point(&self) -> CellCoord {
        self.spawn.unwrap_or(CellCoord::new(0, 0))
    }

    pub fn has_spawn_marker(&self) -> bool {
        self.spawn.is_some()
    }

    /// Lazily iterate solid cells in row-major order. Call again to restart.
    pub fn solid_cells(&self) -> SolidCells<'_> {
        SolidCells {
            grid: self,
            index: 0,
        }
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_solid()).count()
    }
}

/// Iterator over the coordinates of every solid cell.
#[derive(Debug, Clone)]
pub struct SolidCells<'a> {
    grid: &'a GridMap,
    index: usize,
}

impl Iterator for SolidCells<'_> {
    type Item = CellCoord;

    fn next(&mut self) -> Option<CellCoord> {
        while self.index < self.grid.cells.len() {
            let i = self.index;
            self.index += 1;
            if self.grid.cells[i].is_solid() {
                let width = self.grid.width;
                return Some(CellCoord::new((i % width) as i32, (i / width) as i32));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.grid.cells.len() - self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const FLOOR: [u8; 4] = [0, 0, 0, 255];

    fn image_from(rows: &[&str]) -> RgbaImage {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        RgbaImage::from_fn(width, height, |x, y| {
            match rows[y as usize].as_bytes()[x as usize] {
                b'#' => Rgba(MapPalette::WHITE),
                b'S' => Rgba(MapPalette::RED),
                b'g' => Rgba([0, 255, 0, 255]),
                _ => Rgba(FLOOR),
            }
        })
    }

    #[test]
    fn wall_pixels_become_solid() {
        let img = image_from(&["#.#", ".g.", "##."]);
        let grid = GridMap::from_image(&img, &MapPalette::default()).unwrap();

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        for z in 0..3 {
            for x in 0..3 {
                let expected = img.get_pixel(x, z).0 == MapPalette::WHITE;
                assert_eq!(
                    grid.is_solid(x as f32 + 0.5, z as f32 + 0.5),
                    expected,
                    "cell ({x}, {z})"
                );
            }
        }
        assert_eq!(grid.solid_count(), 4);
    }

    #[test]
    fn alpha_is_part_of_the_colour() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 0]));
        let grid = GridMap::from_image(&img, &MapPalette::default()).unwrap();
        assert!(!grid.is_solid(0.5, 0.5));
    }

    #[test]
    fn out_of_bounds_is_solid() {
        let grid = GridMap::from_ascii(&["..", ".."]).unwrap();
        assert!(!grid.is_solid(0.0, 0.0));
        assert!(!grid.is_solid(1.99, 1.99));
        assert!(grid.is_solid(-0.01, 0.5));
        assert!(grid.is_solid(0.5, -0.01));
        assert!(grid.is_solid(2.0, 0.5));
        assert!(grid.is_solid(0.5, 2.0));
        assert!(grid.is_solid(1.0e9, 0.5));
        assert!(grid.cell(CellCoord::new(2, 0)).is_none());
    }

    #[test]
    fn spawn_defaults_to_origin() {
        let grid = GridMap::from_ascii(&["..", ".#"]).unwrap();
        assert!(!grid.has_spawn_marker());
        assert_eq!(grid.spawn_point(), CellCoord::new(0, 0));
    }

    #[test]
    fn last_spawn_wins() {
        let grid = GridMap::from_ascii(&["S..", "..S"]).unwrap();
        assert_eq!(grid.spawn_point(), CellCoord::new(2, 1));
        assert_eq!(grid.cell(CellCoord::new(2, 1)), Some(Cell::SpawnMarker));
        assert_eq!(grid.cell(CellCoord::new(0, 0)), Some(Cell::Empty));
    }

    #[test]
    fn spawn_cell_is_walkable() {
        let img = image_from(&["#S"]);
        let grid = GridMap::from_image(&img, &MapPalette::default()).unwrap();
        assert_eq!(grid.spawn_point(), CellCoord::new(1, 0));
        assert!(!grid.is_solid(1.5, 0.5));
    }

    #[test]
    fn custom_palette() {
        let palette = MapPalette {
            wall: [0, 255, 0, 255],
            spawn: MapPalette::WHITE,
        };
        let img = image_from(&["g#"]);
        let grid = GridMap::from_image(&img, &palette).unwrap();
        assert!(grid.is_solid(0.5, 0.5));
        assert_eq!(grid.spawn_point(), CellCoord::new(1, 0));
    }

    #[test]
    fn solid_cells_are_row_major_and_restartable() {
        let grid = GridMap::from_ascii(&[".#", "#."]).unwrap();
        let first: Vec<CellCoord> = grid.solid_cells().collect();
        assert_eq!(first, vec![CellCoord::new(1, 0), CellCoord::new(0, 1)]);
        let second: Vec<CellCoord> = grid.solid_cells().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn ragged_text_map_is_rejected() {
        let err = GridMap::from_ascii(&["###", "#."]).unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn empty_map_is_rejected() {
        let rows: [&str; 0] = [];
        assert!(matches!(GridMap::from_ascii(&rows), Err(MapLoadError::Empty)));
        let img = RgbaImage::new(0, 0);
        assert!(matches!(
            GridMap::from_image(&img, &MapPalette::default()),
            Err(MapLoadError::Empty)
        ));
    }

    #[test]
    fn load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.png");
        image_from(&["###", "#S#", "#.#"]).save(&path).unwrap();

        let grid = GridMap::load(&path, &MapPalette::default()).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.spawn_point(), CellCoord::new(1, 1));
        assert_eq!(grid.solid_count(), 7);
    }

    #[test]
    fn load_text_map_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.txt");
        std::fs::write(&path, "###\r\n#S#\n\n").unwrap();

        let grid = GridMap::load(&path, &MapPalette::default()).unwrap();
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.spawn_point(), CellCoord::new(1, 1));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GridMap::load(dir.path().join("nope.png"), &MapPalette::default()).unwrap_err();
        assert!(matches!(err, MapLoadError::Image { .. }));
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn corrupt_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = GridMap::load(&path, &MapPalette::default()).unwrap_err();
        assert!(matches!(err, MapLoadError::Image { .. }));
    }
}
