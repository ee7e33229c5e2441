//! Grid map data and coordinate primitives.
//!
//! This module contains the [`GridMap`] type, a read-only rectangular grid of [`Cell`]s, together
//! with the integer [`GridPos`] and real-valued [`Point`] coordinates shared by the ray caster, the
//! projection scanner and the pathfinder. It also holds the built-in default map.

use std::sync::LazyLock;

use color_eyre::eyre::{bail, ensure, Result};

/// Symbol marking a blocked cell in textual maps.
///
/// Every other symbol in a textual map is read as an open cell.
pub const BLOCKED_SYMBOL: char = '#';

/// State of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Walkable, see-through cell.
    Open,
    /// Wall cell. Rays stop on it and paths never enter it.
    Blocked,
}

/// Integer grid coordinate.
///
/// The x axis grows rightwards and the y axis grows downwards. Coordinates are signed so that
/// neighbour offsets and out-of-range probes can be expressed without wrapping; the map decides
/// whether a coordinate is inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl GridPos {
    /// Builds a grid coordinate from its column and row.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate of the cell containing a real-valued point.
    ///
    /// Returns [`None`] for non-finite points or points whose floor does not fit in an `i32`,
    /// both of which lie outside any grid.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "The floored values are range-checked against i32 bounds before casting."
    )]
    pub fn containing(point: Point) -> Option<Self> {
        let (x, y) = (point.x.floor(), point.y.floor());
        let range = f64::from(i32::MIN)..=f64::from(i32::MAX);

        (range.contains(&x) && range.contains(&y)).then(|| Self::new(x as i32, y as i32))
    }

    /// Returns the coordinate shifted by the given offsets, or [`None`] on overflow.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }

    /// Returns the Euclidean distance between two grid coordinates.
    ///
    /// This is the heuristic and the step cost of the pathfinder, so diagonal moves cost the true
    /// diagonal length.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);

        dx.hypot(dy)
    }

    /// Returns the centre point of the cell.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(f64::from(self.x) + 0.5, f64::from(self.y) + 0.5)
    }
}

/// Real-valued position on the grid plane, in cell units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position, growing downwards.
    pub y: f64,
}

impl Point {
    /// Builds a point from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the point reached by travelling `distance` along `angle`.
    ///
    /// Angle zero points along +x and positive angles turn counter-clockwise on screen, which with
    /// a downward y axis means the direction vector is `(cos a, -sin a)`.
    #[must_use]
    pub fn advanced(self, angle: f64, distance: f64) -> Self {
        Self::new(
            angle.cos().mul_add(distance, self.x),
            (-angle.sin()).mul_add(distance, self.y),
        )
    }
}

/// Read-only rectangular grid of cells.
///
/// The map is stored row-major. Any query outside `0 <= x < width`, `0 <= y < height` is treated
/// as not open. Both the ray caster and the pathfinder borrow the map immutably for the duration
/// of a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Cell states, row after row.
    cells: Vec<Cell>,
}

impl Default for GridMap {
    fn default() -> Self {
        Self::parse(&DEFAULT_MAP).expect("the built-in map is well formed")
    }
}

impl GridMap {
    /// Parses a textual map.
    ///
    /// Each line is one row; a trailing carriage return is ignored so files saved with CRLF line
    /// endings load the same way. [`BLOCKED_SYMBOL`] marks a blocked cell and every other symbol
    /// an open one.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    /// - The text contains no rows
    /// - The first row is empty
    /// - Any row has a different length than the first one
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();

        Self::from_rows(&rows)
    }

    /// Builds a map from already split rows.
    ///
    /// # Errors
    ///
    /// This function returns the same errors as [`GridMap::parse`].
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let Some(first) = rows.first() else {
            bail!("map has no rows");
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            bail!("map rows are empty");
        }
        check_dimensions(width, rows.len())?;

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let row_width = row.chars().count();
            if row_width != width {
                bail!("map row {row_idx} has {row_width} cells, expected {width}");
            }

            cells.extend(row.chars().map(|symbol| {
                if symbol == BLOCKED_SYMBOL {
                    Cell::Blocked
                } else {
                    Cell::Open
                }
            }));
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Returns the number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns whether the coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, pos: GridPos) -> bool {
        self.index(pos).is_some()
    }

    /// Returns the state of the cell at the coordinate, or [`None`] outside the grid.
    #[must_use]
    pub fn state(&self, pos: GridPos) -> Option<Cell> {
        self.index(pos).and_then(|idx| self.cells.get(idx)).copied()
    }

    /// Returns whether the coordinate holds an open cell. Out-of-range coordinates are not open.
    #[must_use]
    pub fn is_open(&self, pos: GridPos) -> bool {
        self.state(pos) == Some(Cell::Open)
    }

    /// Returns the row-major index of the coordinate, or [`None`] outside the grid.
    #[must_use]
    pub fn index(&self, pos: GridPos) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;

        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Returns an iterator over the coordinates of every blocked cell, row after row.
    pub fn blocked_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.positions()
            .filter(|&pos| self.state(pos) == Some(Cell::Blocked))
    }

    /// Returns an iterator over every coordinate of the grid, row after row.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        // Both dimensions fit in an i32, checked when the map was built.
        let to_i32 = |value: usize| i32::try_from(value).unwrap_or(i32::MAX);

        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| GridPos::new(to_i32(x), to_i32(y)))
        })
    }
}

/// Rejects dimensions whose coordinates cannot be expressed as a [`GridPos`].
fn check_dimensions(width: usize, height: usize) -> Result<()> {
    ensure!(
        i32::try_from(width).is_ok() && i32::try_from(height).is_ok(),
        "map of {width}x{height} cells is too large"
    );

    Ok(())
}

/// Default map used when no map file is given.
///
/// An enclosed arena with a few pillars and wall segments so that both the projection and the
/// path overlay have something to work around.
static DEFAULT_MAP: LazyLock<&str> = LazyLock::new(|| {
    "\
########################################################
#                                        ###           #
#                                        ###           #
#                                        ###           #
#                                        ###           #
#                                        ###           #
#                                        ###           #
#                     ####                             #
#                        #               ###           #
#                     ####               ###           #
#                                        ###           #
#                                        ###           #
#                                        ###           #
#                                                      #
#                                                      #
#                                                      #
#                                                      #
#  ##  ##  ####         ##                    ##       #
#            ##         ##                    ##       #
#            ##         ##                    ##       #
#            ##         ##                    ##       #
#            ##         ##                    ##       #
#            ##         ##                    ##       #
#            ##         ##                    ##       #
#            ##         ##                    ##       #
#            ##         ##                    ##       #
########################################################"
});
