//! Dense store of the last rendered visual for every cell.

use crate::BoardError;
use crate::visual::Visual;
use fixedbitset::FixedBitSet;
use protocol::Position;

/// Upper bound on `height * width` accepted from an init message.
pub const MAX_CELLS: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub height: usize,
    pub width: usize,
}

/// Grid of cell slots indexed by `(x, y)`, row-major.
///
/// Writes that change a cell mark it for presentation; front-ends drain
/// the marks with [`GridSurface::take_dirty`].
#[derive(Debug, Clone, Default)]
pub struct GridSurface {
    dims: Dimensions,
    cells: Vec<Visual>,
    dirty: FixedBitSet,
}

impl GridSurface {
    /// An empty, uninitialized surface. Every coordinate is out of bounds.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(height: i64, width: i64) -> Result<Self, BoardError> {
        let mut grid = Self::new();
        grid.initialize(height, width)?;
        Ok(grid)
    }

    /// Allocate `height * width` cells, all grass. Replaces any previous
    /// contents and pending marks; a fresh surface needs no per-cell redraw.
    pub fn initialize(&mut self, height: i64, width: i64) -> Result<(), BoardError> {
        if height <= 0 || width <= 0 {
            return Err(BoardError::InvalidDimension { height, width });
        }
        let too_large = || BoardError::TooLarge { height, width, max: MAX_CELLS };
        let rows = usize::try_from(height).map_err(|_| too_large())?;
        let cols = usize::try_from(width).map_err(|_| too_large())?;
        let len = rows.checked_mul(cols).filter(|&n| n <= MAX_CELLS).ok_or_else(too_large)?;

        self.dims = Dimensions { height: rows, width: cols };
        self.cells = vec![Visual::default(); len];
        self.dirty = FixedBitSet::with_capacity(len);
        Ok(())
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dims.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dims.width
    }

    pub fn is_initialized(&self) -> bool {
        !self.cells.is_empty()
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.dims.width && y < self.dims.height).then(|| y * self.dims.width + x)
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Store `visual` at `pos`. Out-of-bounds positions and writes of the
    /// value already stored are no-ops. Returns whether the cell changed.
    pub fn set_visual(&mut self, pos: Position, visual: Visual) -> bool {
        let Some(idx) = self.index(pos) else {
            return false;
        };
        if self.cells[idx] == visual {
            return false;
        }
        self.cells[idx] = visual;
        self.dirty.insert(idx);
        true
    }

    /// Stored visual at `pos`, or the default when out of bounds.
    pub fn current_visual(&self, pos: Position) -> Visual {
        self.index(pos).map(|idx| self.cells[idx]).unwrap_or_default()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.count_ones(..)
    }

    /// Drain the cells changed since the last call, in row-major order.
    pub fn take_dirty(&mut self) -> Vec<(Position, Visual)> {
        let width = self.dims.width;
        let changed = self
            .dirty
            .ones()
            .map(|idx| {
                let pos = Position::new((idx % width) as i32, (idx / width) as i32);
                (pos, self.cells[idx])
            })
            .collect();
        self.dirty.clear();
        changed
    }

    /// Rows of visuals, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Visual]> {
        self.cells.chunks(self.dims.width.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_all_grass() {
        let grid = GridSurface::with_dimensions(2, 3).unwrap();
        assert_eq!(grid.dimensions(), Dimensions { height: 2, width: 3 });
        assert!(grid.rows().flatten().all(|v| *v == Visual::Grass));
        assert_eq!(grid.rows().count(), 2);
        assert_eq!(grid.dirty_count(), 0);
    }

    #[test]
    fn test_initialize_rejects_non_positive() {
        assert!(matches!(
            GridSurface::with_dimensions(0, 4),
            Err(BoardError::InvalidDimension { height: 0, width: 4 })
        ));
        assert!(matches!(
            GridSurface::with_dimensions(3, -1),
            Err(BoardError::InvalidDimension { .. })
        ));
        assert!(matches!(
            GridSurface::with_dimensions(i64::MAX, 2),
            Err(BoardError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_set_visual_marks_changes_only() {
        let mut grid = GridSurface::with_dimensions(2, 2).unwrap();
        let pos = Position::new(1, 0);

        assert!(grid.set_visual(pos, Visual::Wall));
        assert!(!grid.set_visual(pos, Visual::Wall));
        assert!(!grid.set_visual(Position::new(0, 0), Visual::Grass));
        assert_eq!(grid.current_visual(pos), Visual::Wall);

        assert_eq!(grid.take_dirty(), vec![(pos, Visual::Wall)]);
        assert_eq!(grid.dirty_count(), 0);
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let mut grid = GridSurface::with_dimensions(2, 2).unwrap();
        for pos in [Position::new(2, 0), Position::new(0, 2), Position::new(-1, 0)] {
            assert!(!grid.contains(pos));
            assert!(!grid.set_visual(pos, Visual::Wall));
            assert_eq!(grid.current_visual(pos), Visual::Grass);
        }
        assert_eq!(grid.dirty_count(), 0);
    }

    #[test]
    fn test_reinitialize_clears() {
        let mut grid = GridSurface::with_dimensions(2, 2).unwrap();
        grid.set_visual(Position::new(1, 1), Visual::BombArmed);
        grid.initialize(3, 1).unwrap();

        assert_eq!(grid.current_visual(Position::new(0, 2)), Visual::Grass);
        assert!(!grid.contains(Position::new(1, 1)));
        assert!(grid.take_dirty().is_empty());
    }

    #[test]
    fn test_uninitialized_surface() {
        let mut grid = GridSurface::new();
        assert!(!grid.is_initialized());
        assert!(!grid.set_visual(Position::ZERO, Visual::Wall));
        assert_eq!(grid.rows().count(), 0);
    }
}
