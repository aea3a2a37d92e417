use crate::app_config::GridConfig;

/// Where one camera lands on the compositor canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    pub index: usize,
    pub xpos: u32,
    pub ypos: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    grid: GridConfig,
}

impl GridLayout {
    pub fn new(grid: GridConfig) -> Self {
        GridLayout { grid }
    }

    pub fn rows(&self) -> u32 {
        self.grid.rows
    }

    pub fn columns(&self) -> u32 {
        self.grid.columns
    }

    pub fn capacity(&self) -> usize {
        self.grid.rows as usize * self.grid.columns as usize
    }

    /// Total canvas size as (width, height).
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            self.grid.columns.saturating_mul(self.grid.tile_width),
            self.grid.rows.saturating_mul(self.grid.tile_height),
        )
    }

    pub fn placement(&self, index: usize) -> TilePlacement {
        let columns = self.grid.columns.max(1) as usize;
        TilePlacement {
            index,
            xpos: ((index % columns) as u32).saturating_mul(self.grid.tile_width),
            ypos: ((index / columns) as u32).saturating_mul(self.grid.tile_height),
            width: self.grid.tile_width,
            height: self.grid.tile_height,
        }
    }

    /// Placements for the first `min(capacity, camera_count)` cameras, row-major.
    pub fn placements(&self, camera_count: usize) -> Vec<TilePlacement> {
        (0..camera_count.min(self.capacity()))
            .map(|i| self.placement(i))
            .collect()
    }
}
