//! FILENAME: cli/src/viewport.rs
//! PURPOSE: Prints a fixed 10x10 window of the grid and tracks where
//! that window currently sits.
//! CONTEXT: The window's top-left corner is the viewport's own state;
//! scrolling never changes the grid, only which slice of it is shown.

use std::io::Write;

use engine::Sheet;

const VIEWPORT_EXTENT: usize = 10;

pub struct Viewport {
    start_row: usize,
    start_col: usize,
    enabled: bool,
}

impl Viewport {
    pub fn new() -> Self {
        Viewport {
            start_row: 0,
            start_col: 0,
            enabled: true,
        }
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Scrolls one page up (toward row 0).
    pub fn scroll_up(&mut self) {
        if self.start_row >= VIEWPORT_EXTENT {
            self.start_row -= VIEWPORT_EXTENT;
        } else {
            self.start_row = 0;
        }
    }

    /// Scrolls one page down, clamped to the grid's extent. If a full
    /// page would run past the bottom, the viewport is pulled back by
    /// exactly one page from the bottom instead of advancing further.
    pub fn scroll_down(&mut self, total_rows: usize) {
        if total_rows <= VIEWPORT_EXTENT {
            return;
        }
        let last_page_start = total_rows - VIEWPORT_EXTENT;
        if self.start_row + VIEWPORT_EXTENT <= last_page_start {
            self.start_row += VIEWPORT_EXTENT;
        } else if self.start_row >= last_page_start {
            // Already at (or past) the last page: no-op.
        } else {
            self.start_row = last_page_start;
        }
    }

    pub fn scroll_left(&mut self) {
        if self.start_col >= VIEWPORT_EXTENT {
            self.start_col -= VIEWPORT_EXTENT;
        } else {
            self.start_col = 0;
        }
    }

    pub fn scroll_right(&mut self, total_cols: usize) {
        if total_cols <= VIEWPORT_EXTENT {
            return;
        }
        let last_page_start = total_cols - VIEWPORT_EXTENT;
        if self.start_col + VIEWPORT_EXTENT <= last_page_start {
            self.start_col += VIEWPORT_EXTENT;
        } else if self.start_col >= last_page_start {
            // Already at (or past) the last page: no-op.
        } else {
            self.start_col = last_page_start;
        }
    }

    /// Moves the viewport so its top-left corner is `cell_name`.
    /// Fails if the name is malformed or out of bounds.
    pub fn scroll_to(&mut self, cell_name: &str, rows: usize, cols: usize) -> Result<(), ()> {
        let (row, col) = engine::name_to_coord(cell_name).ok_or(())?;
        if row >= rows || col >= cols {
            return Err(());
        }
        self.start_row = row;
        self.start_col = col;
        Ok(())
    }

    /// Prints the current window, unless output has been disabled.
    pub fn print(&self, sheet: &Sheet, out: &mut impl Write) {
        if !self.enabled {
            return;
        }
        let display_rows = VIEWPORT_EXTENT.min(sheet.rows().saturating_sub(self.start_row));
        let display_cols = VIEWPORT_EXTENT.min(sheet.cols().saturating_sub(self.start_col));

        let _ = write!(out, "     ");
        for c in 0..display_cols {
            let col_name = engine::coord::index_to_col(self.start_col + c);
            let _ = write!(out, "{:<8} ", col_name);
        }
        let _ = writeln!(out);

        for r in 0..display_rows {
            let _ = write!(out, "{:<4} ", self.start_row + r + 1);
            for c in 0..display_cols {
                let cell = sheet.grid().get((self.start_row + r, self.start_col + c));
                let _ = write!(out, "{:<8} ", cell.display_value());
            }
            let _ = writeln!(out);
        }
        let _ = out.flush();
    }

}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_down_pulls_back_to_last_page_instead_of_overshooting() {
        let mut vp = Viewport::new();
        // 15 rows: one full page (0..10), then a short tail (5..15).
        vp.scroll_down(15);
        assert_eq!(vp.start_row, 5);
    }

    #[test]
    fn scroll_down_no_ops_past_the_last_page() {
        let mut vp = Viewport::new();
        vp.scroll_down(15);
        vp.scroll_down(15);
        assert_eq!(vp.start_row, 5);
    }

    #[test]
    fn scroll_down_is_a_full_page_when_it_fits_exactly() {
        let mut vp = Viewport::new();
        vp.scroll_down(30);
        assert_eq!(vp.start_row, 10);
    }

    #[test]
    fn scroll_up_never_goes_negative() {
        let mut vp = Viewport::new();
        vp.scroll_up();
        assert_eq!(vp.start_row, 0);
    }

    #[test]
    fn scroll_to_moves_the_window() {
        let mut vp = Viewport::new();
        vp.scroll_to("B2", 10, 10).unwrap();
        assert_eq!(vp.start_row, 1);
        assert_eq!(vp.start_col, 1);
    }

    #[test]
    fn scroll_to_rejects_out_of_bounds() {
        let mut vp = Viewport::new();
        assert!(vp.scroll_to("Z99", 10, 10).is_err());
    }
}
