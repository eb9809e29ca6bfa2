/// Rectangular grid of editable text cells with fixed column headers.
#[derive(Debug, Clone)]
pub struct EditableGrid {
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl EditableGrid {
    pub fn new(headers: &'static [&'static str], initial_rows: usize) -> Self {
        let rows = (0..initial_rows).map(|_| vec![String::new(); headers.len()]).collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Returns false (and changes nothing) if the coordinates are outside the grid.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    pub fn append_row(&mut self) {
        self.rows.push(vec![String::new(); self.headers.len()]);
    }

    /// Removing the last remaining row blanks it instead, so the grid is never empty.
    pub fn remove_row(&mut self, row: usize) {
        if row >= self.rows.len() {
            return;
        }
        if self.rows.len() == 1 {
            self.rows[0] = vec![String::new(); self.headers.len()];
        } else {
            self.rows.remove(row);
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rows whose first column (the key) is non-blank, in grid order.
    pub fn non_empty_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows
            .iter()
            .filter(|r| r.first().is_some_and(|key| !key.trim().is_empty()))
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: &[&str] = &["Key", "Value"];

    #[test]
    fn starts_with_blank_rows() {
        let grid = EditableGrid::new(HEADERS, 3);
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.column_count(), 2);
        assert_eq!(grid.non_empty_rows().count(), 0);
    }

    #[test]
    fn set_cell_outside_grid_is_rejected() {
        let mut grid = EditableGrid::new(HEADERS, 1);
        assert!(grid.set_cell(0, 1, "v"));
        assert!(!grid.set_cell(1, 0, "x"));
        assert!(!grid.set_cell(0, 2, "x"));
        assert_eq!(grid.cell(0, 1), "v");
        assert_eq!(grid.cell(5, 5), "");
    }

    #[test]
    fn non_empty_rows_skip_blank_keys() {
        let mut grid = EditableGrid::new(HEADERS, 3);
        grid.set_cell(0, 0, "a");
        grid.set_cell(1, 0, "   ");
        grid.set_cell(1, 1, "orphan value");
        grid.set_cell(2, 0, "c");

        let keys: Vec<_> = grid.non_empty_rows().map(|r| r[0].clone()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn remove_last_row_blanks_it() {
        let mut grid = EditableGrid::new(HEADERS, 1);
        grid.set_cell(0, 0, "a");
        grid.remove_row(0);
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.cell(0, 0), "");

        grid.append_row();
        grid.set_cell(1, 0, "b");
        grid.remove_row(0);
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.cell(0, 0), "b");
    }
}
