use tracing::info;

use crate::config::PARAMETER_HEADERS;
use crate::types::ParameterRow;
use crate::views::{EditableGrid, ParameterSource};

/// Optimisation parameter grid. Values are recorded, never interpreted.
pub struct ParameterSetsView {
    grid: EditableGrid,
}

impl ParameterSetsView {
    pub fn new(grid_rows: usize) -> Self {
        Self {
            grid: EditableGrid::new(&PARAMETER_HEADERS, grid_rows),
        }
    }

    pub fn grid(&self) -> &EditableGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut EditableGrid {
        &mut self.grid
    }

    /// Parameters live only in this view; saving just confirms the current rows.
    pub fn save(&self) -> usize {
        let rows = self.parameter_rows();
        info!(
            parameters = rows.len(),
            names = ?rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "Parameter sets saved",
        );
        rows.len()
    }
}

impl ParameterSource for ParameterSetsView {
    fn parameter_rows(&self) -> Vec<ParameterRow> {
        self.grid.non_empty_rows().map(ParameterRow::from_cells).collect()
    }
}
