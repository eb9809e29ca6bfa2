pub mod grid;
pub mod introduction;
pub mod parameters;
pub mod results;

pub use grid::EditableGrid;
pub use introduction::{IntroField, IntroductionView};
pub use parameters::ParameterSetsView;
pub use results::{ImageSummary, MarketSelector, ResultsView};

use crate::types::{IntroRow, MarketSnapshot, ParameterRow};

// ---------------------------------------------------------------------------
// Accessor contract pulled by the report assembler
// ---------------------------------------------------------------------------

pub trait IntroductionSource {
    fn strategy_name(&self) -> String;
    fn specific_goal(&self) -> String;
    fn target_performance(&self) -> String;
    fn optimisation_method(&self) -> String;
    /// Rows with a non-empty market id, in grid order.
    fn intro_table_rows(&self) -> Vec<IntroRow>;
}

pub trait ParameterSource {
    /// Rows with a non-empty parameter name, in grid order.
    fn parameter_rows(&self) -> Vec<ParameterRow>;
}

pub trait ResultsSource {
    fn market_store_snapshot(&self) -> MarketSnapshot;
}
