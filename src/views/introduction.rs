use std::sync::Arc;

use tracing::{debug, info};

use crate::config::INTRO_HEADERS;
use crate::state::{ChangeNotifier, MarketStore};
use crate::types::{ChangeAction, IntroRow, MarketChange, MarketField};
use crate::views::{EditableGrid, IntroductionSource};

/// Single-line text inputs on the introduction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroField {
    StrategyName,
    SpecificGoal,
    TargetPerformance,
    OptimisationMethod,
}

impl IntroField {
    pub const ALL: [IntroField; 4] = [
        IntroField::StrategyName,
        IntroField::SpecificGoal,
        IntroField::TargetPerformance,
        IntroField::OptimisationMethod,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IntroField::StrategyName => "Strategy Name",
            IntroField::SpecificGoal => "Specific Goal",
            IntroField::TargetPerformance => "Target Performance Parameter",
            IntroField::OptimisationMethod => "Optimisation Method",
        }
    }
}

/// Strategy metadata plus the per-market configuration grid.
///
/// Saving rebuilds the [`MarketStore`] from the grid and broadcasts the new
/// market list to every observer.
pub struct IntroductionView {
    store: Arc<MarketStore>,
    observers: ChangeNotifier,
    strategy_name: String,
    specific_goal: String,
    target_performance: String,
    optimisation_method: String,
    grid: EditableGrid,
}

impl IntroductionView {
    pub fn new(store: Arc<MarketStore>, grid_rows: usize) -> Self {
        Self {
            store,
            observers: ChangeNotifier::new(),
            strategy_name: String::new(),
            specific_goal: String::new(),
            target_performance: String::new(),
            optimisation_method: String::new(),
            grid: EditableGrid::new(&INTRO_HEADERS, grid_rows),
        }
    }

    pub fn add_observer(&mut self, observer: impl FnMut(&MarketChange) + 'static) {
        self.observers.subscribe(observer);
        debug!(observers = self.observers.listener_count(), "Observer registered");
    }

    pub fn field(&self, field: IntroField) -> &str {
        match field {
            IntroField::StrategyName => &self.strategy_name,
            IntroField::SpecificGoal => &self.specific_goal,
            IntroField::TargetPerformance => &self.target_performance,
            IntroField::OptimisationMethod => &self.optimisation_method,
        }
    }

    pub fn set_field(&mut self, field: IntroField, value: impl Into<String>) {
        let slot = match field {
            IntroField::StrategyName => &mut self.strategy_name,
            IntroField::SpecificGoal => &mut self.specific_goal,
            IntroField::TargetPerformance => &mut self.target_performance,
            IntroField::OptimisationMethod => &mut self.optimisation_method,
        };
        *slot = value.into();
    }

    pub fn grid(&self) -> &EditableGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut EditableGrid {
        &mut self.grid
    }

    /// Markets whose images or notes the next save will discard.
    ///
    /// A save clears the whole store before rebuilding it from the grid, so
    /// this covers markets still in the grid as well as ones removed from it.
    pub fn content_at_risk(&self) -> Vec<String> {
        self.store
            .snapshot()
            .iter()
            .filter(|(_, rec)| rec.has_results_content())
            .map(|(id, _)| id.to_string())
            .collect()
    }

    /// Destructive full replace: clear the store, rebuild it from the grid,
    /// then broadcast the resulting id list. Returns that list.
    pub fn save(&mut self) -> Vec<String> {
        let previous = self.store.market_count();
        self.store.clear();

        for row in self.intro_table_rows() {
            self.store.add(&row.market);
            self.store.set_field(&row.market, MarketField::Timeframe(row.timeframe));
            self.store.set_field(&row.market, MarketField::DataSource(row.data_source));
            self.store
                .set_field(&row.market, MarketField::OptimisationTimespan(row.optimisation_timespan));
            self.store
                .set_field(&row.market, MarketField::OutOfSampleTimespan(row.out_of_sample_timespan));
        }

        let market_ids = self.store.list_ids();
        info!(
            previous,
            markets = market_ids.len(),
            ids = ?market_ids,
            "Introduction saved: store rebuilt with {} markets",
            market_ids.len(),
        );

        self.observers.notify(&MarketChange {
            action: ChangeAction::Update,
            market_ids: market_ids.clone(),
        });
        market_ids
    }
}

impl IntroductionSource for IntroductionView {
    fn strategy_name(&self) -> String {
        self.strategy_name.clone()
    }

    fn specific_goal(&self) -> String {
        self.specific_goal.clone()
    }

    fn target_performance(&self) -> String {
        self.target_performance.clone()
    }

    fn optimisation_method(&self) -> String {
        self.optimisation_method.clone()
    }

    fn intro_table_rows(&self) -> Vec<IntroRow> {
        self.grid.non_empty_rows().map(IntroRow::from_cells).collect()
    }
}
