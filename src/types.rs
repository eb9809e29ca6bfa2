// ---------------------------------------------------------------------------
// Market record
// ---------------------------------------------------------------------------

/// Everything tracked for one market. Blobs hold the uploaded image bytes verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketRecord {
    pub timeframe: String,
    pub data_source: String,
    pub optimisation_timespan: String,
    pub out_of_sample_timespan: String,
    pub equity_curve: Option<Vec<u8>>,
    pub performance_metrics: Option<Vec<u8>>,
    pub notes: String,
}

impl MarketRecord {
    /// True if the record carries anything the introduction grid cannot rebuild.
    pub fn has_results_content(&self) -> bool {
        self.equity_curve.is_some() || self.performance_metrics.is_some() || !self.notes.is_empty()
    }

    pub fn image(&self, kind: ImageKind) -> Option<&[u8]> {
        match kind {
            ImageKind::EquityCurve => self.equity_curve.as_deref(),
            ImageKind::PerformanceMetrics => self.performance_metrics.as_deref(),
        }
    }

    pub fn apply(&mut self, field: MarketField) {
        match field {
            MarketField::Timeframe(v) => self.timeframe = v,
            MarketField::DataSource(v) => self.data_source = v,
            MarketField::OptimisationTimespan(v) => self.optimisation_timespan = v,
            MarketField::OutOfSampleTimespan(v) => self.out_of_sample_timespan = v,
            MarketField::EquityCurve(v) => self.equity_curve = v,
            MarketField::PerformanceMetrics(v) => self.performance_metrics = v,
            MarketField::Notes(v) => self.notes = v,
        }
    }
}

/// One assignable field of a [`MarketRecord`] together with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketField {
    Timeframe(String),
    DataSource(String),
    OptimisationTimespan(String),
    OutOfSampleTimespan(String),
    EquityCurve(Option<Vec<u8>>),
    PerformanceMetrics(Option<Vec<u8>>),
    Notes(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    EquityCurve,
    PerformanceMetrics,
}

impl ImageKind {
    pub fn into_field(self, bytes: Vec<u8>) -> MarketField {
        match self {
            ImageKind::EquityCurve => MarketField::EquityCurve(Some(bytes)),
            ImageKind::PerformanceMetrics => MarketField::PerformanceMetrics(Some(bytes)),
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ImageKind::EquityCurve => "equity_curve",
            ImageKind::PerformanceMetrics => "performance_metrics",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Grid rows
// ---------------------------------------------------------------------------

/// Editable projection of a market shown in the introduction grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntroRow {
    pub market: String,
    pub timeframe: String,
    pub data_source: String,
    pub optimisation_timespan: String,
    pub out_of_sample_timespan: String,
}

impl IntroRow {
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Self {
            market: cell(0).trim().to_string(),
            timeframe: cell(1),
            data_source: cell(2),
            optimisation_timespan: cell(3),
            out_of_sample_timespan: cell(4),
        }
    }

    pub fn cells(&self) -> [String; 5] {
        [
            self.market.clone(),
            self.timeframe.clone(),
            self.data_source.clone(),
            self.optimisation_timespan.clone(),
            self.out_of_sample_timespan.clone(),
        ]
    }
}

/// A recorded optimisation parameter. All values are opaque display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterRow {
    pub name: String,
    pub description: String,
    pub default: String,
    pub start: String,
    pub step: String,
    pub end: String,
    pub best: String,
}

impl ParameterRow {
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Self {
            name: cell(0),
            description: cell(1),
            default: cell(2),
            start: cell(3),
            step: cell(4),
            end: cell(5),
            best: cell(6),
        }
    }

    pub fn cells(&self) -> [String; 7] {
        [
            self.name.clone(),
            self.description.clone(),
            self.default.clone(),
            self.start.clone(),
            self.step.clone(),
            self.end.clone(),
            self.best.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time, owned copy of the market store in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketSnapshot {
    entries: Vec<(String, MarketRecord)>,
}

impl MarketSnapshot {
    pub fn new(entries: Vec<(String, MarketRecord)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MarketRecord)> {
        self.entries.iter().map(|(id, rec)| (id.as_str(), rec))
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&MarketRecord> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, rec)| rec)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Change notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Update,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Update => write!(f, "update"),
        }
    }
}

/// Broadcast after an introduction save: the authoritative market id list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketChange {
    pub action: ChangeAction,
    pub market_ids: Vec<String>,
}
