use std::path::Path;
use std::sync::Arc;

use image::GenericImageView;
use tracing::{info, warn};

use crate::config::{IMAGE_EXTENSIONS, THUMBNAIL_MAX_PX};
use crate::error::InputError;
use crate::state::MarketStore;
use crate::types::{ChangeAction, ImageKind, MarketChange, MarketField, MarketSnapshot};
use crate::views::ResultsSource;

// ---------------------------------------------------------------------------
// MarketSelector
// ---------------------------------------------------------------------------

/// Display cache of the market ids the results form can pick from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketSelector {
    options: Vec<String>,
    selected: Option<String>,
}

impl MarketSelector {
    /// Replace the options. A selection that is still offered is kept;
    /// otherwise the first option (if any) becomes selected.
    pub fn refresh(&mut self, market_ids: &[String]) {
        self.options = market_ids.to_vec();
        let still_offered = self
            .selected
            .as_ref()
            .is_some_and(|s| self.options.contains(s));
        if !still_offered {
            self.selected = self.options.first().cloned();
        }
    }

    /// Returns false if `market_id` is not one of the options.
    pub fn select(&mut self, market_id: &str) -> bool {
        if self.options.iter().any(|o| o == market_id) {
            self.selected = Some(market_id.to_string());
            true
        } else {
            false
        }
    }

    /// Move the selection `step` places through the options, wrapping around.
    pub fn cycle(&mut self, step: isize) {
        if self.options.is_empty() {
            return;
        }
        let len = self.options.len() as isize;
        let current = self
            .selected
            .as_ref()
            .and_then(|s| self.options.iter().position(|o| o == s))
            .map_or(-1, |i| i as isize);
        let next = (current + step).rem_euclid(len) as usize;
        self.selected = Some(self.options[next].clone());
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

// ---------------------------------------------------------------------------
// ImageSummary
// ---------------------------------------------------------------------------

/// Display-only facts about an uploaded image. Never stored in the market record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSummary {
    pub width: u32,
    pub height: u32,
    pub thumb_width: u32,
    pub thumb_height: u32,
    pub byte_len: usize,
}

impl ImageSummary {
    /// Decode `bytes` and derive a thumbnail bounded by [`THUMBNAIL_MAX_PX`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        let (width, height) = img.dimensions();
        let (thumb_width, thumb_height) = img.thumbnail(THUMBNAIL_MAX_PX, THUMBNAIL_MAX_PX).dimensions();
        Ok(Self {
            width,
            height,
            thumb_width,
            thumb_height,
            byte_len: bytes.len(),
        })
    }
}

impl std::fmt::Display for ImageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} px, {} bytes (preview {}x{})",
            self.width, self.height, self.byte_len, self.thumb_width, self.thumb_height
        )
    }
}

// ---------------------------------------------------------------------------
// ResultsView
// ---------------------------------------------------------------------------

/// Per-market result images and notes, edited one selected market at a time.
pub struct ResultsView {
    store: Arc<MarketStore>,
    selector: MarketSelector,
    notes: String,
    equity_curve: Option<ImageSummary>,
    performance_metrics: Option<ImageSummary>,
}

impl ResultsView {
    pub fn new(store: Arc<MarketStore>) -> Self {
        let mut view = Self {
            store,
            selector: MarketSelector::default(),
            notes: String::new(),
            equity_curve: None,
            performance_metrics: None,
        };
        let ids = view.store.list_ids();
        view.update_market_selector(&ids);
        view
    }

    /// Observer entry point for introduction saves.
    pub fn on_market_change(&mut self, change: &MarketChange) {
        match change.action {
            ChangeAction::Update => self.update_market_selector(&change.market_ids),
        }
    }

    fn update_market_selector(&mut self, market_ids: &[String]) {
        self.selector.refresh(market_ids);
        self.load_selected();
    }

    pub fn selector(&self) -> &MarketSelector {
        &self.selector
    }

    pub fn selected_market(&self) -> Option<&str> {
        self.selector.selected()
    }

    pub fn select(&mut self, market_id: &str) -> bool {
        let ok = self.selector.select(market_id);
        if ok {
            self.load_selected();
        }
        ok
    }

    pub fn cycle_market(&mut self, step: isize) {
        self.selector.cycle(step);
        self.load_selected();
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn image_summary(&self, kind: ImageKind) -> Option<ImageSummary> {
        match kind {
            ImageKind::EquityCurve => self.equity_curve,
            ImageKind::PerformanceMetrics => self.performance_metrics,
        }
    }

    /// Refill the notes buffer and image previews from the store for the selected market.
    fn load_selected(&mut self) {
        let record = self.selector.selected().and_then(|id| self.store.get(id));
        match record {
            Some(rec) => {
                self.notes = rec.notes.clone();
                self.equity_curve = preview(rec.image(ImageKind::EquityCurve));
                self.performance_metrics = preview(rec.image(ImageKind::PerformanceMetrics));
            }
            None => {
                self.notes.clear();
                self.equity_curve = None;
                self.performance_metrics = None;
            }
        }
    }

    /// Read an image file and store its raw bytes on the selected market.
    pub fn upload_image(&mut self, kind: ImageKind, path: &Path) -> Result<ImageSummary, InputError> {
        let market = self
            .selector
            .selected()
            .ok_or(InputError::NoMarketSelected)?
            .to_string();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return Err(InputError::UnsupportedImage(path.display().to_string()));
        }

        let bytes = std::fs::read(path).map_err(|e| InputError::UnreadableImage {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let summary = ImageSummary::from_bytes(&bytes).map_err(|e| InputError::UnreadableImage {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        self.store.set_field(&market, kind.into_field(bytes));
        match kind {
            ImageKind::EquityCurve => self.equity_curve = Some(summary),
            ImageKind::PerformanceMetrics => self.performance_metrics = Some(summary),
        }

        info!(
            market_id = %market,
            kind = %kind,
            bytes = summary.byte_len,
            width = summary.width,
            height = summary.height,
            "Image uploaded for {market}",
        );
        Ok(summary)
    }

    /// Store the trimmed notes buffer on the selected market. Returns the market id.
    pub fn save_notes(&mut self) -> Result<String, InputError> {
        let market = self
            .selector
            .selected()
            .ok_or(InputError::NoMarketSelected)?
            .to_string();
        let notes = self.notes.trim().to_string();
        self.notes = notes.clone();
        self.store.set_field(&market, MarketField::Notes(notes));
        info!(market_id = %market, chars = self.notes.len(), "Notes saved for {market}");
        Ok(market)
    }
}

impl ResultsSource for ResultsView {
    fn market_store_snapshot(&self) -> MarketSnapshot {
        self.store.snapshot()
    }
}

fn preview(bytes: Option<&[u8]>) -> Option<ImageSummary> {
    let bytes = bytes?;
    match ImageSummary::from_bytes(bytes) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("Stored image could not be previewed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_bytes;
    use crate::types::MarketRecord;

    fn update(ids: &[&str]) -> MarketChange {
        MarketChange {
            action: ChangeAction::Update,
            market_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn first_market_is_selected_when_nothing_was() {
        let mut view = ResultsView::new(MarketStore::new());
        assert!(view.selected_market().is_none());

        view.on_market_change(&update(&["A", "C"]));
        assert_eq!(view.selected_market(), Some("A"));
        assert_eq!(view.selector().options(), &["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn existing_selection_survives_a_refresh() {
        let mut view = ResultsView::new(MarketStore::new());
        view.on_market_change(&update(&["A", "B", "C"]));
        assert!(view.select("C"));

        view.on_market_change(&update(&["A", "C"]));
        assert_eq!(view.selected_market(), Some("C"));
    }

    #[test]
    fn vanished_selection_falls_back_to_first() {
        let mut selector = MarketSelector::default();
        selector.refresh(&["A".to_string(), "B".to_string()]);
        selector.select("B");
        selector.refresh(&["C".to_string(), "D".to_string()]);
        assert_eq!(selector.selected(), Some("C"));

        selector.refresh(&[]);
        assert_eq!(selector.selected(), None);
    }

    #[test]
    fn cycle_wraps_in_both_directions() {
        let mut selector = MarketSelector::default();
        selector.refresh(&["A".to_string(), "B".to_string(), "C".to_string()]);
        selector.cycle(-1);
        assert_eq!(selector.selected(), Some("C"));
        selector.cycle(1);
        assert_eq!(selector.selected(), Some("A"));
        assert!(!selector.select("Z"));
    }

    #[test]
    fn notes_require_a_selected_market() {
        let store = MarketStore::new();
        let mut view = ResultsView::new(Arc::clone(&store));
        view.set_notes("orphan");

        assert!(matches!(view.save_notes(), Err(InputError::NoMarketSelected)));
        assert!(store.list_ids().is_empty());
    }

    #[test]
    fn notes_are_trimmed_and_stored_on_the_selection() {
        let store = MarketStore::new();
        store.add("EURUSD");
        let mut view = ResultsView::new(Arc::clone(&store));
        assert_eq!(view.selected_market(), Some("EURUSD"));

        view.set_notes("  strong trend regime \n");
        assert_eq!(view.save_notes().unwrap(), "EURUSD");
        assert_eq!(store.get("EURUSD").unwrap().notes, "strong trend regime");
    }

    #[test]
    fn selecting_a_market_loads_its_notes() {
        let store = MarketStore::new();
        store.set_field("A", MarketField::Notes("a notes".to_string()));
        store.set_field("B", MarketField::Notes("b notes".to_string()));
        let mut view = ResultsView::new(Arc::clone(&store));

        assert_eq!(view.notes(), "a notes");
        view.select("B");
        assert_eq!(view.notes(), "b notes");
    }

    #[test]
    fn upload_stores_raw_bytes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.PNG");
        let bytes = png_bytes(800, 200);
        std::fs::write(&path, &bytes).unwrap();

        let store = MarketStore::new();
        store.add("EURUSD");
        let mut view = ResultsView::new(Arc::clone(&store));

        let summary = view.upload_image(ImageKind::EquityCurve, &path).unwrap();
        assert_eq!((summary.width, summary.height), (800, 200));
        assert_eq!((summary.thumb_width, summary.thumb_height), (400, 100));

        let rec = store.get("EURUSD").unwrap();
        assert_eq!(rec.equity_curve.as_deref(), Some(bytes.as_slice()));
        assert!(rec.performance_metrics.is_none());
        assert_eq!(view.image_summary(ImageKind::EquityCurve), Some(summary));
    }

    #[test]
    fn upload_rejects_unsupported_or_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = MarketStore::new();
        store.add("EURUSD");
        let mut view = ResultsView::new(Arc::clone(&store));

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, b"hello").unwrap();
        assert!(matches!(
            view.upload_image(ImageKind::EquityCurve, &txt),
            Err(InputError::UnsupportedImage(_))
        ));

        let fake = dir.path().join("fake.png");
        std::fs::write(&fake, b"not a png").unwrap();
        assert!(matches!(
            view.upload_image(ImageKind::PerformanceMetrics, &fake),
            Err(InputError::UnreadableImage { .. })
        ));

        assert_eq!(store.get("EURUSD").unwrap(), MarketRecord::default());
    }

    #[test]
    fn upload_without_selection_changes_nothing() {
        let store = MarketStore::new();
        let mut view = ResultsView::new(Arc::clone(&store));
        let result = view.upload_image(ImageKind::EquityCurve, Path::new("missing.png"));
        assert!(matches!(result, Err(InputError::NoMarketSelected)));
        assert!(store.list_ids().is_empty());
    }
}
