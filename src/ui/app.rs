use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, InputError};
use crate::report::{normalize_output_path, ReportData};
use crate::state::MarketStore;
use crate::types::ImageKind;
use crate::views::{IntroField, IntroductionView, ParameterSetsView, ResultsView};

// ---------------------------------------------------------------------------
// UI state types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Introduction,
    ParameterSets,
    Results,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Introduction, Tab::ParameterSets, Tab::Results];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Introduction => "Introduction",
            Tab::ParameterSets => "Parameter Sets",
            Tab::Results => "Results",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn shifted(self, step: isize) -> Tab {
        let len = Self::ALL.len() as isize;
        Self::ALL[(self.index() as isize + step).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub level: ModalLevel,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    IntroField(IntroField),
    IntroCell { row: usize, col: usize },
    ParamCell { row: usize, col: usize },
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    OutputPath,
    ImagePath(ImageKind),
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::OutputPath => "Save report as",
            PromptKind::ImagePath(ImageKind::EquityCurve) => "Equity curve image",
            PromptKind::ImagePath(ImageKind::PerformanceMetrics) => "Performance metrics image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Editing { target: EditTarget, buffer: String },
    Prompt { kind: PromptKind, buffer: String },
    /// Introduction save that would discard images/notes for these markets.
    ConfirmIntroSave { at_risk: Vec<String> },
    Modal(Modal),
    Generating,
}

/// What the event loop must do after a key has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Generate(PathBuf),
}

/// Cursor position on a form. On the introduction tab rows `0..4` are the text
/// fields and grid rows follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub tab: Tab,
    pub mode: Mode,
    pub intro: IntroductionView,
    pub params: ParameterSetsView,
    pub results: Rc<RefCell<ResultsView>>,
    pub intro_cursor: Cursor,
    pub param_cursor: Cursor,
    output_dir: PathBuf,
}

impl App {
    pub fn new(cfg: &Config, store: Arc<MarketStore>) -> Self {
        let results = Rc::new(RefCell::new(ResultsView::new(Arc::clone(&store))));
        let mut intro = IntroductionView::new(Arc::clone(&store), cfg.grid_rows);

        let listener = Rc::clone(&results);
        intro.add_observer(move |change| listener.borrow_mut().on_market_change(change));

        Self {
            tab: Tab::Introduction,
            mode: Mode::Normal,
            intro,
            params: ParameterSetsView::new(cfg.grid_rows),
            results,
            intro_cursor: Cursor::default(),
            param_cursor: Cursor::default(),
            output_dir: cfg.output_dir.clone(),
        }
    }

    /// Deep snapshot of every view, taken on the UI thread before generation.
    pub fn report_data(&self) -> ReportData {
        let results = self.results.borrow();
        ReportData::collect(&self.intro, &self.params, &*results)
    }

    pub fn finish_generation(&mut self, outcome: Result<PathBuf, AppError>) {
        self.mode = match outcome {
            Ok(path) => Mode::Modal(notice(
                "Success",
                format!("Report generated successfully!\n{}", path.display()),
            )),
            Err(e) => {
                error!("Report generation failed: {e}");
                Mode::Modal(failure(format!(
                    "An error occurred while generating the report: {e}"
                )))
            }
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.normal_key(key),
            Mode::Editing { target, buffer } => {
                self.editing_key(key, ctrl, target, buffer);
                Action::None
            }
            Mode::Prompt { kind, buffer } => self.prompt_key(key, kind, buffer),
            Mode::ConfirmIntroSave { at_risk } => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => self.save_introduction(),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        info!(markets = ?at_risk, "Introduction save aborted by user");
                    }
                    _ => self.mode = Mode::ConfirmIntroSave { at_risk },
                }
                Action::None
            }
            Mode::Modal(modal) => {
                if !matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.mode = Mode::Modal(modal);
                }
                Action::None
            }
            Mode::Generating => {
                self.mode = Mode::Generating;
                Action::None
            }
        }
    }

    fn normal_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Tab => self.tab = self.tab.shifted(1),
            KeyCode::BackTab => self.tab = self.tab.shifted(-1),
            KeyCode::Char('s') => self.save_current_tab(),
            KeyCode::Char('g') => {
                let suggestion = self.output_dir.join("report.docx");
                self.mode = Mode::Prompt {
                    kind: PromptKind::OutputPath,
                    buffer: suggestion.display().to_string(),
                };
            }
            _ => match self.tab {
                Tab::Introduction => self.intro_key(key),
                Tab::ParameterSets => self.param_key(key),
                Tab::Results => self.results_key(key),
            },
        }
        Action::None
    }

    fn intro_key(&mut self, key: KeyEvent) {
        let fields = IntroField::ALL.len();
        let max_row = fields + self.intro.grid().row_count() - 1;
        let max_col = self.intro.grid().column_count() - 1;
        let cur = &mut self.intro_cursor;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => cur.row = cur.row.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => cur.row = (cur.row + 1).min(max_row),
            KeyCode::Left | KeyCode::Char('h') => cur.col = cur.col.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => cur.col = (cur.col + 1).min(max_col),
            KeyCode::Char('a') => self.intro.grid_mut().append_row(),
            KeyCode::Char('d') if cur.row >= fields => {
                let row = cur.row - fields;
                self.intro.grid_mut().remove_row(row);
                let last = fields + self.intro.grid().row_count() - 1;
                self.intro_cursor.row = self.intro_cursor.row.min(last);
            }
            KeyCode::Enter => {
                let (target, current) = if cur.row < fields {
                    let field = IntroField::ALL[cur.row];
                    (EditTarget::IntroField(field), self.intro.field(field).to_string())
                } else {
                    let (row, col) = (cur.row - fields, cur.col);
                    (EditTarget::IntroCell { row, col }, self.intro.grid().cell(row, col).to_string())
                };
                self.mode = Mode::Editing { target, buffer: current };
            }
            _ => {}
        }
    }

    fn param_key(&mut self, key: KeyEvent) {
        let max_row = self.params.grid().row_count() - 1;
        let max_col = self.params.grid().column_count() - 1;
        let cur = &mut self.param_cursor;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => cur.row = cur.row.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => cur.row = (cur.row + 1).min(max_row),
            KeyCode::Left | KeyCode::Char('h') => cur.col = cur.col.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => cur.col = (cur.col + 1).min(max_col),
            KeyCode::Char('a') => self.params.grid_mut().append_row(),
            KeyCode::Char('d') => {
                let row = cur.row;
                self.params.grid_mut().remove_row(row);
                self.param_cursor.row = row.min(self.params.grid().row_count() - 1);
            }
            KeyCode::Enter => {
                let (row, col) = (cur.row, cur.col);
                self.mode = Mode::Editing {
                    target: EditTarget::ParamCell { row, col },
                    buffer: self.params.grid().cell(row, col).to_string(),
                };
            }
            _ => {}
        }
    }

    fn results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('[') => self.results.borrow_mut().cycle_market(-1),
            KeyCode::Right | KeyCode::Char(']') => self.results.borrow_mut().cycle_market(1),
            KeyCode::Char('e') => self.start_image_prompt(ImageKind::EquityCurve),
            KeyCode::Char('p') => self.start_image_prompt(ImageKind::PerformanceMetrics),
            KeyCode::Char('n') | KeyCode::Enter => {
                let buffer = self.results.borrow().notes().to_string();
                self.mode = Mode::Editing { target: EditTarget::Notes, buffer };
            }
            _ => {}
        }
    }

    fn start_image_prompt(&mut self, kind: ImageKind) {
        if self.results.borrow().selected_market().is_none() {
            self.mode = Mode::Modal(failure(InputError::NoMarketSelected.to_string()));
            return;
        }
        self.mode = Mode::Prompt {
            kind: PromptKind::ImagePath(kind),
            buffer: String::new(),
        };
    }

    fn editing_key(&mut self, key: KeyEvent, ctrl: bool, target: EditTarget, mut buffer: String) {
        let multiline = target == EditTarget::Notes;
        match key.code {
            KeyCode::Char('s') if ctrl && multiline => {
                self.results.borrow_mut().set_notes(buffer);
                self.save_current_tab();
                return;
            }
            KeyCode::Enter if multiline => buffer.push('\n'),
            KeyCode::Enter => {
                self.commit_edit(target, buffer);
                return;
            }
            KeyCode::Esc if multiline => {
                self.results.borrow_mut().set_notes(buffer);
                return;
            }
            KeyCode::Esc => return,
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if !ctrl => buffer.push(c),
            _ => {}
        }
        self.mode = Mode::Editing { target, buffer };
    }

    fn commit_edit(&mut self, target: EditTarget, value: String) {
        match target {
            EditTarget::IntroField(field) => self.intro.set_field(field, value),
            EditTarget::IntroCell { row, col } => {
                self.intro.grid_mut().set_cell(row, col, value);
            }
            EditTarget::ParamCell { row, col } => {
                self.params.grid_mut().set_cell(row, col, value);
            }
            EditTarget::Notes => self.results.borrow_mut().set_notes(value),
        }
    }

    fn prompt_key(&mut self, key: KeyEvent, kind: PromptKind, mut buffer: String) -> Action {
        match key.code {
            KeyCode::Esc => {
                if kind == PromptKind::OutputPath {
                    self.cancel_generation();
                }
                return Action::None;
            }
            KeyCode::Enter => return self.submit_prompt(kind, &buffer),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
        self.mode = Mode::Prompt { kind, buffer };
        Action::None
    }

    fn submit_prompt(&mut self, kind: PromptKind, raw: &str) -> Action {
        match kind {
            PromptKind::OutputPath => match normalize_output_path(raw) {
                Some(path) => {
                    self.mode = Mode::Generating;
                    Action::Generate(path)
                }
                None => {
                    self.cancel_generation();
                    Action::None
                }
            },
            PromptKind::ImagePath(image_kind) => {
                let result = self
                    .results
                    .borrow_mut()
                    .upload_image(image_kind, Path::new(raw.trim()));
                self.mode = Mode::Modal(match result {
                    Ok(summary) => notice("Success", format!("Image loaded: {summary}")),
                    Err(e) => failure(e.to_string()),
                });
                Action::None
            }
        }
    }

    /// An escaped or empty save prompt is a cancellation, not an error.
    fn cancel_generation(&mut self) {
        warn!("Report generation cancelled");
        self.mode = Mode::Modal(Modal {
            level: ModalLevel::Warning,
            title: "Cancelled".to_string(),
            message: "Report generation cancelled.".to_string(),
        });
    }

    fn save_current_tab(&mut self) {
        match self.tab {
            Tab::Introduction => {
                let at_risk = self.intro.content_at_risk();
                if at_risk.is_empty() {
                    self.save_introduction();
                } else {
                    self.mode = Mode::ConfirmIntroSave { at_risk };
                }
            }
            Tab::ParameterSets => {
                self.params.save();
                self.mode = Mode::Modal(notice("Success", "Changes saved successfully!"));
            }
            Tab::Results => {
                let outcome = self.results.borrow_mut().save_notes();
                self.mode = Mode::Modal(match outcome {
                    Ok(market) => notice("Success", format!("Data for {market} saved successfully!")),
                    Err(e) => failure(e.to_string()),
                });
            }
        }
    }

    fn save_introduction(&mut self) {
        self.intro.save();
        self.mode = Mode::Modal(notice("Success", "Changes saved successfully!"));
    }
}

fn notice(title: &str, message: impl Into<String>) -> Modal {
    Modal {
        level: ModalLevel::Info,
        title: title.to_string(),
        message: message.into(),
    }
}

fn failure(message: impl Into<String>) -> Modal {
    Modal {
        level: ModalLevel::Error,
        title: "Error".to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketField;
    use crate::views::{IntroductionSource, ParameterSource};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn app() -> (App, Arc<MarketStore>) {
        let cfg = Config {
            grid_rows: 3,
            output_dir: PathBuf::from("out"),
            ..Config::default()
        };
        let store = MarketStore::new();
        (App::new(&cfg, Arc::clone(&store)), store)
    }

    /// Type `market` into column 0 of intro grid row `row`.
    fn enter_market(app: &mut App, row: usize, market: &str) {
        app.intro_cursor = Cursor { row: IntroField::ALL.len() + row, col: 0 };
        app.handle_key(key(KeyCode::Enter));
        type_text(app, market);
        app.handle_key(key(KeyCode::Enter));
    }

    fn dismiss(app: &mut App) {
        assert!(matches!(app.mode, Mode::Modal(_)), "expected modal, got {:?}", app.mode);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn editing_a_field_commits_on_enter_and_cancels_on_esc() {
        let (mut app, _) = app();
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "Momentum");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.intro.strategy_name(), "Momentum");

        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Backspace));
        type_text(&mut app, "x");
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.intro.strategy_name(), "Momentum");
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn intro_save_broadcasts_to_results_selector() {
        let (mut app, store) = app();
        enter_market(&mut app, 0, "A");
        enter_market(&mut app, 1, "C");

        app.handle_key(key(KeyCode::Char('s')));
        dismiss(&mut app);

        assert_eq!(store.list_ids(), vec!["A", "C"]);
        assert_eq!(app.results.borrow().selected_market(), Some("A"));
    }

    #[test]
    fn results_selection_is_kept_across_intro_saves() {
        let (mut app, _) = app();
        enter_market(&mut app, 0, "A");
        enter_market(&mut app, 1, "C");
        app.handle_key(key(KeyCode::Char('s')));
        dismiss(&mut app);

        app.results.borrow_mut().select("C");
        enter_market(&mut app, 2, "D");
        app.handle_key(key(KeyCode::Char('s')));
        dismiss(&mut app);

        assert_eq!(app.results.borrow().selected_market(), Some("C"));
        assert_eq!(app.results.borrow().selector().options().len(), 3);
    }

    #[test]
    fn intro_save_asks_before_discarding_results_content() {
        let (mut app, store) = app();
        enter_market(&mut app, 0, "A");
        app.handle_key(key(KeyCode::Char('s')));
        dismiss(&mut app);
        store.set_field("A", MarketField::Notes("keep me".to_string()));

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.mode, Mode::ConfirmIntroSave { at_risk: vec!["A".to_string()] });

        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(store.get("A").unwrap().notes, "keep me");

        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Char('y')));
        dismiss(&mut app);
        assert_eq!(store.get("A").unwrap().notes, "");
    }

    #[test]
    fn notes_are_multiline_and_saved_with_ctrl_s() {
        let (mut app, store) = app();
        enter_market(&mut app, 0, "EURUSD");
        app.handle_key(key(KeyCode::Char('s')));
        dismiss(&mut app);

        app.tab = Tab::Results;
        app.handle_key(key(KeyCode::Char('n')));
        type_text(&mut app, "line one");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "line two");
        app.handle_key(ctrl('s'));

        assert!(matches!(&app.mode, Mode::Modal(m) if m.level == ModalLevel::Info));
        assert_eq!(store.get("EURUSD").unwrap().notes, "line one\nline two");
    }

    #[test]
    fn image_prompt_requires_a_market() {
        let (mut app, _) = app();
        app.tab = Tab::Results;
        app.handle_key(key(KeyCode::Char('e')));
        match &app.mode {
            Mode::Modal(m) => {
                assert_eq!(m.level, ModalLevel::Error);
                assert_eq!(m.message, "Please select a market first.");
            }
            other => panic!("expected error modal, got {other:?}"),
        }
    }

    #[test]
    fn cancelling_the_save_prompt_is_a_warning_not_an_error() {
        let (mut app, _) = app();
        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(
            app.mode,
            Mode::Prompt {
                kind: PromptKind::OutputPath,
                buffer: PathBuf::from("out").join("report.docx").display().to_string(),
            }
        );

        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::None);
        match &app.mode {
            Mode::Modal(m) => {
                assert_eq!(m.level, ModalLevel::Warning);
                assert_eq!(m.title, "Cancelled");
            }
            other => panic!("expected cancelled notice, got {other:?}"),
        }
    }

    #[test]
    fn submitting_a_blank_save_path_is_a_cancellation() {
        let (mut app, _) = app();
        app.handle_key(key(KeyCode::Char('g')));
        if let Mode::Prompt { buffer, .. } = &mut app.mode {
            buffer.clear();
        }
        type_text(&mut app, "   ");

        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::None);
        match &app.mode {
            Mode::Modal(m) => {
                assert_eq!(m.level, ModalLevel::Warning);
                assert_eq!(m.title, "Cancelled");
            }
            other => panic!("expected cancelled notice, got {other:?}"),
        }
    }

    #[test]
    fn submitting_the_save_prompt_requests_generation() {
        let (mut app, _) = app();
        app.handle_key(key(KeyCode::Char('g')));
        if let Mode::Prompt { buffer, .. } = &mut app.mode {
            buffer.clear();
        }
        type_text(&mut app, "final");

        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Action::Generate(PathBuf::from("final.docx"))
        );
        assert_eq!(app.mode, Mode::Generating);

        app.finish_generation(Ok(PathBuf::from("final.docx")));
        assert!(matches!(&app.mode, Mode::Modal(m) if m.level == ModalLevel::Info));
    }

    #[test]
    fn report_data_reflects_all_three_views() {
        let (mut app, _) = app();
        enter_market(&mut app, 0, "EURUSD");
        app.handle_key(key(KeyCode::Char('s')));
        dismiss(&mut app);

        app.tab = Tab::ParameterSets;
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "lookback");
        app.handle_key(key(KeyCode::Enter));

        let data = app.report_data();
        assert_eq!(data.intro_rows.len(), 1);
        assert_eq!(data.parameter_rows, app.params.parameter_rows());
        assert_eq!(data.markets.ids(), vec!["EURUSD"]);
    }

    #[test]
    fn tabs_wrap_and_quit_is_reported() {
        let (mut app, _) = app();
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.tab, Tab::Results);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Introduction);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.handle_key(ctrl('c')), Action::Quit);
        assert_eq!(app.handle_key(ctrl('q')), Action::Quit);
    }
}
