use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

use crate::types::ImageKind;
use crate::views::{EditableGrid, IntroField};

use super::app::{App, Cursor, EditTarget, Mode, ModalLevel, Tab};

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Outer vertical split: header | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.tab {
        Tab::Introduction => render_introduction(f, app, chunks[1]),
        Tab::ParameterSets => render_parameters(f, app, chunks[1]),
        Tab::Results => render_results(f, app, chunks[1]),
    }
    render_footer(f, app, chunks[2]);
    render_overlay(f, app, area);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    " Strategy Report Builder ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );
    f.render_widget(tabs, area);
}

fn render_introduction(f: &mut Frame, app: &App, area: Rect) {
    let fields = IntroField::ALL.len();
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(fields as u16 + 2), Constraint::Min(0)])
        .split(area);

    let lines: Vec<Line> = IntroField::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = app.intro_cursor.row == i;
            let value = match &app.mode {
                Mode::Editing { target: EditTarget::IntroField(editing), buffer } if editing == field => {
                    format!("{buffer}▏")
                }
                _ => app.intro.field(*field).to_string(),
            };
            let label_style = if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Yellow)
            };
            Line::from(vec![
                Span::styled(format!("{:<30}", field.label()), label_style),
                Span::raw(value),
            ])
        })
        .collect();

    let form = Paragraph::new(lines).block(panel(" STRATEGY "));
    f.render_widget(form, halves[0]);

    let cursor = (app.intro_cursor.row >= fields).then(|| Cursor {
        row: app.intro_cursor.row - fields,
        col: app.intro_cursor.col,
    });
    let editing = match &app.mode {
        Mode::Editing { target: EditTarget::IntroCell { row, col }, buffer } => {
            Some((*row, *col, buffer.as_str()))
        }
        _ => None,
    };
    render_grid(f, app.intro.grid(), cursor, editing, " MARKETS ", halves[1]);
}

fn render_parameters(f: &mut Frame, app: &App, area: Rect) {
    let editing = match &app.mode {
        Mode::Editing { target: EditTarget::ParamCell { row, col }, buffer } => {
            Some((*row, *col, buffer.as_str()))
        }
        _ => None,
    };
    render_grid(
        f,
        app.params.grid(),
        Some(app.param_cursor),
        editing,
        " PARAMETER SETS ",
        area,
    );
}

fn render_grid(
    f: &mut Frame,
    grid: &EditableGrid,
    cursor: Option<Cursor>,
    editing: Option<(usize, usize, &str)>,
    title: &str,
    area: Rect,
) {
    let header_cells = grid
        .headers()
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = grid
        .rows()
        .iter()
        .enumerate()
        .map(|(r, cells)| {
            let cells = cells.iter().enumerate().map(|(c, text)| {
                let at_cursor = cursor.is_some_and(|cur| cur.row == r && cur.col == c);
                match editing {
                    Some((er, ec, buffer)) if er == r && ec == c => Cell::from(format!("{buffer}▏"))
                        .style(Style::default().fg(Color::Black).bg(Color::Cyan)),
                    _ if at_cursor => Cell::from(text.as_str()).style(
                        Style::default()
                            .bg(Color::DarkGray)
                            .add_modifier(Modifier::BOLD),
                    ),
                    _ => Cell::from(text.as_str()),
                }
            });
            Row::new(cells)
        })
        .collect();

    let widths = vec![Constraint::Ratio(1, grid.column_count() as u32); grid.column_count()];
    let table = Table::new(rows, widths).header(header).block(panel(title));
    f.render_widget(table, area);
}

fn render_results(f: &mut Frame, app: &App, area: Rect) {
    let results = app.results.borrow();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // market selector
            Constraint::Length(4), // images
            Constraint::Min(0),    // notes
        ])
        .split(area);

    let options = results.selector().options();
    let selector_line = if options.is_empty() {
        Line::from(Span::styled(
            "No markets. Save the introduction grid first.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = vec![Span::raw("◀ ")];
        for id in options {
            let style = if Some(id.as_str()) == results.selected_market() {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            spans.push(Span::styled(format!(" {id} "), style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::raw("▶"));
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(selector_line).block(panel(" MARKET ")), chunks[0]);

    let image_lines: Vec<Line> = [ImageKind::EquityCurve, ImageKind::PerformanceMetrics]
        .into_iter()
        .map(|kind| {
            let (text, color) = match results.image_summary(kind) {
                Some(summary) => (summary.to_string(), Color::Green),
                None => ("not uploaded".to_string(), Color::DarkGray),
            };
            Line::from(vec![
                Span::styled(format!("{:<22}", kind.to_string()), Style::default().fg(Color::Yellow)),
                Span::styled(text, Style::default().fg(color)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(image_lines).block(panel(" IMAGES ")), chunks[1]);

    let (notes, title) = match &app.mode {
        Mode::Editing { target: EditTarget::Notes, buffer } => (format!("{buffer}▏"), " NOTES (editing) "),
        _ => (results.notes().to_string(), " NOTES "),
    };
    let notes = Paragraph::new(notes)
        .wrap(Wrap { trim: false })
        .block(panel(title));
    f.render_widget(notes, chunks[2]);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let keys: &[(&str, &str)] = match (&app.mode, app.tab) {
        (Mode::Editing { target: EditTarget::Notes, .. }, _) => {
            &[("[Enter] ", "newline  "), ("[Esc] ", "done  "), ("[^S] ", "save")]
        }
        (Mode::Editing { .. } | Mode::Prompt { .. }, _) => &[("[Enter] ", "confirm  "), ("[Esc] ", "cancel")],
        (_, Tab::Results) => &[
            ("[q] ", "quit  "),
            ("[Tab] ", "switch  "),
            ("[◀ ▶ / [ ]] ", "market  "),
            ("[e/p] ", "upload image  "),
            ("[n] ", "notes  "),
            ("[s] ", "save  "),
            ("[g] ", "generate"),
        ],
        _ => &[
            ("[q] ", "quit  "),
            ("[Tab] ", "switch  "),
            ("[↑↓←→] ", "move  "),
            ("[Enter] ", "edit  "),
            ("[a/d] ", "add/delete row  "),
            ("[s] ", "save  "),
            ("[g] ", "generate"),
        ],
    };

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(k, label)| {
            [
                Span::styled(*k, Style::default().fg(Color::Yellow)),
                Span::raw(*label),
            ]
        })
        .collect();
    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn render_overlay(f: &mut Frame, app: &App, area: Rect) {
    let (title, body, color) = match &app.mode {
        Mode::Modal(modal) => {
            let color = match modal.level {
                ModalLevel::Info => Color::Green,
                ModalLevel::Warning => Color::Yellow,
                ModalLevel::Error => Color::Red,
            };
            (format!(" {} ", modal.title), format!("{}\n\n[Enter] close", modal.message), color)
        }
        Mode::Prompt { kind, buffer } => (format!(" {} ", kind.label()), format!("{buffer}▏"), Color::Cyan),
        Mode::ConfirmIntroSave { at_risk } => (
            " Discard results? ".to_string(),
            format!(
                "Saving rebuilds every market from the grid.\nImages and notes for {} will be lost.\n\n[y] save anyway  [n] cancel",
                at_risk.join(", ")
            ),
            Color::Yellow,
        ),
        Mode::Generating => (" Working ".to_string(), "Generating report...".to_string(), Color::Cyan),
        Mode::Normal | Mode::Editing { .. } => return,
    };

    let popup = centered(area, 60, 9);
    f.render_widget(Clear, popup);
    let paragraph = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Span::styled(title, Style::default().fg(color).add_modifier(Modifier::BOLD))),
    );
    f.render_widget(paragraph, popup);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// A `width`% wide, `height` rows tall rectangle centred in `area`.
fn centered(area: Rect, width_pct: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct.min(100)) / 100) as u16;
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
