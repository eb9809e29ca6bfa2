//! Template loading.
//!
//! `.json` templates deserialize straight into a [`Document`]. Anything else is
//! read as the line-based text format:
//!
//! ```text
//! # Title line
//! ## Heading 1 line
//! ### Heading 2 line
//! Paragraph text, continued on
//! the next line until a blank line.
//! | Header | Cells |
//! | body   | cells |
//! \pagebreak
//! ```

use std::path::Path;

use crate::error::ReportError;
use crate::report::document::{
    Block, Document, STYLE_HEADING_1, STYLE_HEADING_2, STYLE_NORMAL, STYLE_TITLE,
};

const PAGE_BREAK: &str = "\\pagebreak";

pub fn load(path: &Path) -> Result<Document, ReportError> {
    let source = std::fs::read_to_string(path).map_err(|source| ReportError::TemplateOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&source)?)
    } else {
        parse_text(&source)
    }
}

pub fn parse_text(source: &str) -> Result<Document, ReportError> {
    let mut parser = TextParser::default();
    for (idx, raw) in source.lines().enumerate() {
        parser.line(idx + 1, raw)?;
    }
    parser.flush_paragraph();
    parser.flush_table();
    Ok(Document::new(parser.blocks))
}

#[derive(Default)]
struct TextParser<'a> {
    blocks: Vec<Block>,
    paragraph: Vec<&'a str>,
    table: Vec<Vec<String>>,
}

impl<'a> TextParser<'a> {
    fn line(&mut self, line_no: usize, raw: &'a str) -> Result<(), ReportError> {
        let line = raw.trim();

        if line.starts_with('|') {
            self.flush_paragraph();
            return self.table_row(line_no, line);
        }
        self.flush_table();

        if line.is_empty() {
            self.flush_paragraph();
        } else if line == PAGE_BREAK {
            self.flush_paragraph();
            self.blocks.push(Block::PageBreak);
        } else if let Some((style, text)) = heading(line) {
            self.flush_paragraph();
            self.blocks.push(Block::paragraph(style, text));
        } else {
            self.paragraph.push(line);
        }
        Ok(())
    }

    fn table_row(&mut self, line_no: usize, line: &str) -> Result<(), ReportError> {
        let inner = line.trim_start_matches('|');
        let inner = inner.strip_suffix('|').unwrap_or(inner);
        let cells: Vec<String> = inner.split('|').map(|c| c.trim().to_string()).collect();

        // Markdown header separator: |---|:--:|
        if cells
            .iter()
            .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
        {
            return Ok(());
        }

        if let Some(first) = self.table.first() {
            if first.len() != cells.len() {
                return Err(ReportError::TemplateParse {
                    line: line_no,
                    message: format!(
                        "table row has {} cells, expected {}",
                        cells.len(),
                        first.len()
                    ),
                });
            }
        }
        self.table.push(cells);
        Ok(())
    }

    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            let text = self.paragraph.join(" ");
            self.paragraph.clear();
            self.blocks.push(Block::paragraph(STYLE_NORMAL, text));
        }
    }

    fn flush_table(&mut self) {
        if !self.table.is_empty() {
            let rows = std::mem::take(&mut self.table);
            self.blocks.push(Block::Table { rows });
        }
    }
}

fn heading(line: &str) -> Option<(&'static str, &str)> {
    [("### ", STYLE_HEADING_2), ("## ", STYLE_HEADING_1), ("# ", STYLE_TITLE)]
        .into_iter()
        .find_map(|(prefix, style)| line.strip_prefix(prefix).map(|rest| (style, rest.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headings_paragraphs_tables_and_breaks() {
        let doc = parse_text(
            "# [strategy_name] Report\n\
             \n\
             ## 1. Introduction\n\
             This report covers\n\
             [strategy_name].\n\
             \n\
             | Key | Value |\n\
             |-----|-------|\n\
             | Goal | [specific_goal] |\n\
             [intro_table]\n\
             \\pagebreak\n\
             ### Detail\n",
        )
        .unwrap();

        assert_eq!(
            doc.blocks,
            vec![
                Block::paragraph(STYLE_TITLE, "[strategy_name] Report"),
                Block::paragraph(STYLE_HEADING_1, "1. Introduction"),
                Block::normal("This report covers [strategy_name]."),
                Block::Table {
                    rows: vec![
                        vec!["Key".to_string(), "Value".to_string()],
                        vec!["Goal".to_string(), "[specific_goal]".to_string()],
                    ]
                },
                Block::normal("[intro_table]"),
                Block::PageBreak,
                Block::paragraph(STYLE_HEADING_2, "Detail"),
            ]
        );
    }

    #[test]
    fn ragged_table_reports_line_number() {
        let err = parse_text("intro\n\n| a | b |\n| 1 |\n").unwrap_err();
        match err {
            ReportError::TemplateParse { line, message } => {
                assert_eq!(line, 4);
                assert!(message.contains("1 cells, expected 2"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_template_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.md")).unwrap_err();
        assert!(matches!(err, ReportError::TemplateOpen { .. }));
    }

    #[test]
    fn json_template_is_selected_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.JSON");
        std::fs::write(&path, r#"{"blocks":[{"type":"paragraph","text":"[results_table]"}]}"#).unwrap();

        let doc = load(&path).unwrap();
        assert_eq!(doc.blocks, vec![Block::normal("[results_table]")]);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(&path), Err(ReportError::TemplateJson(_))));
    }
}
