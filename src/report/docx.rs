use std::io::{Seek, Write};
use std::path::Path;

use docx_rs::{
    BreakType, Docx, Paragraph, Pic, Run, RunFonts, Style, StyleType, Table, TableCell, TableRow,
};
use image::GenericImageView;
use tempfile::NamedTempFile;

use crate::error::ReportError;
use crate::report::document::{Block, Document, StyleDef};

/// Render `doc` and atomically place it at `path`.
///
/// Rendering goes to a temporary file in the destination directory which is
/// renamed over `path` on success and deleted on any failure.
pub fn write(doc: &Document, path: &Path) -> Result<(), ReportError> {
    let write_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    render(doc, tmp.as_file_mut())?;
    tmp.as_file_mut().flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

pub fn render<W: Write + Seek>(doc: &Document, out: W) -> Result<(), ReportError> {
    build(doc)?
        .build()
        .pack(out)
        .map_err(|e| ReportError::Render(e.to_string()))
}

fn build(doc: &Document) -> Result<Docx, ReportError> {
    let mut docx = Docx::new();
    for def in &doc.styles {
        // Docx::new() ships its own blank "Normal"; a duplicate id would shadow ours.
        let id = style_id(&def.name);
        docx.styles.styles.retain(|s| s.style_id != id);
        docx = docx.add_style(style(def));
    }

    for block in &doc.blocks {
        docx = match block {
            Block::Paragraph { style, text } => docx.add_paragraph(
                Paragraph::new()
                    .style(&style_id(style))
                    .add_run(Run::new().add_text(text.as_str())),
            ),
            Block::Table { rows } => docx.add_table(table(rows)),
            Block::Image {
                label,
                data,
                width_emu,
            } => docx.add_paragraph(
                Paragraph::new().add_run(Run::new().add_image(picture(label, data, *width_emu)?)),
            ),
            Block::PageBreak => {
                docx.add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
            }
        };
    }

    Ok(docx)
}

/// Word style ids are the display name without spaces ("Heading 1" → "Heading1").
fn style_id(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

fn style(def: &StyleDef) -> Style {
    let mut s = Style::new(&style_id(&def.name), StyleType::Paragraph)
        .name(&def.name)
        .size(def.size_pt as usize * 2)
        .color(&def.color)
        .fonts(
            RunFonts::new()
                .ascii(&def.font)
                .hi_ansi(&def.font)
                .cs(&def.font),
        );
    if def.bold {
        s = s.bold();
    }
    if def.italic {
        s = s.italic();
    }
    s
}

fn table(rows: &[Vec<String>]) -> Table {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(i, cells)| {
            let cells = cells
                .iter()
                .map(|text| {
                    let run = Run::new().add_text(text.as_str());
                    let run = if i == 0 { run.bold() } else { run };
                    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
                })
                .collect();
            TableRow::new(cells)
        })
        .collect();
    Table::new(rows)
}

/// Scale the image to `width_emu`, keeping its aspect ratio.
fn picture(label: &str, data: &[u8], width_emu: u32) -> Result<Pic, ReportError> {
    let img = image::load_from_memory(data).map_err(|e| ReportError::Image {
        market: label.to_string(),
        message: e.to_string(),
    })?;
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(ReportError::Image {
            market: label.to_string(),
            message: "image has no pixels".to_string(),
        });
    }
    Ok(Pic::new(data).size(width_emu, scaled_height(width_emu, w, h)))
}

/// Height in EMU for an image `w`×`h` px drawn `width_emu` wide; saturates at `u32::MAX`.
fn scaled_height(width_emu: u32, w: u32, h: u32) -> u32 {
    let height = u64::from(width_emu) * u64::from(h) / u64::from(w);
    u32::try_from(height).unwrap_or(u32::MAX)
}
