use crate::report::document::{
    Document, StyleDef, STYLE_HEADING_1, STYLE_HEADING_2, STYLE_NORMAL, STYLE_TITLE,
};

const REPORT_FONT: &str = "Arial";

/// Installs the report's paragraph styles on a document before content is written.
pub struct StyleApplier;

impl StyleApplier {
    /// (name, size in points, bold)
    const STYLES: [(&'static str, u32, bool); 4] = [
        (STYLE_TITLE, 28, true),
        (STYLE_HEADING_1, 18, true),
        (STYLE_HEADING_2, 16, true),
        (STYLE_NORMAL, 12, false),
    ];

    pub fn definitions() -> Vec<StyleDef> {
        Self::STYLES
            .iter()
            .map(|&(name, size_pt, bold)| StyleDef {
                name: name.to_string(),
                font: REPORT_FONT.to_string(),
                size_pt,
                bold,
                italic: false,
                color: "000000".to_string(),
            })
            .collect()
    }

    /// Idempotent: existing styles with these names are overwritten in place.
    pub fn apply(doc: &mut Document) {
        for def in Self::definitions() {
            doc.upsert_style(def);
        }
    }
}
