use serde::Deserialize;

pub const STYLE_TITLE: &str = "Title";
pub const STYLE_HEADING_1: &str = "Heading 1";
pub const STYLE_HEADING_2: &str = "Heading 2";
pub const STYLE_NORMAL: &str = "Normal";

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

/// A named paragraph style. `size_pt` is in whole points, `color` is RRGGBB hex.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StyleDef {
    pub name: String,
    pub font: String,
    pub size_pt: u32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "000000".to_string()
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        #[serde(default = "default_style")]
        style: String,
        #[serde(default)]
        text: String,
    },
    /// `rows[0]` is the header row.
    Table { rows: Vec<Vec<String>> },
    /// Raw image bytes scaled to `width_emu` when rendered. `label` names the
    /// owner in error messages.
    #[serde(skip)]
    Image {
        label: String,
        data: Vec<u8>,
        width_emu: u32,
    },
    PageBreak,
}

fn default_style() -> String {
    STYLE_NORMAL.to_string()
}

impl Block {
    pub fn paragraph(style: &str, text: impl Into<String>) -> Self {
        Block::Paragraph {
            style: style.to_string(),
            text: text.into(),
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::paragraph(STYLE_NORMAL, text)
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// In-memory report document: a style sheet plus an ordered list of body blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub styles: Vec<StyleDef>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            styles: Vec::new(),
            blocks,
        }
    }

    #[cfg(test)]
    pub fn style(&self, name: &str) -> Option<&StyleDef> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Overwrite the style with the same name in place, or append it.
    /// Any further styles sharing the name are dropped.
    pub fn upsert_style(&mut self, def: StyleDef) {
        match self.styles.iter().position(|s| s.name == def.name) {
            Some(pos) => {
                let name = def.name.clone();
                self.styles[pos] = def;
                let mut seen = false;
                self.styles.retain(|s| {
                    if s.name != name {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.styles.push(def),
        }
    }
}
