use crate::report::document::{Block, Document};

/// Bracketed markers the assembler recognises in template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    StrategyName,
    SpecificGoal,
    TargetPerformance,
    OptimisationMethod,
    IntroTable,
    ParameterSetTable,
    ResultsTable,
}

impl Placeholder {
    pub const ALL: [Placeholder; 7] = [
        Placeholder::StrategyName,
        Placeholder::SpecificGoal,
        Placeholder::TargetPerformance,
        Placeholder::OptimisationMethod,
        Placeholder::IntroTable,
        Placeholder::ParameterSetTable,
        Placeholder::ResultsTable,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Placeholder::StrategyName => "[strategy_name]",
            Placeholder::SpecificGoal => "[specific_goal]",
            Placeholder::TargetPerformance => "[target_performance_parameter]",
            Placeholder::OptimisationMethod => "[optimisation_method]",
            Placeholder::IntroTable => "[intro_table]",
            Placeholder::ParameterSetTable => "[parameter_set_table]",
            Placeholder::ResultsTable => "[results_table]",
        }
    }

    /// Block placeholders replace their whole paragraph; the rest substitute in place.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Placeholder::IntroTable | Placeholder::ParameterSetTable | Placeholder::ResultsTable
        )
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Body paragraph at this block index.
    Paragraph(usize),
    /// Table cell; `row` 0 is the header row.
    Cell { block: usize, row: usize, col: usize },
}

impl Location {
    pub fn block(self) -> usize {
        match self {
            Location::Paragraph(block) | Location::Cell { block, .. } => block,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub placeholder: Placeholder,
    pub location: Location,
}

/// Single scan of the document recording every placeholder occurrence, in
/// document order. Block placeholders only count in body paragraphs.
pub fn locate(doc: &Document) -> Vec<Hit> {
    let mut hits = Vec::new();
    for (block_idx, block) in doc.blocks.iter().enumerate() {
        match block {
            Block::Paragraph { text, .. } => {
                for placeholder in Placeholder::ALL {
                    if text.contains(placeholder.token()) {
                        hits.push(Hit {
                            placeholder,
                            location: Location::Paragraph(block_idx),
                        });
                    }
                }
            }
            Block::Table { rows } => {
                for (row, cells) in rows.iter().enumerate() {
                    for (col, cell) in cells.iter().enumerate() {
                        for placeholder in Placeholder::ALL.into_iter().filter(|p| !p.is_block()) {
                            if cell.contains(placeholder.token()) {
                                hits.push(Hit {
                                    placeholder,
                                    location: Location::Cell { block: block_idx, row, col },
                                });
                            }
                        }
                    }
                }
            }
            Block::Image { .. } | Block::PageBreak => {}
        }
    }
    hits
}
