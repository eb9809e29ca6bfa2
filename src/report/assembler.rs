use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{INTRO_HEADERS, PARAMETER_HEADERS, RESULTS_SECTION};
use crate::error::ReportError;
use crate::report::document::{Block, Document, STYLE_HEADING_1, STYLE_HEADING_2};
use crate::report::placeholder::{locate, Hit, Location, Placeholder};
use crate::report::styles::StyleApplier;
use crate::report::{docx, template};
use crate::types::{IntroRow, MarketSnapshot, ParameterRow};
use crate::views::{IntroductionSource, ParameterSource, ResultsSource};

const DISCLAIMER_TITLE: &str = "Disclaimer";

const DISCLAIMER: &[&str] = &[
    "This report is provided for informational and research purposes only. It does not \
     constitute investment advice, an offer to sell, or a solicitation of an offer to buy \
     any financial instrument.",
    "All results shown are derived from historical or simulated data. Past performance, \
     whether actual or simulated, is not indicative of future results. Optimised parameters \
     may be fitted to the period tested and can perform materially worse out of sample.",
    "Trading leveraged products carries a high level of risk and may not be suitable for all \
     investors. You may lose more than your initial deposit. Seek independent professional \
     advice before making any trading decision.",
    "No representation or warranty is made as to the accuracy or completeness of the \
     information contained herein, and no liability is accepted for any loss arising from \
     its use.",
];

// ---------------------------------------------------------------------------
// ReportData
// ---------------------------------------------------------------------------

/// Frozen copy of everything the report needs, pulled from the views once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportData {
    pub strategy_name: String,
    pub specific_goal: String,
    pub target_performance: String,
    pub optimisation_method: String,
    pub intro_rows: Vec<IntroRow>,
    pub parameter_rows: Vec<ParameterRow>,
    pub markets: MarketSnapshot,
}

impl ReportData {
    /// Calls each accessor exactly once.
    pub fn collect(
        intro: &dyn IntroductionSource,
        params: &dyn ParameterSource,
        results: &dyn ResultsSource,
    ) -> Self {
        Self {
            strategy_name: intro.strategy_name(),
            specific_goal: intro.specific_goal(),
            target_performance: intro.target_performance(),
            optimisation_method: intro.optimisation_method(),
            intro_rows: intro.intro_table_rows(),
            parameter_rows: params.parameter_rows(),
            markets: results.market_store_snapshot(),
        }
    }

    fn text_for(&self, placeholder: Placeholder) -> Option<&str> {
        match placeholder {
            Placeholder::StrategyName => Some(&self.strategy_name),
            Placeholder::SpecificGoal => Some(&self.specific_goal),
            Placeholder::TargetPerformance => Some(&self.target_performance),
            Placeholder::OptimisationMethod => Some(&self.optimisation_method),
            Placeholder::IntroTable | Placeholder::ParameterSetTable | Placeholder::ResultsTable => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ReportAssembler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler {
    image_width_emu: u32,
}

impl ReportAssembler {
    pub fn new(image_width_emu: u32) -> Self {
        Self { image_width_emu }
    }

    /// Load the template, fill it from `data` and write a `.docx` to `output`.
    ///
    /// The document is rendered into a temporary file next to `output` and only
    /// moved into place once complete, so a failure never leaves a partial file.
    pub fn generate(
        &self,
        template_path: &Path,
        output: &Path,
        data: &ReportData,
    ) -> Result<PathBuf, ReportError> {
        let template = template::load(template_path)?;
        let doc = self.assemble(template, data);
        docx::write(&doc, output)?;
        info!(
            output = %output.display(),
            markets = data.markets.len(),
            blocks = doc.blocks.len(),
            "Report written to {}",
            output.display(),
        );
        Ok(output.to_path_buf())
    }

    /// Resolve every placeholder in `doc` and append the disclaimer.
    ///
    /// Pass 1 locates all occurrences; pass 2 substitutes text in place, then
    /// expands block placeholders from the bottom of the document up so the
    /// located indices stay valid.
    pub fn assemble(&self, mut doc: Document, data: &ReportData) -> Document {
        StyleApplier::apply(&mut doc);

        let hits = locate(&doc);

        for hit in hits.iter().filter(|h| !h.placeholder.is_block()) {
            if let Some(replacement) = data.text_for(hit.placeholder) {
                substitute(&mut doc, hit, replacement);
            }
        }

        // Only the first paragraph carrying a block placeholder is expanded.
        let mut expansions: BTreeMap<usize, Vec<Placeholder>> = BTreeMap::new();
        for placeholder in Placeholder::ALL.into_iter().filter(|p| p.is_block()) {
            let first = hits.iter().find(|h| h.placeholder == placeholder);
            match first {
                Some(hit) => expansions
                    .entry(hit.location.block())
                    .or_default()
                    .push(placeholder),
                None => debug!(placeholder = %placeholder, "Template has no {placeholder}, section skipped"),
            }
        }

        for (block_idx, placeholders) in expansions.into_iter().rev() {
            let replacement: Vec<Block> = placeholders
                .into_iter()
                .flat_map(|p| self.expand(p, data))
                .collect();
            doc.blocks.splice(block_idx..=block_idx, replacement);
        }

        append_disclaimer(&mut doc);
        doc
    }

    fn expand(&self, placeholder: Placeholder, data: &ReportData) -> Vec<Block> {
        match placeholder {
            Placeholder::IntroTable => vec![table(
                &INTRO_HEADERS,
                data.intro_rows.iter().map(|r| r.cells().to_vec()),
            )],
            Placeholder::ParameterSetTable => vec![table(
                &PARAMETER_HEADERS,
                data.parameter_rows
                    .iter()
                    .filter(|r| !r.name.is_empty())
                    .map(|r| r.cells().to_vec()),
            )],
            Placeholder::ResultsTable => self.results_blocks(&data.markets),
            _ => Vec::new(),
        }
    }

    /// One block per market in snapshot order: numbered heading, notes,
    /// equity curve, performance metrics, spacer.
    fn results_blocks(&self, markets: &MarketSnapshot) -> Vec<Block> {
        if markets.is_empty() {
            debug!("No markets saved, results section left empty");
            return Vec::new();
        }
        let mut blocks = Vec::new();
        for (n, (market, record)) in markets.iter().enumerate() {
            blocks.push(Block::paragraph(
                STYLE_HEADING_2,
                format!("{RESULTS_SECTION}.{} {market}", n + 1),
            ));
            if !record.notes.is_empty() {
                blocks.push(Block::normal(record.notes.clone()));
            }
            for image in [&record.equity_curve, &record.performance_metrics].into_iter().flatten() {
                blocks.push(Block::Image {
                    label: market.to_string(),
                    data: image.clone(),
                    width_emu: self.image_width_emu,
                });
            }
            blocks.push(Block::normal(""));
        }
        blocks
    }
}

fn substitute(doc: &mut Document, hit: &Hit, replacement: &str) {
    let token = hit.placeholder.token();
    let text = match hit.location {
        Location::Paragraph(idx) => match doc.blocks.get_mut(idx) {
            Some(Block::Paragraph { text, .. }) => Some(text),
            _ => None,
        },
        Location::Cell { block, row, col } => match doc.blocks.get_mut(block) {
            Some(Block::Table { rows }) => rows.get_mut(row).and_then(|r| r.get_mut(col)),
            _ => None,
        },
    };
    if let Some(text) = text {
        *text = text.replace(token, replacement);
    }
}

fn table(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> Block {
    let mut all = vec![headers.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    all.extend(rows);
    Block::Table { rows: all }
}

fn append_disclaimer(doc: &mut Document) {
    doc.blocks.push(Block::PageBreak);
    doc.blocks.push(Block::paragraph(STYLE_HEADING_1, DISCLAIMER_TITLE));
    doc.blocks.extend(DISCLAIMER.iter().map(|p| Block::normal(*p)));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
