pub mod assembler;
pub mod document;
pub mod docx;
pub mod placeholder;
pub mod styles;
pub mod template;

use std::path::PathBuf;

pub use assembler::{ReportAssembler, ReportData};

use crate::error::Result;

/// Run [`ReportAssembler::generate`] on the blocking pool.
///
/// `data` must already be a snapshot: nothing here touches the live views or store.
pub async fn generate_report(
    assembler: ReportAssembler,
    template: PathBuf,
    output: PathBuf,
    data: ReportData,
) -> Result<PathBuf> {
    let written =
        tokio::task::spawn_blocking(move || assembler.generate(&template, &output, &data)).await??;
    Ok(written)
}

/// Save paths without an extension get `.docx` appended.
pub fn normalize_output_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut path = PathBuf::from(trimmed);
    if path.extension().is_none() {
        path.set_extension("docx");
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ReportError};
    use crate::test_support::png_bytes;
    use crate::types::{MarketRecord, MarketSnapshot};

    #[test]
    fn output_path_gets_docx_extension() {
        assert_eq!(normalize_output_path("  out/report "), Some(PathBuf::from("out/report.docx")));
        assert_eq!(normalize_output_path("report.docx"), Some(PathBuf::from("report.docx")));
        assert_eq!(normalize_output_path("   "), None);
    }

    #[tokio::test]
    async fn generates_from_the_shipped_template() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.docx");
        let data = ReportData {
            strategy_name: "Breakout".to_string(),
            markets: MarketSnapshot::new(vec![(
                "EURUSD".to_string(),
                MarketRecord {
                    notes: "Robust across regimes".to_string(),
                    equity_curve: Some(png_bytes(40, 20)),
                    ..MarketRecord::default()
                },
            )]),
            ..ReportData::default()
        };

        let template = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/report_template.md");
        let written = generate_report(ReportAssembler::new(914_400), template, output.clone(), data)
            .await
            .unwrap();

        assert_eq!(written, output);
        assert!(output.metadata().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn missing_template_reports_error_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.docx");

        let err = generate_report(
            ReportAssembler::new(914_400),
            dir.path().join("missing.md"),
            output.clone(),
            ReportData::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Report(ReportError::TemplateOpen { .. })));
        assert!(!output.exists());
    }
}
