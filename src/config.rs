use std::path::PathBuf;

use crate::error::{AppError, Result};

pub const DEFAULT_TEMPLATE_PATH: &str = "templates/report_template.md";

/// English Metric Units per inch, the unit docx drawing extents are expressed in.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Longest edge of the display-only thumbnail derived from an uploaded image.
pub const THUMBNAIL_MAX_PX: u32 = 400;

/// File extensions accepted by the image upload prompt (lowercase, no dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Section number the per-market result headings are numbered under ("3.<n> <market>").
pub const RESULTS_SECTION: u32 = 3;

pub const INTRO_HEADERS: [&str; 5] = [
    "Market",
    "Timeframe",
    "Data Source",
    "Optimisation Timespan",
    "Out-of-Sample Timespan",
];

pub const PARAMETER_HEADERS: [&str; 7] =
    ["Name", "Description", "Default", "Start", "Step", "End", "Best"];

#[derive(Debug, Clone)]
pub struct Config {
    /// Template document the report is built from (REPORT_TEMPLATE)
    pub template_path: PathBuf,
    /// Directory pre-filled in the save-path prompt (REPORT_OUTPUT_DIR)
    pub output_dir: PathBuf,
    /// Display width of embedded result images in inches (REPORT_IMAGE_WIDTH_IN)
    pub image_width_in: f64,
    /// Blank rows each editable grid starts with (GRID_ROWS)
    pub grid_rows: usize,
    pub log_level: String,
    /// The terminal UI owns stdout, so logs go to a file (LOG_FILE)
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let image_width_in = std::env::var("REPORT_IMAGE_WIDTH_IN")
            .unwrap_or_else(|_| "6.0".to_string())
            .parse::<f64>()
            .map_err(|_| AppError::Config("REPORT_IMAGE_WIDTH_IN must be a number".to_string()))?;
        if !(image_width_in > 0.0) {
            return Err(AppError::Config(
                "REPORT_IMAGE_WIDTH_IN must be greater than zero".to_string(),
            ));
        }

        let grid_rows = std::env::var("GRID_ROWS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .map_err(|_| AppError::Config("GRID_ROWS must be a positive integer".to_string()))?;
        if grid_rows == 0 {
            return Err(AppError::Config("GRID_ROWS must be at least 1".to_string()));
        }

        Ok(Self {
            template_path: std::env::var("REPORT_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMPLATE_PATH)),
            output_dir: std::env::var("REPORT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            image_width_in,
            grid_rows,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_file: std::env::var("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("report-builder.log")),
        })
    }

    /// Embedded image width converted to EMU.
    pub fn image_width_emu(&self) -> u32 {
        (self.image_width_in * EMU_PER_INCH).round() as u32
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            output_dir: PathBuf::from("."),
            image_width_in: 6.0,
            grid_rows: 10,
            log_level: "info".to_string(),
            log_file: PathBuf::from("report-builder.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_inches_in_emu() {
        let cfg = Config::default();
        assert_eq!(cfg.image_width_emu(), 5_486_400);
    }
}
