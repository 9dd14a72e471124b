//! Configuration types for statement extraction.
//!
//! Every knob lives in [`ParseConfig`], built via its [`ParseConfigBuilder`].
//! Geometry tolerances are grouped per detection strategy so the ruled-table
//! detector and the whitespace detector can be tuned independently.

use crate::error::StatementError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one parse run.
///
/// # Example
/// ```rust
/// use stmtparse::{PageSelection, ParseConfig};
///
/// let config = ParseConfig::builder()
///     .pages(PageSelection::Range(1, 3))
///     .snap_tolerance(2.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.lattice.snap_tolerance, 2.0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseConfig {
    /// PDF user password for encrypted statements.
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Page selection. Default: all pages.
    pub pages: PageSelection,

    /// Explicit path to libpdfium. If None, the working directory and then
    /// the system library path are tried.
    pub pdfium_library: Option<PathBuf>,

    /// Ruled-table detection (Current-Account layout).
    pub lattice: LatticeSettings,

    /// Whitespace-table detection (Credit-Card layout).
    pub stream: StreamSettings,
}

/// Tolerances for ruling-line ("lattice") table detection, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeSettings {
    /// Edge coordinates closer than this are snapped to their mean. Default: 3.0.
    pub snap_tolerance: f32,
    /// Collinear edges separated by at most this gap are joined. Default: 3.0.
    pub join_tolerance: f32,
    /// Slack allowed when testing whether two edges cross. Default: 3.0.
    pub intersection_tolerance: f32,
    /// Paths thinner than this are treated as a single ruling line rather
    /// than a rectangle with four sides. Default: 2.0.
    pub ruling_max_thickness: f32,
    /// Word grouping: horizontal gap, as a fraction of char height, that
    /// still belongs to the same word. Default: 0.3.
    pub word_gap_ratio: f32,
}

impl Default for LatticeSettings {
    fn default() -> Self {
        Self {
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            intersection_tolerance: 3.0,
            ruling_max_thickness: 2.0,
            word_gap_ratio: 0.3,
        }
    }
}

/// Tolerances for whitespace ("stream") table detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Words whose vertical centres differ by at most this many points share
    /// a text line. Default: 2.0.
    pub row_tolerance: f32,
    /// Words closer than this multiple of the line height merge into one
    /// cell phrase. Default: 1.0.
    pub column_gap_ratio: f32,
    /// A vertical gap larger than this multiple of the median line height
    /// starts a new table. Default: 2.5.
    pub table_gap_ratio: f32,
    /// Word grouping, as in [`LatticeSettings::word_gap_ratio`]. Default: 0.3.
    pub word_gap_ratio: f32,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            row_tolerance: 2.0,
            column_gap_ratio: 1.0,
            table_gap_ratio: 2.5,
            word_gap_ratio: 0.3,
        }
    }
}

impl ParseConfig {
    /// Create a new builder for `ParseConfig`.
    pub fn builder() -> ParseConfigBuilder {
        ParseConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ParseConfig`].
#[derive(Debug)]
pub struct ParseConfigBuilder {
    config: ParseConfig,
}

impl ParseConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn lattice(mut self, settings: LatticeSettings) -> Self {
        self.config.lattice = settings;
        self
    }

    pub fn stream(mut self, settings: StreamSettings) -> Self {
        self.config.stream = settings;
        self
    }

    pub fn snap_tolerance(mut self, pts: f32) -> Self {
        self.config.lattice.snap_tolerance = pts;
        self
    }

    pub fn row_tolerance(mut self, pts: f32) -> Self {
        self.config.stream.row_tolerance = pts;
        self
    }

    pub fn table_gap_ratio(mut self, ratio: f32) -> Self {
        self.config.stream.table_gap_ratio = ratio;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ParseConfig, StatementError> {
        let l = &self.config.lattice;
        let s = &self.config.stream;
        let tolerances = [
            ("snap_tolerance", l.snap_tolerance),
            ("join_tolerance", l.join_tolerance),
            ("intersection_tolerance", l.intersection_tolerance),
            ("ruling_max_thickness", l.ruling_max_thickness),
            ("row_tolerance", s.row_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(StatementError::InvalidConfig(format!(
                    "{name} must be a non-negative number of points, got {value}"
                )));
            }
        }
        let ratios = [
            ("lattice.word_gap_ratio", l.word_gap_ratio),
            ("stream.word_gap_ratio", s.word_gap_ratio),
            ("column_gap_ratio", s.column_gap_ratio),
            ("table_gap_ratio", s.table_gap_ratio),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value <= 0.0 {
                return Err(StatementError::InvalidConfig(format!(
                    "{name} must be > 0, got {value}"
                )));
            }
        }
        if let PageSelection::Range(start, end) = self.config.pages {
            if start == 0 || start > end {
                return Err(StatementError::InvalidConfig(format!(
                    "page range {start}-{end} is invalid (pages are 1-indexed, start <= end)"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the statement to scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Scan all pages (default).
    #[default]
    All,
    /// Scan a single page (1-indexed).
    Single(usize),
    /// Scan a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Scan specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
