//! Category Lookup Tables
//!
//! Label → code tables for the three categorical features. The codes are
//! the label-encoder output the scaler and model were fitted on, so both the
//! spelling and the numbers must stay exactly as listed here.
//!
//! Tables:
//! - STATE_MAP: 20 Indian states
//! - CROP_MAP: 4 crops
//! - SEASON_MAP: 7 growing seasons

use std::fmt;

use crate::error::PipelineError;

/// Categorical feature identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    State,
    Crop,
    Season,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 3] = [CategoryKind::State, CategoryKind::Crop, CategoryKind::Season];

    /// Form field carrying the label (e.g. "State")
    pub fn label_field(self) -> &'static str {
        match self {
            CategoryKind::State => "State",
            CategoryKind::Crop => "Crop",
            CategoryKind::Season => "Season",
        }
    }

    fn table(self) -> &'static [CategoryEntry] {
        match self {
            CategoryKind::State => STATE_MAP,
            CategoryKind::Crop => CROP_MAP,
            CategoryKind::Season => SEASON_MAP,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::State => write!(f, "state"),
            CategoryKind::Crop => write!(f, "crop"),
            CategoryKind::Season => write!(f, "season"),
        }
    }
}

/// A single label with its trained code
#[derive(Debug, Clone, Copy)]
pub struct CategoryEntry {
    pub code: u32,
    pub label: &'static str,
}

// ============================================================================
// EMBEDDED CATEGORY MAPS
// ============================================================================

static STATE_MAP: &[CategoryEntry] = &[
    CategoryEntry { code: 0, label: "Andhra Pradesh" },
    CategoryEntry { code: 1, label: "Assam" },
    CategoryEntry { code: 2, label: "Bihar" },
    CategoryEntry { code: 3, label: "Chhattisgarh" },
    CategoryEntry { code: 4, label: "Gujarat" },
    CategoryEntry { code: 5, label: "Haryana" },
    CategoryEntry { code: 6, label: "Himachal Pradesh" },
    CategoryEntry { code: 7, label: "Jharkhand" },
    CategoryEntry { code: 8, label: "Karnataka" },
    CategoryEntry { code: 9, label: "Kerala" },
    CategoryEntry { code: 10, label: "Madhya Pradesh" },
    CategoryEntry { code: 11, label: "Maharashtra" },
    CategoryEntry { code: 12, label: "Orissa" },
    CategoryEntry { code: 13, label: "Punjab" },
    CategoryEntry { code: 14, label: "Rajasthan" },
    CategoryEntry { code: 15, label: "Tamil Nadu" },
    CategoryEntry { code: 16, label: "Telangana" },
    CategoryEntry { code: 17, label: "Uttar Pradesh" },
    CategoryEntry { code: 18, label: "Uttarakhand" },
    CategoryEntry { code: 19, label: "West Bengal" },
];

static CROP_MAP: &[CategoryEntry] = &[
    CategoryEntry { code: 0, label: "Chickpea" },
    CategoryEntry { code: 1, label: "Cotton" },
    CategoryEntry { code: 2, label: "Maize" },
    CategoryEntry { code: 3, label: "Rice" },
];

static SEASON_MAP: &[CategoryEntry] = &[
    CategoryEntry { code: 0, label: "Autumn" },
    CategoryEntry { code: 1, label: "Kharif" },
    CategoryEntry { code: 2, label: "Rabi" },
    CategoryEntry { code: 3, label: "Summer" },
    CategoryEntry { code: 4, label: "Unknown" },
    CategoryEntry { code: 5, label: "Whole Year" },
    CategoryEntry { code: 6, label: "Winter" },
];

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

/// Encode a label into its trained code
///
/// Labels must match exactly: no trimming, no case folding.
pub fn encode(kind: CategoryKind, label: &str) -> Result<u32, PipelineError> {
    kind.table()
        .iter()
        .find(|entry| entry.label == label)
        .map(|entry| entry.code)
        .ok_or_else(|| PipelineError::UnknownCategory {
            kind,
            label: label.to_string(),
        })
}

/// Reverse lookup: code → label
pub fn decode(kind: CategoryKind, code: u32) -> Option<&'static str> {
    kind.table()
        .iter()
        .find(|entry| entry.code == code)
        .map(|entry| entry.label)
}

/// All labels of a map in code order (drop-down contents)
pub fn labels(kind: CategoryKind) -> Vec<&'static str> {
    kind.table().iter().map(|entry| entry.label).collect()
}
