//! Feature Vector Assembler
//!
//! Turns a raw input record (form fields or a JSON object) into the complete
//! 15-feature vector:
//!
//! 1. Year (required), Decade (explicit, or derived in assisted mode)
//! 2. State/Crop/Season: explicit `<Kind>_encoded` code, else label lookup
//! 3. Numeric measurements, by canonical name or UI alias
//! 4. Assisted-mode defaults for Humidity, Wind and Solar radiation
//!
//! Fields are resolved in canonical order and the first failure is returned.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::encoding::{encode, CategoryKind};
use crate::error::PipelineError;
use crate::features::vector::{Feature, FeatureVector};

/// Assisted-mode fallback for `Humidity_%`
pub const DEFAULT_HUMIDITY_PCT: f64 = 80.0;
/// Assisted-mode fallback for `Wind_Speed_m_s`
pub const DEFAULT_WIND_SPEED_M_S: f64 = 2.0;
/// Assisted-mode fallback for `Solar_Radiation_MJ_m2_day`
pub const DEFAULT_SOLAR_RADIATION: f64 = 18.0;

/// Measurement features, in canonical order
const MEASUREMENTS: [Feature; 10] = [
    Feature::AreaHa,
    Feature::NitrogenReq,
    Feature::PhosphorusReq,
    Feature::PotassiumReq,
    Feature::TemperatureC,
    Feature::HumidityPct,
    Feature::Ph,
    Feature::RainfallMm,
    Feature::WindSpeed,
    Feature::SolarRadiation,
];

// ============================================================================
// Input Mode
// ============================================================================

/// How much of the feature set the caller is expected to supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// All 15 features, pre-encoded (the plain 15-field form)
    #[default]
    Manual,
    /// Labels plus a subset of measurements; Decade derived, weather defaulted
    Assisted,
}

impl InputMode {
    /// Fallback value for a feature the caller left out
    pub fn default_for(self, feature: Feature) -> Option<f64> {
        match (self, feature) {
            (InputMode::Assisted, Feature::HumidityPct) => Some(DEFAULT_HUMIDITY_PCT),
            (InputMode::Assisted, Feature::WindSpeed) => Some(DEFAULT_WIND_SPEED_M_S),
            (InputMode::Assisted, Feature::SolarRadiation) => Some(DEFAULT_SOLAR_RADIATION),
            _ => None,
        }
    }

    /// Field name to report when a feature is missing
    fn field_name(self, feature: Feature) -> &'static str {
        match self {
            InputMode::Assisted => feature.ui_alias().unwrap_or(feature.name()),
            InputMode::Manual => feature.name(),
        }
    }
}

impl FromStr for InputMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(InputMode::Manual),
            "assisted" => Ok(InputMode::Assisted),
            other => anyhow::bail!("Unknown input mode '{}' (expected 'manual' or 'assisted')", other),
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Manual => write!(f, "manual"),
            InputMode::Assisted => write!(f, "assisted"),
        }
    }
}

// ============================================================================
// Raw Input Record
// ============================================================================

/// One submitted value: form fields arrive as text, JSON records may carry numbers
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(s) if s.trim().is_empty())
    }

    fn as_label(&self) -> String {
        match self {
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s.clone(),
        }
    }

    fn to_number(&self, field: &str) -> Result<f64, PipelineError> {
        let (value, text) = match self {
            RawValue::Number(n) => (Some(*n), n.to_string()),
            RawValue::Text(s) => (s.trim().parse::<f64>().ok(), s.clone()),
        };
        match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(PipelineError::invalid(field, &text)),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

/// Field name → submitted value, for a single request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawInput {
    fields: FxHashMap<String, RawValue>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Non-blank value for a field
    fn value(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field).filter(|v| !v.is_blank())
    }

    fn number(&self, field: &str) -> Result<Option<f64>, PipelineError> {
        self.value(field).map(|v| v.to_number(field)).transpose()
    }

    /// Numeric value by canonical name, falling back to the UI alias
    fn feature_number(&self, feature: Feature) -> Result<Option<f64>, PipelineError> {
        if let Some(v) = self.number(feature.name())? {
            return Ok(Some(v));
        }
        match feature.ui_alias() {
            Some(alias) => self.number(alias),
            None => Ok(None),
        }
    }
}

impl From<std::collections::HashMap<String, String>> for RawInput {
    fn from(form: std::collections::HashMap<String, String>) -> Self {
        Self::from_pairs(form)
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// Year rounded down to the nearest multiple of 10
pub fn decade_of(year: f64) -> f64 {
    (year / 10.0).floor() * 10.0
}

fn encoded_feature(kind: CategoryKind) -> Feature {
    match kind {
        CategoryKind::State => Feature::StateEncoded,
        CategoryKind::Crop => Feature::CropEncoded,
        CategoryKind::Season => Feature::SeasonEncoded,
    }
}

fn resolve_category(input: &RawInput, kind: CategoryKind, mode: InputMode) -> Result<f64, PipelineError> {
    let feature = encoded_feature(kind);

    if let Some(code) = input.number(feature.name())? {
        return Ok(code);
    }

    match input.value(kind.label_field()) {
        Some(label) => Ok(f64::from(encode(kind, &label.as_label())?)),
        None => Err(PipelineError::missing(match mode {
            InputMode::Manual => feature.name(),
            InputMode::Assisted => kind.label_field(),
        })),
    }
}

/// Assemble the full feature vector from a raw record
pub fn assemble(input: &RawInput, mode: InputMode) -> Result<FeatureVector, PipelineError> {
    let mut vector = FeatureVector::new();

    let year = input
        .number(Feature::Year.name())?
        .ok_or_else(|| PipelineError::missing(Feature::Year.name()))?;
    vector.insert(Feature::Year.name(), year);

    let decade = match (input.number(Feature::Decade.name())?, mode) {
        (Some(decade), _) => decade,
        (None, InputMode::Assisted) => decade_of(year),
        (None, InputMode::Manual) => return Err(PipelineError::missing(Feature::Decade.name())),
    };
    vector.insert(Feature::Decade.name(), decade);

    for kind in CategoryKind::ALL {
        let code = resolve_category(input, kind, mode)?;
        vector.insert(encoded_feature(kind).name(), code);
    }

    for feature in MEASUREMENTS {
        let value = match input.feature_number(feature)? {
            Some(v) => v,
            None => mode
                .default_for(feature)
                .ok_or_else(|| PipelineError::missing(mode.field_name(feature)))?,
        };
        vector.insert(feature.name(), value);
    }

    debug_assert_eq!(vector.len(), Feature::ALL.len());
    Ok(vector)
}
