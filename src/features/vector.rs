//! Named Feature Vectors
//!
//! The fixed 15-feature schema and the name-keyed vector that flows through
//! the pipeline. Columns are always looked up by name, so the internal order
//! of a vector never influences what an artifact receives.

use crate::error::{MissingFeatures, PipelineError, Stage};

/// One of the 15 predictor variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Year,
    Decade,
    StateEncoded,
    CropEncoded,
    SeasonEncoded,
    AreaHa,
    NitrogenReq,
    PhosphorusReq,
    PotassiumReq,
    TemperatureC,
    HumidityPct,
    Ph,
    RainfallMm,
    WindSpeed,
    SolarRadiation,
}

impl Feature {
    /// Canonical order (as collected by the full manual form)
    pub const ALL: [Feature; 15] = [
        Feature::Year,
        Feature::Decade,
        Feature::StateEncoded,
        Feature::CropEncoded,
        Feature::SeasonEncoded,
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

    /// Column name used by the trained artifacts
    pub fn name(self) -> &'static str {
        match self {
            Feature::Year => "Year",
            Feature::Decade => "Decade",
            Feature::StateEncoded => "State_encoded",
            Feature::CropEncoded => "Crop_encoded",
            Feature::SeasonEncoded => "Season_encoded",
            Feature::AreaHa => "Area_ha",
            Feature::NitrogenReq => "N_req_kg_per_ha",
            Feature::PhosphorusReq => "P_req_kg_per_ha",
            Feature::PotassiumReq => "K_req_kg_per_ha",
            Feature::TemperatureC => "Temperature_C",
            Feature::HumidityPct => "Humidity_%",
            Feature::Ph => "pH",
            Feature::RainfallMm => "Rainfall_mm",
            Feature::WindSpeed => "Wind_Speed_m_s",
            Feature::SolarRadiation => "Solar_Radiation_MJ_m2_day",
        }
    }

    /// Short form-field name the assisted UI uses, if any
    pub fn ui_alias(self) -> Option<&'static str> {
        match self {
            Feature::NitrogenReq => Some("N"),
            Feature::PhosphorusReq => Some("P"),
            Feature::PotassiumReq => Some("K"),
            Feature::TemperatureC => Some("Temp"),
            Feature::RainfallMm => Some("Rainfall"),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Ordered, name-keyed numeric record
///
/// Used both for the assembled vector (canonical order) and the scaled
/// vector (scaler order). Lookups are by name; with 15 columns a linear scan
/// beats hashing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (name, value) pairs; later duplicates overwrite earlier ones
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut vector = Self::new();
        for (name, value) in pairs {
            vector.insert(name, value);
        }
        vector
    }

    /// Pair declared names with positional values
    pub(crate) fn from_columns(names: &[String], values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self {
            names: names.to_vec(),
            values,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.values[idx] = value,
            None => {
                self.names.push(name);
                self.values.push(value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.position(name).map(|idx| self.values[idx])
    }

    pub fn feature(&self, feature: Feature) -> Option<f64> {
        self.get(feature.name())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(|n| n.as_str()).zip(self.values.iter().copied())
    }

    /// Select columns in exactly the given order
    ///
    /// Extra columns are ignored. Every requested name must be present,
    /// otherwise all absent names are reported at once.
    pub fn select(&self, expected: &[String], stage: Stage) -> Result<Vec<f64>, PipelineError> {
        let mut row = Vec::with_capacity(expected.len());
        let mut missing = MissingFeatures::new();

        for name in expected {
            match self.get(name) {
                Some(value) => row.push(value),
                None => missing.push(name.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(PipelineError::SchemaMismatch { stage, missing });
        }
        Ok(row)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
