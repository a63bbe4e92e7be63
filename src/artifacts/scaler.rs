//! Fitted Feature Scaler
//!
//! Loads a pre-fitted per-feature transform exported from scikit-learn as
//! plain attributes:
//!
//! ```json
//! { "feature_names_in_": ["Year", ...], "mean_": [...], "scale_": [...] }
//! ```
//!
//! - `mean_` present (or no `min_`): StandardScaler, `(x - mean) / scale`
//! - `min_` present: MinMaxScaler, `x * scale + min`
//!
//! A missing `mean_` is zeros and a missing `scale_` is ones (the
//! `with_mean=False` / `with_std=False` exports). Zero scale is treated as 1,
//! matching how scikit-learn handles constant columns.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::{check_feature_names, Transformer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalerKind {
    Standard,
    MinMax,
    /// Pass-through (used when no scaling was fitted)
    Identity,
}

/// Attribute export of a fitted scikit-learn scaler
#[derive(Debug, Deserialize)]
struct ScalerFile {
    feature_names_in_: Vec<String>,
    mean_: Option<Vec<f64>>,
    scale_: Option<Vec<f64>>,
    min_: Option<Vec<f64>>,
}

/// Per-feature affine transform with declared input order
#[derive(Debug, Clone)]
pub struct FittedScaler {
    kind: ScalerKind,
    feature_names: Vec<String>,
    /// mean (Standard) or min (MinMax)
    offset: Vec<f64>,
    scale: Vec<f64>,
}

impl FittedScaler {
    /// Standardization: `(x - mean) / scale`
    pub fn standard(feature_names: Vec<String>, mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        Self::build(ScalerKind::Standard, feature_names, mean, scale)
    }

    /// Range scaling: `x * scale + min`
    pub fn min_max(feature_names: Vec<String>, min: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        Self::build(ScalerKind::MinMax, feature_names, min, scale)
    }

    pub fn identity(feature_names: Vec<String>) -> Result<Self> {
        let n = feature_names.len();
        Self::build(ScalerKind::Identity, feature_names, vec![0.0; n], vec![1.0; n])
    }

    /// Load from a JSON attribute export
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler file: {:?}", path))?;
        Self::from_json(&contents).with_context(|| format!("Failed to parse scaler: {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: ScalerFile = serde_json::from_str(json).context("Invalid scaler JSON")?;
        let n = file.feature_names_in_.len();
        let scale = file.scale_.unwrap_or_else(|| vec![1.0; n]);

        match file.min_ {
            Some(min) => Self::min_max(file.feature_names_in_, min, scale),
            None => {
                let mean = file.mean_.unwrap_or_else(|| vec![0.0; n]);
                Self::standard(file.feature_names_in_, mean, scale)
            }
        }
    }

    fn build(kind: ScalerKind, feature_names: Vec<String>, offset: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        check_feature_names(&feature_names)?;
        let n = feature_names.len();
        if offset.len() != n || scale.len() != n {
            anyhow::bail!(
                "Scaler parameter length mismatch: {} features, {} offsets, {} scales",
                n,
                offset.len(),
                scale.len()
            );
        }
        if let Some(i) = offset.iter().chain(scale.iter()).position(|v| !v.is_finite()) {
            anyhow::bail!("Scaler parameter {} is not finite", i % n);
        }

        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();

        Ok(Self { kind, feature_names, offset, scale })
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }
}

impl Transformer for FittedScaler {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.offset.iter().zip(self.scale.iter()))
            .map(|(&x, (&offset, &scale))| match self.kind {
                ScalerKind::Standard => (x - offset) / scale,
                ScalerKind::MinMax => x * scale + offset,
                ScalerKind::Identity => x,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_standard_transform() {
        let scaler = FittedScaler::from_json(
            r#"{"feature_names_in_": ["a", "b"], "mean_": [10.0, 0.5], "scale_": [2.0, 0.25]}"#,
        )
        .unwrap();
        assert_eq!(scaler.kind(), ScalerKind::Standard);
        let out = scaler.transform(&[14.0, 0.0]);
        assert_relative_eq!(out[0], 2.0);
        assert_relative_eq!(out[1], -2.0);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = FittedScaler::from_json(
            r#"{"feature_names_in_": ["a"], "min_": [-0.5], "scale_": [0.1]}"#,
        )
        .unwrap();
        assert_eq!(scaler.kind(), ScalerKind::MinMax);
        assert_relative_eq!(scaler.transform(&[10.0])[0], 0.5);
    }

    #[test]
    fn test_missing_attributes_default() {
        let scaler = FittedScaler::from_json(r#"{"feature_names_in_": ["a", "b"], "scale_": null}"#).unwrap();
        assert_eq!(scaler.transform(&[3.0, -4.0]), vec![3.0, -4.0]);
    }

    #[test]
    fn test_zero_scale_treated_as_one() {
        let scaler = FittedScaler::standard(names(&["a"]), vec![5.0], vec![0.0]).unwrap();
        assert_relative_eq!(scaler.transform(&[7.0])[0], 2.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = FittedScaler::from_json(
            r#"{"feature_names_in_": ["a", "b"], "mean_": [1.0], "scale_": [1.0, 1.0]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        assert!(FittedScaler::identity(names(&["a", "a"])).is_err());
        assert!(FittedScaler::identity(Vec::new()).is_err());
    }
}
