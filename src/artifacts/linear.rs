//! Linear regression model
//!
//! `y = intercept + Σ coef_i · x_i`. Reads either plain names or the
//! scikit-learn attribute names (`coef_`, `intercept_`, `feature_names_in_`).

use anyhow::{Context, Result};
use serde::Deserialize;

use super::Regressor;

#[derive(Debug, Deserialize)]
struct LinearFile {
    #[serde(default, alias = "feature_names_in_")]
    feature_names: Vec<String>,
    #[serde(alias = "coef_")]
    coef: Vec<f64>,
    #[serde(default, alias = "intercept_")]
    intercept: f64,
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    feature_names: Vec<String>,
    coef: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn new(feature_names: Vec<String>, coef: Vec<f64>, intercept: f64) -> Result<Self> {
        if !feature_names.is_empty() && feature_names.len() != coef.len() {
            anyhow::bail!("{} coefficients for {} feature names", coef.len(), feature_names.len());
        }
        if !intercept.is_finite() || coef.iter().any(|c| !c.is_finite()) {
            anyhow::bail!("Linear model parameters must be finite");
        }
        Ok(Self { feature_names, coef, intercept })
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let file: LinearFile = serde_json::from_value(value).context("Invalid linear model JSON")?;
        Self::new(file.feature_names, file.coef, file.intercept)
    }

    pub fn declared_width(&self) -> usize {
        self.coef.len()
    }

    pub fn with_feature_names(self, names: Vec<String>) -> Result<Self> {
        Self::new(names, self.coef, self.intercept)
    }
}

impl Regressor for LinearModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &[f64]) -> f64 {
        self.intercept + row.iter().zip(&self.coef).map(|(x, c)| x * c).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_sklearn_attribute_names() {
        let model = LinearModel::from_value(json!({
            "feature_names_in_": ["a", "b"],
            "coef_": [2.0, -1.0],
            "intercept_": 0.5
        }))
        .unwrap();
        assert_relative_eq!(model.predict(&[3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_coefficient_count_must_match() {
        assert!(LinearModel::from_value(json!({
            "feature_names": ["a"],
            "coef": [1.0, 2.0]
        }))
        .is_err());
    }

    #[test]
    fn test_unnamed_model_adopts_names() {
        let model = LinearModel::from_value(json!({ "coef": [1.0, 1.0] })).unwrap();
        assert_eq!(model.declared_width(), 2);
        let model = model.with_feature_names(vec!["x".into(), "y".into()]).unwrap();
        assert_relative_eq!(model.predict(&[1.0, 2.0]), 3.0);
    }
}
