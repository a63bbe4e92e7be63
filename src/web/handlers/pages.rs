// Page handlers for HTML rendering with Askama

use axum::response::Html;
use askama::Template;

use crate::encoding::{labels, CategoryKind};
use crate::features::{Feature, InputMode};

const TITLE: &str = "Crop Yield Prediction";

/// Drop-down for a categorical label
pub struct SelectView {
    pub name: &'static str,
    pub options: Vec<&'static str>,
}

/// Numeric input box
pub struct FieldView {
    pub name: &'static str,
    pub label: String,
    pub step: &'static str,
    pub required: bool,
}

impl FieldView {
    fn required(name: &'static str, label: &str, step: &'static str) -> Self {
        Self { name, label: label.to_string(), step, required: true }
    }
}

// ============================================================================
// Prediction Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/predict.html")]
pub struct PredictTemplate {
    pub title: &'static str,
    pub selects: Vec<SelectView>,
    pub fields: Vec<FieldView>,
    pub message: String,
    pub is_error: bool,
}

impl PredictTemplate {
    /// Empty form for the configured input mode
    pub fn form(mode: InputMode) -> Self {
        let (selects, fields) = match mode {
            InputMode::Manual => (Vec::new(), manual_fields()),
            InputMode::Assisted => (assisted_selects(), assisted_fields()),
        };
        Self {
            title: TITLE,
            selects,
            fields,
            message: String::new(),
            is_error: false,
        }
    }

    pub fn with_result(mode: InputMode, message: String) -> Self {
        Self { message, ..Self::form(mode) }
    }

    pub fn with_error(mode: InputMode, error: &str) -> Self {
        Self {
            message: format!("Error: {}", error),
            is_error: true,
            ..Self::form(mode)
        }
    }
}

pub fn render_page(template: &PredictTemplate) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        format!("Template error: {}", e)
    }))
}

/// The 15 canonical features, pre-encoded
fn manual_fields() -> Vec<FieldView> {
    Feature::ALL
        .iter()
        .map(|&feature| {
            let step = match feature {
                Feature::Year
                | Feature::Decade
                | Feature::StateEncoded
                | Feature::CropEncoded
                | Feature::SeasonEncoded => "1",
                _ => "any",
            };
            FieldView::required(feature.name(), manual_label(feature), step)
        })
        .collect()
}

fn manual_label(feature: Feature) -> &'static str {
    match feature {
        Feature::Year => "Year",
        Feature::Decade => "Decade",
        Feature::StateEncoded => "State Encoded",
        Feature::CropEncoded => "Crop Encoded",
        Feature::SeasonEncoded => "Season Encoded",
        Feature::AreaHa => "Area (ha)",
        Feature::NitrogenReq => "N (kg/ha)",
        Feature::PhosphorusReq => "P (kg/ha)",
        Feature::PotassiumReq => "K (kg/ha)",
        Feature::TemperatureC => "Temperature (C)",
        Feature::HumidityPct => "Humidity (%)",
        Feature::Ph => "Soil pH",
        Feature::RainfallMm => "Rainfall (mm)",
        Feature::WindSpeed => "Wind Speed (m/s)",
        Feature::SolarRadiation => "Solar Radiation (MJ/m2/day)",
    }
}

fn assisted_selects() -> Vec<SelectView> {
    CategoryKind::ALL
        .iter()
        .map(|&kind| SelectView {
            name: kind.label_field(),
            options: labels(kind),
        })
        .collect()
}

/// Year, measurements under their UI names, optional weather overrides
fn assisted_fields() -> Vec<FieldView> {
    let mut fields = vec![
        FieldView::required("Year", "Year", "1"),
        FieldView::required("Area_ha", "Area (ha)", "any"),
        FieldView::required("N", "N (kg/ha)", "any"),
        FieldView::required("P", "P (kg/ha)", "any"),
        FieldView::required("K", "K (kg/ha)", "any"),
        FieldView::required("Temp", "Temperature (C)", "any"),
        FieldView::required("pH", "Soil pH", "any"),
        FieldView::required("Rainfall", "Rainfall (mm)", "any"),
    ];

    for feature in [Feature::HumidityPct, Feature::WindSpeed, Feature::SolarRadiation] {
        let default = InputMode::Assisted.default_for(feature).unwrap_or_default();
        fields.push(FieldView {
            name: feature.name(),
            label: format!("{} (default {})", manual_label(feature), default),
            step: "any",
            required: false,
        });
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_form_lists_all_features() {
        let page = PredictTemplate::form(InputMode::Manual).render().unwrap();
        for feature in Feature::ALL {
            assert!(page.contains(&format!("name=\"{}\"", feature.name())), "{} missing", feature.name());
        }
        assert!(!page.contains("<select"));
    }

    #[test]
    fn test_assisted_form_has_dropdowns_and_defaults() {
        let page = PredictTemplate::form(InputMode::Assisted).render().unwrap();
        assert!(page.contains("name=\"State\""));
        assert!(page.contains("<option value=\"West Bengal\">"));
        assert!(page.contains("<option value=\"Whole Year\">"));
        assert!(page.contains("name=\"Temp\""));
        assert!(page.contains("Humidity (%) (default 80)"));
        assert!(!page.contains("name=\"Decade\""));
    }

    #[test]
    fn test_error_message_rendered() {
        let page = PredictTemplate::with_error(InputMode::Manual, "missing field").render().unwrap();
        assert!(page.contains("class=\"error\">Error: missing field</h3>"));
    }
}
