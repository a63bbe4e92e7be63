// API Integration Tests
//
// Purpose: drive the form server end to end with the sample artifacts under models/
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use crop_yield_predictor::{
        create_router, AppState, Artifacts, Feature, FittedScaler, InputMode, LinearModel, YieldPipeline,
    };
    use std::path::PathBuf;
    use tower::ServiceExt; // for oneshot

    // Helper: app over the sample XGBoost artifacts
    fn create_test_app(mode: InputMode) -> axum::Router {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models");
        let artifacts = Artifacts::load(&dir.join("scaler.json"), &dir.join("xgboost_model.json"))
            .expect("sample artifacts should load");
        create_router(AppState::from_pipeline(YieldPipeline::new(artifacts, mode).unwrap()))
    }

    // Helper: x-www-form-urlencoded body (only '%' and ' ' occur in our fields)
    fn form_body(pairs: &[(&str, &str)]) -> String {
        let encode = |s: &str| s.replace('%', "%25").replace(' ', "+");
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn post(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    // Helper: read the HTML body
    async fn text_response(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        String::from_utf8(body.to_vec()).expect("Body is not UTF-8")
    }

    fn manual_scenario() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Year", "2024"),
            ("Decade", "2020"),
            ("State_encoded", "11"),
            ("Crop_encoded", "3"),
            ("Season_encoded", "1"),
            ("Area_ha", "2.5"),
            ("N_req_kg_per_ha", "50"),
            ("P_req_kg_per_ha", "30"),
            ("K_req_kg_per_ha", "20"),
            ("Temperature_C", "28"),
            ("Humidity_%", "80"),
            ("pH", "6.5"),
            ("Rainfall_mm", "900"),
            ("Wind_Speed_m_s", "2.0"),
            ("Solar_Radiation_MJ_m2_day", "18"),
        ]
    }

    fn assisted_scenario() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Year", "2024"),
            ("State", "Maharashtra"),
            ("Crop", "Rice"),
            ("Season", "Kharif"),
            ("Area_ha", "2.5"),
            ("N", "50"),
            ("P", "30"),
            ("K", "20"),
            ("Temp", "28"),
            ("pH", "6.5"),
            ("Rainfall", "900"),
        ]
    }

    // =========================================================================
    // Section 1: Form rendering
    // =========================================================================

    #[tokio::test]
    async fn test_get_renders_manual_form() {
        let app = create_test_app(InputMode::Manual);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = text_response(response).await;
        assert!(html.contains("Crop Yield Prediction"));
        for feature in Feature::ALL {
            assert!(html.contains(&format!("name=\"{}\"", feature.name())), "{}", feature.name());
        }
        assert!(!html.contains("Predicted Yield"));
    }

    #[tokio::test]
    async fn test_get_renders_assisted_dropdowns() {
        let app = create_test_app(InputMode::Assisted);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = text_response(response).await;
        assert!(html.contains("<select name=\"State\""));
        assert!(html.contains("<option value=\"Maharashtra\">"));
        assert!(html.contains("<option value=\"Rice\">"));
        assert!(html.contains("<option value=\"Kharif\">"));
    }

    // =========================================================================
    // Section 2: Predictions
    // =========================================================================

    #[tokio::test]
    async fn test_manual_prediction() {
        let app = create_test_app(InputMode::Manual);

        let response = app.oneshot(post(form_body(&manual_scenario()))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = text_response(response).await;
        assert!(html.contains("Predicted Yield: 2561.0 kg/ha"), "{}", html);
    }

    #[tokio::test]
    async fn test_assisted_prediction_uses_weather_defaults() {
        let app = create_test_app(InputMode::Assisted);

        // Humidity, wind and solar radiation left out
        let response = app.oneshot(post(form_body(&assisted_scenario()))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = text_response(response).await;
        assert!(html.contains("Predicted Yield: 2561.0 kg/ha"), "{}", html);
    }

    // =========================================================================
    // Section 3: Error pages
    // =========================================================================

    #[tokio::test]
    async fn test_unknown_state_is_rejected() {
        let app = create_test_app(InputMode::Assisted);

        let mut form = assisted_scenario();
        form[1] = ("State", "Atlantis");
        let response = app.oneshot(post(form_body(&form))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = text_response(response).await;
        assert!(html.contains("Error: unknown state"));
        assert!(html.contains("Atlantis"));
        assert!(!html.contains("Predicted Yield"));
    }

    #[tokio::test]
    async fn test_non_numeric_area_is_rejected() {
        let app = create_test_app(InputMode::Manual);

        let mut form = manual_scenario();
        form[5] = ("Area_ha", "abc");
        let response = app.oneshot(post(form_body(&form))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = text_response(response).await;
        assert!(html.contains("Error: invalid numeric value"));
        assert!(html.contains("Area_ha"));
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected() {
        let app = create_test_app(InputMode::Manual);

        let form: Vec<_> = manual_scenario()
            .into_iter()
            .filter(|(name, _)| *name != "Decade")
            .collect();
        let response = app.oneshot(post(form_body(&form))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = text_response(response).await;
        assert!(html.contains("Error: missing field"));
        assert!(html.contains("Decade"));
    }

    #[tokio::test]
    async fn test_scaler_overflow_is_rejected() {
        let names: Vec<String> = Feature::ALL.iter().map(|f| f.name().to_string()).collect();
        let mut scale = vec![1.0; 15];
        scale[0] = 1e-10; // Year

        let pipeline = YieldPipeline::from_parts(
            Box::new(FittedScaler::standard(names.clone(), vec![0.0; 15], scale).unwrap()),
            Box::new(LinearModel::new(names, vec![1.0; 15], 0.0).unwrap()),
            InputMode::Manual,
        )
        .unwrap();
        let app = create_router(AppState::from_pipeline(pipeline));

        let mut form = manual_scenario();
        form[0] = ("Year", "1e308");
        let response = app.oneshot(post(form_body(&form))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = text_response(response).await;
        assert!(html.contains("Error: invalid numeric value"));
        assert!(html.contains("Year"));
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_server_error() {
        let names: Vec<String> = Feature::ALL.iter().map(|f| f.name().to_string()).collect();
        let mut scaler_names = names.clone();
        scaler_names.push("Soil_Organic_Carbon".to_string());

        let pipeline = YieldPipeline::from_parts(
            Box::new(FittedScaler::identity(scaler_names).unwrap()),
            Box::new(LinearModel::new(names, vec![1.0; 15], 0.0).unwrap()),
            InputMode::Manual,
        )
        .unwrap();
        let app = create_router(AppState::from_pipeline(pipeline));

        let response = app.oneshot(post(form_body(&manual_scenario()))).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = text_response(response).await;
        assert!(html.contains("Soil_Organic_Carbon"));
    }
}
