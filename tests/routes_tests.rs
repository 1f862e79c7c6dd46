/// HTTP route tests driving the router in-process
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

use rust_crop_eligibility::config::Config;
use rust_crop_eligibility::dataset::ReferenceDataset;
use rust_crop_eligibility::handlers::AppState;
use rust_crop_eligibility::router::app_router;
use rust_crop_eligibility::services::EligibilityService;

const SAMPLE_FORM: &str = "age=30&gender=Male&education=Graduate&land_size_acres=2.5\
&annual_income=50000&crop_type=Rice&state=Kerala&district=Ernakulam&region=South\
&has_taken_crop_insurance=1";

/// Helper function to build the app from the bundled artifacts
fn create_test_app() -> Router {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config = Config {
        models_dir: root.join("models"),
        dataset_path: root.join("data/Updated_Farmer_Dataset.csv"),
        ..Config::default()
    };

    let eligibility = EligibilityService::load(&config).unwrap();
    let dataset = ReferenceDataset::load(&config.dataset_path).unwrap();

    app_router(Arc::new(AppState {
        config,
        eligibility,
        dataset,
    }))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_index_renders_dropdowns() {
    let request = Request::get("/").body(Body::empty()).unwrap();
    let (status, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<option value="Kerala">Kerala</option>"#));
    assert!(body.contains(r#"<option value="Unknown">Unknown</option>"#));
    assert!(body.contains(r#"<option value="18">18</option>"#));
    assert!(body.contains(r#"<option value="80">80</option>"#));
    assert!(!body.contains(r#"<option value="81">"#));
}

#[tokio::test]
async fn test_districts_and_regions_for_state() {
    let request = json_post(
        "/get_districts_and_regions",
        serde_json::json!({ "state": "Kerala" }),
    );
    let (status, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "districts": ["Ernakulam", "Kozhikode", "Thrissur"],
            "regions": ["South"]
        })
    );
}

#[tokio::test]
async fn test_districts_and_regions_is_case_sensitive() {
    let request = json_post(
        "/get_districts_and_regions",
        serde_json::json!({ "state": "kerala" }),
    );
    let (status, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["districts"], serde_json::json!([]));
    assert_eq!(json["regions"], serde_json::json!([]));
}

#[tokio::test]
async fn test_districts_and_regions_without_state() {
    let request = json_post("/get_districts_and_regions", serde_json::json!({}));
    let (status, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["districts"], serde_json::json!([]));
}

#[tokio::test]
async fn test_predict_renders_verdicts() {
    let (status, body) = send(create_test_app(), form_post("/predict", SAMPLE_FORM)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("PMFBY"));
    assert!(body.contains("PM-KISAN"));
    assert!(body.contains("FPO Support"));
    assert!(body.contains(r#"<td class="eligible">Eligible</td>"#));
    assert!(body.contains(r#"<td class="not-eligible">Not Eligible</td>"#));
}

#[tokio::test]
async fn test_predict_tolerates_unseen_and_malformed_values() {
    let form = SAMPLE_FORM
        .replace("crop_type=Rice", "crop_type=Saffron")
        .replace("annual_income=50000", "annual_income=lots");
    let (status, body) = send(create_test_app(), form_post("/predict", &form)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("Eligible</td>").count(), 3);
}

#[tokio::test]
async fn test_predict_missing_field_is_client_error() {
    let form = SAMPLE_FORM.replace("&region=South", "");
    let (status, body) = send(create_test_app(), form_post("/predict", &form)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("region"));
}

#[tokio::test]
async fn test_predict_api_reports_probabilities_and_warnings() {
    let request = json_post(
        "/api/v1/predict",
        serde_json::json!({
            "age": 30,
            "gender": "Male",
            "education": "Graduate",
            "land_size_acres": 2.5,
            "annual_income": 50000,
            "crop_type": "Rice",
            "state": "Kerala",
            "district": "Ernakulam",
            "region": "Atlantis",
            "has_taken_crop_insurance": 1
        }),
    );
    let (status, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();

    let results = json["results"].as_object().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(json["results"]["eligible_pmkisan"]["verdict"], "Eligible");
    assert_eq!(json["results"]["eligible_pmkisan"]["probability"], 0.8);
    assert_eq!(json["results"]["eligible_fpo_support"]["threshold"], 0.4);
    assert_eq!(json["results"]["eligible_pmfby"]["category"], "PMFBY");

    let warnings = json["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("Atlantis"));
}

#[tokio::test]
async fn test_predict_api_rejects_incomplete_record() {
    let request = json_post("/api/v1/predict", serde_json::json!({ "age": 30 }));
    let (status, _) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_options_api() {
    let request = Request::get("/api/v1/options").body(Body::empty()).unwrap();
    let (status, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["genders"], serde_json::json!(["Female", "Male", "Other"]));
    assert_eq!(json["age_range"].as_array().unwrap().len(), 63);
}
