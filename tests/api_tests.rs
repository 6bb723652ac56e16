mod common;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use base64::{engine::general_purpose::STANDARD, Engine};
use common::{form_pdf, page_count, png_bytes, FixtureField, MockTemplateRepository};
use dealer_forms_server::cache::InMemoryArtifactStore;
use dealer_forms_server::clock::Clock;
use dealer_forms_server::documents::DocumentService;
use dealer_forms_server::mapping::FieldMapper;
use dealer_forms_server::templates::{FsTemplateRepository, TemplateCatalog};
use dealer_forms_server::{configure, AppState};
use serde_json::{json, Value};

fn app_state(repository: MockTemplateRepository) -> web::Data<AppState> {
    web::Data::new(AppState::new(Arc::new(common::service(
        repository,
        common::test_clock(),
    ))))
}

fn repository() -> MockTemplateRepository {
    MockTemplateRepository::new()
        .with_template("buyers-order", form_pdf(2, &[FixtureField::Text("First Name")]))
        .with_template("we-owe", form_pdf(1, &[]))
}

#[actix_web::test]
async fn test_list_templates() {
    let app = test::init_service(App::new().app_data(app_state(repository())).configure(configure)).await;

    let req = test::TestRequest::get().uri("/api/templates").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let templates = body["templates"].as_array().unwrap();
    let buyers = templates.iter().find(|t| t["id"] == "buyers-order").unwrap();
    assert_eq!(buyers["available"], true);
    assert_eq!(buyers["category"], "buyers-order");
    let credit = templates.iter().find(|t| t["id"] == "credit-application").unwrap();
    assert_eq!(credit["available"], false);
    let extra = templates.iter().find(|t| t["id"] == "we-owe").unwrap();
    assert_eq!(extra["title"], "We Owe");
    assert_eq!(extra["category"], "generic");
}

#[actix_web::test]
async fn test_fill_then_download() {
    // Arrange
    let app = test::init_service(App::new().app_data(app_state(repository())).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/documents/fill")
        .set_json(json!({
            "templateId": "buyers-order",
            "data": { "firstName": "Ana", "lastName": "Reyes" },
        }))
        .to_request();

    // Act
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let download = test::TestRequest::get()
        .uri(body["downloadUrl"].as_str().unwrap())
        .to_request();
    let resp = test::call_service(&app, download).await;

    // Assert
    assert_eq!(body["filename"], "Buyers_Order_Ana_Reyes_20261016.pdf");
    assert_eq!(body["fieldsProcessed"], 1);
    assert_eq!(body["fieldsTotal"], 1);
    assert_eq!(body["mode"], "template");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("Buyers_Order_Ana_Reyes_20261016.pdf"));
    let bytes = test::read_body(resp).await;
    assert_eq!(page_count(&bytes), 2);
}

#[actix_web::test]
async fn test_assemble_with_base64_images() {
    let app = test::init_service(App::new().app_data(app_state(repository())).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/documents/assemble")
        .set_json(json!({
            "templateIds": ["buyers-order", "insurance-verification"],
            "data": { "firstName": "Ana", "lastName": "Reyes", "newCarYear": 2025 },
            "confidence": { "firstName": "high" },
            "images": [
                { "purpose": "driversLicense", "mediaType": "image/png", "data": STANDARD.encode(png_bytes(40, 20)) },
                { "purpose": "tradeInVin", "mediaType": "image/tiff", "data": STANDARD.encode([1u8, 2, 3]) }
            ]
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["pageCount"], 4);
    assert_eq!(body["documents"].as_array().unwrap().len(), 2);
    assert_eq!(body["documents"][1]["mode"], "fallback");
    assert_eq!(body["documentsIncluded"], json!(["Buyers Order", "Insurance Verification"]));
    assert_eq!(body["imagesIncluded"], json!(["Driver's License"]));
    assert_eq!(body["imagesSkipped"][0]["label"], "Trade-In VIN");
    assert_eq!(body["imagesSkipped"][0]["reason"], "unsupported format: image/tiff");
    assert_eq!(body["filename"], "Deal_Packet_Ana_Reyes_20261016.pdf");
}

#[actix_web::test]
async fn test_assemble_rejects_invalid_base64() {
    let app = test::init_service(App::new().app_data(app_state(repository())).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/documents/assemble")
        .set_json(json!({
            "templateIds": ["buyers-order"],
            "images": [{ "purpose": "odometer", "mediaType": "image/png", "data": "%%%" }]
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_assemble_nothing_is_unprocessable() {
    let app = test::init_service(App::new().app_data(app_state(repository())).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/documents/assemble")
        .set_json(json!({ "templateIds": [] }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UnprocessableEntity");
}

#[actix_web::test]
async fn test_assemble_upload_multipart() {
    // Arrange
    let app = test::init_service(App::new().app_data(app_state(repository())).configure(configure)).await;
    let boundary = "----dealerformsboundary";
    let mut payload = Vec::new();
    payload.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"request\"\r\nContent-Type: application/json\r\n\r\n{json}\r\n",
            b = boundary,
            json = json!({ "templateIds": ["we-owe"] })
        )
        .as_bytes(),
    );
    payload.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"newCarOdometer\"; filename=\"odo.png\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = boundary
        )
        .as_bytes(),
    );
    payload.extend_from_slice(&png_bytes(30, 30));
    payload.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let req = test::TestRequest::post()
        .uri("/api/documents/assemble/upload")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(payload)
        .to_request();

    // Act
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["pageCount"], 2);
    assert_eq!(body["imagesIncluded"], json!(["New Car Odometer"]));
    assert_eq!(body["filename"], "Deal_Packet_Customer_20261016.pdf");
}

#[actix_web::test]
async fn test_upload_without_request_part_is_rejected() {
    let app = test::init_service(App::new().app_data(app_state(repository())).configure(configure)).await;
    let boundary = "----dealerformsboundary";
    let payload = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );

    let req = test::TestRequest::post()
        .uri("/api/documents/assemble/upload")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unknown_download_key_is_not_found() {
    let app = test::init_service(App::new().app_data(app_state(repository())).configure(configure)).await;

    let req = test::TestRequest::get().uri("/api/downloads/nope").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NotFound");
}

#[actix_web::test]
async fn test_invalid_template_id_is_bad_request() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let clock: Arc<dyn Clock> = common::test_clock();
    let service = DocumentService::new(
        Arc::new(FsTemplateRepository::new(dir.path())),
        FieldMapper::default(),
        TemplateCatalog::default(),
        clock.clone(),
        Arc::new(InMemoryArtifactStore::new(clock)),
    );
    let state = web::Data::new(AppState::new(Arc::new(service)));
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/documents/fill")
        .set_json(json!({ "templateId": "../secrets" }))
        .to_request();

    // Act
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BadRequest");
}
