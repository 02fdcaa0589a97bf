use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use time::macros::datetime;
use tower::ServiceExt;
use vitrine_app::modules::image_collections::ImageCollectionsModule;
use vitrine_kernel::{settings::Settings, FixedClock, Module, ModuleRegistry};

fn app_at(now: time::OffsetDateTime) -> Router {
    let mut settings = Settings::default();
    settings.media.base_url = "https://cdn.example.com/media".to_string();
    let module = ImageCollectionsModule::new(&settings, Arc::new(FixedClock::new(now)));
    module.routes()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn send_raw(app: &Router, method: Method, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn seed_homepage(app: &Router) {
    let (status, _) = send(
        app,
        Method::POST,
        "/",
        Some(json!({ "name": "Homepage Banners", "identifier": "homepage" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn scheduled_slide_makes_collection_public() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));
    seed_homepage(&app).await;

    let (_, visibility) = send(&app, Method::GET, "/homepage/public", None).await;
    assert_eq!(visibility["is_public"], false);

    let (status, slide) = send(
        &app,
        Method::POST,
        "/homepage/slides",
        Some(json!({
            "image": "summer.jpg",
            "alt_text": "Summer sale",
            "start_date": "2024-01-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(slide["is_active"], true);
    assert_eq!(
        slide["url"],
        "https://cdn.example.com/media/image_slides/summer.jpg"
    );

    let (status, visibility) = send(&app, Method::GET, "/homepage/public", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(visibility["identifier"], "homepage");
    assert_eq!(visibility["is_public"], true);
    assert_eq!(visibility["evaluated_at"], "2024-06-01T00:00:00Z");
}

#[tokio::test]
async fn visibility_uses_injected_clock() {
    let store = {
        let settings = Settings::default();
        let module = ImageCollectionsModule::new(
            &settings,
            Arc::new(FixedClock::new(datetime!(2024-06-01 0:00 UTC))),
        );
        let app = module.routes();
        seed_homepage(&app).await;
        send(
            &app,
            Method::POST,
            "/homepage/slides",
            Some(json!({ "image": "a.jpg", "start_date": "2024-01-01T00:00:00Z" })),
        )
        .await;
        Arc::clone(module.store())
    };

    // Same data, evaluated the day before the slide starts.
    let earlier = ImageCollectionsModule::with_store(
        &Settings::default(),
        Arc::new(FixedClock::new(datetime!(2023-12-31 0:00 UTC))),
        store,
    );
    let (_, visibility) = send(&earlier.routes(), Method::GET, "/homepage/public", None).await;
    assert_eq!(visibility["is_public"], false);
}

#[tokio::test]
async fn detail_lists_slides_with_effective_urls() {
    let app = app_at(datetime!(2024-02-15 0:00 UTC));
    seed_homepage(&app).await;

    for body in [
        json!({ "image": "b.jpg", "alt_text": "linked", "link": " https://example.com/promo ",
                "start_date": "2024-02-01T00:00:00Z", "end_date": "2024-03-01T00:00:00Z" }),
        json!({ "image": "a.jpg", "alt_text": "inverted",
                "start_date": "2024-03-01T00:00:00Z", "end_date": "2024-02-01T00:00:00Z" }),
        json!({ "image": "c.jpg", "alt_text": "always" }),
    ] {
        let (status, _) = send(&app, Method::POST, "/homepage/slides", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, detail) = send(&app, Method::GET, "/homepage", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Homepage Banners");
    assert_eq!(detail["is_public"], true);

    let slides = detail["slides"].as_array().unwrap();
    let alt: Vec<_> = slides.iter().map(|s| s["alt_text"].as_str().unwrap()).collect();
    assert_eq!(alt, ["always", "linked", "inverted"]);

    assert_eq!(slides[0]["url"], "https://cdn.example.com/media/image_slides/c.jpg");
    assert_eq!(slides[1]["url"], "https://example.com/promo");
    assert_eq!(slides[1]["link"], "https://example.com/promo");
    assert_eq!(slides[1]["is_active"], true);
    assert_eq!(slides[2]["is_active"], false);
}

#[tokio::test]
async fn listing_reports_visibility_per_collection() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));
    seed_homepage(&app).await;
    send(&app, Method::POST, "/", Some(json!({ "name": "Archive" }))).await;
    send(
        &app,
        Method::POST,
        "/homepage/slides",
        Some(json!({ "image": "a.jpg" })),
    )
    .await;

    let (status, list) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        list,
        json!([
            { "id": list[0]["id"], "name": "Archive", "identifier": "archive", "is_public": false },
            { "id": list[1]["id"], "name": "Homepage Banners", "identifier": "homepage", "is_public": true }
        ])
    );
}

#[tokio::test]
async fn duplicate_identifier_is_a_conflict() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));
    seed_homepage(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/",
        Some(json!({ "name": "Again", "identifier": "homepage" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["details"][0]["field"], "identifier");
}

#[tokio::test]
async fn invalid_slide_is_rejected_with_field_details() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));
    seed_homepage(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/homepage/slides",
        Some(json!({ "image": "", "link": "not a url" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<_> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["image", "link"]);
}

#[tokio::test]
async fn missing_name_is_reported_in_error_envelope() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));

    let (status, body) = send(&app, Method::POST, "/", Some(json!({ "identifier": "x" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["details"][0]["field"], "body");
    assert!(body["error"]["details"][0]["error"]
        .as_str()
        .unwrap()
        .contains("name"));
}

#[tokio::test]
async fn malformed_body_is_reported_in_error_envelope() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));
    seed_homepage(&app).await;

    let (status, body) = send_raw(&app, Method::POST, "/homepage/slides", r#"{"image": "a.jpg""#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["trace_id"].is_string());
}

#[tokio::test]
async fn non_uuid_slide_id_is_reported_in_error_envelope() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));
    seed_homepage(&app).await;

    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method, "/homepage/slides/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
        assert!(body["error"]["message"].as_str().unwrap().contains("slide_id"));
    }
}

#[tokio::test]
async fn deleting_collection_removes_its_slides() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));
    seed_homepage(&app).await;
    let (_, slide) = send(
        &app,
        Method::POST,
        "/homepage/slides",
        Some(json!({ "image": "a.jpg" })),
    )
    .await;
    let slide_uri = format!("/homepage/slides/{}", slide["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::GET, &slide_uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, "/homepage", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &slide_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&app, Method::GET, "/homepage/public", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn slide_link_can_be_set_and_cleared() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));
    seed_homepage(&app).await;
    let (_, slide) = send(
        &app,
        Method::POST,
        "/homepage/slides",
        Some(json!({ "image": "a.jpg", "link": "http://x.example" })),
    )
    .await;
    assert_eq!(slide["url"], "http://x.example");

    let uri = format!("/homepage/slides/{}", slide["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "image": "image_slides/a.jpg", "link": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["link"], "");
    assert_eq!(updated["url"], "https://cdn.example.com/media/image_slides/a.jpg");
}

#[tokio::test]
async fn renaming_collection_keeps_slides() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));
    seed_homepage(&app).await;
    send(
        &app,
        Method::POST,
        "/homepage/slides",
        Some(json!({ "image": "a.jpg" })),
    )
    .await;

    let (status, renamed) = send(
        &app,
        Method::PUT,
        "/homepage",
        Some(json!({ "name": "Front Page", "identifier": "front" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["identifier"], "front");

    let (_, slides) = send(&app, Method::GET, "/front/slides", None).await;
    assert_eq!(slides.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn labels_are_localized() {
    let app = app_at(datetime!(2024-06-01 0:00 UTC));

    let (status, body) = send(&app, Method::GET, "/labels?locale=de", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["labels"]["end_date"], "Ablaufdatum");

    let (_, body) = send(&app, Method::GET, "/labels", None).await;
    assert_eq!(body["locale"], "en");
    assert_eq!(body["labels"]["start_date"], "publish date");

    let (status, body) = send(&app, Method::GET, "/labels?locale=xx", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn registry_mounts_module_under_api_prefix() {
    let settings = Settings::default();
    let mut registry = ModuleRegistry::new();
    vitrine_app::modules::register_all(
        &mut registry,
        &settings,
        Arc::new(FixedClock::new(datetime!(2024-06-01 0:00 UTC))),
    )
    .unwrap();

    let app = vitrine_http::build_router(&registry, &settings);

    let (status, body) = send(&app, Method::GET, "/api/collections/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "collections module is healthy");

    let (status, spec) = send(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/api/collections/{identifier}/public"].is_object());
    assert!(spec["components"]["schemas"]["Visibility"].is_object());
}
