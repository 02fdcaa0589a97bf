use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use vitrine_http::{
    error::AppError,
    extract::{ApiJson, ApiPath},
};
use vitrine_kernel::Clock;

use super::labels;
use super::media::ImageLocator;
use super::models::{
    Collection, CollectionDetail, CollectionSummary, NewCollection, NewSlide, SlideView,
    Visibility,
};
use super::schedule;
use super::store::{ImageCollectionStore, StoreError};

/// Shared state behind every image collection route.
#[derive(Clone)]
pub struct CollectionsState {
    pub store: Arc<ImageCollectionStore>,
    pub clock: Arc<dyn Clock>,
    pub locator: Arc<dyn ImageLocator>,
    pub default_locale: String,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::Validation(errors) => AppError::validation(
                errors
                    .into_iter()
                    .map(|e| json!({ "field": e.field, "error": e.error }))
                    .collect(),
                message,
            ),
            StoreError::DuplicateIdentifier(identifier) => AppError::conflict(
                vec![json!({ "field": "identifier", "error": "unique", "value": identifier })],
                message,
            ),
            StoreError::CollectionNotFound(_) | StoreError::SlideNotFound(_) => {
                AppError::not_found(message)
            }
        }
    }
}

pub fn router(state: CollectionsState) -> Router {
    Router::new()
        .route("/", get(list_collections).post(create_collection))
        .route("/health", get(health_check))
        .route("/labels", get(list_labels))
        .route(
            "/{identifier}",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
        .route("/{identifier}/public", get(get_visibility))
        .route("/{identifier}/slides", get(list_slides).post(create_slide))
        .route(
            "/{identifier}/slides/{slide_id}",
            get(get_slide).put(update_slide).delete(delete_slide),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "collections module is healthy"
}

async fn list_collections(State(state): State<CollectionsState>) -> Json<Vec<CollectionSummary>> {
    let now = state.clock.now();
    Json(state.store.summaries(now).await)
}

async fn create_collection(
    State(state): State<CollectionsState>,
    ApiJson(input): ApiJson<NewCollection>,
) -> Result<(StatusCode, Json<Collection>), AppError> {
    let collection = state.store.create_collection(input).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

async fn get_collection(
    State(state): State<CollectionsState>,
    ApiPath(identifier): ApiPath<String>,
) -> Result<Json<CollectionDetail>, AppError> {
    let (collection, slides) = state.store.collection_with_slides(&identifier).await?;
    let now = state.clock.now();

    let is_public = schedule::is_public(&slides, now);
    let slides = slides
        .into_iter()
        .map(|slide| SlideView::new(slide, state.locator.as_ref(), now))
        .collect();

    Ok(Json(CollectionDetail {
        collection,
        is_public,
        slides,
    }))
}

async fn update_collection(
    State(state): State<CollectionsState>,
    ApiPath(identifier): ApiPath<String>,
    ApiJson(input): ApiJson<NewCollection>,
) -> Result<Json<Collection>, AppError> {
    Ok(Json(state.store.update_collection(&identifier, input).await?))
}

async fn delete_collection(
    State(state): State<CollectionsState>,
    ApiPath(identifier): ApiPath<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_collection(&identifier).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_visibility(
    State(state): State<CollectionsState>,
    ApiPath(identifier): ApiPath<String>,
) -> Result<Json<Visibility>, AppError> {
    let now = state.clock.now();
    let is_public = state.store.is_public(&identifier, now).await?;

    Ok(Json(Visibility {
        identifier,
        is_public,
        evaluated_at: now,
    }))
}

async fn list_slides(
    State(state): State<CollectionsState>,
    ApiPath(identifier): ApiPath<String>,
) -> Result<Json<Vec<SlideView>>, AppError> {
    let slides = state.store.slides(&identifier).await?;
    let now = state.clock.now();

    Ok(Json(
        slides
            .into_iter()
            .map(|slide| SlideView::new(slide, state.locator.as_ref(), now))
            .collect(),
    ))
}

async fn create_slide(
    State(state): State<CollectionsState>,
    ApiPath(identifier): ApiPath<String>,
    ApiJson(input): ApiJson<NewSlide>,
) -> Result<(StatusCode, Json<SlideView>), AppError> {
    let slide = state.store.create_slide(&identifier, input).await?;
    let view = SlideView::new(slide, state.locator.as_ref(), state.clock.now());
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_slide(
    State(state): State<CollectionsState>,
    ApiPath((identifier, slide_id)): ApiPath<(String, Uuid)>,
) -> Result<Json<SlideView>, AppError> {
    let slide = state.store.slide(&identifier, slide_id).await?;
    Ok(Json(SlideView::new(
        slide,
        state.locator.as_ref(),
        state.clock.now(),
    )))
}

async fn update_slide(
    State(state): State<CollectionsState>,
    ApiPath((identifier, slide_id)): ApiPath<(String, Uuid)>,
    ApiJson(input): ApiJson<NewSlide>,
) -> Result<Json<SlideView>, AppError> {
    let slide = state.store.update_slide(&identifier, slide_id, input).await?;
    Ok(Json(SlideView::new(
        slide,
        state.locator.as_ref(),
        state.clock.now(),
    )))
}

async fn delete_slide(
    State(state): State<CollectionsState>,
    ApiPath((identifier, slide_id)): ApiPath<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.store.delete_slide(&identifier, slide_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct LabelQuery {
    locale: Option<String>,
}

async fn list_labels(
    State(state): State<CollectionsState>,
    Query(query): Query<LabelQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let locale = query.locale.unwrap_or(state.default_locale);
    if !labels::is_supported(&locale) {
        return Err(AppError::bad_request(format!(
            "unsupported locale '{}'; expected one of: {}",
            locale,
            labels::supported_locales().collect::<Vec<_>>().join(", ")
        )));
    }

    Ok(Json(json!({
        "locale": locale,
        "labels": labels::labels(&locale),
    })))
}
