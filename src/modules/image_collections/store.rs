//! In-memory storage for collections and their slides.
//!
//! Field validation, identifier uniqueness, and cascading deletes are
//! enforced here, at the storage boundary. Readers share a lock; each
//! mutation holds the write lock for its whole check-then-write sequence.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::media::upload_path;
use super::models::{
    sort_for_listing, Collection, CollectionSummary, NewCollection, NewSlide, Slide,
    ALT_TEXT_MAX_LEN, IDENTIFIER_MAX_LEN, LINK_MAX_LEN, NAME_MAX_LEN,
};
use super::schedule;
use crate::utils;

/// Identifiers that would collide with the module's own static routes.
pub const RESERVED_IDENTIFIERS: &[&str] = &["health", "labels"];

const LINK_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: String,
}

impl FieldError {
    fn new(field: &'static str, error: impl Into<String>) -> Self {
        Self {
            field,
            error: error.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid input: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("identifier '{0}' is already in use")]
    DuplicateIdentifier(String),

    #[error("image collection '{0}' does not exist")]
    CollectionNotFound(String),

    #[error("slide {0} does not exist")]
    SlideNotFound(Uuid),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.error))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Default)]
struct Tables {
    collections: HashMap<Uuid, Collection>,
    slides: HashMap<Uuid, Slide>,
}

impl Tables {
    fn collection_by_identifier(&self, identifier: &str) -> Result<&Collection, StoreError> {
        self.collections
            .values()
            .find(|c| c.identifier == identifier)
            .ok_or_else(|| StoreError::CollectionNotFound(identifier.to_string()))
    }

    fn identifier_taken(&self, identifier: &str, except: Option<Uuid>) -> bool {
        self.collections
            .values()
            .any(|c| c.identifier == identifier && Some(c.id) != except)
    }

    fn slides_of(&self, collection_id: Uuid) -> impl Iterator<Item = &Slide> {
        self.slides
            .values()
            .filter(move |s| s.collection_id == collection_id)
    }

    fn sorted_slides_of(&self, collection: &Collection) -> Vec<Slide> {
        let mut slides: Vec<_> = self.slides_of(collection.id).cloned().collect();
        sort_for_listing(&mut slides, std::slice::from_ref(collection));
        slides
    }

    fn slide_in(&self, identifier: &str, slide_id: Uuid) -> Result<&Slide, StoreError> {
        let collection = self.collection_by_identifier(identifier)?;
        self.slides
            .get(&slide_id)
            .filter(|s| s.collection_id == collection.id)
            .ok_or(StoreError::SlideNotFound(slide_id))
    }
}

/// Thread-safe store of collections and slides.
#[derive(Debug, Default)]
pub struct ImageCollectionStore {
    tables: RwLock<Tables>,
}

impl ImageCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_collection(&self, input: NewCollection) -> Result<Collection, StoreError> {
        let (name, identifier) = validate_collection(input)?;

        let mut tables = self.tables.write().await;
        if tables.identifier_taken(&identifier, None) {
            return Err(StoreError::DuplicateIdentifier(identifier));
        }

        let collection = Collection {
            id: Uuid::now_v7(),
            name,
            identifier,
        };
        tables.collections.insert(collection.id, collection.clone());

        tracing::info!(
            collection = %collection.identifier,
            id = %collection.id,
            "image collection created"
        );
        Ok(collection)
    }

    /// Replace name and identifier of the collection currently known as
    /// `identifier`. Slides stay attached.
    pub async fn update_collection(
        &self,
        identifier: &str,
        input: NewCollection,
    ) -> Result<Collection, StoreError> {
        let (name, new_identifier) = validate_collection(input)?;

        let mut tables = self.tables.write().await;
        let id = tables.collection_by_identifier(identifier)?.id;
        if tables.identifier_taken(&new_identifier, Some(id)) {
            return Err(StoreError::DuplicateIdentifier(new_identifier));
        }

        let collection = Collection {
            id,
            name,
            identifier: new_identifier,
        };
        tables.collections.insert(id, collection.clone());

        tracing::info!(
            collection = %collection.identifier,
            previous = %identifier,
            "image collection updated"
        );
        Ok(collection)
    }

    /// Remove a collection together with all of its slides. Returns how many
    /// slides went with it.
    pub async fn delete_collection(&self, identifier: &str) -> Result<usize, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.collection_by_identifier(identifier)?.id;

        tables.collections.remove(&id);
        let before = tables.slides.len();
        tables.slides.retain(|_, slide| slide.collection_id != id);
        let removed = before - tables.slides.len();

        tracing::info!(
            collection = %identifier,
            slides_removed = removed,
            "image collection deleted"
        );
        Ok(removed)
    }

    pub async fn collection(&self, identifier: &str) -> Result<Collection, StoreError> {
        let tables = self.tables.read().await;
        tables.collection_by_identifier(identifier).cloned()
    }

    /// All collections ordered by name, then identifier.
    pub async fn collections(&self) -> Vec<Collection> {
        let tables = self.tables.read().await;
        let mut collections: Vec<_> = tables.collections.values().cloned().collect();
        collections.sort_by(Collection::listing_order);
        collections
    }

    /// Listing of all collections with their visibility at `now`, taken
    /// under one read lock.
    pub async fn summaries(&self, now: OffsetDateTime) -> Vec<CollectionSummary> {
        let tables = self.tables.read().await;
        let mut collections: Vec<_> = tables.collections.values().collect();
        collections.sort_by(|a, b| Collection::listing_order(a, b));

        collections
            .into_iter()
            .map(|collection| CollectionSummary {
                is_public: schedule::is_public(tables.slides_of(collection.id), now),
                collection: collection.clone(),
            })
            .collect()
    }

    /// A collection with its ordered slides.
    pub async fn collection_with_slides(
        &self,
        identifier: &str,
    ) -> Result<(Collection, Vec<Slide>), StoreError> {
        let tables = self.tables.read().await;
        let collection = tables.collection_by_identifier(identifier)?;
        Ok((collection.clone(), tables.sorted_slides_of(collection)))
    }

    /// Whether the collection shows any slide at `now`.
    pub async fn is_public(&self, identifier: &str, now: OffsetDateTime) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        let collection = tables.collection_by_identifier(identifier)?;
        Ok(schedule::is_public(tables.slides_of(collection.id), now))
    }

    pub async fn create_slide(&self, identifier: &str, input: NewSlide) -> Result<Slide, StoreError> {
        let fields = validate_slide(input)?;

        let mut tables = self.tables.write().await;
        let collection_id = tables.collection_by_identifier(identifier)?.id;

        let slide = fields.into_slide(Uuid::now_v7(), collection_id);
        tables.slides.insert(slide.id, slide.clone());

        warn_if_never_shown(identifier, &slide);
        tracing::info!(collection = %identifier, slide = %slide.id, "slide created");
        Ok(slide)
    }

    pub async fn update_slide(
        &self,
        identifier: &str,
        slide_id: Uuid,
        input: NewSlide,
    ) -> Result<Slide, StoreError> {
        let fields = validate_slide(input)?;

        let mut tables = self.tables.write().await;
        let collection_id = tables.slide_in(identifier, slide_id)?.collection_id;

        let slide = fields.into_slide(slide_id, collection_id);
        tables.slides.insert(slide_id, slide.clone());

        warn_if_never_shown(identifier, &slide);
        tracing::info!(collection = %identifier, slide = %slide_id, "slide updated");
        Ok(slide)
    }

    pub async fn delete_slide(&self, identifier: &str, slide_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.slide_in(identifier, slide_id)?;
        tables.slides.remove(&slide_id);

        tracing::info!(collection = %identifier, slide = %slide_id, "slide deleted");
        Ok(())
    }

    pub async fn slide(&self, identifier: &str, slide_id: Uuid) -> Result<Slide, StoreError> {
        let tables = self.tables.read().await;
        tables.slide_in(identifier, slide_id).cloned()
    }

    /// Slides of one collection ordered by start date, end date, alt text, id.
    pub async fn slides(&self, identifier: &str) -> Result<Vec<Slide>, StoreError> {
        let tables = self.tables.read().await;
        let collection = tables.collection_by_identifier(identifier)?;
        Ok(tables.sorted_slides_of(collection))
    }
}

fn warn_if_never_shown(identifier: &str, slide: &Slide) {
    if slide.window().is_empty() {
        tracing::warn!(
            collection = %identifier,
            slide = %slide.id,
            "slide starts after it ends and will never be shown"
        );
    }
}

fn validate_collection(input: NewCollection) -> Result<(String, String), StoreError> {
    let mut errors = Vec::new();

    let name = input.name.trim().to_string();
    if name.is_empty() {
        errors.push(FieldError::new("name", "required"));
    } else if name.chars().count() > NAME_MAX_LEN {
        errors.push(FieldError::new(
            "name",
            format!("must be at most {} characters", NAME_MAX_LEN),
        ));
    }

    let identifier = match input.identifier {
        Some(identifier) => identifier.trim().to_string(),
        None => utils::slugify(&name),
    };
    if identifier.is_empty() {
        errors.push(FieldError::new("identifier", "required"));
    } else if identifier.len() > IDENTIFIER_MAX_LEN {
        errors.push(FieldError::new(
            "identifier",
            format!("must be at most {} characters", IDENTIFIER_MAX_LEN),
        ));
    } else if !utils::is_slug(&identifier) {
        errors.push(FieldError::new(
            "identifier",
            "may only contain letters, numbers, underscores, or hyphens",
        ));
    } else if RESERVED_IDENTIFIERS.contains(&identifier.as_str()) {
        errors.push(FieldError::new("identifier", "is reserved"));
    }

    if errors.is_empty() {
        Ok((name, identifier))
    } else {
        Err(StoreError::Validation(errors))
    }
}

/// Slide fields that passed validation, waiting for an id and owner.
struct SlideFields {
    input: NewSlide,
}

impl SlideFields {
    fn into_slide(self, id: Uuid, collection_id: Uuid) -> Slide {
        let NewSlide {
            image,
            alt_text,
            link,
            start_date,
            end_date,
        } = self.input;

        Slide {
            id,
            collection_id,
            image: upload_path(&image),
            alt_text,
            link: link.trim().to_string(),
            start_date,
            end_date,
        }
    }
}

fn validate_slide(input: NewSlide) -> Result<SlideFields, StoreError> {
    let mut errors = Vec::new();

    if input.image.trim().is_empty() {
        errors.push(FieldError::new("image", "required"));
    }

    if input.alt_text.chars().count() > ALT_TEXT_MAX_LEN {
        errors.push(FieldError::new(
            "alt_text",
            format!("must be at most {} characters", ALT_TEXT_MAX_LEN),
        ));
    }

    let link = input.link.trim();
    if !link.is_empty() {
        if link.chars().count() > LINK_MAX_LEN {
            errors.push(FieldError::new(
                "link",
                format!("must be at most {} characters", LINK_MAX_LEN),
            ));
        } else {
            match url::Url::parse(link) {
                Ok(url) if LINK_SCHEMES.contains(&url.scheme()) && url.has_host() => {}
                _ => errors.push(FieldError::new("link", "must be a valid URL")),
            }
        }
    }

    if errors.is_empty() {
        Ok(SlideFields { input })
    } else {
        Err(StoreError::Validation(errors))
    }
}
