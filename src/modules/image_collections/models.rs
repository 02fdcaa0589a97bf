use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::media::ImageLocator;
use super::schedule::PublishWindow;

pub const NAME_MAX_LEN: usize = 512;
pub const IDENTIFIER_MAX_LEN: usize = 512;
pub const ALT_TEXT_MAX_LEN: usize = 128;
pub const LINK_MAX_LEN: usize = 200;

/// Storage prefix for uploaded slide images.
pub const IMAGE_UPLOAD_DIR: &str = "image_slides";

/// A named group of slides shown together, e.g. a rotating banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Internal identifier
    pub id: Uuid,
    /// Human readable title
    pub name: String,
    /// Unique URL-safe slug, the stable external key
    pub identifier: String,
}

impl Collection {
    /// Listing order: name, then identifier.
    pub fn listing_order(a: &Self, b: &Self) -> Ordering {
        a.name
            .cmp(&b.name)
            .then_with(|| a.identifier.cmp(&b.identifier))
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image Collection ({}): {}", self.id, self.identifier)
    }
}

/// Stored image path relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

/// One image plus its metadata and optional publish window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub id: Uuid,
    /// Owning collection
    pub collection_id: Uuid,
    pub image: ImageRef,
    /// Goes into the `alt` attribute of the rendered image; empty when unset
    pub alt_text: String,
    /// Explicit navigation target; empty when unset. Prefer [`Slide::url`].
    pub(super) link: String,
    /// Publish time, `None` means "always started"
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    /// Unpublish time, `None` means "never ends"
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
}

impl Slide {
    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn window(&self) -> PublishWindow {
        PublishWindow::new(self.start_date, self.end_date)
    }

    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        self.window().contains(now)
    }

    /// Effective navigation target, see [`resolve_url`].
    pub fn url(&self, locator: &dyn ImageLocator) -> String {
        resolve_url(self, locator)
    }

    /// Point the slide somewhere other than its image. Only touches `link`.
    pub fn set_url(&mut self, value: impl Into<String>) {
        self.link = value.into();
    }

    /// Drop the explicit link so [`Slide::url`] falls back to the image.
    pub fn clear_url(&mut self) {
        self.link.clear();
    }

    /// Listing key: the owner's name and identifier, start date, end date,
    /// alt text, then id. Unset dates sort before set ones.
    pub fn listing_key<'a>(&'a self, owner: &'a Collection) -> SlideListingKey<'a> {
        debug_assert_eq!(owner.id, self.collection_id);
        (
            owner.name.as_str(),
            owner.identifier.as_str(),
            self.start_date,
            self.end_date,
            self.alt_text.as_str(),
            self.id,
        )
    }
}

impl fmt::Display for Slide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image ({}): {}", self.id, self.alt_text)
    }
}

pub type SlideListingKey<'a> = (
    &'a str,
    &'a str,
    Option<OffsetDateTime>,
    Option<OffsetDateTime>,
    &'a str,
    Uuid,
);

/// Sort slides of one or more collections into listing order. Slides whose
/// owner is not in `owners` go last, by id.
pub fn sort_for_listing(slides: &mut [Slide], owners: &[Collection]) {
    let owner_of = |slide: &Slide| owners.iter().find(|c| c.id == slide.collection_id);
    slides.sort_by(|a, b| match (owner_of(a), owner_of(b)) {
        (Some(owner_a), Some(owner_b)) => a.listing_key(owner_a).cmp(&b.listing_key(owner_b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
}

/// The trimmed link when non-empty, otherwise the image's public location.
pub fn resolve_url(slide: &Slide, locator: &dyn ImageLocator) -> String {
    match slide.link.trim() {
        "" => locator.locate(&slide.image),
        link => link.to_string(),
    }
}

/// Request model for creating or replacing a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCollection {
    pub name: String,
    /// Derived from `name` when omitted
    #[serde(default)]
    pub identifier: Option<String>,
}

/// Request model for creating or replacing a slide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSlide {
    pub image: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
}

/// Collection as listed, with its visibility at the evaluation instant.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    #[serde(flatten)]
    pub collection: Collection,
    pub is_public: bool,
}

/// Slide as rendered, with its effective URL and activity.
#[derive(Debug, Clone, Serialize)]
pub struct SlideView {
    #[serde(flatten)]
    pub slide: Slide,
    pub url: String,
    pub is_active: bool,
}

impl SlideView {
    pub fn new(slide: Slide, locator: &dyn ImageLocator, now: OffsetDateTime) -> Self {
        Self {
            url: slide.url(locator),
            is_active: slide.is_active_at(now),
            slide,
        }
    }
}

/// Collection with its ordered slides.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: Collection,
    pub is_public: bool,
    pub slides: Vec<SlideView>,
}

/// Answer of the visibility endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Visibility {
    pub identifier: String,
    pub is_public: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub evaluated_at: OffsetDateTime,
}
