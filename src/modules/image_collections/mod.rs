//! Image collections: named groups of slides, each slide with an optional
//! publish window and link.

pub mod labels;
pub mod media;
pub mod models;
pub mod routes;
pub mod schedule;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use vitrine_kernel::{settings::Settings, Clock, InitCtx, Migration, Module};

use media::MediaUrlLocator;
use routes::CollectionsState;
use store::ImageCollectionStore;

pub const MODULE_NAME: &str = "collections";

/// Image collections module
pub struct ImageCollectionsModule {
    state: CollectionsState,
}

impl ImageCollectionsModule {
    pub fn new(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self::with_store(settings, clock, Arc::new(ImageCollectionStore::new()))
    }

    /// Build the module around an existing store, e.g. one seeded by a test.
    pub fn with_store(
        settings: &Settings,
        clock: Arc<dyn Clock>,
        store: Arc<ImageCollectionStore>,
    ) -> Self {
        Self {
            state: CollectionsState {
                store,
                clock,
                locator: Arc::new(MediaUrlLocator::new(settings.media.base_url.clone())),
                default_locale: settings.display.default_locale.clone(),
            },
        }
    }

    pub fn store(&self) -> &Arc<ImageCollectionStore> {
        &self.state.store
    }
}

#[async_trait]
impl Module for ImageCollectionsModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if !labels::is_supported(&ctx.settings.display.default_locale) {
            tracing::warn!(
                module = self.name(),
                locale = %ctx.settings.display.default_locale,
                "default locale has no labels, falling back to {}",
                labels::FALLBACK_LOCALE
            );
        }
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            media = %ctx.settings.media.base_url,
            "collections module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let body = |schema: &str| {
            json!({
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{}", schema) }
                    }
                }
            })
        };
        let identifier = json!({
            "name": "identifier",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });
        let slide_id = json!({
            "name": "slide_id",
            "in": "path",
            "required": true,
            "schema": { "type": "string", "format": "uuid" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List image collections",
                        "tags": ["Collections"],
                        "responses": {
                            "200": {
                                "description": "Collections ordered by name, then identifier",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/CollectionSummary" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create an image collection",
                        "tags": ["Collections"],
                        "requestBody": body("NewCollection"),
                        "responses": {
                            "201": { "description": "Created" },
                            "409": error("Identifier already in use"),
                            "422": error("Validation error")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Collections health check",
                        "tags": ["Collections"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                },
                "/labels": {
                    "get": {
                        "summary": "Localized field labels",
                        "tags": ["Collections"],
                        "parameters": [{
                            "name": "locale",
                            "in": "query",
                            "required": false,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": { "description": "Labels keyed by field name" },
                            "400": error("Unsupported locale")
                        }
                    }
                },
                "/{identifier}": {
                    "get": {
                        "summary": "Collection with its slides",
                        "tags": ["Collections"],
                        "parameters": [identifier.clone()],
                        "responses": {
                            "200": {
                                "description": "Collection detail",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/CollectionDetail" }
                                    }
                                }
                            },
                            "404": error("Collection not found")
                        }
                    },
                    "put": {
                        "summary": "Replace name and identifier",
                        "tags": ["Collections"],
                        "parameters": [identifier.clone()],
                        "requestBody": body("NewCollection"),
                        "responses": {
                            "200": { "description": "Updated" },
                            "404": error("Collection not found"),
                            "409": error("Identifier already in use"),
                            "422": error("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a collection and all of its slides",
                        "tags": ["Collections"],
                        "parameters": [identifier.clone()],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error("Collection not found")
                        }
                    }
                },
                "/{identifier}/public": {
                    "get": {
                        "summary": "Whether any slide is currently published",
                        "tags": ["Collections"],
                        "parameters": [identifier.clone()],
                        "responses": {
                            "200": {
                                "description": "Visibility at the evaluation instant",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Visibility" }
                                    }
                                }
                            },
                            "404": error("Collection not found")
                        }
                    }
                },
                "/{identifier}/slides": {
                    "get": {
                        "summary": "List slides of a collection",
                        "tags": ["Slides"],
                        "parameters": [identifier.clone()],
                        "responses": {
                            "200": { "description": "Slides ordered by start date, end date, alt text" },
                            "404": error("Collection not found")
                        }
                    },
                    "post": {
                        "summary": "Add a slide",
                        "tags": ["Slides"],
                        "parameters": [identifier.clone()],
                        "requestBody": body("NewSlide"),
                        "responses": {
                            "201": { "description": "Created" },
                            "404": error("Collection not found"),
                            "422": error("Validation error")
                        }
                    }
                },
                "/{identifier}/slides/{slide_id}": {
                    "get": {
                        "summary": "Get a slide",
                        "tags": ["Slides"],
                        "parameters": [identifier.clone(), slide_id.clone()],
                        "responses": {
                            "200": {
                                "description": "Slide",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Slide" }
                                    }
                                }
                            },
                            "404": error("Slide not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a slide",
                        "tags": ["Slides"],
                        "parameters": [identifier.clone(), slide_id.clone()],
                        "requestBody": body("NewSlide"),
                        "responses": {
                            "200": { "description": "Updated" },
                            "404": error("Slide not found"),
                            "422": error("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a slide",
                        "tags": ["Slides"],
                        "parameters": [identifier, slide_id],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error("Slide not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "NewCollection": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "maxLength": models::NAME_MAX_LEN },
                            "identifier": {
                                "type": "string",
                                "maxLength": models::IDENTIFIER_MAX_LEN,
                                "pattern": "^[A-Za-z0-9_-]+$",
                                "description": "Derived from the name when omitted"
                            }
                        },
                        "required": ["name"]
                    },
                    "CollectionSummary": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "name": { "type": "string" },
                            "identifier": { "type": "string" },
                            "is_public": { "type": "boolean" }
                        },
                        "required": ["id", "name", "identifier", "is_public"]
                    },
                    "CollectionDetail": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "name": { "type": "string" },
                            "identifier": { "type": "string" },
                            "is_public": { "type": "boolean" },
                            "slides": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Slide" }
                            }
                        },
                        "required": ["id", "name", "identifier", "is_public", "slides"]
                    },
                    "NewSlide": {
                        "type": "object",
                        "properties": {
                            "image": { "type": "string", "description": "Stored image path" },
                            "alt_text": { "type": "string", "maxLength": models::ALT_TEXT_MAX_LEN },
                            "link": { "type": "string", "format": "uri", "maxLength": models::LINK_MAX_LEN },
                            "start_date": { "type": ["string", "null"], "format": "date-time" },
                            "end_date": { "type": ["string", "null"], "format": "date-time" }
                        },
                        "required": ["image"]
                    },
                    "Slide": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "collection_id": { "type": "string", "format": "uuid" },
                            "image": { "type": "string" },
                            "alt_text": { "type": "string" },
                            "link": { "type": "string" },
                            "start_date": { "type": ["string", "null"], "format": "date-time" },
                            "end_date": { "type": ["string", "null"], "format": "date-time" },
                            "url": { "type": "string", "description": "Link when set, otherwise the image location" },
                            "is_active": { "type": "boolean" }
                        },
                        "required": ["id", "collection_id", "image", "alt_text", "link", "url", "is_active"]
                    },
                    "Visibility": {
                        "type": "object",
                        "properties": {
                            "identifier": { "type": "string" },
                            "is_public": { "type": "boolean" },
                            "evaluated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["identifier", "is_public", "evaluated_at"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                -- Schema of record for a persistent backend; the in-memory store enforces the same rules.
                DEFINE TABLE image_collection SCHEMAFULL;
                DEFINE FIELD name       ON image_collection TYPE string ASSERT $value != "" AND string::len($value) <= 512;
                DEFINE FIELD identifier ON image_collection TYPE string
                    ASSERT $value = /^[A-Za-z0-9_-]+$/
                        AND string::len($value) <= 512
                        AND $value NOTINSIDE ["health", "labels"];
                DEFINE INDEX image_collection_identifier_unique ON image_collection FIELDS identifier UNIQUE;

                DEFINE TABLE image_slide SCHEMAFULL;
                DEFINE FIELD collection ON image_slide TYPE record<image_collection>;
                DEFINE FIELD image      ON image_slide TYPE string ASSERT $value != "";
                DEFINE FIELD alt_text   ON image_slide TYPE string ASSERT string::len($value) <= 128;
                DEFINE FIELD link       ON image_slide TYPE string ASSERT string::len($value) <= 200;
                DEFINE FIELD start_date ON image_slide TYPE option<datetime>;
                DEFINE FIELD end_date   ON image_slide TYPE option<datetime>;

                DEFINE EVENT image_collection_cascade ON image_collection WHEN $event = "DELETE" THEN (
                    DELETE image_slide WHERE collection = $before.id
                );
                "#,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let collections = self.state.store.collections().await.len();
        tracing::info!(
            module = self.name(),
            collections,
            "collections module stopped"
        );
        Ok(())
    }
}

/// Create a new instance of the image collections module
pub fn create_module(settings: &Settings, clock: Arc<dyn Clock>) -> Arc<dyn Module> {
    Arc::new(ImageCollectionsModule::new(settings, clock))
}
