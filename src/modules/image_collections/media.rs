//! Image location lookup. Storing and serving files happens elsewhere; this
//! only turns a stored path into the address clients fetch it from.

use super::models::{ImageRef, IMAGE_UPLOAD_DIR};

/// Resolves a stored image to its public location.
pub trait ImageLocator: Send + Sync {
    fn locate(&self, image: &ImageRef) -> String;
}

/// Joins image paths onto a configured media base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrlLocator {
    base_url: String,
}

impl MediaUrlLocator {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ImageLocator for MediaUrlLocator {
    fn locate(&self, image: &ImageRef) -> String {
        format!("{}{}", self.base_url, image.path().trim_start_matches('/'))
    }
}

/// Place a bare file name under the slide upload directory; paths that
/// already name a directory are kept as given.
pub fn upload_path(name: &str) -> ImageRef {
    let name = name.trim();
    if name.contains('/') {
        ImageRef::new(name.trim_start_matches('/'))
    } else {
        ImageRef::new(format!("{}/{}", IMAGE_UPLOAD_DIR, name))
    }
}
