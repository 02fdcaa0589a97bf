//! Publish windows and the "is anything showing right now" check.

use time::OffsetDateTime;

use super::models::Slide;

/// Optional publish/unpublish bounds of a slide.
///
/// Both bounds are inclusive. A window whose start lies after its end is
/// valid and simply never contains any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishWindow {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

impl PublishWindow {
    pub const fn new(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> Self {
        Self { start, end }
    }

    /// Unbounded on both sides, always active.
    pub const fn always() -> Self {
        Self::new(None, None)
    }

    pub fn contains(&self, now: OffsetDateTime) -> bool {
        match (self.start, self.end) {
            // started, no end
            (Some(start), None) => start <= now,
            // no start, not yet ended
            (None, Some(end)) => end >= now,
            (None, None) => true,
            // closed interval
            (Some(start), Some(end)) => start <= now && end >= now,
        }
    }

    /// True when no instant can ever fall inside the window.
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }
}

/// Whether any of `slides` is active at `now`. Stops at the first match;
/// an empty set is never public.
pub fn is_public<'a, I>(slides: I, now: OffsetDateTime) -> bool
where
    I: IntoIterator<Item = &'a Slide>,
{
    slides.into_iter().any(|slide| slide.is_active_at(now))
}
