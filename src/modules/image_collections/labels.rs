//! Human readable field labels, looked up by locale and field name.

use std::collections::BTreeMap;

pub const FALLBACK_LOCALE: &str = "en";

type Table = &'static [(&'static str, &'static str)];

const EN: Table = &[
    ("image_collection", "image collection"),
    ("image_collections", "image collections"),
    ("name", "name"),
    ("identifier", "identifier"),
    ("image", "image"),
    ("images", "images"),
    ("alt_text", "alt text"),
    (
        "alt_text.help",
        "This will go into the ``alt`` attribute of the image's HTML markup.",
    ),
    ("link", "link"),
    (
        "link.help",
        "Enter URL, that the image should link to. (not required)",
    ),
    ("start_date", "publish date"),
    ("end_date", "unpublish date"),
];

const DE: Table = &[
    ("image_collection", "Bildersammlung"),
    ("image_collections", "Bildersammlungen"),
    ("name", "Name"),
    ("identifier", "Kennung"),
    ("image", "Bild"),
    ("images", "Bilder"),
    ("alt_text", "Alternativtext"),
    (
        "alt_text.help",
        "Wird in das ``alt``-Attribut des HTML-Markups des Bildes übernommen.",
    ),
    ("link", "Link"),
    (
        "link.help",
        "URL, auf die das Bild verlinken soll. (optional)",
    ),
    ("start_date", "Veröffentlichungsdatum"),
    ("end_date", "Ablaufdatum"),
];

const LOCALES: &[(&str, Table)] = &[("en", EN), ("de", DE)];

fn table(locale: &str) -> Option<Table> {
    // "de-AT" and "de_AT" both resolve to "de"
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_ascii_lowercase();
    LOCALES
        .iter()
        .find(|(code, _)| *code == language)
        .map(|(_, table)| *table)
}

pub fn is_supported(locale: &str) -> bool {
    table(locale).is_some()
}

pub fn supported_locales() -> impl Iterator<Item = &'static str> {
    LOCALES.iter().map(|(code, _)| *code)
}

/// Label for `field` in `locale`, falling back to English for unknown
/// locales or untranslated fields.
pub fn label(locale: &str, field: &str) -> Option<&'static str> {
    let lookup = |table: Table| {
        table
            .iter()
            .find(|(key, _)| *key == field)
            .map(|(_, text)| *text)
    };
    table(locale).and_then(lookup).or_else(|| lookup(EN))
}

/// Every label of `locale`, keyed by field name.
pub fn labels(locale: &str) -> BTreeMap<&'static str, &'static str> {
    EN.iter()
        .filter_map(|(field, _)| label(locale, field).map(|text| (*field, text)))
        .collect()
}
