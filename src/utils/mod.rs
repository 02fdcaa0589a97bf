//! Project-specific utilities live here.

/// True when `value` is a non-empty slug of ASCII letters, digits,
/// underscores, or hyphens.
pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Derive a lowercase slug from a display name.
///
/// Runs of anything other than ASCII letters and digits collapse into a
/// single hyphen; leading and trailing hyphens are dropped. May return an
/// empty string for names without any ASCII alphanumerics.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_accepts_letters_digits_hyphens_underscores() {
        assert!(is_slug("homepage-banners_2024"));
        assert!(!is_slug(""));
        assert!(!is_slug("homepage banners"));
        assert!(!is_slug("startseite/banner"));
        assert!(!is_slug("größe"));
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Homepage Banners"), "homepage-banners");
        assert_eq!(slugify("  Summer -- Sale!! 2024 "), "summer-sale-2024");
        assert_eq!(slugify("***"), "");
    }
}
