//! Slug derivation

/// Turn free text into a URL slug.
///
/// ASCII letters and digits are kept (lowercased); every run of other
/// characters collapses into a single `-`. The result never starts or ends
/// with `-`, so `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_punctuation_and_digits() {
        assert_eq!(slugify("New Arrival!! 2024"), "new-arrival-2024");
    }

    #[test]
    fn test_slugify_trims_separators() {
        assert_eq!(slugify("  --Summer Sale--  "), "summer-sale");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_keeps_existing_hyphens() {
        assert_eq!(slugify("t-shirt"), "t-shirt");
        assert_eq!(slugify("T -- Shirt"), "t-shirt");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Crème"), "caf-cr-me");
    }
}
