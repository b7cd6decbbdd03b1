use serde::de::Error;
use serde::{Deserialize, Deserializer};
use url::Url;

/// Normalizes a name by stripping any whitespace and decomposing it
/// into Unicode Normalization Form D.
///
/// ```
/// use booking::normalization::normalize_name;
/// assert_eq!(normalize_name(" h\u{ef} "), "hi\u{308}");
/// ```
pub fn normalize_name(name: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    name.as_ref().trim().nfd().to_string()
}

/// Normalizes every genre, dropping blanks and repeats. The first
/// occurrence of each genre keeps its position.
pub fn normalize_genres(genres: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    let mut normalized: Vec<String> = vec![];

    for genre in genres {
        let genre = normalize_name(genre);

        if !genre.is_empty() && !normalized.contains(&genre) {
            normalized.push(genre);
        }
    }

    normalized
}

/// Deserializes a `String` after running it through `normalize_name`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    let s: String = Deserialize::deserialize(deserializer)?;
    Ok(normalize_name(s))
}

/// Deserializes an optional `String` after running it through
/// `normalize_name`. Blank strings become `None`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(o.map(normalize_name).filter(|s| !s.is_empty()))
}

/// Deserializes a list of genres through `normalize_genres`.
pub fn deserialize_genres<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where D: Deserializer<'de> {
    let genres: Vec<String> = Deserialize::deserialize(deserializer)?;
    Ok(normalize_genres(genres))
}

/// Deserializes an optional absolute URL. Blank strings become `None`.
pub fn deserialize_link<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where D: Deserializer<'de> {
    let o: Option<String> = Deserialize::deserialize(deserializer)?;

    match o.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(link) => Url::parse(link)
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid link {:?}: {}", link, e))),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use unicode_normalization::is_nfd;

    use super::{normalize_genres, normalize_name};

    fn count_whitespace(s: impl AsRef<str>) -> usize {
        s.as_ref().chars().filter(|c| c.is_whitespace()).count()
    }

    #[test]
    fn genres_are_deduplicated_in_order() {
        let genres = normalize_genres(vec![" Jazz", "Folk", "", "Jazz ", "  ", "Reggae", "Folk"]);

        assert_eq!(genres, vec!["Jazz", "Folk", "Reggae"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 1000, ..ProptestConfig::default()
        })]

        #[test]
        fn normalization_works(string in "(\\S.*\\S|\\S+)", space_before in "\\s*", space_after in "\\s*") {
            let normalized = normalize_name(format!("{}{}{}", space_before, string, space_after));

            prop_assert!(is_nfd(&normalized), "{:?} (normalized form of {:?}) is in NFD", normalized, string);

            prop_assert!(!normalized.starts_with(char::is_whitespace) && !normalized.ends_with(char::is_whitespace), "{:?} (normalized form of {:?}) has no leading or trailing whitespace", normalized, string);

            let trimmed = normalized.trim();

            prop_assert_eq!(count_whitespace(&normalized), count_whitespace(&trimmed), "{:?} (normalized form of {:?}) preserves inner whitespace", normalized, string);
        }
    }
}
