use url::Url;

use crate::model::Id;

/// Convenience wrapper for URL generation functions.
#[derive(Clone)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,
}

impl Urls {
    /// Create a new instance. A trailing slash is added to `base` if it's missing.
    pub fn new(base: impl AsRef<str>) -> Self {
        let base = base.as_ref();
        let with_slash = if base.ends_with('/') {
            base.to_owned()
        } else {
            format!("{}/", base)
        };
        let base = Url::parse(&with_slash).unwrap_or_else(|_| panic!("parse {} as URL", base));

        Urls { base }
    }

    pub fn venue(&self, id: Id) -> Url {
        self.join(&format!("venues/{}", id))
    }

    pub fn artist(&self, id: Id) -> Url {
        self.join(&format!("artists/{}", id))
    }

    fn join(&self, path: &str) -> Url {
        self.base
            .join(path)
            .unwrap_or_else(|_| panic!("get URL for {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::Urls;

    #[test]
    fn resource_urls_hang_off_the_base() {
        let urls = Urls::new("https://www.example.com/booking");

        assert_eq!(urls.venue(4).as_str(), "https://www.example.com/booking/venues/4");
        assert_eq!(urls.artist(12).as_str(), "https://www.example.com/booking/artists/12");
    }
}
