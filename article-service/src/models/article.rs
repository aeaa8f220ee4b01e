use serde::Serialize;
use std::fmt;

pub const DEFAULT_CITY: &str = "New York";
pub const DEFAULT_COUNTRY: &str = "USA";

/// Readership location the keywords and article are tuned for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Location {
    /// Missing or empty parts fall back to New York, USA.
    pub fn new(city: Option<String>, country: Option<String>) -> Self {
        Self {
            city: non_empty(city).unwrap_or_else(|| DEFAULT_CITY.to_string()),
            country: non_empty(country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}

/// A validated request to write one article.
#[derive(Debug, Clone)]
pub struct ArticleRequest {
    pub title: String,
    pub location: Location,
    /// Caller supplied keywords; skips the keyword generation step.
    pub custom_keywords: Option<String>,
}

/// Comma separated keyword phrases, the output of the first pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Keywords(String);

impl Keywords {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Keywords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a full generation run.
#[derive(Debug, Clone)]
pub struct GeneratedArticle {
    pub title: String,
    pub keywords: Keywords,
    /// HTML fragment exactly as returned upstream (trimmed).
    pub article: String,
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_defaults_apply_to_missing_and_empty() {
        assert_eq!(
            Location::new(None, Some(String::new())),
            Location {
                city: "New York".to_string(),
                country: "USA".to_string()
            }
        );
        let loc = Location::new(Some("Lagos".to_string()), Some("Nigeria".to_string()));
        assert_eq!(loc.to_string(), "Lagos, Nigeria");
    }
}
