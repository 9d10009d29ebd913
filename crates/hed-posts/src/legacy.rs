//! Historical post records.
//!
//! Older exports stored the body as an array of paragraphs with images in a
//! map keyed `"<paragraph>-<suffix>"`, and timestamps as epoch milliseconds.
//! Later ones used a single string. Both are accepted here and folded into
//! a [`NewPost`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hed_markup::{Editable, ImageTable, normalize_paragraphs};
use serde::Deserialize;

use crate::{NewPost, PostError};

/// A post as found in a legacy export.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPost {
    /// Id from the old document store, kept only for log messages.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Post title.
    pub title: String,
    /// Body in either historical shape.
    pub content: LegacyContent,
    /// Images in either historical shape.
    #[serde(default)]
    pub images: LegacyImages,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<LegacyTimestamp>,
}

/// Historical body shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyContent {
    /// One string per paragraph.
    Paragraphs(Vec<String>),
    /// Single string body.
    Text(String),
}

/// Historical image shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyImages {
    /// Map from legacy key to URL. Null or empty URLs are ignored.
    Keyed(BTreeMap<String, Option<String>>),
    /// URLs in placeholder order.
    Ordered(Vec<String>),
}

impl Default for LegacyImages {
    fn default() -> Self {
        Self::Ordered(Vec::new())
    }
}

impl LegacyImages {
    fn table(&self) -> ImageTable {
        match self {
            Self::Keyed(map) => ImageTable::keyed(
                map.iter()
                    .filter_map(|(key, url)| Some((key.as_str(), url.as_deref()?))),
            ),
            Self::Ordered(urls) => ImageTable::ordered(urls.iter().cloned()),
        }
    }
}

/// Historical timestamp shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyTimestamp {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// RFC 3339 string.
    Text(String),
}

impl LegacyPost {
    /// Label for log messages.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.id {
            Some(serde_json::Value::String(id)) => format!("{id} ({})", self.title),
            Some(id) => format!("{id} ({})", self.title),
            None => self.title.clone(),
        }
    }

    /// Creation time, or `now` if the record has none.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Validation` if the timestamp is out of range or
    /// not RFC 3339.
    pub fn created_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, PostError> {
        match &self.created_at {
            None => Ok(now),
            Some(LegacyTimestamp::Millis(ms)) => DateTime::from_timestamp_millis(*ms)
                .ok_or_else(|| PostError::Validation(format!("createdAt out of range: {ms}"))),
            Some(LegacyTimestamp::Text(text)) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| PostError::Validation(format!("invalid createdAt {text:?}: {e}"))),
        }
    }

    /// Body and images in the canonical shape.
    ///
    /// A single string body with an ordered image list is already canonical
    /// and passes through unchanged.
    #[must_use]
    pub fn editable(&self) -> Editable {
        match (&self.content, &self.images) {
            (LegacyContent::Text(text), LegacyImages::Ordered(urls)) => {
                Editable::new(text.clone(), urls.clone())
            }
            (LegacyContent::Text(text), images) => {
                normalize_paragraphs(std::slice::from_ref(text), &images.table())
            }
            (LegacyContent::Paragraphs(paragraphs), images) => {
                normalize_paragraphs(paragraphs, &images.table())
            }
        }
    }

    /// Convert into a create request.
    #[must_use]
    pub fn to_new_post(&self) -> NewPost {
        let Editable { text, images } = self.editable();
        NewPost {
            title: self.title.clone(),
            body: text,
            images,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(json: &str) -> LegacyPost {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_paragraphs_with_keyed_images() {
        let post = parse(
            r##"{
                "id": "abc",
                "title": "April",
                "content": ["# Update", "![Image]$$1-1700000000001$$", "closing"],
                "images": {"1-1700000000001": "http://x/a.png", "2-1": null},
                "createdAt": 1700000000000
            }"##,
        );
        let new_post = post.to_new_post();
        assert_eq!(new_post.title, "April");
        assert_eq!(new_post.body, "# Update\n\n[Image]\n\nclosing");
        assert_eq!(new_post.images, vec!["http://x/a.png"]);
        assert_eq!(post.label(), "abc (April)");
    }

    #[test]
    fn test_string_body_with_list_unchanged() {
        let post = parse(
            r#"{"title":"t","content":"a &amp; [Image]","images":["u"],"createdAt":"2024-01-02T03:04:05Z"}"#,
        );
        let new_post = post.to_new_post();
        assert_eq!(new_post.body, "a &amp; [Image]");
        assert_eq!(new_post.images, vec!["u"]);
    }

    #[test]
    fn test_string_body_with_keyed_images() {
        let post = parse(
            r#"{"title":"t","content":"see ![Image]$$0-1$$","images":{"0-1":"u","0-2":"v"}}"#,
        );
        let new_post = post.to_new_post();
        assert_eq!(new_post.body, "see\n[Image]");
        assert_eq!(new_post.images, vec!["u", "v"]);
    }

    #[test]
    fn test_missing_images_defaults_to_empty() {
        let post = parse(r#"{"title":"t","content":["x"]}"#);
        assert!(post.to_new_post().images.is_empty());
    }

    #[test]
    fn test_created_at_millis() {
        let post = parse(r#"{"title":"t","content":"x","createdAt":1700000000000}"#);
        let created = post.created_at(Utc::now()).unwrap();
        assert_eq!(created.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_created_at_rfc3339() {
        let post = parse(r#"{"title":"t","content":"x","createdAt":"2024-01-02T03:04:05+02:00"}"#);
        let created = post.created_at(Utc::now()).unwrap();
        assert_eq!(created.to_rfc3339(), "2024-01-02T01:04:05+00:00");
    }

    #[test]
    fn test_created_at_missing_uses_now() {
        let now = Utc::now();
        let post = parse(r#"{"title":"t","content":"x"}"#);
        assert_eq!(post.created_at(now).unwrap(), now);
    }

    #[test]
    fn test_created_at_invalid_text() {
        let post = parse(r#"{"title":"t","content":"x","createdAt":"yesterday"}"#);
        assert!(matches!(
            post.created_at(Utc::now()),
            Err(PostError::Validation(_))
        ));
    }
}
