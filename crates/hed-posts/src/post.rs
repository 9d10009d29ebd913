//! Post model and write inputs.

use chrono::{DateTime, Utc};
use hed_markup::{Editable, ImageTable, PREVIEW_CHARS, RenderOptions};
use serde::{Deserialize, Serialize};

use crate::PostError;

/// A stored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Store-assigned id.
    pub id: i64,
    /// Post title.
    pub title: String,
    /// Body text with image placeholders.
    pub body: String,
    /// Image URLs in placeholder order.
    pub images: Vec<String>,
    /// Creation time, never changed after insert.
    pub created_at: DateTime<Utc>,
    /// Time of the last update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Ordinal image table for this post's body.
    #[must_use]
    pub fn image_table(&self) -> ImageTable {
        ImageTable::ordered(self.images.iter().cloned())
    }

    /// Body and images as the edit form expects them.
    #[must_use]
    pub fn editable(&self) -> Editable {
        Editable::new(self.body.clone(), self.images.clone())
    }

    /// Render the full body.
    #[must_use]
    pub fn render(&self, options: RenderOptions) -> String {
        hed_markup::render_with(&self.body, &self.image_table(), options)
    }

    /// Render the list-view preview.
    #[must_use]
    pub fn preview(&self) -> String {
        hed_markup::preview(&self.body, &self.image_table(), PREVIEW_CHARS)
    }
}

/// Input for creating a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    /// Post title. Missing counts as blank so `validate` reports it.
    #[serde(default)]
    pub title: String,
    /// Body text with image placeholders.
    #[serde(default)]
    pub body: String,
    /// Image URLs in placeholder order.
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewPost {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Validation` if title or body is blank.
    pub fn validate(&self) -> Result<(), PostError> {
        require_text(&self.title, "title")?;
        require_text(&self.body, "body")?;
        Ok(())
    }
}

/// Partial update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostUpdate {
    /// New title.
    pub title: Option<String>,
    /// New body.
    pub body: Option<String>,
    /// New image list.
    pub images: Option<Vec<String>>,
}

impl PostUpdate {
    /// Check provided fields.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Validation` if a title is given but blank.
    pub fn validate(&self) -> Result<(), PostError> {
        if let Some(title) = &self.title {
            require_text(title, "title")?;
        }
        Ok(())
    }
}

fn require_text(value: &str, field: &str) -> Result<(), PostError> {
    if value.trim().is_empty() {
        return Err(PostError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Post {
        Post {
            id: 7,
            title: "March".to_owned(),
            body: "# Hi\n[Image]".to_owned(),
            images: vec!["http://x/1.png".to_owned()],
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["createdAt"], "2023-11-14T22:13:20Z");
        assert!(json.get("updatedAt").is_none());
        assert_eq!(json["images"][0], "http://x/1.png");
    }

    #[test]
    fn test_render_uses_images() {
        let html = sample().render(RenderOptions::default());
        assert!(html.starts_with("<h1>Hi</h1>"));
        assert!(html.contains(r#"src="http://x/1.png""#));
    }

    #[test]
    fn test_editable() {
        let editable = sample().editable();
        assert_eq!(editable.text, "# Hi\n[Image]");
        assert_eq!(editable.images, vec!["http://x/1.png"]);
    }

    #[test]
    fn test_new_post_requires_title_and_body() {
        let post = NewPost {
            title: "  ".to_owned(),
            body: "x".to_owned(),
            images: Vec::new(),
        };
        assert!(matches!(post.validate(), Err(PostError::Validation(_))));

        let post = NewPost {
            title: "t".to_owned(),
            body: String::new(),
            images: Vec::new(),
        };
        let err = post.validate().unwrap_err();
        assert!(err.to_string().contains("body"));
    }

    #[test]
    fn test_new_post_missing_fields_fail_validation() {
        let post: NewPost = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(post.body, "");
        let err = post.validate().unwrap_err();
        assert!(err.to_string().contains("body"));
    }

    #[test]
    fn test_update_allows_missing_fields() {
        assert!(PostUpdate::default().validate().is_ok());
        let update = PostUpdate {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_new_post_images_default() {
        let post: NewPost = serde_json::from_str(r#"{"title":"t","body":"b"}"#).unwrap();
        assert!(post.images.is_empty());
    }
}
