//! Blog post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_default, BodyNode};
use crate::helpers::parse_date;

/// Slug object as stored (`{"current": "my-post"}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "null_default")]
    pub current: String,
}

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", default, deserialize_with = "null_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_default")]
    pub slug: Slug,

    /// Publish timestamp as stored; see [`Post::published`]
    #[serde(default)]
    pub published_at: Option<String>,

    /// Short summary shown in listings
    #[serde(default)]
    pub overview: Option<String>,

    /// Rich text body
    #[serde(default, deserialize_with = "null_default")]
    pub body: Vec<BodyNode>,
}

impl Post {
    /// Stored URL slug; `None` when the editor left it blank.
    ///
    /// Posts are looked up by `slug.current`, so a post without one has no
    /// reachable page.
    pub fn slug(&self) -> Option<&str> {
        Some(self.slug.current.trim()).filter(|s| !s.is_empty())
    }

    /// Parsed publish time.
    ///
    /// Accepts both datetime (`2024-01-15T10:00:00Z`) and date-only values;
    /// anything else is treated as unset.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_date)
    }
}
