//! List-shaped portfolio records

use serde::{Deserialize, Serialize};

use super::{null_default, Slug};
use crate::cms::ImageSource;

/// A showcased project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id", default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub slug: Slug,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<ImageSource>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub categories: Vec<String>,
    /// Explicit display position, lower first
    #[serde(default)]
    pub order: Option<f64>,
}

/// A work experience entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    #[serde(rename = "_id", default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_default")]
    pub role: String,
    /// Free text such as "June 2020 - Present"
    #[serde(default, deserialize_with = "null_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub technologies: Vec<String>,
    #[serde(rename = "companyLogo", default)]
    pub logo: Option<ImageSource>,
}

/// A quote from someone the owner worked with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(rename = "_id", default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub text: String,
    #[serde(default)]
    pub image: Option<ImageSource>,
}

/// One achievement on the timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(rename = "_id", default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub year: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default)]
    pub order: Option<f64>,
}

/// A short screen recording of a mobile interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileInteraction {
    #[serde(rename = "_id", default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub year: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub order: Option<f64>,
}
