//! Image reference resolution
//!
//! Image fields arrive in two forms depending on the query projection: a
//! plain URL (`"image": image.asset->url`) or the raw image object with an
//! asset pointer. Both resolve to something an `<img src>` can use.

use serde::{Deserialize, Serialize};

use crate::config::CmsConfig;

const IMAGE_CDN: &str = "https://cdn.sanity.io/images";

/// An image field as stored or projected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    Url(String),
    Asset(ImageAsset),
}

/// Image object with an asset pointer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Either an unresolved `_ref` or an expanded asset document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ImageSource {
    /// Alt text, when the editor provided one
    pub fn alt(&self) -> Option<&str> {
        match self {
            ImageSource::Url(_) => None,
            ImageSource::Asset(asset) => asset.alt.as_deref().filter(|s| !s.is_empty()),
        }
    }
}

/// Turns image references into CDN URLs for one project/dataset
#[derive(Debug, Clone, Default)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    pub fn from_config(config: &CmsConfig) -> Self {
        Self::new(config.project_id.clone(), config.dataset.clone())
    }

    /// Resolve an optional image into a URL.
    ///
    /// Returns `None` for absent, empty or unparsable references; callers
    /// simply skip rendering the image.
    pub fn resolve(&self, source: Option<&ImageSource>) -> Option<String> {
        match source? {
            ImageSource::Url(url) => non_empty(url),
            ImageSource::Asset(image) => {
                let asset = image.asset.as_ref()?;
                if let Some(url) = asset.url.as_deref().and_then(non_empty) {
                    return Some(url);
                }
                self.from_reference(asset.reference.as_deref()?)
            }
        }
    }

    /// Build a CDN URL from an `image-<id>-<w>x<h>-<ext>` reference
    pub fn from_reference(&self, reference: &str) -> Option<String> {
        if self.project_id.is_empty() || self.dataset.is_empty() {
            return None;
        }

        let rest = reference.strip_prefix("image-")?;
        let mut parts = rest.rsplitn(3, '-');
        let ext = parts.next()?;
        let dimensions = parts.next()?;
        let id = parts.next()?;

        if id.is_empty() || ext.is_empty() || !is_dimensions(dimensions) {
            return None;
        }

        Some(format!(
            "{}/{}/{}/{}-{}.{}",
            IMAGE_CDN, self.project_id, self.dataset, id, dimensions, ext
        ))
    }
}

fn non_empty(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

fn is_dimensions(s: &str) -> bool {
    match s.split_once('x') {
        Some((w, h)) => {
            !w.is_empty()
                && !h.is_empty()
                && w.bytes().all(|b| b.is_ascii_digit())
                && h.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new("abc123", "production")
    }

    #[test]
    fn test_plain_url_resolves_to_itself() {
        let source = ImageSource::Url("https://example.com/me.png".to_string());
        assert_eq!(
            builder().resolve(Some(&source)).as_deref(),
            Some("https://example.com/me.png")
        );
    }

    #[test]
    fn test_asset_reference_resolves_to_cdn_url() {
        let source: ImageSource = serde_json::from_str(
            r#"{"_type":"image","asset":{"_ref":"image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg","_type":"reference"}}"#,
        )
        .unwrap();
        assert_eq!(
            builder().resolve(Some(&source)).as_deref(),
            Some("https://cdn.sanity.io/images/abc123/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg")
        );
    }

    #[test]
    fn test_expanded_asset_url_wins() {
        let source: ImageSource = serde_json::from_str(
            r#"{"asset":{"url":"https://cdn.sanity.io/images/x/y/z.png"},"alt":"Portrait"}"#,
        )
        .unwrap();
        assert_eq!(
            builder().resolve(Some(&source)).as_deref(),
            Some("https://cdn.sanity.io/images/x/y/z.png")
        );
        assert_eq!(source.alt(), Some("Portrait"));
    }

    #[test]
    fn test_absent_or_broken_references_resolve_to_none() {
        let b = builder();
        assert_eq!(b.resolve(None), None);
        assert_eq!(b.resolve(Some(&ImageSource::Url("  ".to_string()))), None);
        assert_eq!(b.from_reference("file-abc-pdf"), None);
        assert_eq!(b.from_reference("image-abc-bigxsmall-png"), None);
        assert_eq!(
            b.resolve(Some(&ImageSource::Asset(ImageAsset::default()))),
            None
        );
    }

    #[test]
    fn test_unconfigured_builder_cannot_build_references() {
        let b = ImageUrlBuilder::default();
        assert_eq!(b.from_reference("image-abc-10x10-png"), None);
    }
}
