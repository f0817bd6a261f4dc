//! Singleton records: hero, about and contact

use serde::{Deserialize, Serialize};

use super::null_default;
use crate::cms::ImageSource;
use crate::helpers::is_safe_href;

/// Landing section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub bio: String,
    #[serde(default)]
    pub profile_image: Option<ImageSource>,
}

/// About page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
    #[serde(default, deserialize_with = "null_default")]
    pub heading: String,
    #[serde(default, deserialize_with = "null_default")]
    pub bio: String,
    #[serde(default, deserialize_with = "null_default")]
    pub travel_photos: Vec<TravelPhoto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelPhoto {
    #[serde(default, deserialize_with = "null_default")]
    pub location: String,
    #[serde(default)]
    pub image: Option<ImageSource>,
}

/// Contact page and footer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactContent {
    #[serde(default, deserialize_with = "null_default")]
    pub heading: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub social_links: SocialLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
}

impl SocialLinks {
    /// Usable links as (label, url), in display order
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        [
            ("GitHub", &self.github),
            ("LinkedIn", &self.linkedin),
            ("Instagram", &self.instagram),
        ]
        .into_iter()
        .filter_map(|(label, url)| {
            url.as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty() && is_safe_href(u))
                .map(|u| (label, u.to_string()))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hero() {
        let hero: HeroContent = serde_json::from_str(
            r#"{"name":"Jane","roles":["Engineer","Writer"],"bio":null,"profileImage":"https://x/y.png"}"#,
        )
        .unwrap();
        assert_eq!(hero.roles.len(), 2);
        assert_eq!(hero.bio, "");
        assert!(hero.profile_image.is_some());
    }

    #[test]
    fn test_social_links_skip_blank_and_unsafe() {
        let contact: ContactContent = serde_json::from_str(
            r#"{"heading":"Say hi","socialLinks":{"github":"https://github.com/jane","instagram":"  ","linkedin":"javascript:alert(1)"}}"#,
        )
        .unwrap();
        let links = contact.social_links.entries();
        assert_eq!(links, vec![("GitHub", "https://github.com/jane".to_string())]);
    }
}
