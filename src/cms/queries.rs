//! Typed queries, one per content type
//!
//! Each query selects a fixed projection. List queries decode `null` and
//! `[]` alike into an empty `Vec`; singleton queries decode `null` into
//! `None`.

use serde::de::DeserializeOwned;

use super::{CmsError, ContentSource, QueryParams};
use crate::content::{
    AboutContent, ContactContent, Experience, HeroContent, MobileInteraction, Post, Project,
    Testimonial, TimelineEntry,
};

pub const HERO_QUERY: &str = r#"*[_type == "hero"][0] {
  name,
  roles,
  bio,
  "profileImage": profileImage.asset->url
}"#;

pub const PROJECTS_QUERY: &str = r#"*[_type == "project"] | order(_createdAt desc) {
  _id,
  title,
  slug,
  description,
  tags,
  "image": mainImage,
  link,
  categories,
  order
}"#;

pub const POSTS_QUERY: &str = r#"*[_type == "post"] | order(publishedAt desc) {
  _id,
  title,
  slug,
  publishedAt,
  overview,
  body
}"#;

pub const POST_BY_SLUG_QUERY: &str = r#"*[_type == "post" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  publishedAt,
  overview,
  body
}"#;

pub const EXPERIENCES_QUERY: &str = r#"*[_type == "experience"] | order(_createdAt desc) {
  _id,
  company,
  "companyLogo": companyLogo.asset->url,
  role,
  duration,
  description,
  technologies
}"#;

pub const TESTIMONIALS_QUERY: &str = r#"*[_type == "testimonial"] | order(_createdAt asc) {
  _id,
  name,
  text,
  image { alt, asset->{ url } }
}"#;

pub const TIMELINE_QUERY: &str = r#"*[_type == "timeline"] | order(order asc) {
  _id,
  year,
  title,
  description,
  order
}"#;

pub const MOBILE_INTERACTIONS_QUERY: &str = r#"*[_type == "mobileInteraction"] | order(order asc) {
  _id,
  name,
  year,
  videoUrl,
  order
}"#;

pub const ABOUT_QUERY: &str = r#"*[_type == "about"][0] {
  heading,
  bio,
  travelPhotos[] {
    location,
    "image": image.asset->url
  }
}"#;

pub const CONTACT_QUERY: &str = r#"*[_type == "contact"][0] {
  heading,
  description,
  socialLinks
}"#;

/// Run a list query; absent and empty results are both an empty list
pub async fn fetch_list<T: DeserializeOwned>(
    source: &dyn ContentSource,
    groq: &str,
    params: &QueryParams,
) -> Result<Vec<T>, CmsError> {
    let value = source.query(groq, params).await?;
    Ok(serde_json::from_value::<Option<Vec<T>>>(value)?.unwrap_or_default())
}

/// Run a singleton query
pub async fn fetch_one<T: DeserializeOwned>(
    source: &dyn ContentSource,
    groq: &str,
    params: &QueryParams,
) -> Result<Option<T>, CmsError> {
    let value = source.query(groq, params).await?;
    Ok(serde_json::from_value::<Option<T>>(value)?)
}

pub async fn get_hero(source: &dyn ContentSource) -> Result<Option<HeroContent>, CmsError> {
    fetch_one(source, HERO_QUERY, &QueryParams::new()).await
}

pub async fn get_projects(source: &dyn ContentSource) -> Result<Vec<Project>, CmsError> {
    fetch_list(source, PROJECTS_QUERY, &QueryParams::new()).await
}

pub async fn get_posts(source: &dyn ContentSource) -> Result<Vec<Post>, CmsError> {
    fetch_list(source, POSTS_QUERY, &QueryParams::new()).await
}

pub async fn get_post_by_slug(
    source: &dyn ContentSource,
    slug: &str,
) -> Result<Option<Post>, CmsError> {
    let mut params = QueryParams::new();
    params.insert("slug".to_string(), serde_json::Value::from(slug));
    fetch_one(source, POST_BY_SLUG_QUERY, &params).await
}

pub async fn get_experiences(source: &dyn ContentSource) -> Result<Vec<Experience>, CmsError> {
    fetch_list(source, EXPERIENCES_QUERY, &QueryParams::new()).await
}

pub async fn get_testimonials(source: &dyn ContentSource) -> Result<Vec<Testimonial>, CmsError> {
    fetch_list(source, TESTIMONIALS_QUERY, &QueryParams::new()).await
}

pub async fn get_timeline(source: &dyn ContentSource) -> Result<Vec<TimelineEntry>, CmsError> {
    fetch_list(source, TIMELINE_QUERY, &QueryParams::new()).await
}

pub async fn get_mobile_interactions(
    source: &dyn ContentSource,
) -> Result<Vec<MobileInteraction>, CmsError> {
    fetch_list(source, MOBILE_INTERACTIONS_QUERY, &QueryParams::new()).await
}

pub async fn get_about(source: &dyn ContentSource) -> Result<Option<AboutContent>, CmsError> {
    fetch_one(source, ABOUT_QUERY, &QueryParams::new()).await
}

pub async fn get_contact(source: &dyn ContentSource) -> Result<Option<ContactContent>, CmsError> {
    fetch_one(source, CONTACT_QUERY, &QueryParams::new()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticSource;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_null_and_empty_are_the_same() {
        let source = StaticSource::new().with(PROJECTS_QUERY, json!(null));
        assert!(get_projects(&source).await.unwrap().is_empty());

        let source = StaticSource::new().with(PROJECTS_QUERY, json!([]));
        assert!(get_projects(&source).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_singleton_null_is_none() {
        let source = StaticSource::new().with(HERO_QUERY, json!(null));
        assert!(get_hero(&source).await.unwrap().is_none());

        let source = StaticSource::new().with(HERO_QUERY, json!({"name": "Jane", "roles": ["Dev"]}));
        let hero = get_hero(&source).await.unwrap().unwrap();
        assert_eq!(hero.name, "Jane");
    }

    #[tokio::test]
    async fn test_post_by_slug_binds_parameter() {
        let source = StaticSource::new().with(
            POST_BY_SLUG_QUERY,
            json!({"_id": "p1", "title": "Hello", "slug": {"current": "hello"}}),
        );
        let post = get_post_by_slug(&source, "hello").await.unwrap().unwrap();
        assert_eq!(post.id, "p1");

        let calls = source.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.get("slug"), Some(&json!("hello")));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_a_decode_error() {
        let source = StaticSource::new().with(POSTS_QUERY, json!({"not": "a list"}));
        let err = get_posts(&source).await.unwrap_err();
        assert!(matches!(err, CmsError::Decode(_)));
    }
}
