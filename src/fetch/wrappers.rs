//! One loader per content type
//!
//! Each function binds [`SectionLoad`] to a query from
//! [`crate::cms::queries`] and starts it. Failure handling is entirely the
//! adapter's.

use std::sync::Arc;

use super::SectionLoad;
use crate::cms::{queries, ContentSource};
use crate::content::{
    AboutContent, ContactContent, Experience, HeroContent, MobileInteraction, Post, Project,
    Testimonial, TimelineEntry,
};

pub fn load_hero(source: Arc<dyn ContentSource>) -> SectionLoad<Option<HeroContent>> {
    SectionLoad::spawn(move || async move { queries::get_hero(source.as_ref()).await })
}

pub fn load_projects(source: Arc<dyn ContentSource>) -> SectionLoad<Vec<Project>> {
    SectionLoad::spawn(move || async move { queries::get_projects(source.as_ref()).await })
}

pub fn load_posts(source: Arc<dyn ContentSource>) -> SectionLoad<Vec<Post>> {
    SectionLoad::spawn(move || async move { queries::get_posts(source.as_ref()).await })
}

pub fn load_post(source: Arc<dyn ContentSource>, slug: String) -> SectionLoad<Option<Post>> {
    SectionLoad::spawn(move || async move {
        queries::get_post_by_slug(source.as_ref(), &slug).await
    })
}

pub fn load_experiences(source: Arc<dyn ContentSource>) -> SectionLoad<Vec<Experience>> {
    SectionLoad::spawn(move || async move { queries::get_experiences(source.as_ref()).await })
}

pub fn load_testimonials(source: Arc<dyn ContentSource>) -> SectionLoad<Vec<Testimonial>> {
    SectionLoad::spawn(move || async move { queries::get_testimonials(source.as_ref()).await })
}

pub fn load_timeline(source: Arc<dyn ContentSource>) -> SectionLoad<Vec<TimelineEntry>> {
    SectionLoad::spawn(move || async move { queries::get_timeline(source.as_ref()).await })
}

pub fn load_mobile_interactions(
    source: Arc<dyn ContentSource>,
) -> SectionLoad<Vec<MobileInteraction>> {
    SectionLoad::spawn(move || async move {
        queries::get_mobile_interactions(source.as_ref()).await
    })
}

pub fn load_about(source: Arc<dyn ContentSource>) -> SectionLoad<Option<AboutContent>> {
    SectionLoad::spawn(move || async move { queries::get_about(source.as_ref()).await })
}

pub fn load_contact(source: Arc<dyn ContentSource>) -> SectionLoad<Option<ContactContent>> {
    SectionLoad::spawn(move || async move { queries::get_contact(source.as_ref()).await })
}
