//! Page composition shared by the server and static generation
//!
//! Every page render is one mount: it starts a fresh [`SectionLoad`](crate::fetch::SectionLoad) per
//! section, waits for them together up to the render deadline, and hands
//! each section to the template as a [`SectionView`]. Dropping the render
//! future drops the loads with it.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tera::Context;

use crate::cms::{ContentSource, ImageUrlBuilder};
use crate::config::SiteConfig;
use crate::content::arrange::{
    dedupe_testimonials, displayed_interactions, group_timeline, order_projects, recent_posts,
};
use crate::content::{
    AboutContent, ContactContent, Experience, HeroContent, MobileInteraction, Post,
    PortableTextRenderer, Project, Testimonial,
};
use crate::fetch::{wrappers, SectionView};
use crate::helpers::{date_xml, is_safe_href, post_url, url_for};
use crate::templates::{
    AboutData, Banner, ContactData, ExperienceData, FormData, HeroData, InteractionData, MenuItem,
    PhotoData, PostData, PostSummary, ProjectData, SiteData, SocialLink, TemplateRenderer,
    TestimonialData,
};

/// A rendered page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    /// The page stands in for a missing resource and should be served as 404
    pub not_found: bool,
}

impl RenderedPage {
    fn found(html: String) -> Self {
        Self {
            html,
            not_found: false,
        }
    }
}

/// Builds every page of the site from the content store
pub struct PageBuilder {
    config: SiteConfig,
    source: Arc<dyn ContentSource>,
    renderer: TemplateRenderer,
    images: ImageUrlBuilder,
    portable: PortableTextRenderer,
    deadline: Duration,
}

impl PageBuilder {
    pub fn new(config: &SiteConfig, source: Arc<dyn ContentSource>) -> Result<Self> {
        let images = ImageUrlBuilder::from_config(&config.cms);
        Ok(Self {
            config: config.clone(),
            source,
            renderer: TemplateRenderer::new()?,
            portable: PortableTextRenderer::new(images.clone()),
            images,
            deadline: Duration::from_millis(config.server.render_deadline_ms),
        })
    }

    /// Override the render deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn source(&self) -> Arc<dyn ContentSource> {
        Arc::clone(&self.source)
    }

    pub async fn home(&self) -> Result<String> {
        let hero = wrappers::load_hero(self.source());
        let projects = wrappers::load_projects(self.source());
        let experiences = wrappers::load_experiences(self.source());
        let posts = wrappers::load_posts(self.source());
        let testimonials = wrappers::load_testimonials(self.source());
        let timeline = wrappers::load_timeline(self.source());
        let interactions = wrappers::load_mobile_interactions(self.source());
        let contact = wrappers::load_contact(self.source());

        let (hero, projects, experiences, posts, testimonials, timeline, interactions, contact) = tokio::join!(
            hero.settle_within(self.deadline),
            projects.settle_within(self.deadline),
            experiences.settle_within(self.deadline),
            posts.settle_within(self.deadline),
            testimonials.settle_within(self.deadline),
            timeline.settle_within(self.deadline),
            interactions.settle_within(self.deadline),
            contact.settle_within(self.deadline),
        );

        let hero = SectionView::from(hero).present().map(|h| self.hero_data(h));
        let projects = SectionView::from(projects)
            .map(|items| {
                order_projects(items)
                    .into_iter()
                    .take(self.config.home_projects)
                    .map(|p| self.project_data(p))
                    .collect::<Vec<_>>()
            })
            .non_empty();
        let experiences = SectionView::from(experiences).map(|items| {
            items
                .into_iter()
                .map(|e| self.experience_data(e))
                .collect::<Vec<_>>()
        });
        let posts = SectionView::from(posts)
            .map(|items| {
                recent_posts(&items, self.config.home_posts)
                    .into_iter()
                    .map(|p| self.post_summary(p))
                    .collect::<Vec<_>>()
            })
            .non_empty();
        let testimonials = SectionView::from(testimonials).map(|items| {
            dedupe_testimonials(items)
                .into_iter()
                .map(|t| self.testimonial_data(t))
                .collect::<Vec<_>>()
        });
        let timeline = SectionView::from(timeline).map(group_timeline);
        let interactions = SectionView::from(interactions)
            .map(|items| {
                displayed_interactions(items)
                    .into_iter()
                    .map(interaction_data)
                    .collect::<Vec<_>>()
            })
            .non_empty();
        let contact = SectionView::from(contact).present().map(contact_data);

        let still_loading = hero.is_loading()
            || projects.is_loading()
            || experiences.is_loading()
            || posts.is_loading()
            || testimonials.is_loading()
            || timeline.is_loading()
            || interactions.is_loading()
            || contact.is_loading();

        let mut context = self.base_context("/");
        context.insert("still_loading", &still_loading);
        context.insert("social", &social_of(&contact));
        context.insert("hero", &hero);
        context.insert("projects", &projects);
        context.insert("experiences", &experiences);
        context.insert("posts", &posts);
        context.insert("testimonials", &testimonials);
        context.insert("timeline", &timeline);
        context.insert("interactions", &interactions);
        context.insert("contact", &contact);

        self.renderer.render("home.html", &context)
    }

    pub async fn about(&self) -> Result<String> {
        let about = wrappers::load_about(self.source());
        let timeline = wrappers::load_timeline(self.source());

        let (about, timeline) = tokio::join!(
            about.settle_within(self.deadline),
            timeline.settle_within(self.deadline),
        );

        let about = SectionView::from(about)
            .present()
            .map(|a| self.about_data(a));
        let timeline = SectionView::from(timeline).map(group_timeline);

        let mut context = self.base_context("/about/");
        context.insert("still_loading", &(about.is_loading() || timeline.is_loading()));
        context.insert("about", &about);
        context.insert("timeline", &timeline);

        self.renderer.render("about.html", &context)
    }

    pub async fn projects(&self) -> Result<String> {
        let projects = wrappers::load_projects(self.source());
        let projects = SectionView::from(projects.settle_within(self.deadline).await).map(|items| {
            order_projects(items)
                .into_iter()
                .map(|p| self.project_data(p))
                .collect::<Vec<_>>()
        });

        let mut context = self.base_context("/projects/");
        context.insert("still_loading", &projects.is_loading());
        context.insert("projects", &projects);

        self.renderer.render("projects.html", &context)
    }

    pub async fn blog(&self) -> Result<String> {
        let posts = wrappers::load_posts(self.source());
        let posts = SectionView::from(posts.settle_within(self.deadline).await).map(|items| {
            items
                .into_iter()
                .map(|p| self.post_summary(p))
                .collect::<Vec<_>>()
        });

        let mut context = self.base_context("/blog/");
        context.insert("still_loading", &posts.is_loading());
        context.insert("posts", &posts);

        self.renderer.render("blog.html", &context)
    }

    /// A single post; a settled miss renders the "Post not found" page
    pub async fn post(&self, slug: &str) -> Result<RenderedPage> {
        let post = wrappers::load_post(self.source(), slug.to_string());
        let post = SectionView::from(post.settle_within(self.deadline).await).present();

        if matches!(post, SectionView::Empty) {
            tracing::debug!("No post with slug {:?}", slug);
            return Ok(RenderedPage {
                html: self.missing_post()?,
                not_found: true,
            });
        }

        let post = post.map(|p| self.post_data(p));

        let mut context = self.base_context("/blog/");
        context.insert("still_loading", &post.is_loading());
        context.insert("post", &post);

        Ok(RenderedPage::found(
            self.renderer.render("post.html", &context)?,
        ))
    }

    /// The contact page, echoing `form` back into its inputs
    pub async fn contact(&self, form: &FormData, banner: Option<&Banner>) -> Result<String> {
        let contact = wrappers::load_contact(self.source());
        let contact = SectionView::from(contact.settle_within(self.deadline).await)
            .present()
            .map(contact_data);

        let mut context = self.base_context("/contact/");
        context.insert("still_loading", &contact.is_loading());
        context.insert("social", &social_of(&contact));
        context.insert("contact", &contact);
        context.insert("form", form);
        context.insert("banner", &banner);

        self.renderer.render("contact.html", &context)
    }

    pub fn not_found(&self) -> Result<String> {
        let mut context = self.base_context("");
        context.insert("heading", "Page not found");
        context.insert("message", "There is nothing at this address.");
        context.insert("back_link", &url_for(&self.config, "/"));
        context.insert("back_label", "Back home");
        self.renderer.render("not_found.html", &context)
    }

    fn missing_post(&self) -> Result<String> {
        let mut context = self.base_context("/blog/");
        context.insert("heading", "Post not found");
        context.insert(
            "message",
            "This post does not exist or is no longer published.",
        );
        context.insert("back_link", &url_for(&self.config, "blog/"));
        context.insert("back_label", "Back to the blog");
        self.renderer.render("not_found.html", &context)
    }

    /// The 500 page; falls back to static markup if even that fails
    pub fn error_page(&self) -> String {
        let context = self.base_context("");
        match self.renderer.render("error.html", &context) {
            Ok(html) => html,
            Err(err) => {
                tracing::error!("Failed to render error page: {:#}", err);
                "<!DOCTYPE html><title>Error</title><h1>Something went wrong</h1>".to_string()
            }
        }
    }

    fn base_context(&self, current_path: &str) -> Context {
        let config = &self.config;
        let mut context = Context::new();
        context.insert("site", &self.site_data());
        context.insert("current_path", &url_for(config, current_path));
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context.insert("still_loading", &false);
        context.insert("social", &Vec::<SocialLink>::new());
        context.insert(
            "links",
            &serde_json::json!({
                "projects": url_for(config, "projects/"),
                "blog": url_for(config, "blog/"),
                "contact": url_for(config, "contact/"),
            }),
        );
        context.insert("contact_action", &url_for(config, "contact/"));
        context
    }

    fn site_data(&self) -> SiteData {
        let config = &self.config;
        let menu = [
            ("Home", "/"),
            ("About", "about/"),
            ("Projects", "projects/"),
            ("Blog", "blog/"),
            ("Contact", "contact/"),
        ]
        .into_iter()
        .map(|(name, path)| MenuItem {
            name: name.to_string(),
            path: url_for(config, path),
        })
        .collect();

        SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: url_for(config, "/"),
            stylesheet: url_for(config, "folio.css"),
            year: chrono::Utc::now().format("%Y").to_string(),
            menu,
        }
    }

    fn hero_data(&self, hero: HeroContent) -> HeroData {
        HeroData {
            image: self.images.resolve(hero.profile_image.as_ref()),
            name: hero.name,
            roles: hero
                .roles
                .into_iter()
                .filter(|r| !r.trim().is_empty())
                .collect(),
            bio: hero.bio,
        }
    }

    fn project_data(&self, project: Project) -> ProjectData {
        let image = self.images.resolve(project.image.as_ref());
        let image_alt = project
            .image
            .as_ref()
            .and_then(|i| i.alt())
            .unwrap_or(&project.title)
            .to_string();

        ProjectData {
            id: project.id,
            title: project.title,
            description: project.description,
            tags: project.tags,
            categories: project.categories,
            link: project
                .link
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty() && is_safe_href(l)),
            image,
            image_alt,
        }
    }

    fn experience_data(&self, experience: Experience) -> ExperienceData {
        ExperienceData {
            logo: self.images.resolve(experience.logo.as_ref()),
            id: experience.id,
            company: experience.company,
            role: experience.role,
            duration: experience.duration,
            description: experience.description,
            technologies: experience.technologies,
        }
    }

    fn testimonial_data(&self, testimonial: Testimonial) -> TestimonialData {
        TestimonialData {
            image: self.images.resolve(testimonial.image.as_ref()),
            id: testimonial.id,
            name: testimonial.name,
            text: testimonial.text,
        }
    }

    fn post_summary(&self, post: Post) -> PostSummary {
        PostSummary {
            path: post.slug().map(|slug| post_url(&self.config, slug)),
            date: post.published().map(|d| date_xml(&d)),
            title: post.title,
            overview: post.overview.filter(|o| !o.trim().is_empty()),
        }
    }

    fn post_data(&self, post: Post) -> PostData {
        PostData {
            content: self.portable.render(&post.body),
            date: post.published().map(|d| date_xml(&d)),
            title: post.title,
            overview: post.overview.filter(|o| !o.trim().is_empty()),
        }
    }

    fn about_data(&self, about: AboutContent) -> AboutData {
        let paragraphs = about
            .bio
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        // photos whose image cannot be resolved are left out
        let photos = about
            .travel_photos
            .into_iter()
            .filter_map(|photo| {
                let image = self.images.resolve(photo.image.as_ref())?;
                Some(PhotoData {
                    location: photo.location,
                    image,
                })
            })
            .collect();

        AboutData {
            heading: about.heading,
            paragraphs,
            photos,
        }
    }
}

fn interaction_data(item: MobileInteraction) -> InteractionData {
    InteractionData {
        id: item.id,
        name: item.name,
        year: item.year,
        video: item.video_url.filter(|v| !v.trim().is_empty()),
    }
}

fn contact_data(contact: ContactContent) -> ContactData {
    let social = contact
        .social_links
        .entries()
        .into_iter()
        .map(|(name, url)| SocialLink {
            name: name.to_string(),
            url,
        })
        .collect();

    ContactData {
        heading: contact.heading,
        description: contact.description,
        social,
    }
}

fn social_of(contact: &SectionView<ContactData>) -> Vec<SocialLink> {
    match contact {
        SectionView::Ready(data) => data.social.clone(),
        _ => Vec::new(),
    }
}
