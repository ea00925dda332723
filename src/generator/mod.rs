//! Generator module - renders pages with the built-in templates and writes
//! the static output tree

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use tera::Context;
use walkdir::WalkDir;

use crate::content::PostSummary;
use crate::helpers;
use crate::loader::{HomeProps, PostProps};
use crate::templates::{PostPageData, SiteData, TemplateRenderer, STYLESHEET};
use crate::Site;

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let renderer = TemplateRenderer::new(&site.config)?;

        Ok(Self {
            site: site.clone(),
            renderer,
        })
    }

    /// Generate the listing page and every given post page
    pub fn generate(&self, home: &HomeProps, posts: &[PostProps]) -> Result<()> {
        fs::create_dir_all(&self.site.public_dir)?;

        self.write_stylesheet()?;
        self.copy_static_assets()?;

        self.write_home(home)?;

        for props in posts {
            self.write_post(props)?;
        }

        tracing::info!("Generated index and {} post pages", posts.len());
        Ok(())
    }

    /// Create a base context with common variables
    fn create_base_context(&self, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(&self.site.config));
        context.insert("meta_generator", &helpers::meta_generator());
        context.insert("preview", &preview);
        context.insert("canonical", &helpers::full_url_for(&self.site.config, "/"));
        context
    }

    /// Render the listing page
    pub fn render_home(&self, props: &HomeProps) -> Result<String> {
        let mut context = self.create_base_context(props.preview);
        context.insert("posts", &props.posts_pagination.results);
        context.insert("next_page", &props.posts_pagination.next_page);
        self.renderer.render("index.html", &context)
    }

    /// Render listing items only, for pages appended by "load more"
    pub fn render_post_list(&self, posts: &[PostSummary]) -> Result<String> {
        let mut context = self.create_base_context(false);
        context.insert("posts", posts);
        self.renderer.render("partials/post_list.html", &context)
    }

    /// Render a post page
    pub fn render_post(&self, props: &PostProps) -> Result<String> {
        let mut context = self.create_base_context(props.preview);
        if let Some(uid) = &props.post.uid {
            let path = helpers::post_path(&self.site.config, uid);
            context.insert("canonical", &helpers::full_url_for(&self.site.config, &path));
        }
        context.insert("post", &PostPageData::new(&props.post, props.reading_time));
        context.insert("navigation", &props.navigation.links());
        context.insert("comments_script", &helpers::comments_script(&self.site.config));
        self.renderer.render("post.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        let context = self.create_base_context(false);
        self.renderer.render("not_found.html", &context)
    }

    /// Write `index.html`
    pub fn write_home(&self, props: &HomeProps) -> Result<PathBuf> {
        let html = self.render_home(props)?;
        let output_path = self.site.public_dir.join("index.html");
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(output_path)
    }

    /// Write `post/<uid>/index.html`
    pub fn write_post(&self, props: &PostProps) -> Result<PathBuf> {
        let uid = props
            .post
            .uid
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Post {:?} has no uid", props.post.data.title))?;

        let html = self.render_post(props)?;
        let output_path = self.post_output_path(uid);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, &html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated post: {:?}", output_path);
        Ok(output_path)
    }

    pub fn post_output_path(&self, uid: &str) -> PathBuf {
        self.site
            .public_dir
            .join("post")
            .join(uid)
            .join("index.html")
    }

    fn write_stylesheet(&self) -> Result<()> {
        let css_dir = self.site.public_dir.join("css");
        fs::create_dir_all(&css_dir)?;
        fs::write(css_dir.join("style.css"), STYLESHEET)?;
        Ok(())
    }

    /// Copy static assets (images, etc.) into the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        tracing::debug!("Copied {} static assets", copied);
        Ok(())
    }
}
