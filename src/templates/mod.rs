//! Built-in theme templates using the Tera template engine
//!
//! All templates are embedded in the binary. Publication dates reach the
//! templates as raw ISO strings and are formatted by the `pub_date` filter,
//! so the first listing page and pages appended later look the same.

use anyhow::Result;
use chrono::Locale;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Banner, Post};
use crate::helpers;

/// Stylesheet copied to `css/style.css`
pub const STYLESHEET: &str = include_str!("theme/css/style.css");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("not_found.html", include_str!("theme/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/post_list.html",
                include_str!("theme/partials/post_list.html"),
            ),
            (
                "partials/preview_exit.html",
                include_str!("theme/partials/preview_exit.html"),
            ),
        ])?;

        // Text fields are escaped in the templates; URLs and paths are not
        tera.autoescape_on(vec![]);

        let date_filter = PubDateFilter {
            format: config.date_format.clone(),
            locale: config.locale()?,
            tz: config.tz()?,
        };
        tera.register_filter("pub_date", date_filter);
        tera.register_filter("iso_date", iso_date_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: format an ISO timestamp with the site's locale and timezone
struct PubDateFilter {
    format: String,
    locale: Locale,
    tz: chrono_tz::Tz,
}

impl tera::Filter for PubDateFilter {
    fn filter(
        &self,
        value: &tera::Value,
        args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        if value.is_null() {
            return Ok(tera::Value::String(String::new()));
        }
        let s = tera::try_get_value!("pub_date", "value", String, value);
        let format = match args.get("format") {
            Some(val) => tera::try_get_value!("pub_date", "format", String, val),
            None => self.format.clone(),
        };

        // Unparseable values are shown as-is
        let formatted = helpers::format_timestamp(&s, &format, self.locale, self.tz).unwrap_or(s);
        Ok(tera::Value::String(formatted))
    }
}

/// Tera filter: normalize a timestamp for `datetime` attributes
fn iso_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    if value.is_null() {
        return Ok(tera::Value::String(String::new()));
    }
    let s = tera::try_get_value!("iso_date", "value", String, value);
    let iso = helpers::parse_timestamp(&s)
        .map(|d| helpers::date_xml(&d))
        .unwrap_or(s);
    Ok(tera::Value::String(iso))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,
    pub url: String,
    pub root: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            timezone: config.timezone.clone(),
            url: config.url.clone(),
            root: helpers::url_for(config, "/"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub uid: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub first_publication_date: Option<String>,
    pub last_publication_date: Option<String>,
    /// Last publication differs from the first one
    pub edited: bool,
    pub banner: Option<BannerData>,
    pub sections: Vec<SectionData>,
    pub reading_time: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerData {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    pub html: String,
}

impl PostPageData {
    pub fn new(post: &Post, reading_time: usize) -> Self {
        let edited = match (&post.first_publication_date, &post.last_publication_date) {
            (Some(first), Some(last)) => first != last,
            _ => false,
        };

        Self {
            uid: post.uid.clone(),
            title: post.data.title.clone(),
            subtitle: post.data.subtitle.clone(),
            author: post.data.author.clone(),
            first_publication_date: post.first_publication_date.clone(),
            last_publication_date: post.last_publication_date.clone(),
            edited,
            banner: post.data.banner.as_ref().map(BannerData::from),
            sections: post
                .data
                .content
                .iter()
                .map(|section| SectionData {
                    heading: section.heading.clone(),
                    html: section.body_html(),
                })
                .collect(),
            reading_time,
        }
    }
}

impl From<&Banner> for BannerData {
    fn from(banner: &Banner) -> Self {
        Self {
            url: banner.url.clone(),
            alt: banner.alt.clone().unwrap_or_else(|| "Banner".to_string()),
        }
    }
}
