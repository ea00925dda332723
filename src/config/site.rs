//! Site configuration (_config.yml)

use anyhow::{bail, Result};
use chrono::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Date format (date-fns style tokens)
    pub date_format: String,

    /// Render slugs missing from the static path set on first request
    pub fallback: bool,

    #[serde(default)]
    pub prismic: PrismicConfig,
    #[serde(default)]
    pub reading: ReadingConfig,
    #[serde(default)]
    pub comments: CommentsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            date_format: "dd MMM yyyy".to_string(),

            fallback: true,

            prismic: PrismicConfig::default(),
            reading: ReadingConfig::default(),
            comments: CommentsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("PRISMIC_API_ENDPOINT") {
            tracing::debug!("Content endpoint overridden from environment");
            self.prismic.endpoint = endpoint;
        }
        if let Some(token) = lookup("PRISMIC_ACCESS_TOKEN") {
            self.prismic.access_token = Some(token);
        }
        if let Some(repo) = lookup("UTTERANCES_REPO") {
            self.comments.repo = Some(repo);
        }
    }

    /// Reject settings the loaders and renderers cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.prismic.page_size == 0 {
            bail!("prismic.page_size must be greater than zero");
        }
        if self.reading.words_per_minute == 0 {
            bail!("reading.words_per_minute must be greater than zero");
        }
        if self.prismic.document_type.trim().is_empty() {
            bail!("prismic.document_type must not be empty");
        }
        self.locale()?;
        self.tz()?;
        Ok(())
    }

    /// Date locale derived from `language` ("pt-BR" -> pt_BR)
    pub fn locale(&self) -> Result<Locale> {
        let name = self.language.replace('-', "_");
        match Locale::try_from(name.as_str()) {
            Ok(locale) => Ok(locale),
            Err(_) => bail!("Unknown language: {}", self.language),
        }
    }

    /// Timezone used when rendering publication dates
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        if self.timezone.is_empty() {
            return Ok(chrono_tz::UTC);
        }
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => Ok(tz),
            Err(_) => bail!("Unknown timezone: {}", self.timezone),
        }
    }
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismicConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub page_size: u32,
    pub orderings: Option<String>,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "post".to_string(),
            page_size: 2,
            orderings: None,
        }
    }
}

/// Reading time estimation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: usize,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

/// Comment widget (utterances) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// GitHub repository ("owner/name") the widget stores comments in
    pub repo: Option<String>,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: None,
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
        }
    }
}

/// Server / watch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub poll_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
        }
    }
}
