//! spacetraveling: a statically generated blog over a headless content API
//!
//! Posts live in a Prismic repository. The generator fetches them, renders
//! the listing and every post page with embedded Tera templates and writes
//! a static tree; the server adds preview mode, on-demand pages and the
//! "load more" endpoint on top of it.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod loader;
pub mod prismic;
pub mod server;
pub mod state;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A blog rooted at a directory
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim into the output
    pub static_dir: PathBuf,
}

impl Site {
    /// Open a site directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();
        config.validate()?;

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a site from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            public_dir,
            static_dir,
        }
    }

    /// Content API client for this site
    pub fn client(&self) -> Result<prismic::ContentClient> {
        Ok(prismic::ContentClient::from_config(&self.config.prismic)?)
    }

    /// Generate the static site, returning the master ref it was built from
    pub async fn generate(&self) -> Result<String> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("_config.yml"),
            "title: Blog\npublic_dir: out\nprismic:\n  page_size: 5\n",
        )
        .unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "Blog");
        assert_eq!(site.config.prismic.page_size, 5);
        assert_eq!(site.public_dir, dir.path().join("out"));
        assert_eq!(site.static_dir, dir.path().join("static"));
    }

    #[test]
    fn test_site_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("_config.yml"), "prismic:\n  page_size: 0\n").unwrap();
        assert!(Site::new(dir.path()).is_err());
    }
}
