//! Initialize a new blog directory

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
language: pt-BR
timezone: America/Sao_Paulo

# URL
url: http://localhost:3000
root: /

# Directory
public_dir: public
static_dir: static

# Date format (date-fns tokens)
date_format: dd MMM yyyy

# Render posts missing from the last build on first request
fallback: true

# Content API
## PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN override these
prismic:
  endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  access_token:
  document_type: post
  page_size: 2
  orderings:

reading:
  words_per_minute: 200

# Comments (utterances); UTTERANCES_REPO overrides the repo
comments:
  repo:
  issue_term: pathname
  theme: github-dark

server:
  poll_interval_secs: 30
"#;

const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="26" viewBox="0 0 240 26"><text x="0" y="20" font-family="Inter, sans-serif" font-size="22" font-weight="700" fill="#FF57B2">spacetraveling<tspan fill="#F8F8F8">.</tspan></text></svg>
"##;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Already initialized: {:?}", config_path);
    }

    fs::create_dir_all(target_dir.join("static/images"))?;
    fs::write(&config_path, DEFAULT_CONFIG)?;

    let logo_path = target_dir.join("static/images/logo.svg");
    if !logo_path.exists() {
        fs::write(&logo_path, LOGO_SVG)?;
    }

    tracing::debug!("Wrote {:?} and {:?}", config_path, logo_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("static/images/logo.svg").exists());

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.prismic.page_size, 2);
        assert_eq!(site.config.reading.words_per_minute, 200);
        assert_eq!(site.config.comments.issue_term, "pathname");
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
