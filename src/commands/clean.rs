//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Site;

/// Remove the generated output
pub fn run(site: &Site) -> Result<()> {
    if site.public_dir.exists() {
        fs::remove_dir_all(&site.public_dir)?;
        tracing::info!("Deleted: {:?}", site.public_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", site.public_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_clean_removes_output_only() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        fs::create_dir_all(site.public_dir.join("post/a")).unwrap();
        fs::create_dir_all(&site.static_dir).unwrap();

        run(&site).unwrap();
        assert!(!site.public_dir.exists());
        assert!(site.static_dir.exists());

        // Cleaning twice is fine
        run(&site).unwrap();
    }
}
