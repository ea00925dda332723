//! Generate static files

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::loader::{self, ContentRef, StaticPaths};
use crate::prismic::ContentClient;
use crate::Site;

/// Fetch every post and write the static site, returning the master ref
/// the build was read from
pub async fn run(site: &Site) -> Result<String> {
    let client = site.client()?;
    let master_ref = client.master_ref().await?;
    run_with_client(site, &client, &ContentRef::Pinned(master_ref.clone())).await?;
    Ok(master_ref)
}

/// Generate one content version using an existing client
pub async fn run_with_client(
    site: &Site,
    client: &ContentClient,
    content: &ContentRef,
) -> Result<()> {
    let start = Instant::now();
    let config = &site.config;

    let home = loader::load_home(client, config, content).await?;
    let summaries = loader::load_all_summaries(client, config, content).await?;
    let paths = StaticPaths::from_summaries(&summaries, loader::fallback_policy(config));

    tracing::info!(
        "Loaded {} posts ({} on the first listing page)",
        paths.slugs.len(),
        home.posts_pagination.results.len()
    );

    let mut posts = Vec::with_capacity(paths.slugs.len());
    for slug in &paths.slugs {
        let props =
            loader::load_post_with(client, config, slug, summaries.clone(), content).await?;
        posts.push(props);
    }

    let generator = Generator::new(site)?;
    generator.generate(&home, &posts)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Poll the master ref and regenerate whenever published content changes
///
/// `built_ref` is the ref of the build already on disk; anything published
/// after it is picked up on the first poll.
pub async fn watch(site: &Site, built_ref: Option<String>) -> Result<()> {
    watch_content(site, built_ref, || {}).await
}

/// Like [`watch`], calling `on_regenerated` after each successful rebuild
pub async fn watch_content<F>(
    site: &Site,
    built_ref: Option<String>,
    mut on_regenerated: F,
) -> Result<()>
where
    F: FnMut(),
{
    let client = site.client()?;
    let interval = Duration::from_secs(site.config.server.poll_interval_secs.max(1));
    let mut last_ref = built_ref;

    tracing::info!(
        "Polling for content changes every {}s. Press Ctrl+C to stop.",
        interval.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let current = match client.master_ref().await {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("Failed to poll content API: {}", e);
                continue;
            }
        };
        if last_ref.as_deref() == Some(current.as_str()) {
            continue;
        }

        tracing::info!("Content changed, regenerating...");
        let content = ContentRef::Pinned(current.clone());
        match run_with_client(site, &client, &content).await {
            Ok(()) => {
                last_ref = Some(current);
                on_regenerated();
            }
            Err(e) => tracing::error!("Generation failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::prismic::testing::{full_doc, mock_root, page_body, root_body, summary_doc};
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_generate_builds_every_post() {
        let server = MockServer::start_async().await;
        mock_root(&server).await;
        let next = server.url("/api/v2/documents/search?page=2");
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/documents/search")
                    .query_param("pageSize", "2");
                then.status(200).json_body(page_body(
                    vec![summary_doc("a", "A"), summary_doc("b", "B")],
                    Some(next),
                ));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/documents/search")
                    .query_param("pageSize", "100");
                then.status(200).json_body(page_body(
                    vec![
                        summary_doc("a", "A"),
                        summary_doc("b", "B"),
                        summary_doc("c", "C"),
                    ],
                    None,
                ));
            })
            .await;
        for uid in ["a", "b", "c"] {
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/api/v2/documents/search")
                        .query_param("q", format!(r#"[[at(my.post.uid,"{}")]]"#, uid));
                    then.status(200).json_body(page_body(
                        vec![full_doc(uid, &uid.to_uppercase(), "a few words")],
                        None,
                    ));
                })
                .await;
        }

        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.prismic.endpoint = server.url("/api/v2");
        let site = Site::with_config(dir.path(), config);

        run(&site).await.unwrap();

        let index = std::fs::read_to_string(site.public_dir.join("index.html")).unwrap();
        assert!(index.contains("load-more"));
        assert!(!index.contains("/post/c"));

        let middle = std::fs::read_to_string(site.public_dir.join("post/b/index.html")).unwrap();
        assert!(middle.contains(r#"href="/post/a""#));
        assert!(middle.contains(r#"href="/post/c""#));
        assert!(site.public_dir.join("post/c/index.html").exists());
    }

    #[tokio::test]
    async fn test_generate_reads_one_master_ref() {
        let server = MockServer::start_async().await;
        let root = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2");
                then.status(200).json_body(root_body());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/documents/search")
                    .query_param("ref", "master-ref")
                    .query_param_exists("fetch");
                then.status(200)
                    .json_body(page_body(vec![summary_doc("a", "A")], None));
            })
            .await;
        let post = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/documents/search")
                    .query_param("ref", "master-ref")
                    .query_param("q", r#"[[at(my.post.uid,"a")]]"#);
                then.status(200)
                    .json_body(page_body(vec![full_doc("a", "A", "a few words")], None));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.prismic.endpoint = server.url("/api/v2");
        let site = Site::with_config(dir.path(), config);

        let built_ref = run(&site).await.unwrap();

        assert_eq!(built_ref, "master-ref");
        root.assert_hits_async(1).await;
        post.assert_async().await;
        assert!(site.public_dir.join("post/a/index.html").exists());
    }

    #[tokio::test]
    async fn test_watch_rebuilds_content_published_after_build() {
        let server = MockServer::start_async().await;
        mock_root(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/documents/search")
                    .query_param_exists("fetch");
                then.status(200)
                    .json_body(page_body(vec![summary_doc("a", "A")], None));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/documents/search")
                    .query_param("q", r#"[[at(my.post.uid,"a")]]"#);
                then.status(200)
                    .json_body(page_body(vec![full_doc("a", "A", "a few words")], None));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.prismic.endpoint = server.url("/api/v2");
        config.server.poll_interval_secs = 1;
        let site = Site::with_config(dir.path(), config);

        // The tree on disk was built from an older ref
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let watcher = watch_content(&site, Some("older-ref".to_string()), move || {
            let _ = tx.send(());
        });
        tokio::select! {
            result = watcher => panic!("watcher stopped: {:?}", result),
            rebuilt = rx.recv() => assert!(rebuilt.is_some()),
        }
        assert!(site.public_dir.join("post/a/index.html").exists());
    }
}
