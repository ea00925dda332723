//! HTTP client for the content API

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::document::{ApiPage, Document};
use super::predicate::{self, Predicate};
use super::ContentError;
use crate::config::PrismicConfig;

/// Options for a documents search
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Field projection (`post.title`, ...); empty means every field
    pub fetch: Vec<String>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    pub orderings: Option<String>,
    /// Content ref override; the master ref is used when absent
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Client bound to one API endpoint
#[derive(Clone, Debug)]
pub struct ContentClient {
    http: Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl ContentClient {
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, ContentError> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))?;
        let http = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self {
            http,
            endpoint,
            access_token,
        })
    }

    pub fn from_config(config: &PrismicConfig) -> Result<Self, ContentError> {
        Self::new(&config.endpoint, config.access_token.clone())
    }

    pub fn user_agent() -> &'static str {
        concat!("spacetraveling/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve the current master (published) ref
    pub async fn master_ref(&self) -> Result<String, ContentError> {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }

        let root: ApiRoot = self.get_json(url).await?;
        root.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(ContentError::NoMasterRef)
    }

    /// Run a documents search
    pub async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiPage, ContentError> {
        let reference = match &options.reference {
            Some(r) => r.clone(),
            None => self.master_ref().await?,
        };

        let mut url = self.search_url()?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("ref", &reference);
            qp.append_pair("q", &predicate::to_query(predicates));
            if !options.fetch.is_empty() {
                qp.append_pair("fetch", &options.fetch.join(","));
            }
            if let Some(size) = options.page_size {
                qp.append_pair("pageSize", &size.to_string());
            }
            if let Some(page) = options.page {
                qp.append_pair("page", &page.to_string());
            }
            if let Some(orderings) = &options.orderings {
                qp.append_pair("orderings", orderings);
            }
            if let Some(token) = &self.access_token {
                qp.append_pair("access_token", token);
            }
        }

        tracing::debug!("Querying content API: {}", predicate::to_query(predicates));
        self.get_json(url).await
    }

    /// Follow `next_page` links until the result set is exhausted
    pub async fn query_all(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<Vec<Document>, ContentError> {
        let first = self.query(predicates, options).await?;
        let mut documents = first.results;
        let mut next = first.next_page;

        while let Some(url) = next {
            let page = self.fetch_page(&url).await?;
            documents.extend(page.results);
            next = page.next_page;
        }

        Ok(documents)
    }

    /// Fetch a page through an opaque `next_page` cursor
    pub async fn fetch_page(&self, cursor: &str) -> Result<ApiPage, ContentError> {
        let url = self.check_cursor(cursor)?;
        self.get_json(url).await
    }

    /// Fetch one document of `doc_type` by uid
    pub async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        reference: Option<&str>,
    ) -> Result<Document, ContentError> {
        let options = QueryOptions {
            page_size: Some(1),
            reference: reference.map(str::to_string),
            ..Default::default()
        };
        let page = self.query(&[Predicate::uid(doc_type, uid)], &options).await?;
        page.results
            .into_iter()
            .next()
            .ok_or_else(|| ContentError::NotFound(format!("{}/{}", doc_type, uid)))
    }

    /// Fetch one document by its id
    pub async fn get_by_id(
        &self,
        id: &str,
        reference: Option<&str>,
    ) -> Result<Document, ContentError> {
        let options = QueryOptions {
            page_size: Some(1),
            reference: reference.map(str::to_string),
            ..Default::default()
        };
        let page = self.query(&[Predicate::id(id)], &options).await?;
        page.results
            .into_iter()
            .next()
            .ok_or_else(|| ContentError::NotFound(id.to_string()))
    }

    /// Parse a cursor and make sure it points at this API's origin
    pub fn check_cursor(&self, cursor: &str) -> Result<Url, ContentError> {
        let url = Url::parse(cursor)?;
        if url.origin() != self.endpoint.origin() {
            return Err(ContentError::ForeignCursor(cursor.to_string()));
        }
        Ok(url)
    }

    fn search_url(&self) -> Result<Url, ContentError> {
        let base = format!("{}/documents/search", self.endpoint.as_str().trim_end_matches('/'));
        Ok(Url::parse(&base)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ContentError> {
        let resp = self.http.get(url).send().await?;
        Self::handle(resp).await
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, ContentError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(ContentError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::prismic::testing::root_body;

    fn client(server: &MockServer) -> ContentClient {
        ContentClient::new(&server.url("/api/v2"), None).expect("client")
    }

    #[tokio::test]
    async fn test_master_ref() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2");
                then.status(200).json_body(root_body());
            })
            .await;

        let reference = client(&server).master_ref().await.unwrap();
        assert_eq!(reference, "master-ref");
    }

    #[tokio::test]
    async fn test_query_sends_projection_and_page_size() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2");
                then.status(200).json_body(root_body());
            })
            .await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/documents/search")
                    .query_param("ref", "master-ref")
                    .query_param("q", r#"[[at(document.type,"post")]]"#)
                    .query_param("pageSize", "2")
                    .query_param("fetch", "post.title,post.author");
                then.status(200).json_body(json!({
                    "page": 1,
                    "next_page": null,
                    "results": []
                }));
            })
            .await;

        let options = QueryOptions {
            fetch: vec!["post.title".into(), "post.author".into()],
            page_size: Some(2),
            ..Default::default()
        };
        let page = client(&server)
            .query(&[Predicate::document_type("post")], &options)
            .await
            .unwrap();

        search.assert_async().await;
        assert!(page.results.is_empty());
    }

    #[tokio::test]
    async fn test_preview_ref_skips_master_lookup() {
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
                    .query_param("ref", "preview-ref");
                then.status(200).json_body(json!({"next_page": null, "results": []}));
            })
            .await;

        let options = QueryOptions {
            reference: Some("preview-ref".into()),
            ..Default::default()
        };
        client(&server)
            .query(&[Predicate::document_type("post")], &options)
            .await
            .unwrap();

        assert_eq!(root.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_get_by_uid_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2");
                then.status(200).json_body(root_body());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/documents/search");
                then.status(200).json_body(json!({"next_page": null, "results": []}));
            })
            .await;

        let err = client(&server)
            .get_by_uid("post", "missing", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2");
                then.status(401).body("invalid access token");
            })
            .await;

        let err = client(&server).master_ref().await.unwrap_err();
        match err {
            ContentError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid access token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_foreign_cursor_rejected() {
        let client = ContentClient::new("https://blog.cdn.prismic.io/api/v2", None).unwrap();
        assert!(client
            .check_cursor("https://blog.cdn.prismic.io/api/v2/documents/search?page=2")
            .is_ok());
        let err = client
            .check_cursor("https://evil.example.com/api/v2/documents/search")
            .unwrap_err();
        assert!(matches!(err, ContentError::ForeignCursor(_)));
    }
}
