//! HTTP client for CouchDB-compatible servers (CouchDB, Cloudant).
//!
//! Requires the `couchdb` feature. Uses reqwest.
//!
//! ## Routes used
//!
//! - `PUT /{db}` / `DELETE /{db}`: create / delete a database.
//! - `GET /{db}/{id}`: fetch a document.
//! - `GET /{db}/_all_docs?include_docs=true`: list documents.
//! - `POST /{db}`: create a document.
//! - `PUT /{db}/{id}?rev={rev}`: replace a document.
//! - `DELETE /{db}/{id}?rev={rev}`: delete a document.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;

use super::{ConnectionProperties, DatabaseError, DocumentDatabase};

/// [`DocumentDatabase`] over the CouchDB HTTP API.
#[derive(Clone)]
pub struct CouchClient {
    http: reqwest::Client,
    base: Url,
    username: Option<String>,
    password: Option<String>,
}

impl CouchClient {
    /// Build a client for the server described by `properties`.
    pub fn new(properties: &ConnectionProperties) -> Result<Self, DatabaseError> {
        Self::with_http_client(properties, reqwest::Client::new())
    }

    /// Build a client reusing an existing reqwest client (shared pool, custom timeouts).
    pub fn with_http_client(
        properties: &ConnectionProperties,
        http: reqwest::Client,
    ) -> Result<Self, DatabaseError> {
        let base = Url::parse(&properties.base_url())
            .map_err(|e| DatabaseError::transport(format!("invalid server url: {}", e)))?;
        Ok(Self {
            http,
            base,
            username: properties.username.clone(),
            password: properties.password.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Server URL with percent-encoded path segments appended.
    fn url(&self, segments: &[&str]) -> Result<Url, DatabaseError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DatabaseError::transport(format!("cannot use {} as a base url", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn url_with_rev(&self, db: &str, id: &str, rev: &str) -> Result<Url, DatabaseError> {
        let mut url = self.url(&[db, id])?;
        url.query_pairs_mut().append_pair("rev", rev);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_ref()),
            None => builder,
        }
    }

    /// Send a request and decode the JSON answer; non-2xx becomes a status error
    /// and a 2xx body that is not JSON becomes a malformed-response error.
    async fn send(&self, builder: RequestBuilder) -> Result<Value, DatabaseError> {
        let response = builder
            .send()
            .await
            .map_err(|e| DatabaseError::transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| DatabaseError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(DatabaseError::status(status.as_u16(), reason(status, &body)));
        }

        serde_json::from_slice(&body)
            .map_err(|e| DatabaseError::malformed(format!("unreadable response body: {}", e)))
    }
}

/// CouchDB puts a human readable `reason` (and a short `error`) in error bodies.
fn reason(status: StatusCode, body: &[u8]) -> String {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|body| body.get("reason").or_else(|| body.get("error")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

#[async_trait]
impl DocumentDatabase for CouchClient {
    async fn create_database(&self, name: &str) -> Result<(), DatabaseError> {
        let url = self.url(&[name])?;
        self.send(self.request(Method::PUT, url)).await.map(|_| ())
    }

    async fn delete_database(&self, name: &str) -> Result<(), DatabaseError> {
        let url = self.url(&[name])?;
        self.send(self.request(Method::DELETE, url)).await.map(|_| ())
    }

    async fn retrieve(&self, db: &str, id: &str) -> Result<Value, DatabaseError> {
        let url = self.url(&[db, id])?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn retrieve_all(&self, db: &str, include_docs: bool) -> Result<Value, DatabaseError> {
        let mut url = self.url(&[db, "_all_docs"])?;
        if include_docs {
            url.query_pairs_mut().append_pair("include_docs", "true");
        }
        self.send(self.request(Method::GET, url)).await
    }

    async fn create(&self, db: &str, document: Value) -> Result<Value, DatabaseError> {
        let url = self.url(&[db])?;
        self.send(self.request(Method::POST, url).json(&document))
            .await
    }

    async fn update(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        document: Value,
    ) -> Result<Value, DatabaseError> {
        let url = self.url_with_rev(db, id, rev)?;
        self.send(self.request(Method::PUT, url).json(&document))
            .await
    }

    async fn delete(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        fail_on_not_found: bool,
    ) -> Result<(), DatabaseError> {
        let url = self.url_with_rev(db, id, rev)?;
        match self.send(self.request(Method::DELETE, url)).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() && !fail_on_not_found => Ok(()),
            Err(err) => Err(err),
        }
    }
}
