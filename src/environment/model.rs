use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

pub type PostId = u64;
pub type UserId = u64;

/// The shape posts have on the wire: `GET /posts` returns a list of these,
/// `PUT /posts/{id}` sends and echoes one. No date, no reactions; those are
/// local-only fields the reducer fills in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
}

/// A new post as submitted via `POST /posts`: no id yet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPost {
    pub title: String,
    pub body: String,
    pub user_id: UserId,
}

/// Tagged outcome of a write against the remote resource. Callers that
/// care about failures match on the variants; the posts reducer treats
/// `Rejected`/`Failed` as diagnostic no-ops for compatibility with the
/// upstream behavior of swallowing write failures.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WriteOutcome<T> {
    Done(T),
    /// The server answered with a non-200 status, described as "code: reason".
    Rejected(String),
    /// The request never completed (network, DNS, timeout).
    Failed(String),
}

impl<T> WriteOutcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, WriteOutcome::Done(_))
    }
}

/// Raw REST operations on the posts collection. Object safe so the model
/// can hold any transport (reqwest in production, stubs in tests).
#[async_trait]
pub trait PostsApi {
    async fn list(&self) -> Result<Vec<PostRecord>, String>;
    async fn create(&self, draft: &DraftPost) -> Result<PostRecord, String>;
    async fn update(&self, record: &PostRecord) -> Result<PostRecord, String>;
    /// Resolves to (status code, canonical reason) for any completed response.
    async fn delete(&self, id: PostId) -> Result<(u16, String), String>;
}

/// reqwest-backed [`PostsApi`] against a JSON REST collection.
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PostsApi for HttpApi {
    async fn list(&self) -> Result<Vec<PostRecord>, String> {
        log::trace!("GET {}/posts", self.base_url);
        let response = self
            .client
            .get(format!("{}/posts", self.base_url))
            .send()
            .await
            .string_error("list_posts")?
            .error_for_status()
            .string_error("list_posts")?;
        response
            .json::<Vec<PostRecord>>()
            .await
            .string_error("list_posts")
    }

    async fn create(&self, draft: &DraftPost) -> Result<PostRecord, String> {
        log::trace!("POST {}/posts", self.base_url);
        let response = self
            .client
            .post(format!("{}/posts", self.base_url))
            .json(draft)
            .send()
            .await
            .string_error("create_post")?
            .error_for_status()
            .string_error("create_post")?;
        response.json::<PostRecord>().await.string_error("create_post")
    }

    async fn update(&self, record: &PostRecord) -> Result<PostRecord, String> {
        log::trace!("PUT {}/posts/{}", self.base_url, record.id);
        let response = self
            .client
            .put(format!("{}/posts/{}", self.base_url, record.id))
            .json(record)
            .send()
            .await
            .string_error("update_post")?
            .error_for_status()
            .string_error("update_post")?;
        response.json::<PostRecord>().await.string_error("update_post")
    }

    async fn delete(&self, id: PostId) -> Result<(u16, String), String> {
        log::trace!("DELETE {}/posts/{id}", self.base_url);
        let response = self
            .client
            .delete(format!("{}/posts/{id}", self.base_url))
            .send()
            .await
            .string_error("delete_post")?;
        let status = response.status();
        Ok((
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown").to_string(),
        ))
    }
}

/// Facade over the posts API that applies the outcome contract of the
/// four asynchronous operations. Only listing propagates a failure the
/// reducer surfaces in state; writes resolve to [`WriteOutcome`].
#[derive(Clone)]
pub struct Model {
    client: Arc<dyn PostsApi + Send + Sync>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").finish()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Arc::new(HttpApi::new(DEFAULT_BASE_URL)))
    }
}

impl Model {
    pub fn new(client: Arc<dyn PostsApi + Send + Sync>) -> Self {
        Self { client }
    }

    pub async fn posts(&self) -> Result<Vec<PostRecord>, String> {
        log::trace!("Fetch Posts");
        self.client.list().await
    }

    pub async fn create_post(&self, draft: &DraftPost) -> Result<PostRecord, String> {
        log::trace!("Create Post");
        self.client.create(draft).await
    }

    pub async fn update_post(&self, record: &PostRecord) -> WriteOutcome<PostRecord> {
        log::trace!("Update Post {}", record.id);
        match self.client.update(record).await {
            Ok(echo) => WriteOutcome::Done(echo),
            Err(e) => WriteOutcome::Failed(e),
        }
    }

    pub async fn delete_post(&self, id: PostId) -> WriteOutcome<PostId> {
        log::trace!("Delete Post {id}");
        match self.client.delete(id).await {
            Ok((200, _)) => WriteOutcome::Done(id),
            Ok((code, reason)) => WriteOutcome::Rejected(format!("{code}: {reason}")),
            Err(e) => WriteOutcome::Failed(e),
        }
    }
}

trait ResultExt {
    type Output;
    fn string_error(self, call: &'static str) -> Result<Self::Output, String>;
}

impl<T, E: std::fmt::Debug> ResultExt for Result<T, E> {
    type Output = T;
    fn string_error(self, call: &'static str) -> Result<T, String> {
        self.map_err(|e| {
            let string_error = format!("API Error: {call} {e:?}");
            log::error!("{string_error}");
            string_error
        })
    }
}
