use crate::error::ClientError;
use crate::models::{Todo, TodoId, TodoPayload};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the `<api_url>/todos` collection.
///
/// Every call maps to exactly one request. Failures of any kind, timeouts
/// included, collapse into the operation's `ClientError` variant after the
/// cause has been logged.
#[derive(Clone, Debug)]
pub struct TodoClient {
    client: Client,
    base_url: String,
}

impl TodoClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(TodoClient {
            client,
            base_url: format!("{}/todos", api_url.trim_end_matches('/')),
        })
    }

    pub fn collection_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: TodoId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    pub async fn list(&self) -> Result<Vec<Todo>, ClientError> {
        tracing::debug!(url = %self.base_url, "fetching todos");
        let res = async {
            self.client
                .get(&self.base_url)
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<Todo>>()
                .await
        }
        .await;

        res.map_err(|err| {
            tracing::error!(error = %err, "error fetching todos");
            ClientError::FetchFailed(err)
        })
    }

    pub async fn create(&self, payload: &TodoPayload) -> Result<Todo, ClientError> {
        tracing::debug!(title = %payload.title, "creating todo");
        let res = async {
            self.client
                .post(&self.base_url)
                .json(payload)
                .send()
                .await?
                .error_for_status()?
                .json::<Todo>()
                .await
        }
        .await;

        res.map_err(|err| {
            tracing::error!(error = %err, "error creating todo");
            ClientError::CreateFailed(err)
        })
    }

    pub async fn update(&self, id: TodoId, payload: &TodoPayload) -> Result<Todo, ClientError> {
        tracing::debug!(%id, "updating todo");
        let res = async {
            self.client
                .put(self.item_url(id))
                .json(payload)
                .send()
                .await?
                .error_for_status()?
                .json::<Todo>()
                .await
        }
        .await;

        res.map_err(|err| {
            tracing::error!(%id, error = %err, "error updating todo");
            ClientError::UpdateFailed(err)
        })
    }

    pub async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        tracing::debug!(%id, "deleting todo");
        let res = async {
            self.client
                .delete(self.item_url(id))
                .send()
                .await?
                .error_for_status()?;
            Ok::<(), reqwest::Error>(())
        }
        .await;

        res.map_err(|err| {
            tracing::error!(%id, error = %err, "error deleting todo");
            ClientError::DeleteFailed(err)
        })
    }

    /// Server-side title search. The browser filters locally, so only
    /// callers outside the list view use this.
    pub async fn search(&self, query: &str) -> Result<Vec<Todo>, ClientError> {
        tracing::debug!(query, "searching todos");
        let res = async {
            self.client
                .get(format!("{}/search", self.base_url))
                .query(&[("q", query)])
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<Todo>>()
                .await
        }
        .await;

        res.map_err(|err| {
            tracing::error!(query, error = %err, "error searching todos");
            ClientError::SearchFailed(err)
        })
    }
}
