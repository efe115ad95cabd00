//! Client for the remote finance API.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Result of `/add-transaction`: the category the server parsed and the signed amount.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AddedTransaction {
    pub category: String,
    pub amount: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TransactionListing {
    #[serde(default)]
    pub expenses: IndexMap<String, f64>,
    #[serde(default)]
    pub deposits: Vec<(String, f64)>,
    #[serde(default)]
    pub balance: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UserStats {
    pub balance: f64,
    pub transaction_count: u64,
}

#[derive(Serialize)]
struct AddTransactionBody<'a> {
    text: &'a str,
    user_id: &'a str,
}

#[derive(Serialize)]
struct AnalyzeBody<'a> {
    query: &'a str,
    user_id: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[async_trait(?Send)]
pub trait FinanceApi {
    async fn add_transaction(&self, text: &str, user_id: &str)
        -> Result<AddedTransaction, ApiError>;

    /// Free-text answer to a natural-language question about the user's finances.
    async fn analyze(&self, query: &str, user_id: &str) -> Result<String, ApiError>;

    async fn transactions(&self, user_id: &str) -> Result<TransactionListing, ApiError>;

    async fn user_stats(&self, user_id: &str) -> Result<UserStats, ApiError>;
}

pub struct HttpFinanceApi {
    base_url: String,
}

impl HttpFinanceApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_url(&self, path: &str, user_id: &str) -> String {
        format!("{}{}/{}", self.base_url, path, urlencoding::encode(user_id))
    }
}

async fn error_from_response(resp: Response) -> ApiError {
    let status = resp.status();
    let detail = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .and_then(|detail| detail.as_str().map(str::to_string));
    ApiError::Http { status, detail }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    if !resp.ok() {
        return Err(error_from_response(resp).await);
    }
    Ok(resp.json::<T>().await?)
}

#[async_trait(?Send)]
impl FinanceApi for HttpFinanceApi {
    async fn add_transaction(
        &self,
        text: &str,
        user_id: &str,
    ) -> Result<AddedTransaction, ApiError> {
        let url = self.url("/add-transaction");
        debug!(%url, "adding transaction");
        let resp = Request::post(&url)
            .json(&AddTransactionBody { text, user_id })?
            .send()
            .await?;
        read_json(resp).await
    }

    async fn analyze(&self, query: &str, user_id: &str) -> Result<String, ApiError> {
        let url = self.url("/analyze");
        debug!(%url, "requesting analysis");
        let resp = Request::post(&url)
            .json(&AnalyzeBody { query, user_id })?
            .send()
            .await?;
        let body: AnalyzeResponse = read_json(resp).await?;
        Ok(body.response)
    }

    async fn transactions(&self, user_id: &str) -> Result<TransactionListing, ApiError> {
        let url = self.user_url("/get-transactions", user_id);
        let resp = Request::get(&url).send().await?;
        read_json(resp).await
    }

    async fn user_stats(&self, user_id: &str) -> Result<UserStats, ApiError> {
        let url = self.user_url("/user-stats", user_id);
        let resp = Request::get(&url).send().await?;
        read_json(resp).await
    }
}
