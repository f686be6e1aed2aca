use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::auth::SessionClient;
use crate::error::ApiResult;

/// A client of the practice. Named `ClientRecord` to stay clear of the
/// HTTP-client vocabulary used everywhere else in this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Fields accepted by client create and update calls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientCreated {
    client: ClientRecord,
}

/// CRUD over `/clients`.
#[derive(Clone)]
pub struct ClientApi {
    session: Arc<SessionClient>,
}

impl ClientApi {
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self { session }
    }

    pub async fn list(&self) -> ApiResult<Vec<ClientRecord>> {
        self.session.get_json("/clients").await
    }

    pub async fn get(&self, id: i64) -> ApiResult<ClientRecord> {
        self.session.get_json(&format!("/clients/{}", id)).await
    }

    pub async fn create(&self, payload: &ClientPayload) -> ApiResult<ClientRecord> {
        let response: ClientCreated = self.session.post_json("/clients", payload).await?;
        Ok(response.client)
    }

    pub async fn update(&self, id: i64, payload: &ClientPayload) -> ApiResult<()> {
        let _: serde_json::Value = self
            .session
            .put_json(&format!("/clients/{}", id), payload)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.session.delete(&format!("/clients/{}", id)).await
    }
}
