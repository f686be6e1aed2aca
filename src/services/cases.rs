use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::auth::SessionClient;
use crate::error::ApiResult;

/// A case as returned by the backend. The list endpoint omits
/// `updated_at`, so every field outside the identifying trio is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: i64,
    pub case_number: String,
    pub title: String,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub court_name: Option<String>,
    #[serde(default)]
    pub filing_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub opposite_party: Option<String>,
    #[serde(default)]
    pub otherside_counsel: Option<String>,
    #[serde(default)]
    pub party_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Fields accepted by case create and update calls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CasePayload {
    pub case_number: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opposite_party: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otherside_counsel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaseCreated {
    case: Case,
}

/// CRUD over `/cases`.
#[derive(Clone)]
pub struct CaseApi {
    session: Arc<SessionClient>,
}

impl CaseApi {
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self { session }
    }

    pub async fn list(&self) -> ApiResult<Vec<Case>> {
        self.session.get_json("/cases").await
    }

    pub async fn get(&self, id: i64) -> ApiResult<Case> {
        self.session.get_json(&format!("/cases/{}", id)).await
    }

    pub async fn create(&self, payload: &CasePayload) -> ApiResult<Case> {
        let response: CaseCreated = self.session.post_json("/cases", payload).await?;
        Ok(response.case)
    }

    pub async fn update(&self, id: i64, payload: &CasePayload) -> ApiResult<()> {
        let _: serde_json::Value = self
            .session
            .put_json(&format!("/cases/{}", id), payload)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.session.delete(&format!("/cases/{}", id)).await
    }
}
