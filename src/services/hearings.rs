use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::auth::SessionClient;
use crate::error::ApiResult;

/// A hearing update recorded against a case. Creating one with a
/// `next_hearing_date` makes the backend create a linked calendar event;
/// `calendar_event_id` points at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HearingUpdate {
    pub id: i64,
    pub case_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub hearing_date: NaiveDate,
    #[serde(default)]
    pub action_taken: Option<String>,
    #[serde(default)]
    pub court_order: Option<String>,
    #[serde(default)]
    pub next_hearing_date: Option<NaiveDate>,
    #[serde(default)]
    pub action_to_be_taken: Option<String>,
    #[serde(default)]
    pub calendar_event_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Fields accepted when creating a hearing update.
#[derive(Debug, Clone, Serialize)]
pub struct NewHearingUpdate {
    pub case_id: i64,
    pub hearing_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hearing_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_to_be_taken: Option<String>,
}

/// Fields accepted when editing a hearing update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HearingUpdatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hearing_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hearing_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_to_be_taken: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HearingUpdateEnvelope {
    hearing_update: HearingUpdate,
}

/// Operations over `/hearing-updates`.
#[derive(Clone)]
pub struct HearingUpdateApi {
    session: Arc<SessionClient>,
}

impl HearingUpdateApi {
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self { session }
    }

    /// Hearing updates for one case, newest hearing first.
    pub async fn list_for_case(&self, case_id: i64) -> ApiResult<Vec<HearingUpdate>> {
        self.session
            .get_json(&format!("/hearing-updates?case_id={}", case_id))
            .await
    }

    /// Hearing updates across all of the practitioner's cases.
    pub async fn list_all(&self) -> ApiResult<Vec<HearingUpdate>> {
        self.session.get_json("/hearing-updates/all").await
    }

    pub async fn get(&self, id: i64) -> ApiResult<HearingUpdate> {
        self.session
            .get_json(&format!("/hearing-updates/{}", id))
            .await
    }

    pub async fn create(&self, payload: &NewHearingUpdate) -> ApiResult<HearingUpdate> {
        let response: HearingUpdateEnvelope =
            self.session.post_json("/hearing-updates", payload).await?;
        Ok(response.hearing_update)
    }

    pub async fn update(&self, id: i64, payload: &HearingUpdatePatch) -> ApiResult<HearingUpdate> {
        let response: HearingUpdateEnvelope = self
            .session
            .put_json(&format!("/hearing-updates/{}", id), payload)
            .await?;
        Ok(response.hearing_update)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.session
            .delete(&format!("/hearing-updates/{}", id))
            .await
    }
}
