use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::auth::SessionClient;
use crate::error::ApiResult;

/// Minimal case reference embedded in calendar list entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRef {
    pub id: i64,
    pub case_number: String,
    pub title: String,
}

/// A calendar entry: hearing, meeting, deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    pub event_date: NaiveDateTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub reminder_time: Option<i64>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub case_id: Option<i64>,
    /// Only present on the list endpoint.
    #[serde(default)]
    pub case: Option<CaseRef>,
}

/// Fields accepted by event create and update calls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CalendarEventPayload {
    pub title: String,
    /// ISO-8601 date-time string, as the backend parses it.
    pub event_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl CalendarEventPayload {
    /// Convenience constructor for an all-day entry on a given date.
    pub fn on_date(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            event_date: date.format("%Y-%m-%dT00:00:00").to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventCreated {
    event: CreatedEventRef,
}

/// The create endpoint echoes back only an id, title, and date.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEventRef {
    pub id: i64,
    pub title: String,
    pub event_date: NaiveDateTime,
}

/// CRUD over `/calendar`.
#[derive(Clone)]
pub struct CalendarApi {
    session: Arc<SessionClient>,
}

impl CalendarApi {
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self { session }
    }

    /// All events for the practitioner, ordered by date.
    pub async fn list(&self) -> ApiResult<Vec<CalendarEvent>> {
        self.session.get_json("/calendar").await
    }

    pub async fn get(&self, id: i64) -> ApiResult<CalendarEvent> {
        self.session.get_json(&format!("/calendar/{}", id)).await
    }

    pub async fn create(&self, payload: &CalendarEventPayload) -> ApiResult<CreatedEventRef> {
        let response: EventCreated = self.session.post_json("/calendar", payload).await?;
        Ok(response.event)
    }

    pub async fn update(&self, id: i64, payload: &CalendarEventPayload) -> ApiResult<()> {
        let _: serde_json::Value = self
            .session
            .put_json(&format!("/calendar/{}", id), payload)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.session.delete(&format!("/calendar/{}", id)).await
    }
}
