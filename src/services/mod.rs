//! Typed per-resource wrappers over the session client. Each service is a
//! thin pass-through: it shapes requests and decodes responses, while all
//! authentication concerns live in [`crate::auth::SessionClient`].

mod auth;
mod calendar;
mod cases;
mod clients;
mod documents;
mod hearings;

pub use auth::{AuthApi, RegisterRequest};
pub use calendar::{CalendarApi, CalendarEvent, CalendarEventPayload, CaseRef, CreatedEventRef};
pub use cases::{Case, CaseApi, CasePayload};
pub use clients::{ClientApi, ClientPayload, ClientRecord};
pub use documents::{Document, DocumentApi, DocumentUpload, UploadedDocumentRef};
pub use hearings::{HearingUpdate, HearingUpdateApi, HearingUpdatePatch, NewHearingUpdate};
