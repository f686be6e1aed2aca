use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::auth::SessionClient;
use crate::error::ApiResult;
use crate::http::{FormPart, RequestDescriptor};

/// A document attached to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub file_name: String,
    pub file_url: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<NaiveDateTime>,
}

/// A document upload: the file contents plus its form metadata.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub case_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    fn into_parts(self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::File {
                name: "file".to_string(),
                filename: self.filename,
                bytes: self.bytes,
            },
            FormPart::Text {
                name: "case_id".to_string(),
                value: self.case_id.to_string(),
            },
            FormPart::Text {
                name: "title".to_string(),
                value: self.title,
            },
        ];
        if let Some(description) = self.description {
            parts.push(FormPart::Text {
                name: "description".to_string(),
                value: description,
            });
        }
        parts
    }
}

#[derive(Debug, Deserialize)]
struct DocumentUploaded {
    document: UploadedDocumentRef,
}

/// The upload endpoint echoes back a reduced document record.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedDocumentRef {
    pub id: i64,
    pub title: String,
    pub file_name: String,
    pub file_url: String,
}

/// Operations over `/documents`.
#[derive(Clone)]
pub struct DocumentApi {
    session: Arc<SessionClient>,
}

impl DocumentApi {
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self { session }
    }

    /// All documents attached to a case.
    pub async fn list_for_case(&self, case_id: i64) -> ApiResult<Vec<Document>> {
        self.session
            .get_json(&format!("/documents/case/{}", case_id))
            .await
    }

    /// Upload a file as a multipart form. The form is rebuilt from owned
    /// parts if the request is replayed after a token refresh.
    pub async fn upload(&self, upload: DocumentUpload) -> ApiResult<UploadedDocumentRef> {
        let request = RequestDescriptor::post("/documents/upload").multipart(upload.into_parts());
        let response: DocumentUploaded = self.session.send_json(request).await?;
        Ok(response.document)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.session.delete(&format!("/documents/{}", id)).await
    }
}
