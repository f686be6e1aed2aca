use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// HTTP methods used by the backend's REST surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

/// One part of a multipart form. Parts are held by value so a replayed
/// request rebuilds the identical form.
#[derive(Debug, Clone)]
pub enum FormPart {
    /// A plain text field.
    Text { name: String, value: String },
    /// A file field with its original filename.
    File {
        name: String,
        filename: String,
        bytes: Vec<u8>,
    },
}

/// Request body variants the transport knows how to encode.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// An outbound request: method, path relative to the API base URL, extra
/// headers, body, and the one-shot `retried` flag that caps automatic
/// refresh-and-replay at a single attempt per request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Once set, the session layer will never refresh for this request
    /// again; a second auth failure is surfaced to the caller as-is.
    pub retried: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Attach a multipart form body.
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Add a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// A fully received HTTP response: status code plus body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Transport seam between the session layer and the concrete HTTP stack,
/// allowing requests to be scripted in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a single HTTP call. Headers include any bearer credential
    /// the session layer decided to attach for this attempt.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: &RequestBody,
    ) -> ApiResult<HttpResponse>;
}

/// `HttpTransport` backed by reqwest.
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: &RequestBody,
    ) -> ApiResult<HttpResponse> {
        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };

        for (key, value) in headers {
            request = request.header(key, value);
        }

        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(parts) => {
                // The form is rebuilt from owned parts on every attempt so
                // a refresh-and-replay sends the identical payload.
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    form = match part {
                        FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                        FormPart::File {
                            name,
                            filename,
                            bytes,
                        } => form.part(
                            name.clone(),
                            reqwest::multipart::Part::bytes(bytes.clone())
                                .file_name(filename.clone()),
                        ),
                    };
                }
                request.multipart(form)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse::new(status, text))
    }
}

/// Scripted transport for unit tests.
#[cfg(test)]
pub mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    /// A request the mock observed, with the fields the session tests
    /// assert on.
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub method: Method,
        pub url: String,
        pub authorization: Option<String>,
    }

    /// Transport that replays queued responses per URL, in FIFO order,
    /// and records every call it sees.
    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
        calls: Mutex<Vec<RecordedCall>>,
        latency: Option<std::time::Duration>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Delay every call, forcing concurrent requests to overlap at the
        /// network boundary the way they would against a real server.
        pub fn with_latency(latency: std::time::Duration) -> Self {
            Self {
                latency: Some(latency),
                ..Self::default()
            }
        }

        /// Queue a response for a URL. Multiple responses for the same URL
        /// are served in the order they were queued.
        pub fn enqueue(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
            self.responses
                .lock()
                .unwrap()
                .entry(url.into())
                .or_default()
                .push_back(HttpResponse::new(status, body));
        }

        /// Queue a JSON response.
        pub fn enqueue_json<T: serde::Serialize>(
            &self,
            url: impl Into<String>,
            status: u16,
            data: &T,
        ) {
            let body = serde_json::to_string(data).unwrap();
            self.enqueue(url, status, body);
        }

        /// All calls observed so far.
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Calls whose URL matches, preserving order.
        pub fn calls_to(&self, url: &str) -> Vec<RecordedCall> {
            self.calls()
                .into_iter()
                .filter(|call| call.url == url)
                .collect()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn execute(
            &self,
            method: Method,
            url: &str,
            headers: &[(String, String)],
            _body: &RequestBody,
        ) -> ApiResult<HttpResponse> {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            let authorization = headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("authorization"))
                .map(|(_, value)| value.clone());

            self.calls.lock().unwrap().push(RecordedCall {
                method,
                url: url.to_string(),
                authorization,
            });

            self.responses
                .lock()
                .unwrap()
                .get_mut(url)
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| {
                    ApiError::Transport(format!("no mock response queued for {}", url))
                })
        }
    }
}
