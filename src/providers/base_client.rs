use crate::core::error::DriveThruError;
use futures::stream::{BoxStream, StreamExt};
use reqwest::{Client, Response};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Shared HTTP plumbing for the chat-completion providers: one POST
/// endpoint with an auth header, plus SSE-style stream decoding.
#[derive(Clone)]
pub struct HttpClient {
    endpoint: String,
    auth_header: Option<(String, String)>,
    extra_headers: HashMap<String, String>,
    client: Client,
}

impl HttpClient {
    pub fn new(
        endpoint: String,
        auth_header: Option<(String, String)>,
        extra_headers: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            endpoint,
            auth_header,
            extra_headers: extra_headers.unwrap_or_default(),
            client: Client::new(),
        }
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, DriveThruError> {
        let url = format!("{}/{}", self.endpoint, path);
        debug!(%url, "provider request");

        let mut request = self.client.post(&url).header("Content-Type", "application/json");

        if let Some((name, value)) = &self.auth_header {
            request = request.header(name, value);
        }
        for (key, value) in &self.extra_headers {
            request = request.header(key, value);
        }

        let response = request.json(payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveThruError::Api(format!("{}: {}", status, body)));
        }

        Ok(response)
    }

    /// Turns a streaming response body into a stream of text chunks using
    /// a provider-specific parser. The parser returns `Ok(None)` for
    /// chunks that carry no text (keep-alives, done markers).
    pub fn stream_response<F>(
        &self,
        response: Response,
        parser: F,
    ) -> BoxStream<'static, Result<String, DriveThruError>>
    where
        F: Fn(String) -> Result<Option<String>, DriveThruError> + Send + Sync + 'static,
    {
        response
            .bytes_stream()
            .map(|item| {
                item.map_err(DriveThruError::from).and_then(|chunk| {
                    String::from_utf8(chunk.to_vec()).map_err(|e| {
                        DriveThruError::Serialization(format!("stream chunk not UTF-8: {}", e))
                    })
                })
            })
            .filter_map(move |res| {
                let parsed = match res {
                    Ok(data) => parser(data).transpose(),
                    Err(e) => Some(Err(e)),
                };
                async move { parsed }
            })
            .boxed()
    }
}
