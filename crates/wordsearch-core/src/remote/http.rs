//! HTTP backend talking to the puzzle generation service.

use super::{
    BoxFuture, ClearReport, GeneratedDocument, PuzzleEngine, PuzzlePreview, RemoteError, RemoteResult,
    ShapePayload, ShapeStore,
};
use crate::export::GenerateRequest;
use crate::preview::{DirectionFlags, PreviewRequest};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// JSON envelope shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
struct Reply {
    #[serde(default)]
    success: bool,
    error: Option<String>,
    message: Option<String>,
    #[serde(default)]
    grid: Vec<Vec<Option<String>>>,
    #[serde(default)]
    words: Vec<String>,
    #[serde(default)]
    shapes: Vec<String>,
    count: Option<usize>,
}

fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Transport(e.to_string())
}

fn flag(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn with_directions(form: Form, directions: DirectionFlags) -> Form {
    form.text("allowHorizontal", flag(directions.horizontal))
        .text("allowVertical", flag(directions.vertical))
        .text("allowDiagonal", flag(directions.diagonal))
}

/// Decode a JSON reply, mapping `{error}` and `success: false` to server errors.
async fn read_reply(response: Response) -> RemoteResult<Reply> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport)?;
    let reply: Reply = match serde_json::from_slice(&body) {
        Ok(reply) => reply,
        Err(_) if !status.is_success() => return Err(RemoteError::Status(status.as_u16())),
        Err(e) => return Err(RemoteError::Decode(e.to_string())),
    };
    if let Some(error) = reply.error {
        return Err(RemoteError::Server(error));
    }
    if !reply.success {
        if let Some(message) = reply.message {
            return Err(RemoteError::Server(message));
        }
    }
    if !status.is_success() {
        return Err(RemoteError::Status(status.as_u16()));
    }
    if !reply.success {
        return Err(RemoteError::Server("Request failed".to_string()));
    }
    Ok(reply)
}

/// Read a generated document; error replies are JSON.
async fn read_document(response: Response) -> RemoteResult<GeneratedDocument> {
    let status = response.status();
    if !status.is_success() {
        read_reply(response).await?;
        return Err(RemoteError::Status(status.as_u16()));
    }
    let content_disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await.map_err(transport)?.to_vec();
    Ok(GeneratedDocument { bytes, content_disposition })
}

/// Backend for the generation service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend for `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: &str, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(transport)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl PuzzleEngine for HttpBackend {
    fn preview(&self, request: &PreviewRequest) -> BoxFuture<'_, RemoteResult<PuzzlePreview>> {
        let form = with_directions(
            Form::new()
                .text("words", request.words.join("\n"))
                .text("shape", request.shape.to_string()),
            request.directions,
        );
        let seq = request.seq;
        Box::pin(async move {
            log::debug!("POST /preview (request #{})", seq);
            let response = self
                .client
                .post(self.url("preview"))
                .multipart(form)
                .send()
                .await
                .map_err(transport)?;
            let reply = read_reply(response).await?;
            let grid = reply
                .grid
                .into_iter()
                .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
                .collect();
            Ok(PuzzlePreview::from_wire(grid, reply.words))
        })
    }

    fn generate(&self, request: &GenerateRequest) -> BoxFuture<'_, RemoteResult<GeneratedDocument>> {
        let metadata = &request.metadata;
        let form = with_directions(
            Form::new()
                .text("title", metadata.title.clone())
                .text("subject", metadata.subject.clone())
                .text("words", request.words.join("\n"))
                .text("shape", request.shape.to_string())
                .text("font", metadata.font.clone())
                .text("theme", metadata.theme.name())
                .text("exportFormat", metadata.format.name()),
            metadata.directions,
        );
        Box::pin(async move {
            log::debug!("POST /generate");
            let response = self
                .client
                .post(self.url("generate"))
                .multipart(form)
                .send()
                .await
                .map_err(transport)?;
            read_document(response).await
        })
    }
}

impl ShapeStore for HttpBackend {
    fn create(&self, name: &str, payload: &ShapePayload) -> BoxFuture<'_, RemoteResult<String>> {
        let name = name.to_string();
        let payload = payload.clone();
        Box::pin(async move {
            let request = match payload {
                ShapePayload::Drawing(canvas_data) => self
                    .client
                    .post(self.url("save_drawing"))
                    .json(&json!({ "canvas_data": canvas_data, "shape_name": name })),
                ShapePayload::Upload { file_name, bytes } => {
                    let form = Form::new()
                        .part("shape_file", Part::bytes(bytes).file_name(file_name))
                        .text("shape_name", name);
                    self.client.post(self.url("upload_shape")).multipart(form)
                }
            };
            let reply = read_reply(request.send().await.map_err(transport)?).await?;
            Ok(reply.message.unwrap_or_default())
        })
    }

    fn list(&self) -> BoxFuture<'_, RemoteResult<Vec<String>>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url("custom_shapes"))
                .send()
                .await
                .map_err(transport)?;
            Ok(read_reply(response).await?.shapes)
        })
    }

    fn delete_one(&self, name: &str) -> BoxFuture<'_, RemoteResult<String>> {
        let body = json!({ "shape_name": name });
        Box::pin(async move {
            let response = self
                .client
                .post(self.url("delete_custom_shape"))
                .json(&body)
                .send()
                .await
                .map_err(transport)?;
            Ok(read_reply(response).await?.message.unwrap_or_default())
        })
    }

    fn delete_all(&self) -> BoxFuture<'_, RemoteResult<ClearReport>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url("clear_all_custom_shapes"))
                .send()
                .await
                .map_err(transport)?;
            let reply = read_reply(response).await?;
            Ok(ClearReport {
                message: reply.message.unwrap_or_default(),
                count: reply.count.unwrap_or(0),
            })
        })
    }
}
