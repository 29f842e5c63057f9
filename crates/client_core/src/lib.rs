use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use shared::{
    domain::{OutputFileId, PosterSet},
    error::{ServiceError, ServiceErrorBody},
    protocol::{
        GeneratePostersResponse, GENERATE_POSTERS_PATH, IMAGE_FIELD_NAME, STATIC_OUTPUT_PATH,
    },
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;

pub use error::GenerateError;

const FALLBACK_FILENAME: &str = "image";

/// Raw image payload for one submission.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reads the file as-is. No type or size checks happen on this side.
    pub async fn from_path(path: &Path) -> std::result::Result<Self, GenerateError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| GenerateError::ReadImage {
                path: path.to_path_buf(),
                source,
            })?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        let mime_type = mime_guess::from_path(path).first_raw().map(str::to_string);
        Ok(Self {
            filename,
            mime_type,
            bytes,
        })
    }
}

#[async_trait]
pub trait PosterService: Send + Sync {
    async fn generate_posters(
        &self,
        image: ImageUpload,
    ) -> std::result::Result<PosterSet, GenerateError>;
    async fn fetch_poster(&self, url: &str) -> Result<Vec<u8>>;
}

/// Builds the retrieval URL for one generated poster.
pub fn poster_url(server_url: &str, output: &OutputFileId) -> String {
    format!(
        "{}{}{}",
        server_url.trim_end_matches('/'),
        STATIC_OUTPUT_PATH,
        output.as_str()
    )
}

/// Maps a raw `/generate_posters` reply onto a poster set or a failure.
pub fn interpret_response(
    status: StatusCode,
    body: &[u8],
) -> std::result::Result<PosterSet, GenerateError> {
    if status.is_success() {
        let response: GeneratePostersResponse =
            serde_json::from_slice(body).map_err(|source| GenerateError::MalformedBody {
                status: status.as_u16(),
                source,
            })?;
        if let Some(message) = response.message.as_deref() {
            debug!(message, "generation service message");
        }
        if let Some(expected) = response.generated_count {
            if expected != response.output_files.len() {
                warn!(
                    generated_count = expected,
                    output_count = response.output_files.len(),
                    "generated_count disagrees with output_files"
                );
            }
        }
        return Ok(response.into());
    }

    let body: ServiceErrorBody =
        serde_json::from_slice(body).map_err(|source| GenerateError::MalformedBody {
            status: status.as_u16(),
            source,
        })?;
    Err(ServiceError::from_body(status.as_u16(), body).into())
}

pub struct PosterClient {
    http: Client,
    server_url: String,
}

impl PosterClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn poster_url(&self, output: &OutputFileId) -> String {
        poster_url(&self.server_url, output)
    }
}

#[async_trait]
impl PosterService for PosterClient {
    async fn generate_posters(
        &self,
        image: ImageUpload,
    ) -> std::result::Result<PosterSet, GenerateError> {
        let url = format!("{}{}", self.server_url, GENERATE_POSTERS_PATH);
        let size_bytes = image.bytes.len();
        let mut part = Part::bytes(image.bytes).file_name(image.filename.clone());
        if let Some(mime_type) = image.mime_type.as_deref() {
            part = part.mime_str(mime_type)?;
        }
        let form = Form::new().part(IMAGE_FIELD_NAME, part);

        info!(
            %url,
            filename = %image.filename,
            size_bytes,
            "posters: submitting image"
        );
        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), body_len = body.len(), "posters: response received");

        let result = interpret_response(status, &body);
        match &result {
            Ok(posters) => info!(
                status = status.as_u16(),
                output_count = posters.outputs.len(),
                "posters: generation succeeded"
            ),
            Err(err) => warn!(status = status.as_u16(), "posters: generation failed: {err}"),
        }
        result
    }

    async fn fetch_poster(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
