use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::types::TranslationRequest;
use super::TranslationProvider;
use crate::core::chunker::{chunk_text, MAX_CHUNK_LEN};
use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::DEFAULT_ENDPOINT;

// -- Strict serde structs for the MyMemory API --

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: MyMemoryData,
    #[serde(rename = "responseStatus", default)]
    response_status: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// HTTP client for the MyMemory translation endpoint.
///
/// Long input is split into grapheme-bounded chunks; one GET is issued per
/// chunk, all concurrently. Results are joined with a single space in the
/// original chunk order regardless of completion order. Any failed chunk
/// aborts the whole request with no retry; already-translated chunks are
/// discarded.
pub struct MyMemoryClient {
    http: Client,
    endpoint: String,
}

impl MyMemoryClient {
    pub fn new() -> AppResult<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("lingo-widgets/translator")
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    fn chunk_url(&self, chunk: &str, langpair: &str) -> String {
        format!(
            "{}/get?q={}&langpair={}",
            self.endpoint,
            urlencoding::encode(chunk),
            urlencoding::encode(langpair)
        )
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryClient {
    async fn translate(&self, request: &TranslationRequest) -> AppResult<String> {
        let chunks = chunk_text(&request.text, MAX_CHUNK_LEN);
        let langpair = request.langpair();
        log::debug!(
            "[Translator] Dispatching {} chunk(s) for {}",
            chunks.len(),
            langpair
        );

        let mut handles = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let http = self.http.clone();
            let url = self.chunk_url(&chunk, &langpair);
            handles.push(tokio::spawn(fetch_chunk(http, url)));
        }

        // Await in chunk order so the join preserves the input order even
        // when later chunks finish first.
        let mut parts = Vec::with_capacity(handles.len());
        for handle in handles {
            let translated = handle
                .await
                .map_err(|e| AppError::Unknown(format!("Chunk task failed: {}", e)))??;
            parts.push(translated);
        }

        Ok(parts.join(" "))
    }
}

async fn fetch_chunk(http: Client, url: String) -> AppResult<String> {
    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(AppError::Network(format!(
            "Translation API returned error: {}",
            response.status()
        )));
    }

    let payload = response
        .json::<MyMemoryResponse>()
        .await
        .map_err(|e| AppError::Provider(format!("Unexpected response shape: {}", e)))?;

    if let Some(status) = payload.response_status {
        if status != 200 {
            return Err(AppError::Provider(format!(
                "Provider reported status {}",
                status
            )));
        }
    }

    Ok(payload.response_data.translated_text)
}
