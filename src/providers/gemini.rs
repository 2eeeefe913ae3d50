//! Gemini provider implementation
//!
//! Connects to the Generative Language REST API to implement the four
//! input modes: chat (with artifact fences), search-grounded research,
//! deep-research reports, and image generation. Chat responses are run
//! through the artifact extractor before they reach the session.

use crate::artifact::{extract, ArtifactDraft, ArtifactType};
use crate::config::GeminiConfig;
use crate::error::{AtelierError, Result};
use crate::localization::{translate, Language};
use crate::providers::{GeneratedResponse, Generator, HistoryTurn, InputMode};
use crate::store::{Role, Source};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API provider
///
/// The API key is read from the environment variable named in the
/// configuration at construction time, so a missing key fails early
/// instead of on the first send.
pub struct GeminiGenerator {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

/// Request structure for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

/// A content block: an optional role plus ordered parts
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }
}

/// One part of a content block: text or inline binary data
#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<InlineData>,
}

/// Inline binary data (images) in a content part
#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// Tool declaration; only Google Search is used
#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: serde_json::Value,
}

impl Tool {
    fn google_search() -> Self {
        Self {
            google_search: serde_json::json!({}),
        }
    }
}

/// Response structure from `generateContent`
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(rename = "groundingMetadata", default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct GroundingMetadata {
    #[serde(rename = "groundingChunks", default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Request structure for `models/{model}:predict` (image generation)
#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct PredictParameters {
    #[serde(rename = "sampleCount")]
    sample_count: usize,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
    #[serde(rename = "outputMimeType")]
    output_mime_type: String,
}

/// Response structure from `predict`
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded", default)]
    bytes_base64_encoded: Option<String>,
}

impl GeminiGenerator {
    /// Create a new Gemini provider instance
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::MissingCredentials` when the configured API
    /// key environment variable is unset, and `AtelierError::Provider`
    /// when the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| AtelierError::MissingCredentials(config.api_key_env.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("atelier/0.2.0")
            .build()
            .map_err(|e| AtelierError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini provider: model={}, image_model={}",
            config.model,
            config.image_model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// System instruction for regular chat turns, describing the artifact
    /// fence protocol the extractor understands.
    fn chat_system_instruction(language: Language) -> String {
        format!(
            "You are a helpful assistant.\n\
             - To generate a React component, wrap the code in ```react (label: Component Name) block.\n\
             - To generate a chart, provide data in a ```json-chart (label: Chart Title) block. The JSON should be an array of objects.\n\
             - To generate formatted text like tables, lists, or styled text, wrap it in a ```markdown (label: Document Title) block.\n\
             - To generate raw HTML, wrap it in a ```html (label: HTML Snippet) block.\n\
             - When you create an artifact, provide a clear, concise label in the parentheses.\n\
             - Respond in {}.",
            language_name(language)
        )
    }

    /// System instruction for deep-research reports.
    fn report_system_instruction(language: Language) -> String {
        format!(
            "You are a specialist research assistant. Your task is to conduct in-depth research on the given topic using Google Search.\n\
             1. Break down the main topic into key sub-questions.\n\
             2. Gather information to answer these questions.\n\
             3. Synthesize the findings into a comprehensive, well-structured report in Markdown format.\n\
             4. The report must include:\n    \
             - A title (e.g., # Research Report: [Topic]).\n    \
             - An executive summary.\n    \
             - A detailed analysis covering different facets of the topic, using headings (##).\n    \
             - Key findings presented as a bulleted list.\n    \
             - A conclusion.\n\
             5. The final output must be ONLY the Markdown report itself. Do not wrap it in a code block.\n\
             6. The report should be written in {}.",
            language_name(language)
        )
    }

    async fn chat(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
        images: &[String],
        language: Language,
    ) -> Result<GeneratedResponse> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content::text(Some(role_name(turn.role)), turn.text.clone()))
            .collect();

        let mut parts = vec![Part {
            text: Some(prompt.to_string()),
            inline_data: None,
        }];
        for image in images {
            let (mime_type, data) = split_data_url(image)?;
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData { mime_type, data }),
            });
        }
        contents.push(Content {
            role: Some("user".to_string()),
            parts,
        });

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::text(
                None,
                Self::chat_system_instruction(language),
            )),
            tools: Vec::new(),
        };

        let response = self.generate_content(&self.config.model, &request).await?;
        let (text, artifact) = extract(&response_text(&response));

        Ok(GeneratedResponse {
            text,
            sources: Vec::new(),
            artifact,
        })
    }

    async fn research(&self, prompt: &str, language: Language) -> Result<GeneratedResponse> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(
                Some("user"),
                format!("Language: {}. Query: {}", language, prompt),
            )],
            system_instruction: None,
            tools: vec![Tool::google_search()],
        };

        let response = self.generate_content(&self.config.model, &request).await?;

        Ok(GeneratedResponse {
            text: response_text(&response),
            sources: grounding_sources(&response),
            artifact: None,
        })
    }

    async fn deep_research(&self, prompt: &str, language: Language) -> Result<GeneratedResponse> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), prompt.to_string())],
            system_instruction: Some(Content::text(
                None,
                Self::report_system_instruction(language),
            )),
            tools: vec![Tool::google_search()],
        };

        let response = self.generate_content(&self.config.model, &request).await?;
        let report = response_text(&response);

        let (label, notice) = match language {
            Language::Ja => (
                format!("深層調査: {}", prompt),
                format!(
                    "「{}」に関する深層リサーチが完了しました。詳細はアーティファクトパネルをご覧ください。",
                    prompt
                ),
            ),
            Language::En => (
                format!("Deep Research: {}", prompt),
                format!(
                    "Deep research on \"{}\" is complete. See the artifact panel for details.",
                    prompt
                ),
            ),
        };

        Ok(GeneratedResponse {
            text: notice,
            sources: grounding_sources(&response),
            artifact: Some(ArtifactDraft::new(
                ArtifactType::Markdown,
                Some(label),
                report.into(),
            )),
        })
    }

    /// Image generation. Failures are recovered into a plain text response
    /// so a broken image backend degrades the turn instead of failing it.
    async fn image(&self, prompt: &str, language: Language) -> GeneratedResponse {
        match self.predict_image(prompt).await {
            Ok(image_url) => {
                let notice = match language {
                    Language::Ja => {
                        format!("プロンプト「{}」に基づいて画像を生成しました。", prompt)
                    }
                    Language::En => {
                        format!("Generated an image based on the prompt: \"{}\"", prompt)
                    }
                };
                let label: String = prompt.chars().take(50).collect();

                GeneratedResponse {
                    text: notice,
                    sources: Vec::new(),
                    artifact: Some(ArtifactDraft::new(
                        ArtifactType::Image,
                        Some(label),
                        image_url.into(),
                    )),
                }
            }
            Err(error) => {
                tracing::error!("Image generation failed: {}", error);
                GeneratedResponse::text_only(format!("Error generating image: {}", error))
            }
        }
    }

    async fn predict_image(&self, prompt: &str) -> Result<String> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "1:1".to_string(),
                output_mime_type: "image/jpeg".to_string(),
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:predict",
            self.config.api_base, self.config.image_model
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AtelierError::Provider(format!(
                "Image API returned {}: {}",
                status, body
            ))
            .into());
        }

        let parsed: PredictResponse = response.json().await?;
        let encoded = parsed
            .predictions
            .into_iter()
            .find_map(|p| p.bytes_base64_encoded)
            .ok_or_else(|| AtelierError::Provider("Image API returned no image".into()))?;

        Ok(format!("data:image/jpeg;base64,{}", encoded))
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base, model
        );
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AtelierError::Provider(format!(
                "Generation API returned {}: {}",
                status, body
            ))
            .into());
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
        images: &[String],
        mode: InputMode,
        language: Language,
    ) -> Result<GeneratedResponse> {
        // Only chat turns accept attached images.
        if mode != InputMode::Chat && !images.is_empty() {
            return Ok(GeneratedResponse::text_only(translate(
                "chat.imagesNotAllowed",
                language,
            )));
        }

        match mode {
            InputMode::Chat => self.chat(prompt, history, images, language).await,
            InputMode::Image => Ok(self.image(prompt, language).await),
            InputMode::Research => self.research(prompt, language).await,
            InputMode::DeepResearch => self.deep_research(prompt, language).await,
        }
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

fn language_name(language: Language) -> &'static str {
    match language {
        Language::En => "English",
        Language::Ja => "Japanese",
    }
}

/// Concatenated text of the first candidate's parts
fn response_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

/// Sources from the first candidate's grounding metadata; chunks without a
/// web URI are dropped.
fn grounding_sources(response: &GenerateContentResponse) -> Vec<Source> {
    response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|metadata| {
            metadata
                .grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .filter_map(|web| {
                    web.uri.as_ref().map(|uri| Source {
                        uri: uri.clone(),
                        title: web.title.clone(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Split a base64 image data URL into its MIME type and payload
///
/// # Errors
///
/// Returns `AtelierError::InvalidImage` for anything that is not a
/// well-formed `data:<mime>;base64,<payload>` URL; the failure propagates
/// to the send-failure handler.
fn split_data_url(data_url: &str) -> Result<(String, String)> {
    let pattern = Regex::new(r"^data:(.+);base64,(.+)$").expect("data URL pattern is valid");
    let caps = pattern
        .captures(data_url)
        .ok_or_else(|| AtelierError::InvalidImage("Invalid image data URL format".into()))?;
    Ok((caps[1].to_string(), caps[2].to_string()))
}
