//! Synthesis collaborator: turns a transcript set into a structured
//! briefing via a local LLM generate endpoint.
//!
//! The core treats this as one opaque call: build the prompt, POST, parse
//! the fenced JSON block out of the response. No retry policy lives here;
//! failures are terminal for the operation and the caller decides
//! whether to run it again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Env var overriding the generate endpoint base URL.
const SYNTHESIS_URL_ENV: &str = "OPSBRIEF_SYNTHESIS_URL";
/// Env var overriding the model name.
const SYNTHESIS_MODEL_ENV: &str = "OPSBRIEF_SYNTHESIS_MODEL";

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.1";

const SYSTEM_PROMPT: &str = r#"You are a military staff officer consolidating daily situation reports into a command briefing.

RULES:
1. Ground ALL statements in the provided transcripts. Do not invent events.
2. Keep the operational register: terse, factual, no speculation.
3. Attribute incidents to the day-label shown in square brackets before each transcript.
4. Output EXACTLY ONE fenced JSON block matching the schema below, nothing else after it."#;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Cannot reach synthesis service at {0}")]
    Connection(String),

    #[error("Synthesis service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Cannot parse synthesis response: {0}")]
    Parse(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Structured result of a consolidation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsolidatedBriefing {
    pub executive_summary: String,
    pub key_achievements: Vec<String>,
    pub operational_trends: Vec<String>,
    pub critical_challenges: Vec<String>,
    pub strategic_recommendations: Vec<String>,
    pub incident_timeline: Vec<DayIncidents>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayIncidents {
    pub day_label: String,
    pub events: Vec<String>,
}

/// One opaque synthesize call. Implementations must not retry.
pub trait SynthesisClient {
    fn synthesize(
        &self,
        transcripts: &[String],
        day_count: usize,
    ) -> Result<ConsolidatedBriefing, SynthesisError>;
}

// ─── HTTP client ──────────────────────────────────────────────────────────────

/// HTTP synthesis client against an Ollama-style generate endpoint.
pub struct HttpSynthesisClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpSynthesisClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Endpoint and model from the environment, with local defaults and a
    /// 5-minute timeout.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(SYNTHESIS_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var(SYNTHESIS_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(&base_url, &model, 300)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl SynthesisClient for HttpSynthesisClient {
    fn synthesize(
        &self,
        transcripts: &[String],
        day_count: usize,
    ) -> Result<ConsolidatedBriefing, SynthesisError> {
        let prompt = build_synthesis_prompt(transcripts, day_count);
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            system: SYSTEM_PROMPT,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                SynthesisError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                SynthesisError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                SynthesisError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| SynthesisError::Parse(e.to_string()))?;

        parse_briefing_response(&parsed.response)
    }
}

// ─── Prompt and response parsing ──────────────────────────────────────────────

/// Builds the full generate prompt: day-prefixed transcripts followed by
/// the JSON schema the response must match.
pub fn build_synthesis_prompt(transcripts: &[String], day_count: usize) -> String {
    let mut prompt = format!(
        "Consolidate the following situation reports covering the first {day_count} report day(s) into one briefing.\n\n<TRANSCRIPTS>\n"
    );
    for transcript in transcripts {
        prompt.push_str(transcript);
        prompt.push_str("\n---\n");
    }
    prompt.push_str("</TRANSCRIPTS>\n\n");
    prompt.push_str(
        r#"Respond with one fenced JSON block:

```json
{
  "executive_summary": "...",
  "key_achievements": ["..."],
  "operational_trends": ["..."],
  "critical_challenges": ["..."],
  "strategic_recommendations": ["..."],
  "incident_timeline": [{"day_label": "...", "events": ["..."]}]
}
```"#,
    );
    prompt
}

/// Raw shape before lenient list parsing.
#[derive(Deserialize)]
struct RawBriefing {
    #[serde(default)]
    executive_summary: String,
    key_achievements: Option<Vec<serde_json::Value>>,
    operational_trends: Option<Vec<serde_json::Value>>,
    critical_challenges: Option<Vec<serde_json::Value>>,
    strategic_recommendations: Option<Vec<serde_json::Value>>,
    incident_timeline: Option<Vec<serde_json::Value>>,
}

/// Extracts the fenced JSON block and deserialises it leniently: list
/// items that fail to parse are skipped rather than failing the run.
pub fn parse_briefing_response(response: &str) -> Result<ConsolidatedBriefing, SynthesisError> {
    let json_str = extract_json_block(response)?;

    let raw: RawBriefing = serde_json::from_str(&json_str)
        .map_err(|e| SynthesisError::Parse(format!("Invalid briefing JSON: {e}")))?;

    Ok(ConsolidatedBriefing {
        executive_summary: raw.executive_summary,
        key_achievements: parse_array_lenient(raw.key_achievements.as_deref()),
        operational_trends: parse_array_lenient(raw.operational_trends.as_deref()),
        critical_challenges: parse_array_lenient(raw.critical_challenges.as_deref()),
        strategic_recommendations: parse_array_lenient(raw.strategic_recommendations.as_deref()),
        incident_timeline: parse_array_lenient(raw.incident_timeline.as_deref()),
    })
}

fn extract_json_block(response: &str) -> Result<String, SynthesisError> {
    let json_start = response
        .find("```json")
        .ok_or_else(|| SynthesisError::Parse("No JSON block found".into()))?;
    let content_start = json_start + 7;

    let json_end = response[content_start..]
        .find("```")
        .ok_or_else(|| SynthesisError::Parse("Unclosed JSON block".into()))?;

    Ok(response[content_start..content_start + json_end]
        .trim()
        .to_string())
}

/// Parse an array leniently: skip items that fail to deserialize.
fn parse_array_lenient<T: for<'de> Deserialize<'de>>(
    items: Option<&[serde_json::Value]>,
) -> Vec<T> {
    match items {
        None => vec![],
        Some(arr) => arr
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    }
}

// ─── Mock client (testing) ────────────────────────────────────────────────────

/// Mock synthesis client: returns a configured briefing or error.
pub struct MockSynthesisClient {
    briefing: ConsolidatedBriefing,
    fail: bool,
}

impl MockSynthesisClient {
    pub fn returning(briefing: ConsolidatedBriefing) -> Self {
        Self { briefing, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            briefing: ConsolidatedBriefing::default(),
            fail: true,
        }
    }
}

impl SynthesisClient for MockSynthesisClient {
    fn synthesize(
        &self,
        _transcripts: &[String],
        _day_count: usize,
    ) -> Result<ConsolidatedBriefing, SynthesisError> {
        if self.fail {
            return Err(SynthesisError::Connection("mock".into()));
        }
        Ok(self.briefing.clone())
    }
}
