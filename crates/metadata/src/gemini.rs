//! Gemini `generateContent` client and the review prompt it is fed.

use marquee_core::config::{GeminiConfig, Secret};
use serde::{Deserialize, Serialize};

use crate::MetadataError;
use crate::provider::TextGenerator;
use crate::upstream::{Provider, Upstream};

const CAST_IN_PROMPT: usize = 8;
const SIMILAR_IN_PROMPT: usize = 6;

pub struct GeminiClient {
    api_key: Secret,
    model: String,
    upstream: Upstream,
}

impl GeminiClient {
    /// `None` when no key is configured.
    pub fn from_config(config: &GeminiConfig, client: reqwest::Client) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            api_key,
            model: config.model.clone(),
            upstream: Upstream::new(Provider::Gemini, &config.base_url, client),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

fn first_candidate_text(resp: GenerateResponse) -> Option<String> {
    let text: String = resp
        .candidates
        .into_iter()
        .next()?
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, MetadataError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };
        let path = format!("/models/{}:generateContent", self.model);
        let resp: GenerateResponse = self
            .upstream
            .post_json(&path, &[("key", self.api_key.expose())], &body)
            .await?;
        first_candidate_text(resp).ok_or(MetadataError::Empty(Provider::Gemini))
    }
}

/// Everything the review prompt mentions about one title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewContext {
    pub tmdb_id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    /// `(actor, character)` in billing order.
    pub cast: Vec<(String, Option<String>)>,
    pub streaming_providers: Vec<String>,
    pub similar_titles: Vec<String>,
}

pub fn review_prompt(ctx: &ReviewContext, region: &str) -> String {
    let year = ctx.year.map(|y| y.to_string()).unwrap_or_default();
    let genres = if ctx.genres.is_empty() {
        "N/A".to_string()
    } else {
        ctx.genres.join(", ")
    };
    let overview = ctx
        .overview
        .as_deref()
        .filter(|o| !o.is_empty())
        .unwrap_or("No overview available.");

    let cast_lines: Vec<String> = ctx
        .cast
        .iter()
        .take(CAST_IN_PROMPT)
        .map(|(name, character)| {
            format!("- {name} as {}", character.as_deref().unwrap_or("Unknown"))
        })
        .collect();
    let cast = if cast_lines.is_empty() {
        "No cast data.".to_string()
    } else {
        cast_lines.join("\n")
    };

    let providers = if ctx.streaming_providers.is_empty() {
        "No official streaming info".to_string()
    } else {
        ctx.streaming_providers.join(", ")
    };

    let similar: Vec<&str> = ctx
        .similar_titles
        .iter()
        .take(SIMILAR_IN_PROMPT)
        .map(String::as_str)
        .collect();
    let similar = if similar.is_empty() {
        "No recommendation data.".to_string()
    } else {
        similar.join(", ")
    };

    format!(
        "You are a professional English movie critic and SEO writer.\n\
         Write content in natural, human-like English. Avoid repeating the same sentence structure.\n\
         \n\
         Movie basic info:\n\
         - Title: {title}\n\
         - Year: {year}\n\
         - Genres: {genres}\n\
         - Rating (from TMDB): {rating} / 10 from {votes} votes\n\
         - Budget (USD): {budget}\n\
         - Box office / Revenue (USD): {revenue}\n\
         \n\
         Short overview for reference, do NOT copy verbatim:\n\
         \"{overview}\"\n\
         \n\
         Main cast:\n\
         {cast}\n\
         \n\
         Streaming providers ({region} region):\n\
         {providers}\n\
         \n\
         Similar or related titles:\n\
         {similar}\n\
         \n\
         Create a structured review article with these sections:\n\
         1. Movie Synopsis\n\
         2. Box Office & Budget Analysis\n\
         3. Pros & Cons\n\
         4. Why You Should Watch This Movie\n\
         5. Main Actor Performance Analysis\n\
         6. Character Descriptions\n\
         7. Target Audience\n\
         8. Language & Style\n\
         \n\
         Rules:\n\
         - Language: English only.\n\
         - Do NOT mention that you are an AI.\n\
         - Do NOT invent box office numbers; use the given numbers only.\n\
         - If some data is missing, skip or generalize without lying.\n",
        title = ctx.title,
        rating = ctx.vote_average.unwrap_or(0.0),
        votes = ctx.vote_count.unwrap_or(0),
        budget = ctx.budget.unwrap_or(0),
        revenue = ctx.revenue.unwrap_or(0),
    )
}
