/*
 * src/ingestion/summarizer.rs
 *
 * File for the Summarizer agent (C3)
 *
 * Purpose:
 *   Input = long description + name + category; output = summary
 *   (<= N chars), canonical tag list, signals boolean map. May fail
 *   with NO_SUMMARY (§4.3).
 */

use async_trait::async_trait;
use langchain_rust::language_models::llm::LLM;
use langchain_rust::llm::{OpenAI, OpenAIModel};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::venue::Venue;

const MAX_SUMMARY_CHARS: usize = 280;

pub struct SummarizerOutcome {
	pub summary: String,
	pub tags: Vec<String>,
	pub signals: HashMap<String, Value>,
}

#[async_trait]
pub trait SummarizerCapability: Send + Sync {
	async fn summarize(&self, venue: &Venue) -> Result<SummarizerOutcome, String>;
}

/// Backed by the same `langchain_rust::llm::OpenAI` single-shot `LLM`
/// trait the fallback itinerary generator uses, scoped down to one
/// `invoke` call rather than a ReAct agent loop.
pub struct LlmSummarizer {
	llm: Arc<dyn LLM + Send + Sync>,
}

impl Default for LlmSummarizer {
	fn default() -> Self {
		Self {
			llm: Arc::new(OpenAI::default().with_model(OpenAIModel::Gpt4oMini)),
		}
	}
}

#[async_trait]
impl SummarizerCapability for LlmSummarizer {
	async fn summarize(&self, venue: &Venue) -> Result<SummarizerOutcome, String> {
		let description = venue
			.description
			.as_deref()
			.ok_or_else(|| "no description to summarize from".to_string())?;

		let prompt = format!(
			"Summarize this venue in under {MAX_SUMMARY_CHARS} characters and list 3-8 lowercase \
			 canonical tags as a JSON array, plus a signals object with booleans for \
			 hq_experience/editor_pick/extraordinary/dateworthy. Name: {}. Category: {}. \
			 Description: {description}. Respond as JSON: {{\"summary\":...,\"tags\":[...],\"signals\":{{...}}}}",
			venue.name,
			venue.category.as_deref().unwrap_or("unknown"),
		);

		let response = self.llm.invoke(prompt.as_str()).await.map_err(|e| e.to_string())?;
		let cleaned = response.trim_start_matches("```json").trim_end_matches("```").trim();
		let parsed: Value = serde_json::from_str(cleaned).map_err(|e| format!("malformed summarizer response: {e}"))?;

		let summary = parsed
			.get("summary")
			.and_then(|v| v.as_str())
			.map(|s| s.chars().take(MAX_SUMMARY_CHARS).collect::<String>())
			.filter(|s| !s.trim().is_empty())
			.ok_or_else(|| "summarizer produced no summary".to_string())?;

		let tags = parsed
			.get("tags")
			.and_then(|v| v.as_array())
			.map(|arr| arr.iter().filter_map(|t| t.as_str().map(str::to_string)).collect())
			.unwrap_or_default();

		let signals = parsed
			.get("signals")
			.and_then(|v| v.as_object())
			.map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
			.unwrap_or_default();

		Ok(SummarizerOutcome { summary, tags, signals })
	}
}

#[cfg(test)]
pub struct StubSummarizer {
	pub summary: String,
	pub tags: Vec<String>,
}

#[cfg(test)]
#[async_trait]
impl SummarizerCapability for StubSummarizer {
	async fn summarize(&self, _venue: &Venue) -> Result<SummarizerOutcome, String> {
		Ok(SummarizerOutcome {
			summary: self.summary.clone(),
			tags: self.tags.clone(),
			signals: HashMap::new(),
		})
	}
}
