//! Monthly product-trend ideas for UMKM, cached per month.
//!
//! Answers are cached with `moka` (6-hour TTL) so repeated dashboard loads
//! do not hit Gemini.

use std::time::Duration;

use askama::Template;
use moka::future::Cache;
use serde::Deserialize;
use tracing::instrument;

use crate::gemini::{self, Content, GeminiClient, GeminiError, GenerateContentRequest};

const CACHE_CAPACITY: u64 = 240;
const CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Cached trend answers keyed by `(month, year)`.
pub type TrendCache = Cache<(u32, i32), serde_json::Value>;

/// Build the trend cache.
#[must_use]
pub fn new_cache() -> TrendCache {
    Cache::builder()
        .max_capacity(CACHE_CAPACITY)
        .time_to_live(CACHE_TTL)
        .build()
}

#[derive(Template)]
#[template(path = "prompts/trend.txt")]
struct TrendPrompt<'a> {
    month: u32,
    month_name: &'a str,
    year: i32,
}

/// Errors from the trend endpoint.
#[derive(Debug, thiserror::Error)]
pub enum TrendError {
    #[error("month must be between 1 and 12")]
    InvalidMonth,

    #[error("year must be between {MIN_YEAR} and {MAX_YEAR}")]
    InvalidYear,

    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

/// `?month=&year=` query.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrendQuery {
    pub month: u32,
    pub year: i32,
}

impl TrendQuery {
    /// Check ranges and return the Indonesian month name.
    ///
    /// # Errors
    ///
    /// Returns `TrendError::InvalidMonth` or `TrendError::InvalidYear`.
    pub fn validate(self) -> Result<&'static str, TrendError> {
        let name = self
            .month
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| MONTH_NAMES.get(i))
            .copied()
            .ok_or(TrendError::InvalidMonth)?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(TrendError::InvalidYear);
        }
        Ok(name)
    }
}

pub struct TrendService<'a> {
    gemini: &'a GeminiClient,
    cache: &'a TrendCache,
}

impl<'a> TrendService<'a> {
    #[must_use]
    pub const fn new(gemini: &'a GeminiClient, cache: &'a TrendCache) -> Self {
        Self { gemini, cache }
    }

    /// Trend ideas for the given month as JSON.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range month/year, or the
    /// Gemini error when the model fails or answers with invalid JSON.
    #[instrument(skip(self), fields(month = query.month, year = query.year))]
    pub async fn trend(&self, query: TrendQuery) -> Result<serde_json::Value, TrendError> {
        let month_name = query.validate()?;
        let key = (query.month, query.year);

        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Trend cache hit");
            return Ok(cached);
        }

        let prompt = TrendPrompt {
            month: query.month,
            month_name,
            year: query.year,
        }
        .render()
        .map_err(|e| GeminiError::Config(format!("prompt template: {e}")))?;

        let request = GenerateContentRequest::new(vec![Content::text(
            tokoku_core::ChatRole::User,
            prompt,
        )])
        .json_response();
        let text = self.gemini.generate_text(&request).await?;
        let value: serde_json::Value = gemini::parse_json(&text)?;

        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }
}
