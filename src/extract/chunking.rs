//! # Content Chunking
//!
//! Page content normally goes to the extraction service in one piece. Only
//! when the estimated token count passes the threshold is it split, at
//! paragraph boundaries where possible and at word boundaries otherwise.
//!
//! Token counts are estimated from word counts with a fixed word-token rate,
//! which is close enough to decide whether a page is "large".

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Estimated tokens per whitespace-separated word
pub const WORD_TOKEN_RATE: f64 = 0.75;

/// Default chunk size in estimated tokens
pub const DEFAULT_CHUNK_TOKEN_THRESHOLD: usize = 10_000;

/// Chunking parameters handed to the extraction service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkingParams {
    /// Fraction of each chunk repeated at the start of the next one
    pub overlap_rate: f64,

    /// Maximum estimated tokens per chunk
    pub chunk_token_threshold: usize,

    /// Whether to split the content at all
    pub apply_chunking: bool,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            overlap_rate: 0.0,
            chunk_token_threshold: DEFAULT_CHUNK_TOKEN_THRESHOLD,
            apply_chunking: false,
        }
    }
}

impl ChunkingParams {
    /// Parameters for `content`: no overlap, chunking only above the threshold
    pub fn for_content(content: &str, chunk_token_threshold: usize) -> Self {
        Self {
            overlap_rate: 0.0,
            chunk_token_threshold,
            apply_chunking: estimate_tokens(content) > chunk_token_threshold,
        }
    }
}

/// Estimate the token count of `text`
pub fn estimate_tokens(text: &str) -> usize {
    tokens_for_words(text.split_whitespace().count())
}

fn tokens_for_words(words: usize) -> usize {
    (words as f64 * WORD_TOKEN_RATE).ceil() as usize
}

fn words_for_tokens(tokens: usize) -> usize {
    ((tokens as f64 / WORD_TOKEN_RATE).floor() as usize).max(1)
}

/// Split `content` according to `params`
///
/// Returns the content unchanged as a single chunk when chunking is off.
#[instrument(skip(content), fields(len = content.len()))]
pub fn chunk_content(content: &str, params: &ChunkingParams) -> Vec<String> {
    if !params.apply_chunking {
        return vec![content.to_string()];
    }

    let max_words = words_for_tokens(params.chunk_token_threshold);
    let overlap_rate = params.overlap_rate.clamp(0.0, 0.9);
    let overlap_words = ((max_words as f64 * overlap_rate).floor() as usize).min(max_words - 1);

    let mut chunks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for paragraph in content.split("\n\n") {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        if !current.is_empty() && current.len() + words.len() > max_words {
            let carried = carry_overlap(&current, overlap_words);
            chunks.push(std::mem::replace(&mut current, carried));
        }

        for word in words {
            if current.len() >= max_words {
                let carried = carry_overlap(&current, overlap_words);
                chunks.push(std::mem::replace(&mut current, carried));
            }
            current.push(word);
        }
        current.push("\n\n");
    }

    if current.iter().any(|word| *word != "\n\n") {
        chunks.push(current);
    }

    let chunks: Vec<String> = chunks.into_iter().map(|words| join_words(&words)).collect();
    debug!("Split content into {} chunks", chunks.len());
    chunks
}

fn carry_overlap<'a>(words: &[&'a str], overlap_words: usize) -> Vec<&'a str> {
    let real: Vec<&str> = words.iter().copied().filter(|w| *w != "\n\n").collect();
    real[real.len().saturating_sub(overlap_words)..].to_vec()
}

fn join_words(words: &[&str]) -> String {
    let mut text = String::new();
    for word in words {
        if *word == "\n\n" {
            text.truncate(text.trim_end().len());
            text.push_str("\n\n");
        } else {
            text.push_str(word);
            text.push(' ');
        }
    }
    text.trim().to_string()
}
