//! Blank-line chunking with heading merge.
//!
//! Text is split on blank lines (lines that are empty or whitespace-only). A segment shorter than the threshold is most
//! likely a title, so it is glued to the segment that follows it instead of
//! being indexed on its own.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SHORT_SEGMENT_THRESHOLD: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Segments with fewer trimmed characters than this merge with their successor.
    pub short_segment_threshold: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { short_segment_threshold: DEFAULT_SHORT_SEGMENT_THRESHOLD }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn chunk(&self, raw_text: &str) -> Vec<String> {
        // Whitespace-only lines count as blank, so "Title\n  \nBody" splits too.
        let normalized = raw_text
            .lines()
            .map(|line| if line.trim().is_empty() { "" } else { line })
            .collect::<Vec<_>>()
            .join("\n");
        // Empty segments come from runs of blank lines; they never take part in a merge.
        let segments: Vec<&str> = normalized
            .split("\n\n")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let mut chunks = Vec::with_capacity(segments.len());
        let mut i = 0;
        while i < segments.len() {
            let current = segments[i];
            let is_short = current.chars().count() < self.config.short_segment_threshold;
            if is_short && i + 1 < segments.len() {
                chunks.push(format!("{}\n\n{}", current, segments[i + 1]));
                i += 2;
            } else {
                chunks.push(current.to_string());
                i += 1;
            }
        }
        tracing::trace!(target: "chunker", "split {} bytes into {} chunks", raw_text.len(), chunks.len());
        chunks
    }
}
