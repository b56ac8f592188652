//! Configuration for the query engine's own behavior.
//!
//! Connection strings, listen addresses, and authentication belong to
//! whatever transport a caller builds on top of this crate — there is none
//! of that here. What's left is the handful of knobs the engine itself
//! consults while validating, resolving, and evaluating.

use serde::{Deserialize, Serialize};

/// Engine-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QdslConfig {
    /// Maximum allowed group/condition nesting depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum edit distance considered for "did you mean" suggestions on
    /// unknown operators and fields.
    #[serde(default = "default_edit_distance_threshold")]
    pub edit_distance_threshold: u8,

    /// Default text search language passed to `plainto_tsquery`/
    /// `phraseto_tsquery`. `None` lets PostgreSQL fall back to its
    /// configured default.
    #[serde(default)]
    pub default_fts_language: Option<String>,

    /// Separator used when generating join aliases, e.g. `orders_1` with
    /// `_` or `orders-1` with `-`.
    #[serde(default = "default_alias_prefix_separator")]
    pub alias_prefix_separator: char,

    /// Whether the memory evaluator buffers a stream fully before sorting,
    /// rather than emitting results in encounter order. `true` is the
    /// conservative default: callers that request an `order_by` expect a
    /// globally sorted result even against a streaming source.
    #[serde(default = "default_stream_order_buffer")]
    pub stream_order_buffer: bool,
}

impl Default for QdslConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            edit_distance_threshold: default_edit_distance_threshold(),
            default_fts_language: None,
            alias_prefix_separator: default_alias_prefix_separator(),
            stream_order_buffer: default_stream_order_buffer(),
        }
    }
}

impl QdslConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(depth) = std::env::var("QDSL_MAX_DEPTH") {
            if let Ok(n) = depth.parse() {
                config.max_depth = n;
            }
        }
        if let Ok(threshold) = std::env::var("QDSL_EDIT_DISTANCE_THRESHOLD") {
            if let Ok(n) = threshold.parse() {
                config.edit_distance_threshold = n;
            }
        }
        if let Ok(lang) = std::env::var("QDSL_DEFAULT_FTS_LANGUAGE") {
            config.default_fts_language = Some(lang);
        }
        if let Ok(buffer) = std::env::var("QDSL_STREAM_ORDER_BUFFER") {
            config.stream_order_buffer = buffer == "1" || buffer.eq_ignore_ascii_case("true");
        }

        config
    }
}

fn default_max_depth() -> u32 {
    8
}

fn default_edit_distance_threshold() -> u8 {
    2
}

fn default_alias_prefix_separator() -> char {
    '_'
}

fn default_stream_order_buffer() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QdslConfig::default();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.edit_distance_threshold, 2);
        assert!(config.stream_order_buffer);
        assert_eq!(config.default_fts_language, None);
    }

    #[test]
    fn test_from_env_falls_back_to_defaults() {
        std::env::remove_var("QDSL_MAX_DEPTH");
        let config = QdslConfig::from_env();
        assert_eq!(config.max_depth, default_max_depth());
    }
}
