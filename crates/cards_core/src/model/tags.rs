//! Tag codec: semantic tag list <-> persisted text blob.
//!
//! The blob is a JSON array of strings. Encoding keeps at most
//! [`MAX_TAGS`] entries; decoding never fails.

/// Maximum number of tags kept on write.
pub const MAX_TAGS: usize = 12;

/// Encodes tags for persistence, silently dropping entries past [`MAX_TAGS`].
pub fn encode_tags(tags: &[String]) -> String {
    let kept = &tags[..tags.len().min(MAX_TAGS)];
    serde_json::to_string(kept).unwrap_or_else(|_| "[]".to_string())
}

/// Strict decode. Fails on malformed JSON and on any shape other than an
/// array of strings.
pub fn try_decode_tags(blob: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(blob)
}

/// Lenient decode used on every read path: a corrupted blob yields no tags.
pub fn decode_tags(blob: &str) -> Vec<String> {
    try_decode_tags(blob).unwrap_or_default()
}
