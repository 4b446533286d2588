//! Single-vs-batch classification of raw payloads.
//!
//! Only the first significant byte is inspected. Whether the payload is
//! actually valid JSON is left to the request decoder.

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Top-level shape of a raw JSON payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Starts with `{`: a single request
    Object,
    /// Starts with `[`: a batch of requests
    Array,
    /// Anything else, including empty input
    Other,
}

impl PayloadShape {
    pub fn is_batch(&self) -> bool {
        matches!(self, PayloadShape::Array)
    }
}

/// `raw` without a leading UTF-8 byte order mark
pub fn strip_bom(raw: &[u8]) -> &[u8] {
    raw.strip_prefix(UTF8_BOM).unwrap_or(raw)
}

/// Classify `raw` by its first non-whitespace byte.
pub fn detect(raw: &[u8]) -> PayloadShape {
    let first = strip_bom(raw)
        .iter()
        .copied()
        .find(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r'));

    match first {
        Some(b'{') => PayloadShape::Object,
        Some(b'[') => PayloadShape::Array,
        _ => PayloadShape::Other,
    }
}

/// Shorthand for `detect(raw).is_batch()`
pub fn is_batch(raw: &[u8]) -> bool {
    detect(raw).is_batch()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_object() {
        assert_eq!(detect(br#"{"jsonrpc":"2.0"}"#), PayloadShape::Object);
    }

    #[test]
    fn test_detect_array() {
        assert_eq!(detect(br#"[{"jsonrpc":"2.0"}]"#), PayloadShape::Array);
        assert!(is_batch(b"[]"));
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(detect(b" \r\n\t [1]"), PayloadShape::Array);
        assert_eq!(detect(b"\n\n{}"), PayloadShape::Object);
    }

    #[test]
    fn test_byte_order_mark() {
        assert_eq!(detect(b"\xEF\xBB\xBF {}"), PayloadShape::Object);
    }

    #[test]
    fn test_other_shapes() {
        assert_eq!(detect(b""), PayloadShape::Other);
        assert_eq!(detect(b"   "), PayloadShape::Other);
        assert_eq!(detect(b"not even a json"), PayloadShape::Other);
        assert_eq!(detect(b"42"), PayloadShape::Other);
        assert_eq!(detect(br#""[quoted]""#), PayloadShape::Other);
    }

    #[test]
    fn test_detection_does_not_validate() {
        // Malformed JSON is still classified; the decoder reports the parse error.
        assert_eq!(detect(b"[not json"), PayloadShape::Array);
    }
}
