//! Decodes one wire message buffer into an [`SslFrame`] or [`SstFrame`].
//!
//! A message is a single JSON object. Decoding walks the parsed value tree
//! structurally instead of deserializing against a rigid schema: unknown
//! keys are skipped, nested objects are descended into, and the source
//! array is decoded through a bounded slot cursor so that an overlong
//! array can never write past [`MAX_SOURCES`] entries. Decoding is pure;
//! it never touches the energy model or any other shared state.

use crate::frames::{SslFrame, SslSource, SstFrame, SstSource, MAX_SOURCES, TAG_BYTES};
use log::warn;
use serde_json::{Map, Number, Value};
use std::error::Error;
use std::fmt::{self, Display};
use std::str::FromStr;

/// Why a wire message was rejected. Either way the message is discarded
/// and no state changes.
#[derive(Debug)]
pub enum DecodeError {
    /// The first non-whitespace byte was not `{`. Seen for mid-stream
    /// fragments left over from a previous read.
    NotAnObject,
    /// The buffer started like an object but did not parse.
    Json(serde_json::Error),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NotAnObject => write!(f, "message is not a JSON object"),
            DecodeError::Json(e) => write!(f, "json error: {}", e),
        }
    }
}

impl Error for DecodeError {}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Field sink for one frame kind. The tree walk is shared; only the key
/// mapping differs between SSL and SST.
trait FrameFields: Default {
    fn label() -> &'static str;
    fn number_field(&mut self, key: &str, value: &Number);
    fn string_field(&mut self, key: &str, value: &str);
    /// Advance the slot cursor. Returns false when the frame is full and
    /// the element must be discarded.
    fn open_slot(&mut self) -> bool;
}

impl FrameFields for SslFrame {
    fn label() -> &'static str {
        "SSL"
    }

    fn number_field(&mut self, key: &str, value: &Number) {
        match key {
            "timeStamp" => {
                if let Some(ts) = value.as_u64() {
                    self.timestamp = ts;
                }
            }
            "x" | "y" | "z" | "E" => {
                let (Some(slot), Some(v)) = (self.sources.last_mut(), value.as_f64()) else {
                    return;
                };
                match key {
                    "x" => slot.x = v,
                    "y" => slot.y = v,
                    "z" => slot.z = v,
                    _ => slot.energy = v,
                }
            }
            _ => {}
        }
    }

    fn string_field(&mut self, _key: &str, _value: &str) {}

    fn open_slot(&mut self) -> bool {
        if self.sources.len() >= MAX_SOURCES {
            return false;
        }
        self.sources.push(SslSource::default());
        true
    }
}

impl FrameFields for SstFrame {
    fn label() -> &'static str {
        "SST"
    }

    fn number_field(&mut self, key: &str, value: &Number) {
        match key {
            "timeStamp" => {
                if let Some(ts) = value.as_u64() {
                    self.timestamp = ts;
                }
            }
            "id" => {
                if let (Some(slot), Some(id)) = (self.sources.last_mut(), value.as_u64()) {
                    slot.id = id as u32;
                }
            }
            "x" | "y" | "z" | "activity" => {
                let (Some(slot), Some(v)) = (self.sources.last_mut(), value.as_f64()) else {
                    return;
                };
                match key {
                    "x" => slot.x = v,
                    "y" => slot.y = v,
                    "z" => slot.z = v,
                    _ => slot.activity = v,
                }
            }
            _ => {}
        }
    }

    fn string_field(&mut self, key: &str, value: &str) {
        if key == "tag" {
            if let Some(slot) = self.sources.last_mut() {
                slot.tag = truncate_tag(value);
            }
        }
    }

    fn open_slot(&mut self) -> bool {
        if self.sources.len() >= MAX_SOURCES {
            return false;
        }
        self.sources.push(SstSource::default());
        true
    }
}

/// Bounds the tag to [`TAG_BYTES`] bytes without splitting a UTF-8
/// character.
fn truncate_tag(tag: &str) -> String {
    if tag.len() <= TAG_BYTES {
        return tag.to_owned();
    }
    let mut end = TAG_BYTES;
    while !tag.is_char_boundary(end) {
        end -= 1;
    }
    tag[..end].to_owned()
}

fn walk_object<F: FrameFields>(map: &Map<String, Value>, frame: &mut F) {
    for (key, value) in map {
        match value {
            Value::Number(n) => frame.number_field(key, n),
            Value::String(s) => frame.string_field(key, s),
            Value::Object(inner) => walk_object(inner, frame),
            Value::Array(items) => walk_array(items, frame),
            Value::Bool(_) | Value::Null => {}
        }
    }
}

fn walk_array<F: FrameFields>(items: &[Value], frame: &mut F) {
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::Array(inner) => walk_array(inner, frame),
            Value::Object(map) => {
                if frame.open_slot() {
                    walk_object(map, frame);
                } else {
                    warn!(
                        "{} source array too big, discarding element {}",
                        F::label(),
                        i
                    );
                }
            }
            _ => {}
        }
    }
}

fn decode<F: FrameFields>(text: &str) -> Result<F, DecodeError> {
    if !text.trim_start().starts_with('{') {
        return Err(DecodeError::NotAnObject);
    }

    // One receive can coalesce back-to-back objects; only the first one is
    // decoded and the remainder of the buffer is dropped.
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    let root = match stream.next() {
        Some(parsed) => parsed?,
        None => return Err(DecodeError::NotAnObject),
    };
    let Value::Object(map) = root else {
        return Err(DecodeError::NotAnObject);
    };

    let mut frame = F::default();
    walk_object(&map, &mut frame);
    Ok(frame)
}

/// Decode one SSL wire message.
pub fn decode_ssl(text: &str) -> Result<SslFrame, DecodeError> {
    decode(text)
}

/// Decode one SST wire message.
pub fn decode_sst(text: &str) -> Result<SstFrame, DecodeError> {
    decode(text)
}

impl FromStr for SslFrame {
    type Err = DecodeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_ssl(s)
    }
}

impl FromStr for SstFrame {
    type Err = DecodeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_sst(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ssl_full_frame() {
        let s = r#"{
            "timeStamp": 41888,
            "src": [
                { "x": 0.000, "y": 0.824, "z": 0.566, "E": 0.321 },
                { "x": -0.161, "y": 0.959, "z": 0.232, "E": 0.121 },
                { "x": -0.942, "y": -0.263, "z": 0.211, "E": 0.130 },
                { "x": 0.266, "y": 0.507, "z": 0.820, "E": 0.081 }
            ]
        }"#;

        let frame = decode_ssl(s).unwrap();
        assert_eq!(frame.timestamp, 41888);
        assert_eq!(frame.sources.len(), 4);
        assert_eq!(frame.sources[0].y, 0.824);
        assert_eq!(frame.sources[2].x, -0.942);
        assert_eq!(frame.sources[3].energy, 0.081);
    }

    #[test]
    fn test_decode_ssl_integer_coordinates() {
        // Senders are free to emit whole numbers without a decimal point.
        let s = r#"{"timeStamp":100,"src":[{"x":1,"y":0,"z":0,"E":1.0}]}"#;
        let frame = decode_ssl(s).unwrap();
        assert_eq!(frame.timestamp, 100);
        assert_eq!(frame.sources.len(), 1);
        assert_eq!(frame.sources[0].x, 1.0);
        assert_eq!(frame.sources[0].energy, 1.0);
    }

    #[test]
    fn test_decode_ssl_discards_excess_sources() {
        let s = r#"{"timeStamp":7,"src":[
            {"x":0.1,"y":0.0,"z":0.0,"E":0.1},
            {"x":0.2,"y":0.0,"z":0.0,"E":0.2},
            {"x":0.3,"y":0.0,"z":0.0,"E":0.3},
            {"x":0.4,"y":0.0,"z":0.0,"E":0.4},
            {"x":0.5,"y":0.0,"z":0.0,"E":0.5},
            {"x":0.6,"y":0.0,"z":0.0,"E":0.6}
        ]}"#;

        let frame = decode_ssl(s).unwrap();
        assert_eq!(frame.sources.len(), MAX_SOURCES);
        assert_eq!(frame.sources[3].energy, 0.4);
    }

    #[test]
    fn test_decode_sst_full_frame() {
        let s = r#"{
            "timeStamp": 41887,
            "src": [
                { "id": 100, "tag": "dynamic", "x": -0.014, "y": 0.901, "z": 0.434, "activity": 0.954 },
                { "id": 0, "tag": "", "x": 0.000, "y": 0.000, "z": 0.000, "activity": 0.000 }
            ]
        }"#;

        let frame = decode_sst(s).unwrap();
        assert_eq!(frame.timestamp, 41887);
        assert_eq!(frame.sources.len(), 2);
        assert_eq!(frame.sources[0].id, 100);
        assert_eq!(frame.sources[0].tag, "dynamic");
        assert_eq!(frame.sources[0].activity, 0.954);
        assert_eq!(frame.sources[1].id, 0);
        assert_eq!(frame.sources[1].tag, "");
    }

    #[test]
    fn test_decode_sst_truncates_long_tag() {
        let s = r#"{"timeStamp":1,"src":[
            {"id":3,"tag":"a-very-long-tag-name-exceeding-twenty-chars","x":0,"y":0,"z":0,"activity":0.5}
        ]}"#;

        let frame = decode_sst(s).unwrap();
        assert_eq!(frame.sources[0].tag.len(), TAG_BYTES);
        assert_eq!(frame.sources[0].tag, "a-very-long-tag-name");
    }

    #[test]
    fn test_decode_sst_tag_truncation_respects_char_boundary() {
        // 19 ASCII bytes followed by a 2-byte character: cutting at 20
        // would split it.
        let s = r#"{"timeStamp":1,"src":[
            {"id":1,"tag":"0123456789012345678é","x":0,"y":0,"z":0,"activity":0.1}
        ]}"#;

        let frame = decode_sst(s).unwrap();
        assert!(frame.sources[0].tag.len() <= TAG_BYTES);
        assert_eq!(frame.sources[0].tag, "0123456789012345678");
    }

    #[test]
    fn test_rejects_non_object_input() {
        assert!(matches!(
            decode_ssl("not json"),
            Err(DecodeError::NotAnObject)
        ));
        assert!(matches!(decode_ssl(""), Err(DecodeError::NotAnObject)));
        assert!(matches!(
            decode_ssl("[1, 2, 3]"),
            Err(DecodeError::NotAnObject)
        ));
        assert!(matches!(
            decode_sst("\"tag\""),
            Err(DecodeError::NotAnObject)
        ));
    }

    #[test]
    fn test_rejects_truncated_object() {
        assert!(matches!(
            decode_ssl(r#"{"timeStamp": 41888, "src": [{"x": 0."#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_leading_whitespace_is_tolerated() {
        let frame = decode_ssl("  \n\t {\"timeStamp\": 5, \"src\": []}").unwrap();
        assert_eq!(frame.timestamp, 5);
        assert!(frame.sources.is_empty());
    }

    #[test]
    fn test_coalesced_objects_decode_first_only() {
        let s = r#"{"timeStamp":1,"src":[{"x":1,"y":0,"z":0,"E":0.5}]}{"timeStamp":2,"src":[]}"#;
        let frame = decode_ssl(s).unwrap();
        assert_eq!(frame.timestamp, 1);
        assert_eq!(frame.sources.len(), 1);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let s = r#"{"timeStamp":9,"version":"2.1","src":[{"x":0.5,"y":0.5,"z":0,"E":0.2,"extra":true}]}"#;
        let frame = decode_ssl(s).unwrap();
        assert_eq!(frame.timestamp, 9);
        assert_eq!(frame.sources[0].x, 0.5);
    }

    #[test]
    fn test_from_str_round_trip() {
        let frame: SslFrame = r#"{"timeStamp":3,"src":[]}"#.parse().unwrap();
        assert_eq!(frame.timestamp, 3);
    }
}
