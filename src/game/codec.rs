//! Session codec — the two wire formats a [`SessionState`] is persisted in.
//!
//! - **Legacy**: `x,y,room_index`, e.g. `"3,-1,0"`.
//! - **Keyed**: `{"v":2,"x":3,"y":-1,"room":"euniciar"}` as URL-safe base64
//!   (no padding) so it is a valid cookie value. Generation 1 records, which
//!   store an integer index in `room` and carry no `v`, are still accepted,
//!   as is the bare JSON without the base64 wrapper.
//!
//! Decoding picks the format from the input itself; encoding uses the
//! configured [`SessionFormat`].

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::movement::Position;
use crate::game::room::{RoomLookupError, RoomRegistry};
use crate::game::session::SessionState;

pub const LEGACY_SEPARATOR: char = ',';

/// Schema generation written by the keyed encoder.
pub const KEYED_VERSION: u8 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionFormat {
    Legacy,
    #[default]
    Keyed,
}

impl SessionFormat {
    /// Guess the format of a persisted value.
    pub fn detect(raw: &str) -> Self {
        let raw = raw.trim();
        if !raw.is_empty()
            && raw.contains(LEGACY_SEPARATOR)
            && raw
                .chars()
                .all(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == LEGACY_SEPARATOR)
        {
            SessionFormat::Legacy
        } else {
            SessionFormat::Keyed
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("session value is empty")]
    Empty,
    #[error("expected 3 segments, found {found}")]
    SegmentCount { found: usize },
    #[error("segment {segment} is not an integer: '{value}'")]
    InvalidInteger { segment: usize, value: String },
    #[error("session value is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("session value is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("session record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported session record version {0}")]
    UnsupportedVersion(u8),
    #[error(transparent)]
    UnknownRoom(#[from] RoomLookupError),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot encode session: {0}")]
    UnknownRoom(#[from] RoomLookupError),
    #[error("cannot serialize session record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum RoomField {
    Index(u32),
    Key(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct KeyedRecord {
    #[serde(default = "first_generation")]
    v: u8,
    x: i32,
    y: i32,
    room: RoomField,
}

fn first_generation() -> u8 {
    1
}

/// Encoder/decoder bound to the room registry, which maps between room keys
/// and legacy indices.
#[derive(Debug, Clone, Copy)]
pub struct SessionCodec<'r> {
    registry: &'r RoomRegistry,
    format: SessionFormat,
}

impl<'r> SessionCodec<'r> {
    pub fn new(registry: &'r RoomRegistry, format: SessionFormat) -> Self {
        Self { registry, format }
    }

    pub fn format(&self) -> SessionFormat {
        self.format
    }

    pub fn registry(&self) -> &'r RoomRegistry {
        self.registry
    }

    /// Encode in this codec's format.
    pub fn encode(&self, state: &SessionState) -> Result<String, EncodeError> {
        self.encode_as(self.format, state)
    }

    pub fn encode_as(&self, format: SessionFormat, state: &SessionState) -> Result<String, EncodeError> {
        let room = self.registry.resolve(&state.room)?;
        match format {
            SessionFormat::Legacy => Ok(format!(
                "{}{sep}{}{sep}{}",
                state.position.x,
                state.position.y,
                room.index,
                sep = LEGACY_SEPARATOR
            )),
            SessionFormat::Keyed => {
                let record = KeyedRecord {
                    v: KEYED_VERSION,
                    x: state.position.x,
                    y: state.position.y,
                    room: RoomField::Key(room.key.clone()),
                };
                let json = serde_json::to_vec(&record)?;
                Ok(URL_SAFE_NO_PAD.encode(json))
            }
        }
    }

    /// Decode a value in either format.
    pub fn decode(&self, raw: &str) -> Result<SessionState, DecodeError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DecodeError::Empty);
        }
        match SessionFormat::detect(raw) {
            SessionFormat::Legacy => self.decode_legacy(raw),
            SessionFormat::Keyed => self.decode_keyed(raw),
        }
    }

    fn decode_legacy(&self, raw: &str) -> Result<SessionState, DecodeError> {
        let segments: Vec<&str> = raw.split(LEGACY_SEPARATOR).collect();
        if segments.len() != 3 {
            return Err(DecodeError::SegmentCount {
                found: segments.len(),
            });
        }
        let x = parse_segment::<i32>(&segments, 0)?;
        let y = parse_segment::<i32>(&segments, 1)?;
        let index = parse_segment::<i64>(&segments, 2)?;
        let index = u32::try_from(index).map_err(|_| RoomLookupError::UnknownIndex(index))?;
        let room = self.registry.resolve_index(index)?;
        Ok(SessionState::new(Position::new(x, y), &room.key))
    }

    fn decode_keyed(&self, raw: &str) -> Result<SessionState, DecodeError> {
        let json = if raw.starts_with('{') {
            raw.to_string()
        } else {
            String::from_utf8(URL_SAFE_NO_PAD.decode(raw)?)?
        };
        let record: KeyedRecord = serde_json::from_str(&json)?;
        if record.v == 0 || record.v > KEYED_VERSION {
            return Err(DecodeError::UnsupportedVersion(record.v));
        }
        let room = match &record.room {
            RoomField::Index(i) => self.registry.resolve_index(*i)?,
            RoomField::Key(k) => self.registry.resolve(k)?,
        };
        Ok(SessionState::new(Position::new(record.x, record.y), &room.key))
    }
}

fn parse_segment<T: std::str::FromStr>(segments: &[&str], i: usize) -> Result<T, DecodeError> {
    segments[i]
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidInteger {
            segment: i,
            value: segments[i].to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(WorldConfig::default().rooms, None).unwrap()
    }

    fn state(x: i32, y: i32, room: &str) -> SessionState {
        SessionState::new(Position::new(x, y), room)
    }

    #[test]
    fn legacy_roundtrip() {
        let reg = registry();
        let codec = SessionCodec::new(&reg, SessionFormat::Legacy);
        for s in [
            state(0, 0, "euniciar"),
            state(-4, 7, "patricolia"),
            state(i32::MIN, i32::MAX, "euniciar"),
        ] {
            let raw = codec.encode(&s).unwrap();
            assert_eq!(codec.decode(&raw).unwrap(), s);
        }
        assert_eq!(codec.encode(&state(3, -1, "patricolia")).unwrap(), "3,-1,1");
    }

    #[test]
    fn keyed_roundtrip() {
        let reg = registry();
        let codec = SessionCodec::new(&reg, SessionFormat::Keyed);
        for s in [state(0, 0, "euniciar"), state(12, -30, "patricolia")] {
            let raw = codec.encode(&s).unwrap();
            assert!(!raw.contains(',') && !raw.contains('"') && !raw.contains('='));
            assert_eq!(codec.decode(&raw).unwrap(), s);
        }
    }

    #[test]
    fn either_codec_reads_both_formats() {
        let reg = registry();
        let legacy = SessionCodec::new(&reg, SessionFormat::Legacy);
        let keyed = SessionCodec::new(&reg, SessionFormat::Keyed);
        let s = state(2, 1, "patricolia");
        assert_eq!(keyed.decode(&legacy.encode(&s).unwrap()).unwrap(), s);
        assert_eq!(legacy.decode(&keyed.encode(&s).unwrap()).unwrap(), s);
    }

    #[test]
    fn first_generation_record_uses_index() {
        let reg = registry();
        let codec = SessionCodec::new(&reg, SessionFormat::Keyed);
        let raw = URL_SAFE_NO_PAD.encode(r#"{"x":1,"y":2,"room":1}"#);
        assert_eq!(codec.decode(&raw).unwrap(), state(1, 2, "patricolia"));
        // bare JSON is accepted too
        assert_eq!(
            codec.decode(r#"{"x":5,"y":-5,"room":0}"#).unwrap(),
            state(5, -5, "euniciar")
        );
    }

    #[test]
    fn detect_format() {
        assert_eq!(SessionFormat::detect("0,0,0"), SessionFormat::Legacy);
        assert_eq!(SessionFormat::detect("-3,12,1"), SessionFormat::Legacy);
        assert_eq!(SessionFormat::detect("eyJ4IjowfQ"), SessionFormat::Keyed);
        assert_eq!(SessionFormat::detect("12"), SessionFormat::Keyed);
    }

    #[test]
    fn legacy_errors_are_typed() {
        let reg = registry();
        let codec = SessionCodec::new(&reg, SessionFormat::Legacy);
        assert!(matches!(codec.decode(""), Err(DecodeError::Empty)));
        assert!(matches!(
            codec.decode("1,2"),
            Err(DecodeError::SegmentCount { found: 2 })
        ));
        assert!(matches!(
            codec.decode("1,2,3,4"),
            Err(DecodeError::SegmentCount { found: 4 })
        ));
        assert!(matches!(
            codec.decode("1,,0"),
            Err(DecodeError::InvalidInteger { segment: 1, .. })
        ));
        assert!(matches!(
            codec.decode("1,2,-1"),
            Err(DecodeError::UnknownRoom(RoomLookupError::UnknownIndex(-1)))
        ));
        assert!(matches!(
            codec.decode("1,2,4294967296"),
            Err(DecodeError::UnknownRoom(RoomLookupError::UnknownIndex(4_294_967_296)))
        ));
        assert!(matches!(
            codec.decode("1,2,x"),
            Err(DecodeError::InvalidInteger { segment: 2, .. })
        ));
        assert!(matches!(
            codec.decode("99999999999,0,0"),
            Err(DecodeError::InvalidInteger { segment: 0, .. })
        ));
        assert!(matches!(
            codec.decode("0,0,9"),
            Err(DecodeError::UnknownRoom(RoomLookupError::UnknownIndex(9)))
        ));
    }

    #[test]
    fn keyed_errors_are_typed() {
        let reg = registry();
        let codec = SessionCodec::new(&reg, SessionFormat::Keyed);
        assert!(matches!(codec.decode("!!!not base64"), Err(DecodeError::Base64(_))));
        let not_json = URL_SAFE_NO_PAD.encode("hello");
        assert!(matches!(codec.decode(&not_json), Err(DecodeError::Json(_))));
        let bad_utf8 = URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(codec.decode(&bad_utf8), Err(DecodeError::Utf8(_))));
        let future = URL_SAFE_NO_PAD.encode(r#"{"v":9,"x":0,"y":0,"room":"euniciar"}"#);
        assert!(matches!(
            codec.decode(&future),
            Err(DecodeError::UnsupportedVersion(9))
        ));
        let lost = URL_SAFE_NO_PAD.encode(r#"{"v":2,"x":0,"y":0,"room":"atlantis"}"#);
        assert!(matches!(
            codec.decode(&lost),
            Err(DecodeError::UnknownRoom(RoomLookupError::UnknownKey(_)))
        ));
    }

    #[test]
    fn arbitrary_garbage_never_panics() {
        let reg = registry();
        let codec = SessionCodec::new(&reg, SessionFormat::Keyed);
        for raw in ["{", "}", ",,", "-,-,-", "💥", "e30", "null", "{\"x\":1}", "0,0,0,"] {
            assert!(codec.decode(raw).is_err(), "{raw} should not decode");
        }
    }

    #[test]
    fn encoding_unknown_room_fails() {
        let reg = registry();
        for format in [SessionFormat::Legacy, SessionFormat::Keyed] {
            let codec = SessionCodec::new(&reg, format);
            assert!(matches!(
                codec.encode(&state(0, 0, "atlantis")),
                Err(EncodeError::UnknownRoom(_))
            ));
        }
    }
}
