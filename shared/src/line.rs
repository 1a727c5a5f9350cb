//! Newline-delimited JSON codec for the control link
//!
//! Every message is one JSON array on its own line:
//! ```text
//! ["<address>/<topic>", <payload>]\n   addressed to a device
//! ["/<topic>", <payload>]\n            addressed to the gateway itself
//! ```
//!
//! The payload may be omitted, in which case it is `null`. Outbound lines use
//! the same shape.

use bytes::{Buf, BytesMut};
use serde_json::{json, Value};
use thiserror::Error;

use crate::address::{AddressError, DeviceAddress};
use crate::event::Event;
use crate::limits::MAX_LINE_LEN;
use crate::payload::Payload;

/// Errors that can occur while parsing a control line
#[derive(Error, Debug)]
pub enum LineError {
    #[error("Line too long: {0} bytes (max: {MAX_LINE_LEN})")]
    LineTooLong(usize),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a [topic, payload] array")]
    NotAnArray,

    #[error("Topic must be a string")]
    TopicNotString,

    #[error("Topic {0:?} has no `/` separator")]
    MissingSeparator(String),

    #[error("Invalid device address: {0}")]
    Address(#[from] AddressError),
}

/// One command line from the controller
#[derive(Debug, Clone, PartialEq)]
pub struct ControlMessage {
    /// `None` for gateway-level topics
    pub address: Option<DeviceAddress>,
    /// Device topic without the address, or the full `/...` gateway topic
    pub topic: String,
    pub payload: Payload,
}

/// Parse one line, without its terminator
pub fn parse(line: &str) -> Result<ControlMessage, LineError> {
    let value: Value = serde_json::from_str(line.trim())?;
    let Value::Array(mut items) = value else {
        return Err(LineError::NotAnArray);
    };
    if items.is_empty() || items.len() > 2 {
        return Err(LineError::NotAnArray);
    }

    let payload = if items.len() == 2 {
        Payload::from(items.remove(1))
    } else {
        Payload::Null
    };
    let Value::String(full_topic) = items.remove(0) else {
        return Err(LineError::TopicNotString);
    };

    if full_topic.starts_with('/') {
        return Ok(ControlMessage {
            address: None,
            topic: full_topic,
            payload,
        });
    }

    let (address, topic) = full_topic
        .split_once('/')
        .ok_or_else(|| LineError::MissingSeparator(full_topic.clone()))?;
    Ok(ControlMessage {
        address: Some(address.parse()?),
        topic: topic.to_string(),
        payload,
    })
}

/// Render an event as an outbound line, terminator included
pub fn format_event(event: &Event) -> String {
    render(&event.wire_topic(), event.value.to_json())
}

/// Render a gateway-level message such as `/attach`
pub fn format_notify(topic: &str, payload: Value) -> String {
    render(topic, payload)
}

fn render(topic: &str, payload: Value) -> String {
    let mut line = json!([topic, payload]).to_string();
    line.push('\n');
    line
}

/// Decoder state machine for streaming decoding
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Partial line data being accumulated
    buffer: BytesMut,
    /// Dropping the tail of an over-long line, up to its newline
    discarding: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(MAX_LINE_LEN),
            discarding: false,
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next line from the buffer.
    ///
    /// Call this repeatedly until it returns `Ok(None)`. A malformed line is
    /// consumed before its error is returned, so decoding can continue.
    /// Blank lines are skipped.
    pub fn decode_next(&mut self) -> Result<Option<ControlMessage>, LineError> {
        loop {
            let Some(end) = self.buffer.iter().position(|&b| b == b'\n') else {
                if self.discarding {
                    self.buffer.clear();
                } else if self.buffer.len() > MAX_LINE_LEN {
                    let len = self.buffer.len();
                    self.buffer.clear();
                    self.discarding = true;
                    return Err(LineError::LineTooLong(len));
                }
                return Ok(None);
            };

            let line = self.buffer.split_to(end);
            self.buffer.advance(1);

            if self.discarding {
                self.discarding = false;
                continue;
            }

            if end > MAX_LINE_LEN {
                return Err(LineError::LineTooLong(end));
            }
            let text = String::from_utf8_lossy(&line);
            if text.trim().is_empty() {
                continue;
            }
            return parse(&text).map(Some);
        }
    }

    /// Get the current buffer length (for debugging)
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TypedValue;

    #[test]
    fn test_parse_addressed() {
        let msg = parse(r#"["0011223344aa/relay/0:0/state/set", true]"#).expect("valid");
        assert_eq!(msg.address, Some(DeviceAddress::new(0x0011_2233_44aa)));
        assert_eq!(msg.topic, "relay/0:0/state/set");
        assert_eq!(msg.payload, Payload::Bool(true));
    }

    #[test]
    fn test_parse_gateway_topic() {
        let msg = parse(r#"["/info/get"]"#).expect("valid");
        assert_eq!(msg.address, None);
        assert_eq!(msg.topic, "/info/get");
        assert_eq!(msg.payload, Payload::Null);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("{}"), Err(LineError::NotAnArray)));
        assert!(matches!(parse("[]"), Err(LineError::NotAnArray)));
        assert!(matches!(parse("[1, 2]"), Err(LineError::TopicNotString)));
        assert!(matches!(parse(r#"["led"]"#), Err(LineError::MissingSeparator(_))));
        assert!(matches!(parse(r#"["xyz/led/-/state/get"]"#), Err(LineError::Address(_))));
        assert!(matches!(parse("[\"/a\""), Err(LineError::Json(_))));
    }

    #[test]
    fn test_format_event() {
        let event = Event::new(
            DeviceAddress::new(0xa),
            "relay/0:0/state",
            TypedValue::Bool(true),
        );
        assert_eq!(
            format_event(&event),
            "[\"00000000000a/relay/0:0/state\",true]\n"
        );
        assert_eq!(
            format_notify("/attach", json!("00000000000b")),
            "[\"/attach\",\"00000000000b\"]\n"
        );
    }

    #[test]
    fn test_line_decoder() {
        let mut decoder = LineDecoder::new();

        decoder.extend(b"[\"/nodes/get\"]\n\n[\"/info");
        let first = decoder.decode_next().expect("decode error").expect("line");
        assert_eq!(first.topic, "/nodes/get");
        assert!(decoder.decode_next().expect("decode error").is_none());
        assert_eq!(decoder.buffer_len(), 7);

        decoder.extend(b"/get\"]\n");
        let second = decoder.decode_next().expect("decode error").expect("line");
        assert_eq!(second.topic, "/info/get");
    }

    #[test]
    fn test_bad_line_is_consumed() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"garbage\n[\"/info/get\"]\n");
        assert!(decoder.decode_next().is_err());
        assert!(decoder.decode_next().expect("decode error").is_some());
    }

    #[test]
    fn test_line_too_long() {
        let mut decoder = LineDecoder::new();
        decoder.extend(&vec![b'x'; MAX_LINE_LEN + 1]);
        assert!(matches!(decoder.decode_next(), Err(LineError::LineTooLong(_))));
        assert_eq!(decoder.buffer_len(), 0);
    }

    #[test]
    fn test_tail_of_long_line_is_dropped() {
        let valid = b"[\"0000000000bb/relay/-/state/set\", true]";

        // tail arrives in a later read
        let mut decoder = LineDecoder::new();
        decoder.extend(&vec![b'x'; MAX_LINE_LEN + 1]);
        assert!(matches!(decoder.decode_next(), Err(LineError::LineTooLong(_))));
        decoder.extend(valid);
        assert!(matches!(decoder.decode_next(), Ok(None)));
        decoder.extend(b"\n");
        assert!(matches!(decoder.decode_next(), Ok(None)));
        assert_eq!(decoder.buffer_len(), 0);

        // tail arrives together with the next line
        let mut decoder = LineDecoder::new();
        decoder.extend(&vec![b'x'; MAX_LINE_LEN + 1]);
        assert!(matches!(decoder.decode_next(), Err(LineError::LineTooLong(_))));
        decoder.extend(b"yyyy\n");
        decoder.extend(valid);
        decoder.extend(b"\n");
        let message = decoder.decode_next().expect("decode").expect("message");
        assert_eq!(message.topic, "relay/-/state/set");
        assert_eq!(message.address, Some(DeviceAddress::new(0xbb)));
        assert!(matches!(decoder.decode_next(), Ok(None)));
    }
}
