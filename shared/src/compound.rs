//! Chunked LED strip programs
//!
//! A compound program is a list of segments, each painting `count` LEDs in
//! one colour. Serialised segments are split across as many
//! `LED_STRIP_COMPOUND_SET` frames as needed. Each chunk carries the running
//! LED offset at which it starts; the receiving peer stitches them together.

use bytes::{BufMut, Bytes, BytesMut};

use crate::color::Color;
use crate::frame::{check_range, ValidationError};
use crate::limits::{COMPOUND_CHUNK_MAX, COMPOUND_COUNTER_LIMIT, COMPOUND_SEGMENT_LEN};
use crate::payload::Payload;

/// `count` LEDs painted with `color`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub count: u8,
    pub color: Color,
}

impl Segment {
    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.count);
        buf.put_u8(self.color.r);
        buf.put_u8(self.color.g);
        buf.put_u8(self.color.b);
        buf.put_u8(self.color.w);
    }
}

/// One frame's worth of a compound program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundChunk {
    /// LED offset where this chunk starts
    pub seq: u8,
    pub data: Bytes,
}

impl CompoundChunk {
    /// A final chunk is shorter than the maximum chunk size
    pub fn is_short(&self) -> bool {
        self.data.len() < COMPOUND_CHUNK_MAX
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundProgram {
    segments: Vec<Segment>,
}

impl CompoundProgram {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parse `[count, "#colour", count, "#colour", ...]`
    pub fn from_payload(payload: &Payload) -> Result<Self, ValidationError> {
        let items = payload.as_list("compound")?;
        if items.len() % 2 != 0 {
            return Err(ValidationError::InvalidCompound(format!(
                "expected count/colour pairs, got {} items",
                items.len()
            )));
        }

        let segments = items
            .chunks_exact(2)
            .map(|pair| {
                let count = pair[0].as_int("count")?;
                let count = check_range("count", count, 0, u8::MAX as i64)? as u8;
                let color = Color::parse(pair[1].as_str("color")?)?;
                Ok(Segment { count, color })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Lazily split the program into frames
    pub fn chunks(&self) -> CompoundChunks<'_> {
        CompoundChunks {
            segments: &self.segments,
            cursor: 0,
            counter: 0,
            finished: false,
        }
    }
}

/// Iterator over the chunks of a [`CompoundProgram`].
///
/// Ends after the first chunk shorter than [`COMPOUND_CHUNK_MAX`] bytes, or
/// once the running LED counter reaches [`COMPOUND_COUNTER_LIMIT`]. A program
/// that fills its last chunk exactly is followed by an empty terminating
/// chunk.
#[derive(Debug)]
pub struct CompoundChunks<'a> {
    segments: &'a [Segment],
    cursor: usize,
    counter: u32,
    finished: bool,
}

impl Iterator for CompoundChunks<'_> {
    type Item = CompoundChunk;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let per_chunk = COMPOUND_CHUNK_MAX / COMPOUND_SEGMENT_LEN;
        let end = (self.cursor + per_chunk).min(self.segments.len());
        let taken = &self.segments[self.cursor..end];

        let mut data = BytesMut::with_capacity(COMPOUND_CHUNK_MAX);
        for segment in taken {
            segment.write(&mut data);
        }

        let chunk = CompoundChunk {
            seq: self.counter as u8,
            data: data.freeze(),
        };

        self.cursor = end;
        self.counter += taken.iter().map(|s| u32::from(s.count)).sum::<u32>();
        if chunk.is_short() || self.counter >= COMPOUND_COUNTER_LIMIT {
            self.finished = true;
        }

        Some(chunk)
    }
}

impl std::iter::FusedIterator for CompoundChunks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn program(counts: &[u8]) -> CompoundProgram {
        CompoundProgram::new(
            counts
                .iter()
                .map(|&count| Segment {
                    count,
                    color: Color::rgb(count, 0, 0),
                })
                .collect(),
        )
    }

    #[test]
    fn test_from_payload() {
        let payload = Payload::from(json!([3, "#ff0000", 2, "#00ff00(10)"]));
        let program = CompoundProgram::from_payload(&payload).expect("valid program");
        assert_eq!(
            program.segments(),
            &[
                Segment {
                    count: 3,
                    color: Color::rgb(0xff, 0, 0)
                },
                Segment {
                    count: 2,
                    color: Color::rgbw(0, 0xff, 0, 0x10)
                },
            ]
        );
    }

    #[test]
    fn test_from_payload_rejects_bad_input() {
        for bad in [
            json!([3, "#ff0000", 2]),
            json!([256, "#ff0000"]),
            json!([-1, "#ff0000"]),
            json!([1, "red"]),
            json!(["#ff0000", 1]),
            json!({"count": 1}),
        ] {
            assert!(
                CompoundProgram::from_payload(&Payload::from(bad.clone())).is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_two_hundred_elements() {
        let program = program(&[1; 200]);
        let chunks: Vec<_> = program.chunks().collect();

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.data.len() <= COMPOUND_CHUNK_MAX));
        assert!(chunks.windows(2).all(|w| w[0].seq < w[1].seq));

        let last = chunks.last().expect("at least one chunk");
        assert!(last.is_short());
        // 22 full chunks of 9 segments, then the remaining 2
        assert_eq!(chunks.len(), 23);
        assert_eq!(last.data.len(), 2 * COMPOUND_SEGMENT_LEN);
        assert_eq!(last.seq, 198);

        let total: usize = chunks.iter().map(|c| c.data.len()).sum();
        assert_eq!(total, 200 * COMPOUND_SEGMENT_LEN);
    }

    #[test]
    fn test_stops_at_counter_limit() {
        // 30 LEDs per segment: the counter passes 255 after the first chunk
        let program = program(&[30; 40]);
        let chunks: Vec<_> = program.chunks().collect();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].seq, 0);
        assert_eq!(chunks[0].data.len(), COMPOUND_CHUNK_MAX);
    }

    #[test]
    fn test_counter_advances_by_led_count() {
        let program = program(&[10; 20]);
        let seqs: Vec<u8> = program.chunks().map(|c| c.seq).collect();
        // 9 * 10 LEDs per full chunk
        assert_eq!(seqs, vec![0, 90, 180]);
    }

    #[test]
    fn test_exact_fill_emits_empty_terminator() {
        let program = program(&[1; 9]);
        let chunks: Vec<_> = program.chunks().collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].data.len(), COMPOUND_CHUNK_MAX);
        assert!(chunks[1].data.is_empty());
        assert_eq!(chunks[1].seq, 9);
    }

    #[test]
    fn test_empty_program() {
        let chunks: Vec<_> = CompoundProgram::default().chunks().collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].seq, 0);
        assert!(chunks[0].data.is_empty());
    }

    #[test]
    fn test_segment_layout() {
        let program = CompoundProgram::new(vec![Segment {
            count: 4,
            color: Color::rgbw(0x11, 0x22, 0x33, 0x44),
        }]);
        let chunk = program.chunks().next().expect("one chunk");
        assert_eq!(&chunk.data[..], &[4, 0x11, 0x22, 0x33, 0x44]);
    }
}
