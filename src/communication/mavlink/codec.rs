//! MAVLink v2 framing codec
//!
//! Inbound bytes accumulate in a buffer that survives datagram boundaries,
//! so a frame split across two datagrams still decodes. Frames that fail
//! CRC or carry unknown message ids are dropped silently; MAVLink over UDP
//! is best-effort and the GCS re-requests.

use std::io::Cursor;

use mavlink::common::MavMessage;
use mavlink::peek_reader::PeekReader;
use mavlink::MavHeader;

use super::MAX_MESSAGE_SIZE;

const MAGIC_V1: u8 = 0xFE;
const MAGIC_V2: u8 = 0xFD;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("message encoding failed: {0}")]
    Encode(String),

    #[error("encoded frame exceeds {MAX_MESSAGE_SIZE} bytes")]
    Oversize,
}

/// Stateful frame extractor.
#[derive(Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(2048),
        }
    }

    /// Feed one datagram's payload and drain every complete frame.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<(MavHeader, MavMessage)> {
        self.buf.extend_from_slice(bytes);
        self.drain_frames()
    }

    fn drain_frames(&mut self) -> Vec<(MavHeader, MavMessage)> {
        let mut messages = Vec::new();

        loop {
            let Some(pos) = self.buf.iter().position(|&b| b == MAGIC_V1 || b == MAGIC_V2) else {
                self.buf.clear();
                break;
            };
            if pos > 0 {
                self.buf.drain(..pos);
            }
            if self.buf.len() < 2 {
                break;
            }

            let magic = self.buf[0];
            let payload_len = self.buf[1] as usize;
            let frame_size = if magic == MAGIC_V2 {
                // v2: 10-byte header + payload + 2 CRC, plus a 13-byte
                // signature when incompat_flags bit 0 is set
                let base = 12 + payload_len;
                if self.buf.len() >= 3 && (self.buf[2] & 0x01) != 0 {
                    base + 13
                } else {
                    base
                }
            } else {
                // v1: 6-byte header + payload + 2 CRC
                8 + payload_len
            };

            if self.buf.len() < frame_size {
                break;
            }

            if let Some(message) = parse_frame(&self.buf[..frame_size]) {
                messages.push(message);
            }
            self.buf.drain(..frame_size);
        }

        messages
    }
}

/// Parse a single complete MAVLink frame (v1 or v2).
fn parse_frame(data: &[u8]) -> Option<(MavHeader, MavMessage)> {
    if data.is_empty() {
        return None;
    }
    let mut reader = PeekReader::new(Cursor::new(data));
    if data[0] == MAGIC_V2 {
        mavlink::read_v2_msg::<MavMessage, _>(&mut reader).ok()
    } else {
        mavlink::read_v1_msg::<MavMessage, _>(&mut reader).ok()
    }
}

/// Encode one message as a MAVLink v2 frame.
pub fn encode(header: MavHeader, message: &MavMessage) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(280);
    mavlink::write_v2_msg(&mut buf, header, message)
        .map_err(|e| CodecError::Encode(format!("{e:?}")))?;
    if buf.len() > MAX_MESSAGE_SIZE {
        return Err(CodecError::Oversize);
    }
    Ok(buf)
}
