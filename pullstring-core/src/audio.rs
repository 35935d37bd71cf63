//! In-memory audio accumulation and WAV container handling.

use crate::error::{PullStringError, Result};

/// Buffers raw audio chunks between an explicit start and end signal.
///
/// Chunked network transmission is not supported by the Web API; all
/// chunks are held in memory and flushed as a single upload when the
/// owning conversation ends the audio. This is a single-writer resource:
/// it is owned by one conversation and is not safe for concurrent calls
/// without external synchronization.
#[derive(Debug, Default)]
pub struct AudioAccumulator {
    buffer: Option<Vec<u8>>,
}

impl AudioAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin accumulating. If a previous buffer was never flushed it is
    /// discarded; the last caller wins.
    pub fn start(&mut self) {
        if self.buffer.is_some() {
            tracing::debug!("discarding unflushed audio buffer on restart");
        }
        self.buffer = Some(Vec::new());
    }

    /// Append a chunk in call order. Appending while idle loses data
    /// silently, so it fails instead.
    pub fn append(&mut self, chunk: &[u8]) -> Result<()> {
        match &mut self.buffer {
            Some(buffer) => {
                buffer.extend_from_slice(chunk);
                Ok(())
            }
            None => Err(PullStringError::Sequence(
                "add_audio called without start_audio".to_string(),
            )),
        }
    }

    /// Return the FIFO concatenation of all appended chunks and go idle.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.buffer.take().ok_or_else(|| {
            PullStringError::Sequence("end_audio called without start_audio".to_string())
        })
    }

    pub fn is_accumulating(&self) -> bool {
        self.buffer.is_some()
    }
}

/// Minimal WAV (RIFF) container handling for speech uploads.
pub mod wav {
    /// Expected sample format: mono 16-bit PCM at 16 kHz.
    const PCM_FORMAT: u16 = 1;
    const CHANNELS: u16 = 1;
    const SAMPLE_RATE: u32 = 16_000;
    const BITS_PER_SAMPLE: u16 = 16;

    /// Extract the PCM payload from a WAV container, verifying that it
    /// wraps mono 16-bit PCM at 16 kHz. Returns `None` for anything else;
    /// malformed audio is a "no result", not an error.
    pub fn pcm_payload(bytes: &[u8]) -> Option<&[u8]> {
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return None;
        }

        let mut format_ok = false;
        let mut data: Option<&[u8]> = None;
        let mut offset = 12;
        while offset + 8 <= bytes.len() {
            let id = &bytes[offset..offset + 4];
            let size = read_u32(bytes, offset + 4)? as usize;
            let body_start = offset + 8;
            let body_end = body_start.checked_add(size)?;
            if body_end > bytes.len() {
                return None;
            }
            let body = &bytes[body_start..body_end];

            match id {
                b"fmt " => {
                    if size < 16 {
                        return None;
                    }
                    format_ok = read_u16(body, 0)? == PCM_FORMAT
                        && read_u16(body, 2)? == CHANNELS
                        && read_u32(body, 4)? == SAMPLE_RATE
                        && read_u16(body, 14)? == BITS_PER_SAMPLE;
                }
                b"data" => data = Some(body),
                _ => {}
            }

            // Chunks are padded to an even byte boundary.
            offset = body_end + (size & 1);
        }

        if format_ok { data } else { None }
    }

    fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
        let raw = bytes.get(offset..offset + 2)?;
        Some(u16::from_le_bytes([raw[0], raw[1]]))
    }

    fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
        let raw = bytes.get(offset..offset + 4)?;
        Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    #[cfg(test)]
    pub(crate) fn container(samples: &[u8]) -> Vec<u8> {
        container_with_format(samples, CHANNELS, SAMPLE_RATE, BITS_PER_SAMPLE)
    }

    #[cfg(test)]
    pub(crate) fn container_with_format(
        samples: &[u8],
        channels: u16,
        sample_rate: u32,
        bits: u16,
    ) -> Vec<u8> {
        let byte_rate = sample_rate * channels as u32 * (bits / 8) as u32;
        let block_align = channels * (bits / 8);

        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        out.extend_from_slice(samples);
        out
    }
}
