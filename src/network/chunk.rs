//! GELF UDP chunking
//!
//! A payload larger than one datagram is split into chunks, each prefixed by
//! a 12-byte header:
//!
//! ```text
//! +------+------+----------------------+-------+-------+-----------+
//! | 0x1e | 0x0f | message id (8 bytes) | index | count | payload.. |
//! +------+------+----------------------+-------+-------+-----------+
//! ```
//!
//! Receivers reassemble chunks sharing a message id; they may arrive in any
//! order. A payload that fits in one datagram is sent without a header.
//!
//! The one-byte count field and the receiver limit cap a message at
//! [`MAX_CHUNK_COUNT`] chunks, so at most `128 * (max_datagram_size - 12)`
//! bytes. Larger payloads fail with `ChunkLimitExceeded` and nothing is sent.

use crate::core::{LoggerError, Result};

pub const CHUNK_MAGIC: [u8; 2] = [0x1e, 0x0f];
pub const CHUNK_HEADER_SIZE: usize = 12;
/// Receivers discard messages split into more chunks than this
pub const MAX_CHUNK_COUNT: usize = 128;

/// One datagram worth of a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpChunk {
    pub sequence_id: [u8; 8],
    pub chunk_index: u8,
    pub chunk_count: u8,
    pub payload: Vec<u8>,
}

impl UdpChunk {
    /// Whether this chunk is part of a multi-chunk message and carries a header
    pub fn is_chunked(&self) -> bool {
        self.chunk_count > 1
    }

    /// Bytes to put on the wire
    pub fn to_datagram(&self) -> Vec<u8> {
        if !self.is_chunked() {
            return self.payload.clone();
        }

        let mut datagram = Vec::with_capacity(CHUNK_HEADER_SIZE + self.payload.len());
        datagram.extend_from_slice(&CHUNK_MAGIC);
        datagram.extend_from_slice(&self.sequence_id);
        datagram.push(self.chunk_index);
        datagram.push(self.chunk_count);
        datagram.extend_from_slice(&self.payload);
        datagram
    }

    /// Parse a chunked datagram; `None` for unchunked or malformed input
    pub fn from_datagram(datagram: &[u8]) -> Option<Self> {
        if datagram.len() < CHUNK_HEADER_SIZE || datagram[..2] != CHUNK_MAGIC {
            return None;
        }

        let mut sequence_id = [0u8; 8];
        sequence_id.copy_from_slice(&datagram[2..10]);
        let chunk_index = datagram[10];
        let chunk_count = datagram[11];
        if chunk_index >= chunk_count {
            return None;
        }

        Some(Self {
            sequence_id,
            chunk_index,
            chunk_count,
            payload: datagram[CHUNK_HEADER_SIZE..].to_vec(),
        })
    }
}

/// Splits payloads to fit a maximum datagram size
#[derive(Debug, Clone, Copy)]
pub struct UdpChunkHelper {
    max_datagram_size: usize,
}

impl UdpChunkHelper {
    /// `max_datagram_size` includes the chunk header and must leave room for
    /// at least one payload byte
    pub fn new(max_datagram_size: usize) -> Result<Self> {
        if max_datagram_size <= CHUNK_HEADER_SIZE {
            return Err(LoggerError::config(
                "UdpChunkHelper",
                format!(
                    "maximum datagram size {} must exceed the {}-byte chunk header",
                    max_datagram_size, CHUNK_HEADER_SIZE
                ),
            ));
        }
        Ok(Self { max_datagram_size })
    }

    pub fn max_datagram_size(&self) -> usize {
        self.max_datagram_size
    }

    /// Payload bytes carried by one chunk
    pub fn chunk_payload_size(&self) -> usize {
        self.max_datagram_size - CHUNK_HEADER_SIZE
    }

    /// Number of chunks needed for `payload_len` bytes
    pub fn chunk_count(&self, payload_len: usize) -> usize {
        if payload_len <= self.chunk_payload_size() {
            1
        } else {
            payload_len.div_ceil(self.chunk_payload_size())
        }
    }

    /// Split with a fresh random message id
    pub fn chunk(&self, payload: &[u8]) -> Result<Vec<UdpChunk>> {
        self.chunk_with_id(payload, rand::random())
    }

    /// Split with a caller-provided message id
    pub fn chunk_with_id(&self, payload: &[u8], sequence_id: [u8; 8]) -> Result<Vec<UdpChunk>> {
        let count = self.chunk_count(payload.len());
        if count > MAX_CHUNK_COUNT {
            return Err(LoggerError::chunk_limit(count, MAX_CHUNK_COUNT));
        }

        if count == 1 {
            return Ok(vec![UdpChunk {
                sequence_id,
                chunk_index: 0,
                chunk_count: 1,
                payload: payload.to_vec(),
            }]);
        }

        Ok(payload
            .chunks(self.chunk_payload_size())
            .enumerate()
            .map(|(index, part)| UdpChunk {
                sequence_id,
                chunk_index: index as u8,
                chunk_count: count as u8,
                payload: part.to_vec(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_small_datagram_is_rejected() {
        for size in [0, 1, CHUNK_HEADER_SIZE] {
            let err = UdpChunkHelper::new(size).unwrap_err();
            assert!(err.is_configuration());
        }
        assert!(UdpChunkHelper::new(CHUNK_HEADER_SIZE + 1).is_ok());
    }

    #[test]
    fn test_small_and_large_payloads() {
        let helper = UdpChunkHelper::new(1200).unwrap();

        let small = helper.chunk(&[7u8; 10]).unwrap();
        assert_eq!(small.len(), 1);
        assert_eq!(small[0].chunk_count, 1);
        assert_eq!(small[0].to_datagram(), vec![7u8; 10]);

        let large = helper.chunk(&vec![1u8; 5000]).unwrap();
        assert_eq!(large.len(), 5);
        assert!(large.iter().all(|c| c.chunk_count == 5));
        assert!(large.iter().all(|c| c.sequence_id == large[0].sequence_id));
        assert!(large.iter().all(|c| c.to_datagram().len() <= 1200));
        assert_eq!(large[4].payload.len(), 5000 - 4 * 1188);
    }

    #[test]
    fn test_exact_fit_is_single_chunk() {
        let helper = UdpChunkHelper::new(112).unwrap();
        assert_eq!(helper.chunk(&[0u8; 100]).unwrap().len(), 1);
        assert_eq!(helper.chunk(&[0u8; 101]).unwrap().len(), 2);
    }

    #[test]
    fn test_datagram_header_layout() {
        let helper = UdpChunkHelper::new(16).unwrap();
        let id = [1, 2, 3, 4, 5, 6, 7, 8];
        let chunks = helper.chunk_with_id(b"abcdefghij", id).unwrap();
        assert_eq!(chunks.len(), 3);

        let datagram = chunks[1].to_datagram();
        assert_eq!(&datagram[..2], &CHUNK_MAGIC);
        assert_eq!(&datagram[2..10], &id);
        assert_eq!(datagram[10], 1);
        assert_eq!(datagram[11], 3);
        assert_eq!(&datagram[12..], b"efgh");

        assert_eq!(UdpChunk::from_datagram(&datagram), Some(chunks[1].clone()));
        assert_eq!(UdpChunk::from_datagram(b"{\"version\":\"1.1\"}"), None);
    }

    #[test]
    fn test_chunk_limit() {
        let helper = UdpChunkHelper::new(CHUNK_HEADER_SIZE + 1).unwrap();
        assert_eq!(helper.chunk(&[0u8; MAX_CHUNK_COUNT]).unwrap().len(), MAX_CHUNK_COUNT);

        let err = helper.chunk(&[0u8; MAX_CHUNK_COUNT + 1]).unwrap_err();
        assert!(matches!(err, LoggerError::ChunkLimitExceeded { chunks: 129, max: 128 }));
        assert!(err.is_transport());
    }

    #[test]
    fn test_empty_payload() {
        let helper = UdpChunkHelper::new(100).unwrap();
        let chunks = helper.chunk(&[]).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].payload.is_empty());
    }
}
