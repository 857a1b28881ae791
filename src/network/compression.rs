//! GZIP payload compression

use crate::core::{LoggerError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Magic bytes every GZIP member starts with
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compress a payload into a single GZIP member
pub fn gzip(payload: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(payload.len() / 2 + 32),
        Compression::default(),
    );
    encoder
        .write_all(payload)
        .map_err(|e| LoggerError::io_operation("compressing payload", "gzip write failed", e))?;
    encoder
        .finish()
        .map_err(|e| LoggerError::io_operation("compressing payload", "gzip finish failed", e))
}

/// Prepare payload bytes, compressing them when asked to
pub fn encode_payload(payload: &str, compress: bool) -> Result<Vec<u8>> {
    if compress {
        gzip(payload.as_bytes())
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_gzip_decompresses_to_input() {
        let payload = r#"{"version":"1.1","short_message":"repeat repeat repeat repeat"}"#;
        let compressed = gzip(payload.as_bytes()).unwrap();
        assert_eq!(&compressed[..2], &GZIP_MAGIC);

        let mut decoded = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_encode_payload_passthrough() {
        assert_eq!(encode_payload("abc", false).unwrap(), b"abc".to_vec());
        assert_eq!(&encode_payload("abc", true).unwrap()[..2], &GZIP_MAGIC);
    }
}
