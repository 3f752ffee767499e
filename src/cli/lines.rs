//! Line framing for interactive input that survives bad lines

use crate::error::{MarketError, Result};
use bytes::BytesMut;
use std::io;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// Newline-delimited input where an over-long or non-UTF-8 line becomes an
/// error item instead of a stream error, so reading continues with the next line.
#[derive(Debug)]
pub struct InputLines {
    inner: LinesCodec,
    max_length: usize,
}

impl InputLines {
    pub fn new(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
            max_length,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn recover(
        &self,
        decoded: std::result::Result<Option<String>, LinesCodecError>,
    ) -> Result<Option<Result<String>>> {
        match decoded {
            Ok(line) => Ok(line.map(Ok)),
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                tracing::warn!("Dropped input line over {} bytes", self.max_length);
                Ok(Some(Err(MarketError::Validation(format!(
                    "line longer than {} bytes",
                    self.max_length
                )))))
            }
            Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!("Dropped input line that is not valid UTF-8");
                Ok(Some(Err(MarketError::Validation(
                    "input line is not valid UTF-8".to_string(),
                ))))
            }
            Err(LinesCodecError::Io(e)) => Err(e.into()),
        }
    }
}

impl Decoder for InputLines {
    type Item = Result<String>;
    type Error = MarketError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>> {
        let decoded = self.inner.decode(buf);
        self.recover(decoded)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>> {
        let decoded = self.inner.decode_eof(buf);
        self.recover(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut InputLines, input: &[u8]) -> Vec<Result<String>> {
        let mut buf = BytesMut::from(input);
        let mut items = Vec::new();
        while let Some(item) = codec.decode(&mut buf).unwrap() {
            items.push(item);
        }
        while let Some(item) = codec.decode_eof(&mut buf).unwrap() {
            items.push(item);
        }
        items
    }

    #[test]
    fn test_long_line_skipped_and_next_line_kept() {
        let mut codec = InputLines::new(16);
        let input = format!("say {}\noffer 40\n", "x".repeat(64));

        let items = decode_all(&mut codec, input.as_bytes());
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Err(MarketError::Validation(_))));
        assert_eq!(items[1].as_ref().unwrap(), "offer 40");
    }

    #[test]
    fn test_invalid_utf8_line_skipped() {
        let mut codec = InputLines::new(64);

        let items = decode_all(&mut codec, b"say hi\nsay \xff\xfe\nlist\n");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), "say hi");
        assert!(matches!(items[1], Err(MarketError::Validation(_))));
        assert_eq!(items[2].as_ref().unwrap(), "list");
    }

    #[test]
    fn test_long_trailing_line_at_eof() {
        let mut codec = InputLines::new(8);

        let items = decode_all(&mut codec, b"list\nsay 0123456789abcdef");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "list");
        assert!(matches!(items[1], Err(MarketError::Validation(_))));
    }
}
