//! `std::io::Write` adapter over a [`Pipeline`].

use std::io::{self, Write};

use crate::pipeline::Pipeline;

/// Writes pipeline output through to an inner writer.
///
/// Call [`finish`](Self::finish) to flush the pipeline; dropping the writer
/// abandons the stream without emitting trailing blocks or tags.
#[derive(Debug)]
pub struct StreamWriter<W: Write> {
    pipeline: Pipeline,
    inner: W,
}

impl<W: Write> StreamWriter<W> {
    /// Drive `pipeline` into `inner`.
    pub fn new(pipeline: Pipeline, inner: W) -> Self {
        Self { pipeline, inner }
    }

    /// Borrow the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Flush the pipeline, write the tail, and return the inner writer.
    pub fn finish(self) -> io::Result<W> {
        let Self { pipeline, mut inner } = self;
        for chunk in pipeline.finish()? {
            inner.write_all(&chunk)?;
        }
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> Write for StreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for chunk in self.pipeline.write(buf)? {
            self.inner.write_all(&chunk)?;
        }
        Ok(buf.len())
    }

    /// Flushes the inner writer only. Pipeline residue stays buffered until
    /// [`finish`](StreamWriter::finish).
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use xorcipher_crypto::Iv;

    use crate::{
        config::StreamConfig, entropy::IvStrategy, envelope::Envelope, error::CipherError,
        pipeline::StreamIntegrity, session::Variant,
    };

    #[test]
    fn writer_matches_process_all() {
        let envelope = Envelope::new("io", Variant::Sfc32);
        let config = StreamConfig::new(32).unwrap();
        let strategy = IvStrategy::Fixed(Iv::new([3u8; 16]));
        let data: Vec<u8> = (0..200).map(|i| (i * 7) as u8).collect();

        let expected = envelope
            .encryptor(StreamIntegrity::ChainedMac, &config, &strategy)
            .unwrap()
            .process_all(&data)
            .unwrap();

        let pipeline = envelope.encryptor(StreamIntegrity::ChainedMac, &config, &strategy).unwrap();
        let mut writer = super::StreamWriter::new(pipeline, Vec::new());
        for piece in data.chunks(13) {
            writer.write_all(piece).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), expected);
    }

    #[test]
    fn integrity_failure_maps_to_invalid_data() {
        let envelope = Envelope::new("io", Variant::Sfc32);
        let config = StreamConfig::new(8).unwrap();
        let mut wire = envelope
            .encryptor(StreamIntegrity::ChainedMac, &config, &IvStrategy::Random)
            .unwrap()
            .process_all(&[1u8; 40])
            .unwrap();
        wire[3] ^= 0x04;

        let pipeline = envelope.decryptor(StreamIntegrity::ChainedMac, &config).unwrap();
        let mut writer = super::StreamWriter::new(pipeline, Vec::new());
        let err = writer.write_all(&wire).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        let source = err.into_inner().unwrap().downcast::<CipherError>().unwrap();
        assert_eq!(*source, CipherError::BlockCorrupted { index: 0 });
    }

    #[test]
    fn truncation_maps_to_unexpected_eof() {
        let envelope = Envelope::new("io", Variant::Sfc32);
        let pipeline = envelope.decryptor(StreamIntegrity::None, &StreamConfig::default()).unwrap();
        let mut writer = super::StreamWriter::new(pipeline, Vec::new());
        writer.write_all(&[0u8; 10]).unwrap();
        let err = writer.finish().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }
}
