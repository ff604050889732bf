use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Failures while normalizing an audio byte stream.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("unsupported or unrecognized audio format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt audio stream: {0}")]
    Decode(String),

    #[error("audio stream contained no decodable frames")]
    Empty,

    #[error("wav encoding failed: {0}")]
    Encode(#[from] hound::Error),
}

/// Decode an audio byte stream of unknown encoding and re-encode it as
/// 16-bit PCM WAV, preserving the source sample rate and channel count.
/// The result is an in-memory buffer ready to be written or uploaded.
pub fn normalize_to_wav(bytes: &[u8]) -> Result<Vec<u8>, AudioError> {
    let (samples, sample_rate, channels) = decode_interleaved(bytes)?;

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Sniff the container format and decode every packet of the default audio
/// track into interleaved 16-bit samples.
fn decode_interleaved(bytes: &[u8]) -> Result<(Vec<i16>, u32, u16), AudioError> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::UnsupportedFormat("no decodable audio track".to_string()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut samples: Vec<i16> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<i16>> = None;
    let mut sample_rate = 0u32;
    let mut channels = 0u16;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buf.is_none() {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    channels = spec.channels.count() as u16;
                    sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            // A malformed packet is skippable; the rest of the stream may
            // still decode
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!("skipping undecodable packet: {}", e);
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        }
    }

    if samples.is_empty() || sample_rate == 0 || channels == 0 {
        return Err(AudioError::Empty);
    }

    Ok((samples, sample_rate, channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_wav_roundtrip_preserves_samples() {
        // A 440 Hz-ish ramp, mono, 16 kHz
        let samples: Vec<i16> = (0..1600).map(|i| ((i % 100) * 300 - 15000) as i16).collect();
        let input = make_wav(&samples, 16_000, 1);

        let output = normalize_to_wav(&input).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(output)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_stereo_channel_count_preserved() {
        let samples: Vec<i16> = (0..400).map(|i| (i * 50) as i16).collect();
        let input = make_wav(&samples, 44_100, 2);

        let output = normalize_to_wav(&input).unwrap();

        let reader = hound::WavReader::new(Cursor::new(output)).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44_100);
    }

    #[test]
    fn test_garbage_input_is_unsupported() {
        let garbage = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x02, 0x03];
        assert!(matches!(
            normalize_to_wav(&garbage),
            Err(AudioError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_empty_input_is_unsupported() {
        assert!(matches!(
            normalize_to_wav(&[]),
            Err(AudioError::UnsupportedFormat(_))
        ));
    }
}
