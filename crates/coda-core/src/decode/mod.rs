//! Uploaded media decoding
//!
//! Turns the raw bytes of an uploaded file into a planar PCM [`AudioAsset`]
//! via Symphonia. The declared MIME type is passed along as a probe hint
//! only; the container is always probed from the bytes themselves.
//!
//! Decode failure is terminal for the upload: no partial asset is ever
//! produced, and mid-stream corruption aborts rather than skipping damaged
//! packets, so the caller can surface a single error and leave existing
//! playback state untouched.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::types::{AudioAsset, Sample};

/// Errors produced while decoding an uploaded file
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The upload was zero bytes long
    #[error("media payload is empty")]
    EmptyInput,

    /// The container or codec could not be recognized
    #[error("unsupported media format: {0}")]
    UnsupportedFormat(String),

    /// The container holds no decodable audio track
    #[error("no audio track found")]
    NoAudioTrack,

    /// The audio track does not declare a sample rate
    #[error("audio track has no sample rate")]
    UnknownSampleRate,

    /// The stream is corrupt past the point of recovery
    #[error("malformed media stream: {0}")]
    Malformed(String),

    /// The stream ended before the declared sample count
    #[error("truncated media stream: expected {expected} frames, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    /// The stream decoded successfully but contained zero audio frames
    #[error("media stream contains no audio frames")]
    EmptyStream,
}

/// Decode uploaded media bytes into a PCM asset
///
/// `mime` is the upload's declared MIME type, used as a probe hint when
/// present. Duration metadata on the returned asset derives from the
/// decoded sample count, never from the container header.
pub fn decode_bytes(data: Vec<u8>, mime: Option<&str>) -> Result<AudioAsset, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(mime) = mime {
        hint.mime_type(mime);
    }

    // Probe the container
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    // First decodable audio track wins
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;
    let declared_frames = track.codec_params.n_frames;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let mut channels: Vec<Vec<Sample>> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<Sample>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream is signalled as an unexpected-EOF I/O error
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(DecodeError::Malformed(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        // Allocate channel buffers on the first decoded packet, once the
        // real signal spec is known
        if sample_buf.is_none() {
            let spec = *decoded.spec();
            channels = vec![Vec::new(); spec.channels.count()];
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            let channel_count = channels.len();
            for frame in buf.samples().chunks_exact(channel_count) {
                for (channel, &sample) in channels.iter_mut().zip(frame) {
                    channel.push(sample);
                }
            }
        }
    }

    let frames = channels.first().map(|c| c.len()).unwrap_or(0) as u64;
    if frames == 0 {
        return Err(DecodeError::EmptyStream);
    }
    if let Some(expected) = declared_frames {
        if frames < expected {
            return Err(DecodeError::Truncated {
                expected,
                actual: frames,
            });
        }
    }

    let asset = AudioAsset::from_channels(channels, sample_rate);
    log::info!(
        "decoded {}: {} channel(s), {} frames at {} Hz ({:.2}s)",
        asset.id(),
        asset.channel_count(),
        asset.frames(),
        asset.sample_rate(),
        asset.duration_seconds()
    );

    Ok(asset)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an in-memory 16-bit PCM WAV with the given per-channel samples
    fn wav_bytes(channels: &[Vec<f32>], sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: channels.len() as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..channels[0].len() {
            for channel in channels {
                let sample = (channel[i].clamp(-1.0, 1.0) * 32767.0) as i16;
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(matches!(
            decode_bytes(Vec::new(), None),
            Err(DecodeError::EmptyInput)
        ));
    }

    #[test]
    fn test_garbage_payload_rejected() {
        let result = decode_bytes(vec![0xAB; 256], Some("audio/mpeg"));
        assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_decode_stereo_wav() {
        let left: Vec<f32> = (0..4410).map(|i| (i as f32 / 4410.0).sin()).collect();
        let right: Vec<f32> = (0..4410).map(|i| (i as f32 / 4410.0).cos() * 0.5).collect();
        let bytes = wav_bytes(&[left.clone(), right], 44100);

        let asset = decode_bytes(bytes, Some("audio/wav")).unwrap();
        assert_eq!(asset.channel_count(), 2);
        assert_eq!(asset.sample_rate(), 44100);
        assert_eq!(asset.frames(), 4410);
        assert!((asset.duration_seconds() - 0.1).abs() < 1e-9);
        // 16-bit quantization keeps samples within one LSB of the source
        for (a, b) in asset.channel(0).iter().zip(&left) {
            assert!((a - b).abs() < 2.0 / 32768.0);
        }
    }

    #[test]
    fn test_truncated_wav_rejected() {
        let samples: Vec<f32> = (0..8000).map(|i| ((i % 100) as f32 / 50.0) - 1.0).collect();
        let mut bytes = wav_bytes(&[samples], 22050);
        // Chop the tail off the data chunk
        bytes.truncate(bytes.len() / 2);

        let result = decode_bytes(bytes, None);
        assert!(
            matches!(
                result,
                Err(DecodeError::Truncated { .. }) | Err(DecodeError::Malformed(_))
            ),
            "truncated stream must not yield a partial asset"
        );
    }
}
