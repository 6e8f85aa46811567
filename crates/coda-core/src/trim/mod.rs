//! Sample-accurate trimming and WAV export
//!
//! Slices an asset's PCM by region-derived sample indices and serializes
//! the result to a standard RIFF/WAVE container: a 44-byte header followed
//! by interleaved 16-bit signed little-endian PCM. In-memory PCM is
//! floating point, so export always quantizes to 16-bit.
//!
//! Trimming is synchronous and always succeeds for a structurally valid
//! asset; region validity is guaranteed by [`SelectionRegion`]'s
//! constructor and is not re-checked here.

use std::io::Cursor;

use crate::types::{AudioAsset, Sample, SelectionRegion};

/// Size of the canonical RIFF/WAVE header in bytes
pub const WAV_HEADER_LEN: usize = 44;

/// Bytes per exported sample (16-bit PCM)
pub const BYTES_PER_SAMPLE: usize = 2;

/// Output of a trim operation
#[derive(Debug, Clone)]
pub struct TrimResult {
    /// The trimmed copy: same channel count and sample rate, fresh identity
    pub asset: AudioAsset,
    /// The trimmed audio encoded as a complete WAV file
    pub wav_bytes: Vec<u8>,
}

impl TrimResult {
    /// Per-channel sample count of the trimmed copy
    pub fn frames(&self) -> usize {
        self.asset.frames()
    }
}

/// Trim `asset` to `region` and encode the slice as WAV
///
/// Sample bounds are `floor(pct / 100 * frames)` on both ends, matching
/// the displayed selection exactly; the encoded byte length is
/// `44 + frames * channels * 2`.
pub fn trim(asset: &AudioAsset, region: SelectionRegion) -> TrimResult {
    let total = asset.frames();
    let start = region.start_sample(total);
    let end = region.end_sample(total);

    let channels: Vec<Vec<Sample>> = asset
        .channels()
        .iter()
        .map(|channel| channel[start..end].to_vec())
        .collect();
    let trimmed = AudioAsset::from_channels(channels, asset.sample_rate());

    let wav_bytes = encode_wav(&trimmed);

    log::info!(
        "trimmed {} [{:.1}%, {:.1}%] -> {}: {} frames, {} bytes",
        asset.id(),
        region.start_pct(),
        region.end_pct(),
        trimmed.id(),
        trimmed.frames(),
        wav_bytes.len()
    );

    TrimResult {
        asset: trimmed,
        wav_bytes,
    }
}

/// Encode an asset as a 16-bit PCM WAV file in memory
///
/// Samples are clamped to [-1, 1] and quantized; channels are interleaved
/// frame by frame in channel order.
pub fn encode_wav(asset: &AudioAsset) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: asset.channel_count() as u16,
        sample_rate: asset.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)
        .expect("in-memory WAV writer always opens");

    for i in 0..asset.frames() {
        for channel in asset.channels() {
            let clamped = channel[i].clamp(-1.0, 1.0);
            writer
                .write_sample((clamped * 32767.0) as i16)
                .expect("in-memory WAV write cannot fail");
        }
    }

    writer.finalize().expect("in-memory WAV finalize cannot fail");
    cursor.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_asset(frames: usize, sample_rate: u32) -> AudioAsset {
        let left: Vec<f32> = (0..frames).map(|i| ((i % 200) as f32 / 100.0) - 1.0).collect();
        let right: Vec<f32> = (0..frames).map(|i| ((i % 320) as f32 / 160.0) - 1.0).collect();
        AudioAsset::from_channels(vec![left, right], sample_rate)
    }

    #[test]
    fn test_trim_sample_count_concrete() {
        // 10.0s stereo at 44100 Hz, region 20% -> 50%: 3.0s of audio
        let asset = stereo_asset(441_000, 44100);
        let region = SelectionRegion::new(20.0, 50.0).unwrap();

        let result = trim(&asset, region);
        assert_eq!(result.frames(), 132_300);
        assert_eq!(result.asset.channel_count(), 2);
        assert_eq!(result.asset.sample_rate(), 44100);
        assert_eq!(
            result.wav_bytes.len(),
            WAV_HEADER_LEN + 132_300 * 2 * BYTES_PER_SAMPLE
        );
        assert_eq!(result.wav_bytes.len(), 529_244);
    }

    #[test]
    fn test_trim_count_within_one_of_rounded_span() {
        // Bounds are floored independently, so the slice length may differ
        // from the rounded span by at most one frame
        for &(total, start, end) in &[
            (44_101usize, 13.3f64, 77.7f64),
            (99_991, 0.1, 99.9),
            (12_345, 33.0, 66.0),
            (7, 10.0, 90.0),
        ] {
            let channels = vec![vec![0.0f32; total]];
            let asset = AudioAsset::from_channels(channels, 44100);
            let region = SelectionRegion::new(start, end).unwrap();

            let result = trim(&asset, region);
            let expected = ((end - start) / 100.0 * total as f64).round() as i64;
            let got = result.frames() as i64;
            assert!(
                (got - expected).abs() <= 1,
                "total={} region=({}, {}): got {} expected {}±1",
                total,
                start,
                end,
                got,
                expected
            );
        }
    }

    #[test]
    fn test_trim_slices_expected_samples() {
        let samples: Vec<f32> = (0..1000).map(|i| i as f32 / 1000.0).collect();
        let asset = AudioAsset::from_channels(vec![samples.clone()], 48000);
        let region = SelectionRegion::new(10.0, 20.0).unwrap();

        let result = trim(&asset, region);
        assert_eq!(result.asset.channel(0), &samples[100..200]);
    }

    #[test]
    fn test_wav_round_trip_preserves_format() {
        let asset = stereo_asset(4410, 44100);
        let region = SelectionRegion::new(20.0, 50.0).unwrap();
        let result = trim(&asset, region);

        let reader = hound::WavReader::new(Cursor::new(result.wav_bytes.clone())).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.len() as usize, result.frames() * 2);
    }

    #[test]
    fn test_decode_round_trip_preserves_shape() {
        // The encoder's output must decode back to the same channel
        // count, sample rate and frame count
        let asset = stereo_asset(22_050, 44100);
        let region = SelectionRegion::new(5.0, 95.0).unwrap();
        let result = trim(&asset, region);

        let decoded = crate::decode::decode_bytes(result.wav_bytes.clone(), Some("audio/wav")).unwrap();
        assert_eq!(decoded.channel_count(), result.asset.channel_count());
        assert_eq!(decoded.sample_rate(), result.asset.sample_rate());
        assert_eq!(decoded.frames(), result.frames());
    }

    #[test]
    fn test_quantization_clamps_out_of_range() {
        let asset = AudioAsset::from_channels(vec![vec![2.0f32, -2.0, 0.0]], 8000);
        let bytes = encode_wav(&asset);

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![32767, -32767, 0]);
    }

    #[test]
    fn test_full_region_is_identity_slice() {
        let asset = stereo_asset(1000, 44100);
        let result = trim(&asset, SelectionRegion::full());
        assert_eq!(result.frames(), 1000);
        assert_ne!(result.asset.id(), asset.id());
    }
}
