use std::io::Cursor;

use anyhow::{Context, Result};

/// Encode floating-point samples as an in-memory 16-bit PCM WAV file.
///
/// Samples are clamped to [-1.0, 1.0] before quantization. Negative values
/// scale by the negative full-scale magnitude (32768) and positive values by
/// the positive one (32767), so full-scale input never overflows. Zero
/// samples produce a header-only 44-byte container.
pub fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).context("Failed to create WAV writer")?;
        for &sample in samples {
            writer
                .write_sample(quantize(sample))
                .context("Failed to write sample to WAV buffer")?;
        }
        writer.finalize().context("Failed to finalize WAV buffer")?;
    }

    Ok(cursor.into_inner())
}

fn quantize(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn declared_length_is_44_plus_2n() {
        let samples: Vec<f32> = (0..480)
            .map(|i| (i as f32 * 0.1).sin() * 0.5)
            .collect();
        let bytes = encode_wav(&samples, 16_000, 1).unwrap();

        assert_eq!(bytes.len(), 44 + 2 * samples.len());
        // RIFF chunk size field: file length minus the 8-byte RIFF header
        let riff_len = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        assert_eq!(riff_len as usize, 36 + 2 * samples.len());
        // data chunk size field
        let data_len = u32::from_le_bytes(bytes[40..44].try_into().unwrap());
        assert_eq!(data_len as usize, 2 * samples.len());
    }

    #[test]
    fn header_declares_rate_and_channels() {
        let bytes = encode_wav(&[0.0; 100], 16_000, 1).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 100);
    }

    #[test]
    fn zero_samples_yield_header_only_container() {
        let bytes = encode_wav(&[], 16_000, 1).unwrap();
        assert_eq!(bytes.len(), 44);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    #[test]
    fn quantization_clamps_and_scales_symmetrically() {
        assert_eq!(quantize(-1.0), i16::MIN);
        assert_eq!(quantize(1.0), i16::MAX);
        assert_eq!(quantize(-2.0), i16::MIN);
        assert_eq!(quantize(2.0), i16::MAX);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), (0.5 * 32767.0) as i16);
        assert_eq!(quantize(-0.5), (-0.5 * 32768.0) as i16);
    }

    #[test]
    fn round_trips_through_hound() {
        let samples = vec![0.0, 0.25, -0.25, 0.99, -0.99];
        let bytes = encode_wav(&samples, 16_000, 1).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let decoded: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), samples.len());
        assert_eq!(decoded[0], 0);
        assert!(decoded[1] > 8000 && decoded[1] < 8200);
        assert!(decoded[2] < -8000 && decoded[2] > -8300);
    }
}
