/// Peak and RMS energy over a sample buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    /// Peak absolute amplitude.
    pub peak: f32,
    /// Root-mean-square energy.
    pub rms: f32,
}

/// Compute peak absolute amplitude and RMS over a buffer.
/// An empty buffer reports zero for both.
pub fn analyze(samples: &[f32]) -> Levels {
    if samples.is_empty() {
        return Levels { peak: 0.0, rms: 0.0 };
    }

    let mut peak = 0.0_f32;
    let mut sum_squares = 0.0_f64;
    for &sample in samples {
        let abs = sample.abs();
        if abs > peak {
            peak = abs;
        }
        sum_squares += (sample as f64) * (sample as f64);
    }

    Levels {
        peak,
        rms: (sum_squares / samples.len() as f64).sqrt() as f32,
    }
}

/// Apply a single linear gain in place.
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_is_silent() {
        let levels = analyze(&[]);
        assert_eq!(levels.peak, 0.0);
        assert_eq!(levels.rms, 0.0);
    }

    #[test]
    fn peak_and_rms_of_constant_signal() {
        let samples = vec![0.5_f32; 1000];
        let levels = analyze(&samples);
        assert_eq!(levels.peak, 0.5);
        assert!((levels.rms - 0.5).abs() < 1e-6);
    }

    #[test]
    fn peak_tracks_largest_magnitude() {
        let levels = analyze(&[0.1, -0.8, 0.3]);
        assert_eq!(levels.peak, 0.8);
    }

    #[test]
    fn gain_scales_in_place() {
        let mut samples = vec![0.1, -0.2];
        apply_gain(&mut samples, 2.0);
        assert_eq!(samples, vec![0.2, -0.4]);
    }
}
