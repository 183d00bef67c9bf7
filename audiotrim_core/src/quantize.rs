use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Positive full-scale value of a signed 16-bit sample.
pub const FULL_SCALE: f32 = i16::MAX as f32;

/// Noise added to each scaled sample before rounding, in units of one
/// 16-bit quantization step (LSB).
///
/// Amplitudes are clamped to `0.0..=1.0` when a [`Quantizer`] is built, so the
/// offset never exceeds a single step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dither {
    /// Plain rounding.
    None,
    /// Uniform offset in `[-amplitude, amplitude)`.
    Rectangular { amplitude: f32 },
    /// Triangular offset in `(-amplitude, amplitude)`, the difference of two
    /// uniform draws.
    Triangular { amplitude: f32 },
}

impl Default for Dither {
    fn default() -> Self {
        Dither::Rectangular { amplitude: 0.5 }
    }
}

impl Dither {
    pub(crate) fn sanitized(self) -> Self {
        fn clamp(amplitude: f32) -> f32 {
            if amplitude.is_finite() {
                amplitude.clamp(0.0, 1.0)
            } else {
                0.0
            }
        }

        match self {
            Dither::None => Dither::None,
            Dither::Rectangular { amplitude } => Dither::Rectangular {
                amplitude: clamp(amplitude),
            },
            Dither::Triangular { amplitude } => Dither::Triangular {
                amplitude: clamp(amplitude),
            },
        }
    }
}

/// Scale `sample` to 16-bit, add `offset`, round to nearest and saturate.
///
/// Out-of-range input never wraps: anything at or beyond full scale lands on
/// `i16::MIN` or `i16::MAX`. NaN maps to silence.
pub fn quantize_sample(sample: f32, offset: f32) -> i16 {
    let scaled = (sample * FULL_SCALE + offset).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

/// Stateful float-to-`i16` converter that draws one dither offset per sample.
#[derive(Debug)]
pub struct Quantizer {
    dither: Dither,
    rng: StdRng,
}

impl Quantizer {
    /// A fixed `seed` makes the dither sequence, and therefore the encoded
    /// output, reproducible.
    pub fn new(dither: Dither, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            dither: dither.sanitized(),
            rng,
        }
    }

    pub fn dither(&self) -> Dither {
        self.dither
    }

    pub fn next_offset(&mut self) -> f32 {
        match self.dither {
            Dither::None => 0.0,
            Dither::Rectangular { amplitude } => (self.rng.gen::<f32>() * 2.0 - 1.0) * amplitude,
            Dither::Triangular { amplitude } => {
                (self.rng.gen::<f32>() - self.rng.gen::<f32>()) * amplitude
            }
        }
    }

    pub fn quantize(&mut self, sample: f32) -> i16 {
        let offset = self.next_offset();
        quantize_sample(sample, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_instead_of_wrapping() {
        assert_eq!(quantize_sample(1.0, 0.5), i16::MAX);
        assert_eq!(quantize_sample(-1.0, -0.5), i16::MIN);
        assert_eq!(quantize_sample(-1.0, 0.0), -32_767);
        assert_eq!(quantize_sample(1.5, 0.0), i16::MAX);
        assert_eq!(quantize_sample(-3.0, 0.0), i16::MIN);
        assert_eq!(quantize_sample(f32::INFINITY, 0.0), i16::MAX);
        assert_eq!(quantize_sample(f32::NEG_INFINITY, 0.0), i16::MIN);
        assert_eq!(quantize_sample(f32::NAN, 0.0), 0);
    }

    #[test]
    fn rounds_to_nearest_step() {
        assert_eq!(quantize_sample(0.0, 0.0), 0);
        assert_eq!(quantize_sample(0.5, 0.0), 16_384);
        assert_eq!(quantize_sample(0.0, 0.49), 0);
        assert_eq!(quantize_sample(0.0, -0.49), 0);
    }

    #[test]
    fn dither_stays_within_one_step() {
        for dither in [
            Dither::default(),
            Dither::Triangular { amplitude: 1.0 },
            Dither::Rectangular { amplitude: 7.0 },
        ] {
            let mut quantizer = Quantizer::new(dither, Some(7));
            for _ in 0..10_000 {
                let offset = quantizer.next_offset();
                assert!(offset.abs() <= 1.0, "{dither:?} produced {offset}");
            }
        }
    }

    #[test]
    fn quantized_values_stay_in_range_for_extreme_input() {
        let mut quantizer = Quantizer::new(Dither::Triangular { amplitude: 1.0 }, Some(11));
        for step in -400..=400 {
            let sample = step as f32 / 100.0;
            let value = i32::from(quantizer.quantize(sample));
            assert!((i32::from(i16::MIN)..=i32::from(i16::MAX)).contains(&value));
        }
    }

    #[test]
    fn seeded_quantizers_agree() {
        let mut a = Quantizer::new(Dither::default(), Some(42));
        let mut b = Quantizer::new(Dither::default(), Some(42));
        let samples: Vec<f32> = (0..256).map(|n| (n as f32 * 0.01).sin() * 0.8).collect();
        let left: Vec<i16> = samples.iter().map(|&s| a.quantize(s)).collect();
        let right: Vec<i16> = samples.iter().map(|&s| b.quantize(s)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn no_dither_is_plain_rounding() {
        let mut quantizer = Quantizer::new(Dither::None, None);
        assert_eq!(quantizer.quantize(0.25), quantize_sample(0.25, 0.0));
        assert_eq!(quantizer.next_offset(), 0.0);
    }

    #[test]
    fn non_finite_amplitude_disables_dither() {
        let quantizer = Quantizer::new(Dither::Rectangular { amplitude: f32::NAN }, Some(1));
        assert_eq!(quantizer.dither(), Dither::Rectangular { amplitude: 0.0 });
    }
}
