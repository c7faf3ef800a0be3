//! Exponentially weighted moving average.
//!
//! α = 1 − 0.5^(1/h), so an observation h steps old carries half the weight
//! of the current one. Seeded with the first value:
//! EWMA[0] = V[0], EWMA[t] = α·V[t] + (1 − α)·EWMA[t−1].
//! Defined from the first index; there is no warmup.

/// Smoothing factor for a halflife of `halflife` periods.
pub fn decay_alpha(halflife: usize) -> f64 {
    1.0 - 0.5_f64.powf(1.0 / halflife as f64)
}

pub fn calculate_ewma(values: &[f64], halflife: usize) -> Vec<f64> {
    if halflife == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = decay_alpha(halflife);
    let mut out = Vec::with_capacity(values.len());
    let mut ewma = values[0];
    out.push(ewma);

    for &v in &values[1..] {
        ewma = alpha * v + (1.0 - alpha) * ewma;
        out.push(ewma);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn alpha_halves_weight_after_halflife() {
        for h in [1, 2, 5, 20, 60] {
            let alpha = decay_alpha(h);
            assert_relative_eq!((1.0 - alpha).powi(h as i32), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn halflife_one_alpha_is_half() {
        assert_relative_eq!(decay_alpha(1), 0.5);
    }

    #[test]
    fn seeded_with_first_value() {
        let out = calculate_ewma(&[42.0, 50.0], 3);
        assert_eq!(out[0], 42.0);
    }

    #[test]
    fn recursive_calculation() {
        let values = [100.0, 160.0, 95.0, 130.0];
        let out = calculate_ewma(&values, 2);
        let alpha = decay_alpha(2);

        let e1 = alpha * 160.0 + (1.0 - alpha) * 100.0;
        let e2 = alpha * 95.0 + (1.0 - alpha) * e1;
        let e3 = alpha * 130.0 + (1.0 - alpha) * e2;

        assert_eq!(out.len(), 4);
        assert_relative_eq!(out[1], e1, epsilon = 1e-12);
        assert_relative_eq!(out[2], e2, epsilon = 1e-12);
        assert_relative_eq!(out[3], e3, epsilon = 1e-12);
    }

    #[test]
    fn constant_input_is_constant() {
        let out = calculate_ewma(&[7.0; 10], 4);
        for v in out {
            assert_relative_eq!(v, 7.0);
        }
    }

    #[test]
    fn empty_and_zero_halflife() {
        assert!(calculate_ewma(&[], 5).is_empty());
        assert!(calculate_ewma(&[1.0, 2.0], 0).is_empty());
    }
}
