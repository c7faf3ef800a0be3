//! Rolling sample standard deviation.
//!
//! STDDEV(n)[i] = sqrt(sum((V[i-j] - mean)^2 for j in 0..n) / (n - 1))
//! Warmup: the first (n-1) points are `None`. A window of one sample has no
//! sample deviation, so `n == 1` yields `None` everywhere.

pub fn rolling_stddev(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let warmup = window.saturating_sub(1);

    for i in 0..values.len() {
        if window < 2 || i < warmup {
            out.push(None);
            continue;
        }

        let slice = &values[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance = slice
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (window - 1) as f64;

        out.push(Some(variance.sqrt()));
    }
    out
}
