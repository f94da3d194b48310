use rand::Rng;

/// Rescales `value` into [0, 1] over `[low, high]`; a degenerate range maps to 0.
pub fn normalise(value: f64, low: f64, high: f64) -> f64 {
    if high - low < 1e-12 {
        return 0.0;
    }
    (value - low) / (high - low)
}

/// Normalises non-negative weights into a distribution; `None` if nothing is positive.
pub fn pdf(weights: &[f64]) -> Option<Vec<f64>> {
    let sum: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if sum <= 0.0 || !sum.is_finite() {
        return None;
    }
    Some(weights.iter().map(|w| w.max(0.0) / sum).collect())
}

/// Boltzmann distribution of `values / temperature`, shifted by the max for stability.
pub fn softmax(values: &[f64], temperature: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let exps: Vec<f64> = values.iter().map(|v| ((v - max) / temperature).exp()).collect();
    let sum: f64 = exps.iter().sum();

    exps.into_iter().map(|e| e / sum).collect()
}

/// Draws an index from a distribution that sums to one.
pub fn sample_from<R: Rng + ?Sized>(probabilities: &[f64], rng: &mut R) -> usize {
    let roll: f64 = rng.gen();

    let mut cumulative = 0.0;
    for (index, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if roll < cumulative {
            return index;
        }
    }

    // rounding can leave the sum just short of 1
    probabilities.iter().rposition(|p| *p > 0.0).unwrap_or(0)
}
