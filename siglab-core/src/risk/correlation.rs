//! Inter-position correlation scoring.

/// Mean absolute pairwise Pearson correlation across return series.
///
/// Series are truncated to the shortest length so pairs stay aligned.
/// Fewer than two usable series, or series shorter than two points, score 0.
pub fn correlation_score(return_series: &[Vec<f64>]) -> f64 {
    let usable: Vec<&Vec<f64>> = return_series.iter().filter(|s| s.len() >= 2).collect();
    if usable.len() < 2 {
        return 0.0;
    }
    let len = usable.iter().map(|s| s.len()).min().unwrap_or(0);
    if len < 2 {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut pairs = 0usize;
    for i in 0..usable.len() {
        for j in (i + 1)..usable.len() {
            if let Some(r) = pearson(&usable[i][..len], &usable[j][..len]) {
                sum += r.abs();
                pairs += 1;
            }
        }
    }
    if pairs == 0 {
        0.0
    } else {
        sum / pairs as f64
    }
}

/// Pearson correlation of two equal-length slices. None when either side has
/// zero variance.
fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    if var_a < 1e-15 || var_b < 1e-15 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}
