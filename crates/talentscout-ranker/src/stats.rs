//! Statistical primitives shared by the normaliser and scorer.

use std::cmp::Ordering;

/// Percentiles are clamped into `[NORM_EPSILON, 1 − NORM_EPSILON]` before the
/// inverse normal CDF so the boundaries never map to ±∞.
pub const NORM_EPSILON: f64 = 1e-6;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// True when every value equals the first; empty input counts as constant.
pub fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Population standard deviation around `mean`.
///
/// Returns 1.0 instead of 0 (zero variance, single member, empty input) so
/// callers can always divide by it. A constant group is zero variance even
/// when rounding in `mean` leaves a residue.
pub fn population_std(values: &[f64], mean: f64) -> f64 {
    if is_constant(values) {
        return 1.0;
    }
    let variance = values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    let std = variance.sqrt();
    if std > 0.0 && std.is_finite() {
        std
    } else {
        1.0
    }
}

/// Descending-rank percentiles, in input order.
///
/// The value at 0-based position `i` of the descending sort gets
/// `1 − i/(n−1)`; a single value gets 1.0. Tied values all receive the
/// highest percentile of their tie group.
pub fn percentiles(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    match n {
        0 => return vec![],
        1 => return vec![1.0],
        _ => {}
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));

    let denom = (n - 1) as f64;
    let mut out = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Group starts at i, the best position any member holds.
        let pct = 1.0 - i as f64 / denom;
        for &idx in &order[i..=j] {
            out[idx] = pct;
        }
        i = j + 1;
    }
    out
}

/// Logistic function.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Inverse of the standard normal CDF, for `p` in (0, 1).
///
/// Acklam's rational approximation (relative error below 1.2e-9). `p` is
/// clamped into `[NORM_EPSILON, 1 − NORM_EPSILON]` first.
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    let p = if p.is_nan() {
        0.5
    } else {
        p.clamp(NORM_EPSILON, 1.0 - NORM_EPSILON)
    };

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// Inverse error function on (−1, 1), via `erfinv(x) = Φ⁻¹((x + 1)/2) / √2`.
pub fn erfinv(x: f64) -> f64 {
    normal_quantile((x + 1.0) / 2.0) / std::f64::consts::SQRT_2
}

/// Percentile mapped to a cross-source z: `√2 · erfinv(2p − 1)`.
pub fn unified_z(norm: f64) -> f64 {
    let p = norm.clamp(NORM_EPSILON, 1.0 - NORM_EPSILON);
    std::f64::consts::SQRT_2 * erfinv(2.0 * p - 1.0)
}
