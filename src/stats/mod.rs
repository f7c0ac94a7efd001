//! Order statistics over price lists that are already sorted ascending.
//!
//! Two percentile conventions live here and must stay separate:
//! [`nearest_rank`] picks an existing element, [`quartiles`] interpolates
//! between order statistics. They disagree on even-sized inputs.

/// Q1, Q2 and Q3 of a price list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// Everything the reporter needs from one side of one market.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub median: f64,
    pub total_volume: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub min: f64,
    pub max: f64,
}

#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value, or the mean of the two middle values for even lengths.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    let mid = n / 2;
    if n % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Element at `floor(n * p / 100)`, clamped to the last index.
/// Negative or NaN `p` lands on the first element.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    // float -> usize casts saturate, so negatives and NaN become 0
    let index = ((n as f64) * p / 100.0).floor() as usize;
    sorted[index.min(n - 1)]
}

/// Quartiles with the "exclusive" method: linear interpolation at
/// fractional rank `(n + 1) * k / 4`, with the integer rank clamped into
/// `[1, n - 1]` so small inputs extrapolate instead of failing.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub fn quartiles(sorted: &[f64]) -> Quartiles {
    const DIVISIONS: i64 = 4;

    let n = sorted.len();
    if n == 1 {
        let only = sorted[0];
        return Quartiles {
            q1: only,
            q2: only,
            q3: only,
        };
    }

    let m = n as i64 + 1;
    let cut = |i: i64| -> f64 {
        let j = (i * m / DIVISIONS).clamp(1, n as i64 - 1);
        let delta = i * m - j * DIVISIONS;
        let lo = sorted[(j - 1) as usize];
        let hi = sorted[j as usize];
        (lo * (DIVISIONS - delta) as f64 + hi * delta as f64) / DIVISIONS as f64
    };

    Quartiles {
        q1: cut(1),
        q2: cut(2),
        q3: cut(3),
    }
}

/// Rounds to two decimals on the exact binary value, ties to even.
/// Agrees with `{:.2}` formatting of the same value.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[7.0]), 7.0);
    }

    #[test]
    fn nearest_rank_differs_from_median_on_even_input() {
        let prices = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(nearest_rank(&prices, 50.0), 3.0);
        assert_eq!(median(&prices), 2.5);
    }

    #[test]
    fn nearest_rank_clamps() {
        let prices = [10.0, 20.0, 30.0];
        assert_eq!(nearest_rank(&prices, 0.0), 10.0);
        assert_eq!(nearest_rank(&prices, 100.0), 30.0);
        assert_eq!(nearest_rank(&prices, 250.0), 30.0);
        assert_eq!(nearest_rank(&prices, -10.0), 10.0);
        assert_eq!(nearest_rank(&prices, f64::NAN), 10.0);
    }

    #[test]
    fn nearest_rank_is_a_member_and_monotone() {
        let prices = [1.5, 2.0, 2.0, 3.25, 8.0, 9.5, 11.0];
        let mut last = f64::MIN;
        for step in 0..1000 {
            let p = f64::from(step) / 10.0;
            let value = nearest_rank(&prices, p);
            assert!(prices.contains(&value));
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn quartiles_exclusive_method() {
        let ten: Vec<f64> = (1..=10).map(f64::from).collect();
        let q = quartiles(&ten);
        assert!((q.q1 - 2.75).abs() < 1e-12);
        assert!((q.q2 - 5.5).abs() < 1e-12);
        assert!((q.q3 - 8.25).abs() < 1e-12);

        let q = quartiles(&[1.0, 2.0, 3.0, 4.0]);
        assert!((q.q1 - 1.25).abs() < 1e-12);
        assert!((q.q2 - 2.5).abs() < 1e-12);
        assert!((q.q3 - 3.75).abs() < 1e-12);
    }

    #[test]
    fn quartiles_extrapolate_on_two_values() {
        let q = quartiles(&[1.0, 2.0]);
        assert!((q.q1 - 0.75).abs() < 1e-12);
        assert!((q.q2 - 1.5).abs() < 1e-12);
        assert!((q.q3 - 2.25).abs() < 1e-12);
    }

    #[test]
    fn quartiles_of_single_value() {
        let q = quartiles(&[4.2]);
        assert_eq!(q, Quartiles { q1: 4.2, q2: 4.2, q3: 4.2 });
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(12.345_67), 12.35);
        assert_eq!(round2(2.675_1), 2.68);
        assert_eq!(round2(-1.006), -1.01);
    }

    #[test]
    fn round2_ties_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(3.125), 3.12);
        assert_eq!(round2(1.125), 1.12);
        assert_eq!(round2(0.375), 0.38);
    }
}
