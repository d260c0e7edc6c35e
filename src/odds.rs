//! Hypergeometric draw odds.

/// Binomial coefficient as a float, computed multiplicatively.
pub fn combination(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    if k == 0 || k == n {
        return 1.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}

/// Percentage chance (0-100) of drawing at least `need` of the `target`
/// copies when drawing `draw` cards from a deck of `total` without replacement.
pub fn hypergeometric_at_least(total: usize, target: usize, draw: usize, need: usize) -> f64 {
    if need > target || need > draw || draw > total || target > total {
        return 0.0;
    }
    let all_hands = combination(total, draw);
    if all_hands <= 0.0 {
        return 0.0;
    }
    let mut probability = 0.0;
    for k in need..=draw.min(target) {
        probability += combination(target, k) * combination(total - target, draw - k) / all_hands;
    }
    (probability * 100.0).min(100.0)
}
