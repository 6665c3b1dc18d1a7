//! Flat-slice vector kernels.
//!
//! Callers guarantee equal lengths; arenas fix the dimension at
//! construction so these only `debug_assert!` it.

/// Sigmoid arguments are clamped to `[-MAX_EXP, MAX_EXP]`.
pub const MAX_EXP: f32 = 6.0;

/// Inner product.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `y += alpha * x`.
#[inline]
pub fn axpy(alpha: f32, x: &[f32], y: &mut [f32]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Logistic function with the argument clamped to `[-MAX_EXP, MAX_EXP]`.
///
/// Returns the value and whether the argument was clipped.
#[inline]
pub fn sigmoid_clipped(x: f32) -> (f32, bool) {
    let clipped = !(-MAX_EXP..=MAX_EXP).contains(&x);
    let x = x.clamp(-MAX_EXP, MAX_EXP);
    (1.0 / (1.0 + (-x).exp()), clipped)
}

#[inline]
pub fn sigmoid(x: f32) -> f32 {
    sigmoid_clipped(x).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_and_axpy() {
        let a = [1.0, 2.0, 3.0];
        let mut b = [4.0, -5.0, 6.0];
        assert_eq!(dot(&a, &b), 12.0);
        axpy(0.5, &a, &mut b);
        assert_eq!(b, [4.5, -4.0, 7.5]);
    }

    #[test]
    fn test_sigmoid_clips() {
        assert_eq!(sigmoid(0.0), 0.5);
        let (hi, clipped) = sigmoid_clipped(1e9);
        assert!(clipped);
        assert_eq!(hi, sigmoid(MAX_EXP));
        let (lo, clipped) = sigmoid_clipped(f32::NEG_INFINITY);
        assert!(clipped);
        assert!(lo > 0.0);
        assert!(!sigmoid_clipped(MAX_EXP).1);
    }
}
