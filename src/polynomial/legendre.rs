//! Legendre polynomial evaluation.
//!
//! Legendre polynomials P_n(x) are orthogonal on [-1, 1] with weight 1:
//! ∫_{-1}^{1} P_m(x) P_n(x) dx = 2/(2n+1) δ_{mn}

/// Evaluate Legendre polynomial P_n(x) using the three-term recurrence
/// (n+1) P_{n+1}(x) = (2n+1) x P_n(x) - n P_{n-1}(x).
pub fn legendre(n: usize, x: f64) -> f64 {
    legendre_and_derivative(n, x).0
}

/// Evaluate P_n(x) and P'_n(x) in one pass of the recurrence.
///
/// The derivative follows from P'_n(x) = n (x P_n(x) - P_{n-1}(x)) / (x^2 - 1)
/// away from the endpoints, and from P'_n(±1) = (±1)^{n+1} n(n+1)/2 at them.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    if n == 1 {
        return (x, 1.0);
    }

    let mut p_prev = 1.0;
    let mut p_curr = x;
    for k in 1..n {
        let p_next = ((2 * k + 1) as f64 * x * p_curr - k as f64 * p_prev) / (k + 1) as f64;
        p_prev = p_curr;
        p_curr = p_next;
    }

    let endpoint = (n * (n + 1)) as f64 / 2.0;
    let dp = if (x - 1.0).abs() < 1e-14 {
        endpoint
    } else if (x + 1.0).abs() < 1e-14 {
        if n % 2 == 0 { -endpoint } else { endpoint }
    } else {
        n as f64 * (x * p_curr - p_prev) / (x * x - 1.0)
    };

    (p_curr, dp)
}

/// Orthonormal Legendre polynomial sqrt((2n+1)/2) P_n(x) and its derivative.
///
/// With this scaling the modal mass matrix is the identity, which makes the
/// modal energies used by smoothness indicators directly comparable.
pub fn legendre_normalized_and_derivative(n: usize, x: f64) -> (f64, f64) {
    let (p, dp) = legendre_and_derivative(n, x);
    let scale = ((2 * n + 1) as f64 / 2.0).sqrt();
    (scale * p, scale * dp)
}
