//! Pointwise source terms s(u, x, t).

use crate::equations::{Direction, Equations};

/// Source term evaluated at every solution node and added to the residual.
///
/// Implementations must be thread-safe (`Send + Sync`) for parallel
/// computation. Closures `Fn(&[f64; N], &Direction, f64, &E) -> [f64; N]`
/// implement the trait directly.
pub trait SourceTerms<E: Equations<N>, const N: usize>: Send + Sync {
    /// Evaluate the source at a single node.
    fn source(&self, u: &[f64; N], x: &Direction, t: f64, equations: &E) -> [f64; N];

    /// Name of this source term for debugging and logging.
    fn name(&self) -> &'static str {
        "source"
    }
}

impl<E, F, const N: usize> SourceTerms<E, N> for F
where
    E: Equations<N>,
    F: Fn(&[f64; N], &Direction, f64, &E) -> [f64; N] + Send + Sync,
{
    #[inline]
    fn source(&self, u: &[f64; N], x: &Direction, t: f64, equations: &E) -> [f64; N] {
        self(u, x, t, equations)
    }
}

/// Sum of several source terms.
///
/// # Example
/// ```
/// use dgsem::equations::{Direction, LinearScalarAdvection};
/// use dgsem::source::{CombinedSource, SourceTerms};
///
/// type Eq = LinearScalarAdvection<1>;
/// let decay = |u: &[f64; 1], _x: &Direction, _t: f64, _eq: &Eq| [-u[0]];
/// let forcing = |_u: &[f64; 1], x: &Direction, _t: f64, _eq: &Eq| [x[0]];
/// let combined = CombinedSource::<Eq, 1>::new().with(decay).with(forcing);
///
/// let eq = LinearScalarAdvection::new([1.0]);
/// assert_eq!(combined.source(&[2.0], &[0.5, 0.0, 0.0], 0.0, &eq), [-1.5]);
/// ```
pub struct CombinedSource<E: Equations<N>, const N: usize> {
    sources: Vec<Box<dyn SourceTerms<E, N>>>,
}

impl<E: Equations<N>, const N: usize> Default for CombinedSource<E, N> {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
        }
    }
}

impl<E: Equations<N>, const N: usize> CombinedSource<E, N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source term to the combination.
    pub fn with<S: SourceTerms<E, N> + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Number of source terms in the combination.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the combination is empty.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<E: Equations<N>, const N: usize> SourceTerms<E, N> for CombinedSource<E, N> {
    fn source(&self, u: &[f64; N], x: &Direction, t: f64, equations: &E) -> [f64; N] {
        let mut total = [0.0; N];
        for source in &self.sources {
            let s = source.source(u, x, t, equations);
            for v in 0..N {
                total[v] += s[v];
            }
        }
        total
    }

    fn name(&self) -> &'static str {
        "combined"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::CompressibleEuler;

    #[test]
    fn test_closure_source_matches_manufactured_terms() {
        let eq = CompressibleEuler::<2>::new(1.4);
        let source = |u: &[f64; 4], x: &Direction, t: f64, eq: &CompressibleEuler<2>| {
            eq.source_terms_convergence_test(u, x, t)
        };
        let x = [0.3, 0.7, 0.0];
        let u = eq.initial_condition_convergence_test(&x, 0.1);
        assert_eq!(
            source.source(&u, &x, 0.1, &eq),
            eq.source_terms_convergence_test(&u, &x, 0.1)
        );
    }

    #[test]
    fn test_empty_combination_is_zero() {
        let eq = CompressibleEuler::<1>::new(1.4);
        let combined = CombinedSource::<CompressibleEuler<1>, 3>::new();
        assert!(combined.is_empty());
        assert_eq!(combined.source(&[1.0, 0.0, 2.5], &[0.0; 3], 0.0, &eq), [0.0; 3]);
    }
}
