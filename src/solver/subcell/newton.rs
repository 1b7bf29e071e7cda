//! Newton-bisection for nonlinear bounds.
//!
//! For one node and one adjacent subcell interface we look for the largest
//! β = 1 - α ∈ [0, 1 - α_current] with
//!
//! ```text
//! goal(β) = bound - q(u_safe + β dt a)      (lower bound: goal <= 0)
//! ```
//!
//! where `a` is the scaled antidiffusive direction. Newton steps that leave
//! the bracket [β_L, β_R] or produce inadmissible states fall back to
//! bisection.

use std::sync::Arc;

use crate::equations::{Equations, NonlinearVariable};

/// Parameters of one limiting problem.
pub(crate) struct NewtonProblem<'a, E, const N: usize> {
    pub variable: &'a Arc<dyn NonlinearVariable<E, N>>,
    pub bound: f64,
    pub lower: bool,
    pub max_iterations: usize,
    pub reltol: f64,
    pub abstol: f64,
}

/// Outcome of a Newton-bisection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct NewtonOutcome {
    pub alpha: f64,
    pub converged: bool,
}

impl<E: Equations<N>, const N: usize> NewtonProblem<'_, E, N> {
    fn goal(&self, u: &[f64; N], equations: &E) -> f64 {
        self.bound - self.variable.value(u, equations)
    }

    fn satisfied(&self, goal: f64) -> bool {
        let slack = self.abstol.max(self.bound.abs() * self.abstol);
        if self.lower {
            goal <= slack
        } else {
            goal >= -slack
        }
    }

    /// Limit the interface flux `direction` at a node whose low-order
    /// state is `u_safe` and whose current blending factor is `alpha`.
    pub(crate) fn solve(
        &self,
        alpha: f64,
        u_safe: &[f64; N],
        direction: &[f64; N],
        dt: f64,
        equations: &E,
    ) -> NewtonOutcome {
        let state = |beta: f64| {
            let mut u = *u_safe;
            for v in 0..N {
                u[v] += beta * dt * direction[v];
            }
            u
        };

        let mut beta = 1.0 - alpha;
        if beta <= 0.0 {
            return NewtonOutcome { alpha, converged: true };
        }

        let mut u_curr = state(beta);
        if equations.is_admissible(&u_curr) && self.satisfied(self.goal(&u_curr, equations)) {
            return NewtonOutcome { alpha, converged: true };
        }

        let mut beta_l: f64 = 0.0;
        let mut beta_r = beta;
        let mut converged = false;

        for _ in 0..self.max_iterations {
            let beta_old = beta;

            if equations.is_admissible(&u_curr) {
                let goal = self.goal(&u_curr, equations);
                if self.satisfied(goal) {
                    beta_l = beta;
                } else {
                    beta_r = beta;
                }

                let gradient = self.variable.gradient(&u_curr, equations);
                let dgoal: f64 = -(0..N).map(|v| gradient[v] * dt * direction[v]).sum::<f64>();
                if dgoal.abs() > f64::EPSILON {
                    beta -= goal / dgoal;
                }
                if !(beta_l..=beta_r).contains(&beta) {
                    beta = 0.5 * (beta_l + beta_r);
                }
            } else {
                beta_r = beta;
                beta = 0.5 * (beta_l + beta_r);
            }

            u_curr = state(beta);
            if !equations.is_admissible(&u_curr) {
                continue;
            }

            let goal = self.goal(&u_curr, equations);
            if self.satisfied(goal) {
                beta_l = beta;
            } else {
                beta_r = beta;
            }

            if (beta_old - beta).abs() < self.reltol
                || goal.abs() < self.abstol.max(self.bound.abs() * self.abstol)
            {
                converged = true;
                break;
            }
        }

        // Fall back to the last iterate known to satisfy the bound.
        let final_ok = equations.is_admissible(&u_curr) && self.satisfied(self.goal(&u_curr, equations));
        let beta_final = if final_ok { beta } else { beta_l };
        NewtonOutcome {
            alpha: alpha.max(1.0 - beta_final),
            converged,
        }
    }
}
