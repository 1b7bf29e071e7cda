//! Element-local subcell limiting.

use super::newton::NewtonProblem;
use super::{BoundSlot, SubcellLimiterIdp, bar_state};
use crate::equations::{Direction, Equations};
use crate::error::{DgError, Result};
use crate::flux::NumericalFlux;
use crate::operators::TensorLayout;

/// Add the low-order subcell finite volume residual along `axis` to
/// `low_order` and store the antidiffusive fluxes A = f̂ - F^FV of the
/// interior subcell interfaces.
///
/// `high_order` holds the flux-differencing volume term along `axis`; the
/// high-order interface fluxes f̂ are recovered from it by the telescoping
/// sum f̂_{i+1/2} = f̂_{i-1/2} + w_i V_i.
#[allow(clippy::too_many_arguments)]
pub(crate) fn subcell_fluxes_axis<E, SF, const N: usize>(
    axis: usize,
    u: &[[f64; N]],
    normals: &[Direction],
    high_order: &[[f64; N]],
    low_order: &mut [[f64; N]],
    antidiffusive: &mut [[f64; N]],
    layout: &TensorLayout,
    weights: &[f64],
    inverse_weights: &[f64],
    equations: &E,
    surface_flux: &SF,
) where
    E: Equations<N>,
    SF: NumericalFlux<E, N>,
{
    let n = layout.n();
    for t in 0..layout.n_face_nodes() {
        let line_normals = &normals[t * (n + 1)..(t + 1) * (n + 1)];
        let line_antidiffusive = &mut antidiffusive[t * (n - 1)..(t + 1) * (n - 1)];

        let first = layout.line_node(axis, t, 0);
        let mut fhat = equations.flux(&u[first], &line_normals[0]);
        for v in 0..N {
            low_order[first][v] -= inverse_weights[0] * fhat[v];
        }

        for i in 0..n - 1 {
            let left = layout.line_node(axis, t, i);
            let right = layout.line_node(axis, t, i + 1);
            let f_fv = surface_flux.flux(&u[left], &u[right], &line_normals[i + 1], equations);
            for v in 0..N {
                fhat[v] += weights[i] * high_order[left][v];
                low_order[left][v] += inverse_weights[i] * f_fv[v];
                low_order[right][v] -= inverse_weights[i + 1] * f_fv[v];
                line_antidiffusive[i][v] = fhat[v] - f_fv[v];
            }
        }

        let last = layout.line_node(axis, t, n - 1);
        let f_last = equations.flux(&u[last], &line_normals[n]);
        for v in 0..N {
            low_order[last][v] += inverse_weights[n - 1] * f_last[v];
        }
    }
}

/// Read-only data of one element's limiting step.
pub(crate) struct ElementLimiterInput<'a, E, const N: usize> {
    pub limiter: &'a SubcellLimiterIdp<E, N>,
    pub slots: &'a [BoundSlot],
    pub variable_names: &'a [&'static str; N],
    pub equations: &'a E,
    pub layout: &'a TensorLayout,
    pub inverse_weights: &'a [f64],
    /// Stage input
    pub u: &'a [[f64; N]],
    pub inverse_jacobian: &'a [f64],
    /// Subcell interface normals, `[(axis * nfn + t) * (n + 1) + i]`
    pub normals: &'a [Direction],
    /// Bar states of the element faces, `[face * nfn + t]`
    pub face_bar_states: &'a [[f64; N]],
    /// Antidiffusive fluxes, `[(axis * nfn + t) * (n - 1) + i]`
    pub antidiffusive: &'a [[f64; N]],
    pub dt: f64,
}

/// Mutable per-element buffers of the limiting step.
pub(crate) struct ElementLimiterOutput<'a, const N: usize> {
    /// Low-order residual on entry, limited residual on exit
    pub du: &'a mut [[f64; N]],
    /// `[node * n_slots + slot]`
    pub bounds: &'a mut [f64],
    /// Blending factor per node (0: high order)
    pub alpha: &'a mut [f64],
    /// Scratch for the low-order forward Euler states
    pub u_safe: &'a mut [[f64; N]],
}

/// Index of the line through `idx` parallel to `axis`.
#[inline]
fn line_index(layout: &TensorLayout, axis: usize, idx: &[usize; 3]) -> usize {
    let mut t = 0;
    let mut scale = 1;
    for (d, &i) in idx.iter().enumerate().take(layout.ndims()) {
        if d != axis {
            t += i * scale;
            scale *= layout.n();
        }
    }
    t
}

/// Interior subcell interfaces adjacent to `node`, as
/// (index into the antidiffusive fluxes, sign of the contribution, axis).
fn adjacent_interfaces(layout: &TensorLayout, node: usize) -> impl Iterator<Item = (usize, f64, usize)> {
    let layout = *layout;
    let n = layout.n();
    let nfn = layout.n_face_nodes();
    let idx = layout.multi_index(node);
    let ndims = layout.ndims();
    (0..ndims).flat_map(move |axis| {
        let i = idx[axis];
        let base = (axis * nfn + line_index(&layout, axis, &idx)) * (n - 1);
        let minus = (i > 0).then(|| (base + i - 1, 1.0, axis));
        let plus = (i + 1 < n).then(|| (base + i, -1.0, axis));
        minus.into_iter().chain(plus)
    })
}

/// Compute bounds and blending factors of one element and apply the
/// limited antidiffusive correction to `output.du`.
///
/// Errors carry element id 0; the caller attaches the real one.
pub(crate) fn limit_element<E: Equations<N>, const N: usize>(
    input: &ElementLimiterInput<'_, E, N>,
    output: &mut ElementLimiterOutput<'_, N>,
) -> Result<()> {
    let ElementLimiterInput {
        limiter,
        slots,
        variable_names,
        equations,
        layout,
        inverse_weights,
        u,
        inverse_jacobian,
        normals,
        face_bar_states,
        antidiffusive,
        dt,
    } = *input;
    let n = layout.n();
    let nfn = layout.n_face_nodes();
    let n_nodes = layout.n_nodes();
    let n_slots = slots.len();

    // Local bounds from the stage input and the bar states.
    for node in 0..n_nodes {
        for (s, slot) in slots.iter().enumerate() {
            if slot.is_local() {
                output.bounds[node * n_slots + s] = slot.value(&u[node], limiter, equations);
            }
        }
    }
    let widen = |bounds: &mut [f64], node: usize, state: &[f64; N]| {
        for (s, slot) in slots.iter().enumerate() {
            if slot.is_local() {
                slot.widen(&mut bounds[node * n_slots + s], state, limiter, equations);
            }
        }
    };
    for axis in 0..layout.ndims() {
        for t in 0..nfn {
            for i in 0..n - 1 {
                let left = layout.line_node(axis, t, i);
                let right = layout.line_node(axis, t, i + 1);
                let normal = &normals[(axis * nfn + t) * (n + 1) + i + 1];
                let bar = bar_state(&u[left], &u[right], normal, equations);
                widen(&mut *output.bounds, left, &bar);
                widen(&mut *output.bounds, right, &bar);
            }
        }
    }
    for face in 0..layout.n_faces() {
        for t in 0..nfn {
            widen(&mut *output.bounds, layout.face_node(face, t), &face_bar_states[face * nfn + t]);
        }
    }

    // Low-order forward Euler states.
    for node in 0..n_nodes {
        for v in 0..N {
            output.u_safe[node][v] = u[node][v] + dt * output.du[node][v];
        }
    }

    // Feasibility of the low-order update and the positivity bounds.
    let beta = limiter.positivity_correction_factor;
    for node in 0..n_nodes {
        let u_safe = &output.u_safe[node];
        if limiter.has_nonlinear() && !equations.is_admissible(u_safe) {
            return Err(DgError::InadmissibleState {
                element: 0,
                node,
                reason: "low-order update is not admissible".to_string(),
            });
        }
        for (s, &slot) in slots.iter().enumerate() {
            let value = slot.value(u_safe, limiter, equations);
            let bound = &mut output.bounds[node * n_slots + s];
            let infeasible = |bound: f64| DgError::InfeasibleLimiter {
                element: 0,
                node,
                variable: limiter.slot_name(slot, variable_names),
                value,
                bound,
            };
            if slot.is_local() {
                let deviation = slot.deviation(value, *bound);
                if !(deviation <= limiter.feasibility_tolerance * bound.abs().max(1.0)) {
                    return Err(infeasible(*bound));
                }
                // Round-off can leave the low-order value just outside.
                if deviation > 0.0 {
                    *bound = value;
                }
            } else {
                if !(value >= 0.0) {
                    return Err(infeasible(0.0));
                }
                *bound = beta * value;
            }
        }
    }

    // Blending factors.
    output.alpha.fill(0.0);
    let gamma = limiter.gamma(layout.ndims());
    let (reltol, abstol) = limiter.newton_tolerances;
    let mut newton_failures = 0usize;

    for node in 0..n_nodes {
        let idx = layout.multi_index(node);
        let scale = |axis: usize| inverse_jacobian[node] * inverse_weights[idx[axis]];

        for (s, &slot) in slots.iter().enumerate() {
            let bound = output.bounds[node * n_slots + s];
            match slot {
                BoundSlot::TwoSidedMin(v) | BoundSlot::TwoSidedMax(v) | BoundSlot::PositivityCons(v) => {
                    // Zalesak: total antidiffusive inflow versus the room left to the bound.
                    let lower = slot.is_lower();
                    let mut p = 0.0;
                    for (f, sign, axis) in adjacent_interfaces(layout, node) {
                        let c = sign * antidiffusive[f][v] * scale(axis);
                        p += if lower { c.min(0.0) } else { c.max(0.0) };
                    }
                    let room = (bound - output.u_safe[node][v]) / dt;
                    let ratio = if lower {
                        if p < 0.0 { room.min(0.0) / p } else { 1.0 }
                    } else if p > 0.0 {
                        room.max(0.0) / p
                    } else {
                        1.0
                    };
                    output.alpha[node] = output.alpha[node].max(1.0 - ratio.min(1.0));
                }
                BoundSlot::PositivityNonlinear(i) | BoundSlot::OneSided(i, _) => {
                    let variable = match slot {
                        BoundSlot::PositivityNonlinear(_) => &limiter.positivity_variables_nonlinear[i],
                        _ => &limiter.local_onesided_variables_nonlinear[i].variable,
                    };
                    let problem = NewtonProblem {
                        variable,
                        bound,
                        lower: slot.is_lower(),
                        max_iterations: limiter.max_iterations_newton,
                        reltol,
                        abstol,
                    };
                    for (f, sign, axis) in adjacent_interfaces(layout, node) {
                        let factor = gamma * sign * scale(axis);
                        let mut direction = [0.0; N];
                        for v in 0..N {
                            direction[v] = factor * antidiffusive[f][v];
                        }
                        let outcome =
                            problem.solve(output.alpha[node], &output.u_safe[node], &direction, dt, equations);
                        output.alpha[node] = outcome.alpha;
                        if !outcome.converged {
                            newton_failures += 1;
                        }
                    }
                }
            }
        }
    }

    if newton_failures > 0 {
        log::warn!(
            "Newton-bisection hit the iteration cap ({}) on {} subcell interfaces",
            limiter.max_iterations_newton,
            newton_failures
        );
    }

    // Limited antidiffusive correction; each interface takes the larger
    // factor of its two nodes.
    for axis in 0..layout.ndims() {
        for t in 0..nfn {
            for i in 0..n - 1 {
                let left = layout.line_node(axis, t, i);
                let right = layout.line_node(axis, t, i + 1);
                let alpha = output.alpha[left].max(output.alpha[right]);
                let a = &antidiffusive[(axis * nfn + t) * (n - 1) + i];
                let scale_left = (1.0 - alpha) * inverse_jacobian[left] * inverse_weights[i];
                let scale_right = (1.0 - alpha) * inverse_jacobian[right] * inverse_weights[i + 1];
                for v in 0..N {
                    output.du[left][v] -= scale_left * a[v];
                    output.du[right][v] += scale_right * a[v];
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_interfaces_of_corner_and_center() {
        let layout = TensorLayout::new(2, 3);
        // corner node (0, 0): one interface per axis, both on its plus side
        let corner: Vec<_> = adjacent_interfaces(&layout, 0).collect();
        assert_eq!(corner, vec![(0, -1.0, 0), (6, -1.0, 1)]);

        // center node (1, 1): two interfaces per axis
        let center: Vec<_> = adjacent_interfaces(&layout, 4).collect();
        assert_eq!(center.len(), 4);
        assert_eq!(center[0], (2, 1.0, 0));
        assert_eq!(center[1], (3, -1.0, 0));
        assert_eq!(center[2], (8, 1.0, 1));
        assert_eq!(center[3], (9, -1.0, 1));
    }

    #[test]
    fn test_line_index_matches_line_node() {
        let layout = TensorLayout::new(3, 4);
        for axis in 0..3 {
            for t in 0..layout.n_face_nodes() {
                for along in 0..4 {
                    let node = layout.line_node(axis, t, along);
                    assert_eq!(line_index(&layout, axis, &layout.multi_index(node)), t);
                }
            }
        }
    }
}
