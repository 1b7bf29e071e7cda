//! Boundary condition trait and the generic conditions.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::equations::{Direction, Equations, WallReflection};
use crate::error::{DgError, Result};
use crate::flux::NumericalFlux;
use crate::mesh::BoundaryTag;

/// Condition imposed weakly through the surface flux at boundary faces.
///
/// The default flux evaluates the surface flux between the interior trace
/// and the external state, with the interior on the `u_ll` side and the
/// outward scaled normal.
pub trait BoundaryCondition<E: Equations<N>, const N: usize>: Send + Sync {
    /// Exterior state seen across the boundary.
    fn external_state(
        &self,
        u_inner: &[f64; N],
        normal: &Direction,
        x: &Direction,
        t: f64,
        equations: &E,
    ) -> [f64; N];

    /// Numerical flux through the boundary.
    fn boundary_flux(
        &self,
        u_inner: &[f64; N],
        normal: &Direction,
        x: &Direction,
        t: f64,
        surface_flux: &dyn NumericalFlux<E, N>,
        equations: &E,
    ) -> [f64; N] {
        let u_outer = self.external_state(u_inner, normal, x, t, equations);
        surface_flux.flux(u_inner, &u_outer, normal, equations)
    }

    /// Name of this boundary condition for debugging/logging.
    fn name(&self) -> &'static str;
}

/// Prescribed exterior state u_b(x, t).
pub struct BoundaryConditionDirichlet<F> {
    state: F,
}

impl<F> BoundaryConditionDirichlet<F> {
    pub fn new(state: F) -> Self {
        Self { state }
    }
}

impl<E, F, const N: usize> BoundaryCondition<E, N> for BoundaryConditionDirichlet<F>
where
    E: Equations<N>,
    F: Fn(&Direction, f64) -> [f64; N] + Send + Sync,
{
    fn external_state(
        &self,
        _u_inner: &[f64; N],
        _normal: &Direction,
        x: &Direction,
        t: f64,
        _equations: &E,
    ) -> [f64; N] {
        (self.state)(x, t)
    }

    fn name(&self) -> &'static str {
        "dirichlet"
    }
}

/// Outflow: the exterior state copies the interior one, so the surface
/// flux reduces to the physical flux.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundaryConditionDoNothing;

impl<E: Equations<N>, const N: usize> BoundaryCondition<E, N> for BoundaryConditionDoNothing {
    fn external_state(
        &self,
        u_inner: &[f64; N],
        _normal: &Direction,
        _x: &Direction,
        _t: f64,
        _equations: &E,
    ) -> [f64; N] {
        *u_inner
    }

    fn boundary_flux(
        &self,
        u_inner: &[f64; N],
        normal: &Direction,
        _x: &Direction,
        _t: f64,
        _surface_flux: &dyn NumericalFlux<E, N>,
        equations: &E,
    ) -> [f64; N] {
        equations.flux(u_inner, normal)
    }

    fn name(&self) -> &'static str {
        "do_nothing"
    }
}

/// Impermeable wall: the exterior state mirrors the normal momentum.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundaryConditionSlipWall;

impl<E, const N: usize> BoundaryCondition<E, N> for BoundaryConditionSlipWall
where
    E: Equations<N> + WallReflection<N>,
{
    fn external_state(
        &self,
        u_inner: &[f64; N],
        normal: &Direction,
        _x: &Direction,
        _t: f64,
        equations: &E,
    ) -> [f64; N] {
        equations.reflect(u_inner, normal)
    }

    fn name(&self) -> &'static str {
        "slip_wall"
    }
}

/// Boundary conditions attached to the sides of the domain.
pub struct BoundaryConditions<E: Equations<N>, const N: usize> {
    conditions: BTreeMap<BoundaryTag, Arc<dyn BoundaryCondition<E, N>>>,
}

impl<E: Equations<N>, const N: usize> Clone for BoundaryConditions<E, N> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
        }
    }
}

impl<E: Equations<N>, const N: usize> Default for BoundaryConditions<E, N> {
    fn default() -> Self {
        Self {
            conditions: BTreeMap::new(),
        }
    }
}

impl<E: Equations<N> + 'static, const N: usize> BoundaryConditions<E, N> {
    /// No conditions; valid for fully periodic meshes.
    pub fn periodic() -> Self {
        Self::default()
    }

    /// The same condition on every side.
    pub fn all<B>(condition: B) -> Self
    where
        B: BoundaryCondition<E, N> + 'static,
    {
        let shared: Arc<dyn BoundaryCondition<E, N>> = Arc::new(condition);
        Self {
            conditions: BoundaryTag::ALL
                .iter()
                .map(|&tag| (tag, Arc::clone(&shared)))
                .collect(),
        }
    }

    /// Attach `condition` to one side, replacing any previous one.
    pub fn with<B>(mut self, tag: BoundaryTag, condition: B) -> Self
    where
        B: BoundaryCondition<E, N> + 'static,
    {
        self.conditions.insert(tag, Arc::new(condition));
        self
    }
}

impl<E: Equations<N>, const N: usize> BoundaryConditions<E, N> {
    /// Condition of a side.
    pub fn get(&self, tag: BoundaryTag) -> Option<&dyn BoundaryCondition<E, N>> {
        self.conditions.get(&tag).map(|bc| bc.as_ref())
    }

    /// Check that every side in `required` has a condition.
    pub fn validate(&self, required: &[BoundaryTag]) -> Result<()> {
        for tag in required {
            if !self.conditions.contains_key(tag) {
                return Err(DgError::InvalidConfiguration(format!(
                    "no boundary condition for non-periodic side {:?}",
                    tag
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::CompressibleEuler;
    use crate::flux::FluxLaxFriedrichs;

    #[test]
    fn test_slip_wall_has_no_mass_flux() {
        let eq = CompressibleEuler::<2>::new(1.4);
        let u = [1.0, 0.3, -0.2, 2.5];
        let normal = [0.6, 0.8, 0.0];
        let f = BoundaryConditionSlipWall.boundary_flux(
            &u,
            &normal,
            &[0.0; 3],
            0.0,
            &FluxLaxFriedrichs,
            &eq,
        );
        assert!(f[0].abs() < 1e-14);
        // Only pressure acts on the wall.
        let tangential = f[1] * normal[1] - f[2] * normal[0];
        assert!(tangential.abs() < 1e-14);
    }

    #[test]
    fn test_do_nothing_returns_physical_flux() {
        let eq = CompressibleEuler::<1>::new(1.4);
        let u = [1.2, 0.4, 3.0];
        let n = [-1.0, 0.0, 0.0];
        let f = BoundaryConditionDoNothing.boundary_flux(&u, &n, &[0.0; 3], 0.0, &FluxLaxFriedrichs, &eq);
        assert_eq!(f, eq.flux(&u, &n));
    }

    #[test]
    fn test_missing_side_is_reported() {
        let bcs = BoundaryConditions::<CompressibleEuler<2>, 4>::periodic()
            .with(BoundaryTag::XMin, BoundaryConditionSlipWall);
        assert!(bcs.validate(&[BoundaryTag::XMin]).is_ok());
        assert!(matches!(
            bcs.validate(&[BoundaryTag::XMin, BoundaryTag::XMax]),
            Err(DgError::InvalidConfiguration(_))
        ));

        let dirichlet = BoundaryConditions::<CompressibleEuler<2>, 4>::all(
            BoundaryConditionDirichlet::new(|_x: &Direction, _t: f64| [1.0, 0.0, 0.0, 2.5]),
        );
        assert!(dirichlet.validate(BoundaryTag::sides(2)).is_ok());
        assert_eq!(dirichlet.get(BoundaryTag::YMax).map(|bc| bc.name()), Some("dirichlet"));
    }
}
