//! Two-dimensional shallow water equations with variable bottom topography.
//!
//! Conservative variables (h, hu, hv, b). The bottom b is carried as a
//! fourth variable with zero flux so that the nonconservative source
//! g h ∇b can be discretized by a two-point flux.

use super::{Direction, Equations, WallReflection, norm};

/// Shallow water equations in 2D.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShallowWater2D {
    gravity: f64,
}

impl ShallowWater2D {
    /// Create with gravitational acceleration g.
    pub fn new(gravity: f64) -> Self {
        Self { gravity }
    }

    /// Gravitational acceleration.
    #[inline]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Velocity padded to three components.
    #[inline]
    pub fn velocity(&self, u: &[f64; 4]) -> Direction {
        [u[1] / u[0], u[2] / u[0], 0.0]
    }

    /// Water height h, the shock-indicator variable.
    #[inline]
    pub fn waterheight(&self, u: &[f64; 4]) -> f64 {
        u[0]
    }

    /// Lake at rest: free surface H, zero velocity, bottom b(x).
    pub fn initial_condition_lake_at_rest(&self, water_level: f64, bottom: f64) -> [f64; 4] {
        [water_level - bottom, 0.0, 0.0, bottom]
    }

    fn signal_speeds(&self, u: &[f64; 4], normal: &Direction) -> (f64, f64) {
        let v = self.velocity(u);
        let v_normal = v[0] * normal[0] + v[1] * normal[1];
        (v_normal, (self.gravity * u[0]).sqrt() * norm(normal))
    }
}

impl Equations<4> for ShallowWater2D {
    const NDIMS: usize = 2;

    fn variable_names(&self) -> [&'static str; 4] {
        ["h", "h_v1", "h_v2", "b"]
    }

    #[inline]
    fn flux(&self, u: &[f64; 4], normal: &Direction) -> [f64; 4] {
        let v = self.velocity(u);
        let v_normal = v[0] * normal[0] + v[1] * normal[1];
        let p = 0.5 * self.gravity * u[0] * u[0];
        [
            u[0] * v_normal,
            u[1] * v_normal + p * normal[0],
            u[2] * v_normal + p * normal[1],
            0.0,
        ]
    }

    #[inline]
    fn max_abs_speed(&self, u_ll: &[f64; 4], u_rr: &[f64; 4], normal: &Direction) -> f64 {
        let (v_ll, c_ll) = self.signal_speeds(u_ll, normal);
        let (v_rr, c_rr) = self.signal_speeds(u_rr, normal);
        (v_ll.abs() + c_ll).max(v_rr.abs() + c_rr)
    }

    fn min_max_speed(&self, u_ll: &[f64; 4], u_rr: &[f64; 4], normal: &Direction) -> (f64, f64) {
        let (v_ll, c_ll) = self.signal_speeds(u_ll, normal);
        let (v_rr, c_rr) = self.signal_speeds(u_rr, normal);
        ((v_ll - c_ll).min(v_rr - c_rr), (v_ll + c_ll).max(v_rr + c_rr))
    }

    /// (H, v1, v2, b) with total water height H = h + b.
    fn cons2prim(&self, u: &[f64; 4]) -> [f64; 4] {
        let v = self.velocity(u);
        [u[0] + u[3], v[0], v[1], u[3]]
    }

    fn prim2cons(&self, prim: &[f64; 4]) -> [f64; 4] {
        let h = prim[0] - prim[3];
        [h, h * prim[1], h * prim[2], prim[3]]
    }

    fn cons2entropy(&self, u: &[f64; 4]) -> [f64; 4] {
        let v = self.velocity(u);
        let g = self.gravity;
        [
            g * (u[0] + u[3]) - 0.5 * (v[0] * v[0] + v[1] * v[1]),
            v[0],
            v[1],
            g * u[0],
        ]
    }

    /// Total energy ½ h |v|² + ½ g h² + g h b.
    fn entropy(&self, u: &[f64; 4]) -> f64 {
        let h = u[0];
        0.5 * (u[1] * u[1] + u[2] * u[2]) / h + 0.5 * self.gravity * h * h + self.gravity * h * u[3]
    }

    fn is_admissible(&self, u: &[f64; 4]) -> bool {
        u.iter().all(|x| x.is_finite()) && u[0] > 0.0
    }
}

impl WallReflection<4> for ShallowWater2D {
    fn reflect(&self, u: &[f64; 4], normal: &Direction) -> [f64; 4] {
        let n_norm = norm(normal);
        let (nx, ny) = (normal[0] / n_norm, normal[1] / n_norm);
        let m_normal = u[1] * nx + u[2] * ny;
        [u[0], u[1] - 2.0 * m_normal * nx, u[2] - 2.0 * m_normal * ny, u[3]]
    }
}
