//! Compressible Euler equations for an ideal gas in 1, 2 and 3 dimensions.
//!
//! Conservative variables (ρ, ρv_1, .., ρv_D, ρE), N = D + 2.
//! Primitive variables (ρ, v_1, .., v_D, p).

use super::{Direction, Equations, NonlinearVariable, WallReflection, norm};
use std::f64::consts::PI;

/// Ideal-gas Euler equations in `D` dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressibleEuler<const D: usize> {
    gamma: f64,
    inv_gamma_minus_one: f64,
}

impl<const D: usize> CompressibleEuler<D> {
    /// Create with heat capacity ratio γ > 1.
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma,
            inv_gamma_minus_one: 1.0 / (gamma - 1.0),
        }
    }

    /// Heat capacity ratio γ.
    #[inline]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// 1 / (γ - 1).
    #[inline]
    pub fn inv_gamma_minus_one(&self) -> f64 {
        self.inv_gamma_minus_one
    }

    /// Velocity padded to three components.
    #[inline]
    pub fn velocity<const N: usize>(&self, u: &[f64; N]) -> Direction {
        let inv_rho = 1.0 / u[0];
        let mut v = [0.0; 3];
        for d in 0..D {
            v[d] = u[1 + d] * inv_rho;
        }
        v
    }

    /// Pressure p = (γ - 1)(ρE - ½ |ρv|² / ρ).
    #[inline]
    pub fn pressure<const N: usize>(&self, u: &[f64; N]) -> f64 {
        let momentum_sq: f64 = (0..D).map(|d| u[1 + d] * u[1 + d]).sum();
        (self.gamma - 1.0) * (u[D + 1] - 0.5 * momentum_sq / u[0])
    }

    /// Speed of sound sqrt(γ p / ρ).
    #[inline]
    pub fn sound_speed<const N: usize>(&self, u: &[f64; N]) -> f64 {
        (self.gamma * self.pressure(u) / u[0]).sqrt()
    }

    /// ρ p, the default shock-indicator variable.
    #[inline]
    pub fn density_pressure<const N: usize>(&self, u: &[f64; N]) -> f64 {
        u[0] * self.pressure(u)
    }

    /// Thermodynamic specific entropy ln p - γ ln ρ.
    #[inline]
    pub fn specific_entropy_thermodynamic<const N: usize>(&self, u: &[f64; N]) -> f64 {
        self.pressure(u).ln() - self.gamma * u[0].ln()
    }

    /// Modified specific entropy ρe ρ^{-γ} (Guermond et al., 2019).
    #[inline]
    pub fn entropy_guermond<const N: usize>(&self, u: &[f64; N]) -> f64 {
        self.pressure(u) * self.inv_gamma_minus_one * u[0].powf(-self.gamma)
    }

    fn physical_flux<const N: usize>(&self, u: &[f64; N], normal: &Direction) -> [f64; N] {
        let v = self.velocity(u);
        let p = self.pressure(u);
        let v_normal: f64 = (0..D).map(|d| v[d] * normal[d]).sum();

        let mut f = [0.0; N];
        f[0] = u[0] * v_normal;
        for d in 0..D {
            f[1 + d] = u[1 + d] * v_normal + p * normal[d];
        }
        f[D + 1] = (u[D + 1] + p) * v_normal;
        f
    }

    fn signal_speeds<const N: usize>(&self, u: &[f64; N], normal: &Direction) -> (f64, f64) {
        let v = self.velocity(u);
        let v_normal: f64 = (0..D).map(|d| v[d] * normal[d]).sum();
        (v_normal, self.sound_speed(u) * norm(normal))
    }

    fn to_primitive<const N: usize>(&self, u: &[f64; N]) -> [f64; N] {
        let v = self.velocity(u);
        let mut prim = [0.0; N];
        prim[0] = u[0];
        prim[1..=D].copy_from_slice(&v[..D]);
        prim[D + 1] = self.pressure(u);
        prim
    }

    fn to_conservative<const N: usize>(&self, prim: &[f64; N]) -> [f64; N] {
        let rho = prim[0];
        let mut u = [0.0; N];
        u[0] = rho;
        let mut kinetic = 0.0;
        for d in 0..D {
            u[1 + d] = rho * prim[1 + d];
            kinetic += 0.5 * rho * prim[1 + d] * prim[1 + d];
        }
        u[D + 1] = prim[D + 1] * self.inv_gamma_minus_one + kinetic;
        u
    }

    fn to_entropy<const N: usize>(&self, u: &[f64; N]) -> [f64; N] {
        let v = self.velocity(u);
        let p = self.pressure(u);
        let s = self.specific_entropy_thermodynamic(u);
        let rho_p = u[0] / p;
        let v_square: f64 = (0..D).map(|d| v[d] * v[d]).sum();

        let mut w = [0.0; N];
        w[0] = (self.gamma - s) * self.inv_gamma_minus_one - 0.5 * rho_p * v_square;
        for d in 0..D {
            w[1 + d] = rho_p * v[d];
        }
        w[D + 1] = -rho_p;
        w
    }

    fn admissible<const N: usize>(&self, u: &[f64; N]) -> bool {
        u.iter().all(|x| x.is_finite()) && u[0] > 0.0 && self.pressure(u) > 0.0
    }

    fn mirror<const N: usize>(&self, u: &[f64; N], normal: &Direction) -> [f64; N] {
        let n_norm = norm(normal);
        let mut m_normal = 0.0;
        for d in 0..D {
            m_normal += u[1 + d] * normal[d] / n_norm;
        }
        let mut out = *u;
        for d in 0..D {
            out[1 + d] -= 2.0 * m_normal * normal[d] / n_norm;
        }
        out
    }

    /// Constant state given by primitive variables.
    pub fn initial_condition_constant<const N: usize>(&self, prim: [f64; N]) -> [f64; N] {
        self.to_conservative(&prim)
    }
}

macro_rules! impl_euler_equations {
    ($dim:literal, $nvars:literal, $names:expr) => {
        impl Equations<$nvars> for CompressibleEuler<$dim> {
            const NDIMS: usize = $dim;

            fn variable_names(&self) -> [&'static str; $nvars] {
                $names
            }

            #[inline]
            fn flux(&self, u: &[f64; $nvars], normal: &Direction) -> [f64; $nvars] {
                self.physical_flux(u, normal)
            }

            #[inline]
            fn max_abs_speed(
                &self,
                u_ll: &[f64; $nvars],
                u_rr: &[f64; $nvars],
                normal: &Direction,
            ) -> f64 {
                let (v_ll, c_ll) = self.signal_speeds(u_ll, normal);
                let (v_rr, c_rr) = self.signal_speeds(u_rr, normal);
                (v_ll.abs() + c_ll).max(v_rr.abs() + c_rr)
            }

            #[inline]
            fn min_max_speed(
                &self,
                u_ll: &[f64; $nvars],
                u_rr: &[f64; $nvars],
                normal: &Direction,
            ) -> (f64, f64) {
                let (v_ll, c_ll) = self.signal_speeds(u_ll, normal);
                let (v_rr, c_rr) = self.signal_speeds(u_rr, normal);
                ((v_ll - c_ll).min(v_rr - c_rr), (v_ll + c_ll).max(v_rr + c_rr))
            }

            fn cons2prim(&self, u: &[f64; $nvars]) -> [f64; $nvars] {
                self.to_primitive(u)
            }

            fn prim2cons(&self, prim: &[f64; $nvars]) -> [f64; $nvars] {
                self.to_conservative(prim)
            }

            fn cons2entropy(&self, u: &[f64; $nvars]) -> [f64; $nvars] {
                self.to_entropy(u)
            }

            fn entropy(&self, u: &[f64; $nvars]) -> f64 {
                -u[0] * self.specific_entropy_thermodynamic(u) * self.inv_gamma_minus_one
            }

            fn is_admissible(&self, u: &[f64; $nvars]) -> bool {
                self.admissible(u)
            }
        }

        impl WallReflection<$nvars> for CompressibleEuler<$dim> {
            fn reflect(&self, u: &[f64; $nvars], normal: &Direction) -> [f64; $nvars] {
                self.mirror(u, normal)
            }
        }

        impl NonlinearVariable<CompressibleEuler<$dim>, $nvars> for Pressure {
            fn name(&self) -> &'static str {
                "pressure"
            }

            fn value(&self, u: &[f64; $nvars], equations: &CompressibleEuler<$dim>) -> f64 {
                equations.pressure(u)
            }

            fn gradient(&self, u: &[f64; $nvars], equations: &CompressibleEuler<$dim>) -> [f64; $nvars] {
                let v = equations.velocity(u);
                let gm1 = equations.gamma() - 1.0;
                let mut g = [0.0; $nvars];
                g[0] = 0.5 * gm1 * (0..$dim).map(|d| v[d] * v[d]).sum::<f64>();
                for d in 0..$dim {
                    g[1 + d] = -gm1 * v[d];
                }
                g[$dim + 1] = gm1;
                g
            }
        }

        impl NonlinearVariable<CompressibleEuler<$dim>, $nvars> for SpecificEntropy {
            fn name(&self) -> &'static str {
                "specific_entropy"
            }

            fn value(&self, u: &[f64; $nvars], equations: &CompressibleEuler<$dim>) -> f64 {
                equations.entropy_guermond(u)
            }

            fn gradient(&self, u: &[f64; $nvars], equations: &CompressibleEuler<$dim>) -> [f64; $nvars] {
                let gamma = equations.gamma();
                let rho = u[0];
                let v = equations.velocity(u);
                let v_square: f64 = (0..$dim).map(|d| v[d] * v[d]).sum();
                let inv_rho_gammap1 = rho.powf(-(gamma + 1.0));

                let mut g = [0.0; $nvars];
                g[0] = inv_rho_gammap1 * (0.5 * rho * (gamma + 1.0) * v_square - gamma * u[$dim + 1]);
                for d in 0..$dim {
                    g[1 + d] = -u[1 + d] * inv_rho_gammap1;
                }
                g[$dim + 1] = rho.powf(-gamma);
                g
            }
        }
    };
}

impl_euler_equations!(1, 3, ["rho", "rho_v1", "rho_e"]);
impl_euler_equations!(2, 4, ["rho", "rho_v1", "rho_v2", "rho_e"]);
impl_euler_equations!(3, 5, ["rho", "rho_v1", "rho_v2", "rho_v3", "rho_e"]);

/// Pressure as a limited quantity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pressure;

/// Modified specific entropy ρe ρ^{-γ} as a limited quantity.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpecificEntropy;

// Manufactured solution: ρ = ρv_d = 2 + 0.1 sin(π (Σ x_d - t)), ρE = ρ²,
// periodic on [0, 2]^D.
const MMS_C: f64 = 2.0;
const MMS_A: f64 = 0.1;
const MMS_OMEGA: f64 = PI;

impl CompressibleEuler<1> {
    /// Smooth manufactured solution (pair with
    /// [`Self::source_terms_convergence_test`]).
    pub fn initial_condition_convergence_test(&self, x: &Direction, t: f64) -> [f64; 3] {
        let rho = MMS_C + MMS_A * (MMS_OMEGA * (x[0] - t)).sin();
        [rho, rho, rho * rho]
    }

    /// Source term balancing the manufactured solution.
    pub fn source_terms_convergence_test(&self, _u: &[f64; 3], x: &Direction, t: f64) -> [f64; 3] {
        let (si, co) = (MMS_OMEGA * (x[0] - t)).sin_cos();
        let rho = MMS_C + MMS_A * si;
        let rho_x = MMS_OMEGA * MMS_A * co;
        let du = rho_x * (2.0 * rho - 0.5) * (self.gamma - 1.0);
        [0.0, du, du]
    }
}

impl CompressibleEuler<2> {
    /// Smooth manufactured solution (pair with
    /// [`Self::source_terms_convergence_test`]).
    pub fn initial_condition_convergence_test(&self, x: &Direction, t: f64) -> [f64; 4] {
        let rho = MMS_C + MMS_A * (MMS_OMEGA * (x[0] + x[1] - t)).sin();
        [rho, rho, rho, rho * rho]
    }

    /// Source term balancing the manufactured solution.
    pub fn source_terms_convergence_test(&self, _u: &[f64; 4], x: &Direction, t: f64) -> [f64; 4] {
        let (si, co) = (MMS_OMEGA * (x[0] + x[1] - t)).sin_cos();
        let rho = MMS_C + MMS_A * si;
        let rho_x = MMS_OMEGA * MMS_A * co;
        let tmp = (2.0 * rho - 1.0) * (self.gamma - 1.0);
        let du_momentum = rho_x * (1.0 + tmp);
        [rho_x, du_momentum, du_momentum, 2.0 * rho_x * (rho + tmp)]
    }

    /// Weak blast wave centered at the origin with radius 0.5.
    pub fn initial_condition_weak_blast_wave(&self, x: &Direction, _t: f64) -> [f64; 4] {
        let r = (x[0] * x[0] + x[1] * x[1]).sqrt();
        let phi = x[1].atan2(x[0]);
        let prim = if r > 0.5 {
            [1.0, 0.0, 0.0, 1.0]
        } else {
            [1.1691, 0.1882 * phi.cos(), 0.1882 * phi.sin(), 1.245]
        };
        self.to_conservative(&prim)
    }
}
