//! Two-point volume fluxes for the compressible Euler equations.
//!
//! All fluxes here are symmetric and consistent, so they can be used in the
//! flux-differencing volume integral. Ranocha's and Chandrashekar's fluxes
//! are entropy conservative; Ranocha's and Shima et al.'s are also kinetic
//! energy preserving.

use super::traits::NumericalFlux;
use crate::equations::{CompressibleEuler, Direction, inv_ln_mean, ln_mean};

/// Entropy-conserving and kinetic-energy-preserving flux of Ranocha (2018).
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxRanocha;

/// Entropy-conserving flux of Chandrashekar (2013).
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxChandrashekar;

/// Kinetic-energy and pressure-equilibrium preserving flux of
/// Shima, Kuya, Tamaki and Kawai (2021).
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxShima;

/// Kinetic-energy-preserving flux of Kennedy and Gruber (2008).
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxKennedyGruber;

/// Primitive quantities shared by all flux formulas.
struct States {
    rho_ll: f64,
    rho_rr: f64,
    v_ll: Direction,
    v_rr: Direction,
    p_ll: f64,
    p_rr: f64,
    v_dot_n_ll: f64,
    v_dot_n_rr: f64,
}

impl States {
    #[inline]
    fn new<const D: usize, const N: usize>(
        eq: &CompressibleEuler<D>,
        u_ll: &[f64; N],
        u_rr: &[f64; N],
        normal: &Direction,
    ) -> Self {
        let v_ll = eq.velocity(u_ll);
        let v_rr = eq.velocity(u_rr);
        Self {
            rho_ll: u_ll[0],
            rho_rr: u_rr[0],
            v_dot_n_ll: (0..D).map(|d| v_ll[d] * normal[d]).sum(),
            v_dot_n_rr: (0..D).map(|d| v_rr[d] * normal[d]).sum(),
            v_ll,
            v_rr,
            p_ll: eq.pressure(u_ll),
            p_rr: eq.pressure(u_rr),
        }
    }

    #[inline]
    fn v_avg(&self, d: usize) -> f64 {
        0.5 * (self.v_ll[d] + self.v_rr[d])
    }
}

/// Assemble (f1, f1 v_avg + p n, f_energy).
#[inline]
fn assemble<const D: usize, const N: usize>(
    s: &States,
    f1: f64,
    p: f64,
    energy: f64,
    normal: &Direction,
) -> [f64; N] {
    let mut f = [0.0; N];
    f[0] = f1;
    for d in 0..D {
        f[1 + d] = f1 * s.v_avg(d) + p * normal[d];
    }
    f[D + 1] = energy;
    f
}

#[inline]
fn ranocha<const D: usize, const N: usize>(
    eq: &CompressibleEuler<D>,
    u_ll: &[f64; N],
    u_rr: &[f64; N],
    normal: &Direction,
) -> [f64; N] {
    let s = States::new(eq, u_ll, u_rr, normal);
    let rho_mean = ln_mean(s.rho_ll, s.rho_rr);
    // p_ll p_rr / ln_mean(ρ_ll p_rr, ρ_rr p_ll) = ln mean of the temperature-like p/ρ
    let inv_rho_p_mean = s.p_ll * s.p_rr * inv_ln_mean(s.rho_ll * s.p_rr, s.rho_rr * s.p_ll);
    let p_avg = 0.5 * (s.p_ll + s.p_rr);
    let velocity_square_avg: f64 = 0.5 * (0..D).map(|d| s.v_ll[d] * s.v_rr[d]).sum::<f64>();

    let f1 = rho_mean * 0.5 * (s.v_dot_n_ll + s.v_dot_n_rr);
    let energy = f1 * (velocity_square_avg + inv_rho_p_mean * eq.inv_gamma_minus_one())
        + 0.5 * (s.p_ll * s.v_dot_n_rr + s.p_rr * s.v_dot_n_ll);
    assemble::<D, N>(&s, f1, p_avg, energy, normal)
}

#[inline]
fn chandrashekar<const D: usize, const N: usize>(
    eq: &CompressibleEuler<D>,
    u_ll: &[f64; N],
    u_rr: &[f64; N],
    normal: &Direction,
) -> [f64; N] {
    let s = States::new(eq, u_ll, u_rr, normal);
    let beta_ll = 0.5 * s.rho_ll / s.p_ll;
    let beta_rr = 0.5 * s.rho_rr / s.p_rr;
    let specific_kin_ll: f64 = 0.5 * (0..D).map(|d| s.v_ll[d] * s.v_ll[d]).sum::<f64>();
    let specific_kin_rr: f64 = 0.5 * (0..D).map(|d| s.v_rr[d] * s.v_rr[d]).sum::<f64>();

    let rho_avg = 0.5 * (s.rho_ll + s.rho_rr);
    let rho_mean = ln_mean(s.rho_ll, s.rho_rr);
    let beta_mean = ln_mean(beta_ll, beta_rr);
    let beta_avg = 0.5 * (beta_ll + beta_rr);
    let p_mean = 0.5 * rho_avg / beta_avg;
    let velocity_square_avg = specific_kin_ll + specific_kin_rr;
    let v_dot_n_avg: f64 = (0..D).map(|d| s.v_avg(d) * normal[d]).sum();

    let f1 = rho_mean * v_dot_n_avg;
    let mut energy = f1 * 0.5 * (eq.inv_gamma_minus_one() / beta_mean - velocity_square_avg);
    for d in 0..D {
        energy += (f1 * s.v_avg(d) + p_mean * normal[d]) * s.v_avg(d);
    }
    assemble::<D, N>(&s, f1, p_mean, energy, normal)
}

#[inline]
fn shima<const D: usize, const N: usize>(
    eq: &CompressibleEuler<D>,
    u_ll: &[f64; N],
    u_rr: &[f64; N],
    normal: &Direction,
) -> [f64; N] {
    let s = States::new(eq, u_ll, u_rr, normal);
    let rho_avg = 0.5 * (s.rho_ll + s.rho_rr);
    let p_avg = 0.5 * (s.p_ll + s.p_rr);
    let v_dot_n_avg = 0.5 * (s.v_dot_n_ll + s.v_dot_n_rr);
    let velocity_square_avg: f64 = 0.5 * (0..D).map(|d| s.v_ll[d] * s.v_rr[d]).sum::<f64>();
    let pv_dot_n_avg = 0.5 * (s.p_ll * s.v_dot_n_rr + s.p_rr * s.v_dot_n_ll);

    let f1 = rho_avg * v_dot_n_avg;
    let energy =
        p_avg * v_dot_n_avg * eq.inv_gamma_minus_one() + f1 * velocity_square_avg + pv_dot_n_avg;
    assemble::<D, N>(&s, f1, p_avg, energy, normal)
}

#[inline]
fn kennedy_gruber<const D: usize, const N: usize>(
    eq: &CompressibleEuler<D>,
    u_ll: &[f64; N],
    u_rr: &[f64; N],
    normal: &Direction,
) -> [f64; N] {
    let s = States::new(eq, u_ll, u_rr, normal);
    let rho_avg = 0.5 * (s.rho_ll + s.rho_rr);
    let p_avg = 0.5 * (s.p_ll + s.p_rr);
    let e_avg = 0.5 * (u_ll[D + 1] / s.rho_ll + u_rr[D + 1] / s.rho_rr);
    let v_dot_n_avg = 0.5 * (s.v_dot_n_ll + s.v_dot_n_rr);

    let f1 = rho_avg * v_dot_n_avg;
    let energy = f1 * e_avg + p_avg * v_dot_n_avg;
    assemble::<D, N>(&s, f1, p_avg, energy, normal)
}

macro_rules! impl_euler_volume_flux {
    ($flux:ty, $kernel:ident, $name:literal, $(($dim:literal, $nvars:literal)),+) => {
        $(
            impl NumericalFlux<CompressibleEuler<$dim>, $nvars> for $flux {
                #[inline]
                fn flux(
                    &self,
                    u_ll: &[f64; $nvars],
                    u_rr: &[f64; $nvars],
                    normal: &Direction,
                    equations: &CompressibleEuler<$dim>,
                ) -> [f64; $nvars] {
                    $kernel(equations, u_ll, u_rr, normal)
                }

                fn name(&self) -> &'static str {
                    $name
                }

                fn is_symmetric(&self) -> bool {
                    true
                }
            }
        )+
    };
}

impl_euler_volume_flux!(FluxRanocha, ranocha, "ranocha", (1, 3), (2, 4), (3, 5));
impl_euler_volume_flux!(FluxChandrashekar, chandrashekar, "chandrashekar", (1, 3), (2, 4), (3, 5));
impl_euler_volume_flux!(FluxShima, shima, "shima_etal", (1, 3), (2, 4), (3, 5));
impl_euler_volume_flux!(FluxKennedyGruber, kennedy_gruber, "kennedy_gruber", (1, 3), (2, 4), (3, 5));
