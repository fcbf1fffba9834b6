//! Core temperature/pressure profiles and the phase-boundary solver.
//!
//! The outer core is assumed adiabatic with the exponential profile
//! `T(r) = T_cmb · exp((r_c² − r²)/D²)` (Labrosse, PEPI 2015) and the
//! liquidus is quadratic in pressure, `T_m(P) = T_m0·(1 + T_m1·P + T_m2·P²)`
//! (Davies, PEPI 2015). Pressure inside the core follows the uniform-density
//! hydrostatic form `P(r) = P_cmb + (2π/3)·G·ρ²·(r_c² − r²)`.
//!
//! The inner-core boundary sits where the adiabat crosses the liquidus.
//! Both fully-liquid and fully-solid configurations are detected *before*
//! the root-finder runs, because bisection is only sound once a sign change
//! is guaranteed.

use crate::config::{GeometryParameters, NimmoCoreParameters};
use crate::error::ModelError;
use crate::thermal::CoreState;

/// Newtonian gravitational constant (m³/(kg·s²))
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674e-11;

/// Bisection iteration budget; generous for a meter-scale tolerance on a
/// planetary-radius bracket.
const BISECT_MAX_ITER: usize = 120;
/// Bisection radius tolerance (m).
const BISECT_TOL_M: f64 = 1e-6;

/// Hydrostatic pressure at radius `r` inside a uniform-density core (Pa).
pub fn pressure_at_radius_Pa(
    cmb_pressure_Pa: f64,
    density_kg_per_m3: f64,
    core_radius_m: f64,
    radius_m: f64,
) -> f64 {
    let two_thirds_pi_g = 2.0 / 3.0 * std::f64::consts::PI * GRAVITATIONAL_CONSTANT;
    cmb_pressure_Pa
        + two_thirds_pi_g
            * density_kg_per_m3
            * density_kg_per_m3
            * (core_radius_m * core_radius_m - radius_m * radius_m)
}

/// Radius at which the hydrostatic pressure equals `pressure_Pa` (m).
///
/// Contract: pressures above the center pressure clamp to radius zero with a
/// warning rather than producing a NaN from a negative square root. The
/// clamp is observable through the log so tests can catch silent misuse.
pub fn radius_at_pressure_m(
    cmb_pressure_Pa: f64,
    density_kg_per_m3: f64,
    core_radius_m: f64,
    pressure_Pa: f64,
) -> f64 {
    let two_thirds_pi_g = 2.0 / 3.0 * std::f64::consts::PI * GRAVITATIONAL_CONSTANT;
    let r2 = core_radius_m * core_radius_m
        - (pressure_Pa - cmb_pressure_Pa) / (two_thirds_pi_g * density_kg_per_m3 * density_kg_per_m3);
    if r2 < 0.0 {
        log::warn!(
            "pressure {:.4e} Pa exceeds center pressure; clamping radius to 0",
            pressure_Pa
        );
        return 0.0;
    }
    r2.sqrt()
}

/// Adiabat, liquidus and hydrostatic structure of an exponential-profile
/// core. Built once per model from the parameter set.
#[derive(Debug, Clone, Copy)]
pub struct CoreProfile {
    /// Core radius r_c (m)
    pub core_radius_m: f64,
    /// Pressure at the CMB (Pa)
    pub cmb_pressure_Pa: f64,
    /// Outer-core density (kg/m³)
    pub density_kg_per_m3: f64,
    /// Adiabatic length scale D (m)
    pub adiabatic_length_m: f64,
    /// Liquidus polynomial coefficients
    pub liquidus_t0_K: f64,
    pub liquidus_t1_per_Pa: f64,
    pub liquidus_t2_per_Pa2: f64,
}

impl CoreProfile {
    pub fn from_parameters(geometry: &GeometryParameters, core: &NimmoCoreParameters) -> Self {
        Self {
            core_radius_m: geometry.core_radius_m,
            cmb_pressure_Pa: core.cmb_pressure_Pa,
            density_kg_per_m3: core.density_kg_per_m3,
            adiabatic_length_m: core.adiabatic_length_m,
            liquidus_t0_K: core.liquidus_t0_K,
            liquidus_t1_per_Pa: core.liquidus_t1_per_Pa,
            liquidus_t2_per_Pa2: core.liquidus_t2_per_Pa2,
        }
    }

    /// Adiabat temperature at radius `r`, anchored to the CMB (K).
    pub fn adiabat_K(&self, radius_m: f64, t_cmb_K: f64) -> f64 {
        let d2 = self.adiabatic_length_m * self.adiabatic_length_m;
        let r_c2 = self.core_radius_m * self.core_radius_m;
        t_cmb_K * ((r_c2 - radius_m * radius_m) / d2).exp()
    }

    /// Hydrostatic pressure at radius `r` (Pa).
    pub fn pressure_Pa(&self, radius_m: f64) -> f64 {
        pressure_at_radius_Pa(
            self.cmb_pressure_Pa,
            self.density_kg_per_m3,
            self.core_radius_m,
            radius_m,
        )
    }

    /// Pressure at the center of the planet (Pa).
    pub fn center_pressure_Pa(&self) -> f64 {
        self.pressure_Pa(0.0)
    }

    /// Liquidus temperature at pressure `p` (K).
    pub fn liquidus_at_pressure_K(&self, pressure_Pa: f64) -> f64 {
        self.liquidus_t0_K
            * (1.0
                + self.liquidus_t1_per_Pa * pressure_Pa
                + self.liquidus_t2_per_Pa2 * pressure_Pa * pressure_Pa)
    }

    /// Liquidus temperature at radius `r` (K).
    pub fn liquidus_at_radius_K(&self, radius_m: f64) -> f64 {
        self.liquidus_at_pressure_K(self.pressure_Pa(radius_m))
    }

    /// Adiabat minus liquidus at radius `r`; positive where the core is
    /// molten.
    fn superheat_K(&self, radius_m: f64, t_cmb_K: f64) -> f64 {
        self.adiabat_K(radius_m, t_cmb_K) - self.liquidus_at_radius_K(radius_m)
    }

    /// Solidification state at this CMB temperature.
    pub fn core_state(&self, t_cmb_K: f64) -> CoreState {
        if self.superheat_K(self.core_radius_m, t_cmb_K) <= 0.0 {
            CoreState::FullySolid
        } else if self.superheat_K(0.0, t_cmb_K) >= 0.0 {
            CoreState::FullyLiquid
        } else {
            CoreState::PartiallySolidified
        }
    }

    /// Inner-core radius (m).
    ///
    /// The two boundary short-circuits run first: with the whole core below
    /// the liquidus the answer is exactly `r_c`, with the center above it
    /// the answer is exactly `0`. Only the remaining case has a guaranteed
    /// sign change over `[0, r_c]`, which bisection then exploits.
    pub fn inner_core_radius_m(&self, t_cmb_K: f64) -> Result<f64, ModelError> {
        match self.core_state(t_cmb_K) {
            CoreState::FullySolid => Ok(self.core_radius_m),
            CoreState::FullyLiquid => Ok(0.0),
            CoreState::PartiallySolidified => bisect(
                |r| self.superheat_K(r, t_cmb_K),
                0.0,
                self.core_radius_m,
                BISECT_TOL_M,
                BISECT_MAX_ITER,
            ),
        }
    }
}

/// Bounded bisection for `f(x) = 0` on `[lo, hi]`.
///
/// Requires a sign change; callers are expected to have short-circuited the
/// boundary cases already, so a missing sign change is a caller bug surfaced
/// as [`ModelError::BracketError`] rather than a garbage root.
pub(crate) fn bisect<F>(
    f: F,
    mut lo: f64,
    mut hi: f64,
    tol: f64,
    max_iter: usize,
) -> Result<f64, ModelError>
where
    F: Fn(f64) -> f64,
{
    let f_lo = f(lo);
    let f_hi = f(hi);
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(ModelError::BracketError { lo, hi });
    }

    for _ in 0..max_iter {
        let mid = 0.5 * (lo + hi);
        if hi - lo < tol {
            return Ok(mid);
        }
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Err(ModelError::NonConvergence {
        iterations: max_iter,
    })
}
