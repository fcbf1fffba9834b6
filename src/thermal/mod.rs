//! Thermal evolution models for the core and mantle.
//!
//! The mantle side is a parameterized boundary-layer convection balance
//! ([`mantle`]); the core side is an entropy/energy budget behind the
//! [`ThermalModel`] trait with two interchangeable variants:
//!
//! - [`nimmo::NimmoCoreModel`] - bisection phase boundary on an exponential
//!   adiabat, exsolution-extended energy budget;
//! - [`stevenson::StevensonCoreModel`] - analytic quadratic ICB-pressure
//!   solve on pressure-polynomial profiles.
//!
//! Every per-kelvin coefficient follows the sign convention
//! `Q_source = Q̃ · dT_cmb/dt`: coefficients are negative for sources that
//! release heat while the core cools, so the energy balance reads
//! `dT_cmb/dt = (Q_cmb − Q_radiogenic) / ΣQ̃` and cooling comes out negative.

pub mod adiabat;
pub mod mantle;
pub mod nimmo;
pub mod stevenson;

pub use adiabat::CoreProfile;
pub use mantle::{MantleBalance, MantleModel};
pub use nimmo::NimmoCoreModel;
pub use stevenson::StevensonCoreModel;

use crate::cache::{EvalCache, Oxide};
use crate::error::ModelError;

/// Finite-difference step (K) for estimating dr_i/dT_cmb.
pub const FD_DELTA_K: f64 = 0.1;

/// Solidification state of the core as a function of `T_cmb`.
///
/// Transitions run FullyLiquid → PartiallySolidified → FullySolid as the
/// planet cools and only reverse if `T_cmb` itself reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    /// Adiabat above the liquidus everywhere; no inner core
    FullyLiquid,
    /// Inner core growing between center and r_c
    PartiallySolidified,
    /// Adiabat below the liquidus at the CMB; core frozen through
    FullySolid,
}

/// Mass of oxide exsolved from the core per kelvin of CMB cooling (kg/K,
/// all non-negative). Supplied by the thermodynamics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExsolutionCoefficients {
    pub mgo_kg_per_K: f64,
    pub sio2_kg_per_K: f64,
    pub feo_kg_per_K: f64,
}

impl ExsolutionCoefficients {
    pub const ZERO: Self = Self {
        mgo_kg_per_K: 0.0,
        sio2_kg_per_K: 0.0,
        feo_kg_per_K: 0.0,
    };

    pub fn get(&self, oxide: Oxide) -> f64 {
        match oxide {
            Oxide::MgO => self.mgo_kg_per_K,
            Oxide::SiO2 => self.sio2_kg_per_K,
            Oxide::FeO => self.feo_kg_per_K,
        }
    }
}

/// Per-kelvin heat coefficients Q̃_* (J/K), one per energy source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QtCoefficients {
    /// Secular cooling of the whole core
    pub secular_J_per_K: f64,
    /// Latent heat of inner-core freezing
    pub latent_J_per_K: f64,
    /// Gravitational energy of light-element release at the ICB
    pub gravitational_J_per_K: f64,
    /// MgO exsolution latent + buoyancy
    pub exsolution_mgo_J_per_K: f64,
    /// SiO₂ exsolution latent + buoyancy
    pub exsolution_sio2_J_per_K: f64,
    /// FeO exsolution latent + buoyancy
    pub exsolution_feo_J_per_K: f64,
}

impl QtCoefficients {
    /// Sum of all per-kelvin coefficients (J/K).
    pub fn total_J_per_K(&self) -> f64 {
        self.secular_J_per_K
            + self.latent_J_per_K
            + self.gravitational_J_per_K
            + self.exsolution_mgo_J_per_K
            + self.exsolution_sio2_J_per_K
            + self.exsolution_feo_J_per_K
    }
}

/// Entropy analogues Ẽ_* (J/K²) of the heat coefficients; used for dynamo
/// power diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EtCoefficients {
    pub secular_J_per_K2: f64,
    pub latent_J_per_K2: f64,
    pub gravitational_J_per_K2: f64,
    pub exsolution_J_per_K2: f64,
}

impl EtCoefficients {
    pub fn total_J_per_K2(&self) -> f64 {
        self.secular_J_per_K2
            + self.latent_J_per_K2
            + self.gravitational_J_per_K2
            + self.exsolution_J_per_K2
    }
}

/// Result of one core energy-balance evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CoreBalance {
    /// CMB temperature rate (K/s)
    pub dt_cmb_dt_K_per_s: f64,
    /// Total per-kelvin coefficient the rate was divided by (J/K)
    pub qt_total_J_per_K: f64,
    /// Inner-core radius at this state (m)
    pub inner_core_radius_m: f64,
    /// Solidification state
    pub state: CoreState,
}

/// Capability interface shared by the interchangeable core models.
///
/// One variant struct per published parameter set; no inheritance chain.
/// All derived-quantity lookups go through the per-evaluation [`EvalCache`].
pub trait ThermalModel {
    /// Solidification state at this CMB temperature.
    fn core_state(&self, t_cmb_K: f64) -> CoreState;

    /// Inner-core radius (m), boundary short-circuits included.
    fn inner_core_radius_m(&self, t_cmb_K: f64, cache: &mut EvalCache)
        -> Result<f64, ModelError>;

    /// Per-kelvin heat coefficients at this state.
    fn qt_coefficients(
        &self,
        t_cmb_K: f64,
        exsolution: &ExsolutionCoefficients,
        cache: &mut EvalCache,
    ) -> Result<QtCoefficients, ModelError>;

    /// Per-kelvin entropy coefficients at this state.
    fn et_coefficients(
        &self,
        t_cmb_K: f64,
        exsolution: &ExsolutionCoefficients,
        cache: &mut EvalCache,
    ) -> Result<EtCoefficients, ModelError>;

    /// Present-day radiogenic heat production inside the core (W).
    fn radiogenic_present_W(&self) -> f64;

    /// Partition the CMB heat flow and return the CMB temperature rate.
    ///
    /// `q_cmb_W` is the heat conducted into the mantle's lower boundary
    /// layer; `q_radiogenic_W` is instantaneous core radiogenic production.
    fn energy_balance(
        &self,
        t_cmb_K: f64,
        q_cmb_W: f64,
        q_radiogenic_W: f64,
        exsolution: &ExsolutionCoefficients,
        cache: &mut EvalCache,
    ) -> Result<CoreBalance, ModelError> {
        let qt = self.qt_coefficients(t_cmb_K, exsolution, cache)?;
        let qt_total = qt.total_J_per_K();
        // The coefficients are all ≤ 0; a vanishing sum means the budget has
        // no thermal inertia left to absorb the imbalance.
        if qt_total.abs() < 1.0 {
            return Err(ModelError::singular(format!(
                "core per-kelvin coefficients sum to {qt_total:.3e} J/K"
            )));
        }
        let dt_cmb_dt_K_per_s = (q_cmb_W - q_radiogenic_W) / qt_total;
        Ok(CoreBalance {
            dt_cmb_dt_K_per_s,
            qt_total_J_per_K: qt_total,
            inner_core_radius_m: self.inner_core_radius_m(t_cmb_K, cache)?,
            state: self.core_state(t_cmb_K),
        })
    }
}
