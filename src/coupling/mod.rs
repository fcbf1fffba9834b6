//! Thermo-chemical coupling: the derivative function the stepper calls.
//!
//! [`EvolutionModel`] owns the mantle balance, a core model behind the
//! [`ThermalModel`] trait, and the two external collaborators (equilibrium
//! thermodynamics, radiogenic heating). One call to
//! [`EvolutionModel::derivative`] is one pure evaluation: it decodes the
//! state, builds a fresh [`EvalCache`], runs mantle → core → chemistry, and
//! returns the 11-entry rate vector. Nothing persists between calls.
//!
//! ## The circular dependency
//!
//! The reaction engine needs `dK/K`, which depends on `dT_cmb/dt`; the core
//! balance needs exsolution coefficients, which also depend on `dT_cmb/dt`;
//! and `dT_cmb/dt` in turn contains the exsolution heat terms. The cycle is
//! broken with a one-step lag: the exsolution coefficients are evaluated at
//! a fixed a-priori rate estimate (configuration), after which the actual
//! rate is known and `dK/K` is evaluated at that actual rate. No fixed-point
//! iteration is attempted.

pub mod thermo;

pub use thermo::{ExponentialDecayRadiogenics, VantHoffThermodynamics};

use crate::cache::EvalCache;
use crate::chemistry::{self, MolePool, MoleRates, REACTION_COUNT};
use crate::config::Parameters;
use crate::error::ModelError;
use crate::state::{PlanetState, StateVector, IDX_SPECIES, IDX_T_CMB, IDX_T_UM};
use crate::thermal::{
    CoreBalance, ExsolutionCoefficients, MantleBalance, MantleModel, NimmoCoreModel, ThermalModel,
};

/// What the thermodynamics collaborator returns for one state.
#[derive(Debug, Clone, Copy)]
pub struct EquilibriumResponse {
    /// Relative equilibrium-constant rates dK_i/K_i (1/s), in reaction order
    pub dk_over_k: [f64; REACTION_COUNT],
    /// Oxide exsolution-rate coefficients (kg/K)
    pub exsolution: ExsolutionCoefficients,
}

/// Equilibrium thermodynamics collaborator.
///
/// Supplies the forcing of the reaction engine and the exsolution-rate
/// coefficients of the core budget. What the constants physically are
/// (activity models, pressure corrections) is entirely this collaborator's
/// business.
pub trait Thermodynamics {
    fn equilibrium_response(
        &self,
        t_cmb_K: f64,
        pool: &MolePool,
        dt_cmb_dt_K_per_s: f64,
        time_sec: f64,
    ) -> EquilibriumResponse;
}

/// Radiogenic heat production collaborator.
pub trait Radiogenics {
    /// Instantaneous production (W) given the present-day value and time.
    fn heat_production_W(&self, present_day_W: f64, time_sec: f64) -> f64;
}

/// Everything needed to evaluate one derivative of the planet state.
pub struct EvolutionModel {
    mantle: MantleModel,
    core: Box<dyn ThermalModel>,
    thermodynamics: Box<dyn Thermodynamics>,
    radiogenics: Box<dyn Radiogenics>,
    params: Parameters,
}

/// Energy-side diagnostics of one evaluation, for reporting and export.
#[derive(Debug, Clone, Copy)]
pub struct EvolutionDiagnostics {
    pub mantle: MantleBalance,
    pub core: CoreBalance,
    /// Mantle radiogenic production at this time (W)
    pub q_radiogenic_mantle_W: f64,
    /// Core radiogenic production at this time (W)
    pub q_radiogenic_core_W: f64,
}

impl EvolutionModel {
    /// Assemble a model from parts.
    pub fn new(
        params: Parameters,
        core: Box<dyn ThermalModel>,
        thermodynamics: Box<dyn Thermodynamics>,
        radiogenics: Box<dyn Radiogenics>,
    ) -> Result<Self, ModelError> {
        params.validate()?;
        let mantle = MantleModel::new(&params.geometry, params.mantle.clone());
        Ok(Self {
            mantle,
            core,
            thermodynamics,
            radiogenics,
            params,
        })
    }

    /// Default configuration: Nimmo-style core, van 't Hoff thermodynamics,
    /// exponential-decay radiogenics.
    pub fn with_defaults(params: Parameters) -> Result<Self, ModelError> {
        let core = NimmoCoreModel::validated(&params.geometry, params.core.clone())?;
        let thermodynamics = VantHoffThermodynamics::default();
        let radiogenics = ExponentialDecayRadiogenics::new(params.coupling.present_time_sec);
        Self::new(
            params,
            Box::new(core),
            Box::new(thermodynamics),
            Box::new(radiogenics),
        )
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn mantle(&self) -> &MantleModel {
        &self.mantle
    }

    pub fn core(&self) -> &dyn ThermalModel {
        self.core.as_ref()
    }

    /// Derivative contract for the external stepper: `f(t, y) → dy/dt`.
    ///
    /// Pure function of its arguments; each call builds and discards its own
    /// cache.
    pub fn derivative(&self, time_sec: f64, y: &StateVector) -> Result<StateVector, ModelError> {
        let mut cache = EvalCache::new();
        self.derivative_with_cache(time_sec, y, &mut cache)
    }

    /// Same as [`derivative`](Self::derivative) but with a caller-supplied
    /// cache, so tests can instrument hit/miss counts. The cache must be
    /// fresh: passing one from a previous evaluation violates its scoping
    /// contract.
    pub fn derivative_with_cache(
        &self,
        time_sec: f64,
        y: &StateVector,
        cache: &mut EvalCache,
    ) -> Result<StateVector, ModelError> {
        let state = PlanetState::from_vector(time_sec, y);
        state.validate()?;

        let (core_balance, mantle_balance, response) = self.evaluate_balances(&state, cache)?;
        let rates: MoleRates = chemistry::solve_rates(&state.pool, &response.dk_over_k)?;

        let mut dy = [0.0; crate::state::STATE_LEN];
        dy[IDX_T_CMB] = core_balance.dt_cmb_dt_K_per_s;
        dy[IDX_T_UM] = mantle_balance.dt_um_dt_K_per_s;
        dy[IDX_SPECIES..].copy_from_slice(&rates.independent());
        Ok(dy)
    }

    /// Energy-side diagnostics at a state, for logging and CSV export.
    pub fn diagnostics(
        &self,
        time_sec: f64,
        y: &StateVector,
    ) -> Result<EvolutionDiagnostics, ModelError> {
        let state = PlanetState::from_vector(time_sec, y);
        state.validate()?;
        let mut cache = EvalCache::new();
        let (core, mantle, _) = self.evaluate_balances(&state, &mut cache)?;
        Ok(EvolutionDiagnostics {
            mantle,
            core,
            q_radiogenic_mantle_W: self
                .radiogenics
                .heat_production_W(self.mantle.params().radiogenic_present_W, time_sec),
            q_radiogenic_core_W: self
                .radiogenics
                .heat_production_W(self.core.radiogenic_present_W(), time_sec),
        })
    }

    /// Shared mantle/core/chemistry-forcing evaluation.
    ///
    /// Returns the core balance, the mantle balance, and the equilibrium
    /// response evaluated at the *actual* CMB rate (the lagged estimate is
    /// only used inside the core balance, see module docs).
    fn evaluate_balances(
        &self,
        state: &PlanetState,
        cache: &mut EvalCache,
    ) -> Result<(CoreBalance, MantleBalance, EquilibriumResponse), ModelError> {
        let q_radiogenic_mantle_W = self
            .radiogenics
            .heat_production_W(self.mantle.params().radiogenic_present_W, state.time_sec);
        let mantle_balance =
            self.mantle
                .balance(state.t_um_K, state.t_cmb_K, q_radiogenic_mantle_W);

        // Lagged pass: exsolution coefficients at the a-priori rate estimate.
        let lagged = self.thermodynamics.equilibrium_response(
            state.t_cmb_K,
            &state.pool,
            self.params.coupling.dt_cmb_dt_estimate_K_per_s,
            state.time_sec,
        );

        let q_radiogenic_core_W = self
            .radiogenics
            .heat_production_W(self.core.radiogenic_present_W(), state.time_sec);
        let core_balance = self.core.energy_balance(
            state.t_cmb_K,
            mantle_balance.q_cmb_W,
            q_radiogenic_core_W,
            &lagged.exsolution,
            cache,
        )?;

        // Actual pass: the reaction forcing sees the rate just computed.
        let response = self.thermodynamics.equilibrium_response(
            state.t_cmb_K,
            &state.pool,
            core_balance.dt_cmb_dt_K_per_s,
            state.time_sec,
        );

        Ok((core_balance, mantle_balance, response))
    }
}
