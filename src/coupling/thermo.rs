//! Default implementations of the external collaborators.
//!
//! These are intentionally simple reference implementations: a van 't Hoff
//! linearization for the equilibrium constants and a single-lump exponential
//! decay for radiogenic heating. Production studies plug in their own
//! [`Thermodynamics`](super::Thermodynamics)/[`Radiogenics`](super::Radiogenics)
//! implementations; the engine only sees the trait.

use serde::{Deserialize, Serialize};

use crate::chemistry::{MolePool, REACTION_COUNT};
use crate::coupling::{EquilibriumResponse, Radiogenics, Thermodynamics};
use crate::thermal::ExsolutionCoefficients;

/// Universal gas constant (J/(mol·K))
const R_J_PER_MOL_K: f64 = 8.314;

/// van 't Hoff-linearized equilibrium constants.
///
/// For K(T) with reaction enthalpy ΔH, `d ln K/dt = ΔH/(R·T²)·dT/dt`
/// (van 't Hoff). Positive enthalpies make the dissolved state less stable
/// as the core cools, which is what drives exsolution.
///
/// Exsolution coefficients switch on below a saturation temperature: above
/// it the alloy is undersaturated and nothing precipitates regardless of the
/// cooling rate.
/// Reference: Badro et al., PNAS 2016 (Mg solubility); Hirose et al.,
/// Nature 2017 (SiO₂ saturation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VantHoffThermodynamics {
    /// Reaction enthalpies ΔH_i (J/mol), in reaction order
    pub reaction_enthalpy_J_per_mol: [f64; REACTION_COUNT],
    /// CMB temperature below which the core alloy is saturated (K)
    pub saturation_temperature_K: f64,
    /// MgO exsolved per kelvin of cooling when saturated (kg/K)
    pub mgo_rate_kg_per_K: f64,
    /// SiO₂ exsolved per kelvin of cooling when saturated (kg/K)
    pub sio2_rate_kg_per_K: f64,
    /// FeO exsolved per kelvin of cooling when saturated (kg/K)
    pub feo_rate_kg_per_K: f64,
}

impl Default for VantHoffThermodynamics {
    fn default() -> Self {
        Self {
            // Exchange reactions run hot (metal/silicate partitioning);
            // the mantle-internal breakdowns are gentler.
            reaction_enthalpy_J_per_mol: [3.1e5, 4.2e5, 2.4e5, 1.1e5, 0.9e5],
            saturation_temperature_K: 4400.0,
            mgo_rate_kg_per_K: 1.8e19,
            sio2_rate_kg_per_K: 9.0e18,
            feo_rate_kg_per_K: 2.0e18,
        }
    }
}

impl Thermodynamics for VantHoffThermodynamics {
    fn equilibrium_response(
        &self,
        t_cmb_K: f64,
        _pool: &MolePool,
        dt_cmb_dt_K_per_s: f64,
        _time_sec: f64,
    ) -> EquilibriumResponse {
        let mut dk_over_k = [0.0; REACTION_COUNT];
        for (rate, enthalpy) in dk_over_k
            .iter_mut()
            .zip(self.reaction_enthalpy_J_per_mol.iter())
        {
            *rate = enthalpy / (R_J_PER_MOL_K * t_cmb_K * t_cmb_K) * dt_cmb_dt_K_per_s;
        }

        let exsolution = if t_cmb_K < self.saturation_temperature_K {
            ExsolutionCoefficients {
                mgo_kg_per_K: self.mgo_rate_kg_per_K,
                sio2_kg_per_K: self.sio2_rate_kg_per_K,
                feo_kg_per_K: self.feo_rate_kg_per_K,
            }
        } else {
            ExsolutionCoefficients::ZERO
        };

        EquilibriumResponse {
            dk_over_k,
            exsolution,
        }
    }
}

/// Single-lump exponential radiogenic decay.
///
/// `h(t) = h_present · exp(λ·(t_present − t))` with the mean decay constant
/// of the long-lived isotopes.
/// Source: Stevenson et al., Icarus 1983, Table I (λ = 1.38×10⁻¹⁷ 1/s).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExponentialDecayRadiogenics {
    /// Mean decay constant λ (1/s)
    pub decay_constant_per_s: f64,
    /// Epoch at which production equals the present-day value (s)
    pub present_time_sec: f64,
}

impl ExponentialDecayRadiogenics {
    pub fn new(present_time_sec: f64) -> Self {
        Self {
            decay_constant_per_s: 1.38e-17,
            present_time_sec,
        }
    }
}

impl Radiogenics for ExponentialDecayRadiogenics {
    fn heat_production_W(&self, present_day_W: f64, time_sec: f64) -> f64 {
        present_day_W * (self.decay_constant_per_s * (self.present_time_sec - time_sec)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_rate_gives_zero_forcing() {
        let thermo = VantHoffThermodynamics::default();
        let pool = MolePool::from_independent(&[1.0e21; 9]);
        let response = thermo.equilibrium_response(4000.0, &pool, 0.0, 0.0);
        assert_eq!(response.dk_over_k, [0.0; REACTION_COUNT]);
    }

    #[test]
    fn cooling_lowers_all_constants() {
        let thermo = VantHoffThermodynamics::default();
        let pool = MolePool::from_independent(&[1.0e21; 9]);
        let response = thermo.equilibrium_response(4000.0, &pool, -3.0e-15, 0.0);
        assert!(response.dk_over_k.iter().all(|r| *r < 0.0));
    }

    #[test]
    fn undersaturated_core_does_not_exsolve() {
        let thermo = VantHoffThermodynamics::default();
        let pool = MolePool::from_independent(&[1.0e21; 9]);
        let hot = thermo.equilibrium_response(5000.0, &pool, -3.0e-15, 0.0);
        assert_eq!(hot.exsolution, ExsolutionCoefficients::ZERO);
        let cold = thermo.equilibrium_response(4000.0, &pool, -3.0e-15, 0.0);
        assert!(cold.exsolution.mgo_kg_per_K > 0.0);
    }

    #[test]
    fn radiogenics_decay_toward_present() {
        let radio = ExponentialDecayRadiogenics::new(1.42e17);
        let early = radio.heat_production_W(1.3e13, 0.0);
        let present = radio.heat_production_W(1.3e13, 1.42e17);
        assert!(early > present);
        assert_relative_eq!(present, 1.3e13, max_relative = 1e-12);
    }
}
