//! Integrated state of the planet and its flat-vector codec.
//!
//! The external stepper sees an 11-entry vector:
//! `[T_cmb, T_um, Mg, Si, Fe, O, MgO, SiO2, FeO, MgSiO3, FeSiO3]`.
//! The two derived pools `M_c` and `M_m` are *not* integrated; they are
//! recomputed from their members whenever a vector is decoded, which keeps
//! the pool identities exact by construction.

use serde::{Deserialize, Serialize};

use crate::chemistry::{MolePool, INDEPENDENT_SPECIES_COUNT};
use crate::config::ChemistryParameters;
use crate::error::ModelError;

/// Length of the integrated state vector.
pub const STATE_LEN: usize = 2 + INDEPENDENT_SPECIES_COUNT;

/// Index of `T_cmb` in the state vector.
pub const IDX_T_CMB: usize = 0;
/// Index of `T_um` in the state vector.
pub const IDX_T_UM: usize = 1;
/// First chemical-pool index in the state vector.
pub const IDX_SPECIES: usize = 2;

/// The integrated state vector.
pub type StateVector = [f64; STATE_LEN];

/// Decoded planet state at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetState {
    /// Time (s)
    pub time_sec: f64,
    /// Core-mantle boundary temperature (K)
    pub t_cmb_K: f64,
    /// Upper-mantle temperature (K)
    pub t_um_K: f64,
    /// Molar amounts, derived pools refreshed
    pub pool: MolePool,
}

impl PlanetState {
    /// Initial conditions from configuration.
    pub fn initial(t_cmb_K: f64, t_um_K: f64, chemistry: &ChemistryParameters) -> Self {
        Self {
            time_sec: 0.0,
            t_cmb_K,
            t_um_K,
            pool: MolePool::from_independent(&chemistry.initial_inventory()),
        }
    }

    /// Decode a stepper vector.
    pub fn from_vector(time_sec: f64, y: &StateVector) -> Self {
        let mut independent = [0.0; INDEPENDENT_SPECIES_COUNT];
        independent.copy_from_slice(&y[IDX_SPECIES..]);
        Self {
            time_sec,
            t_cmb_K: y[IDX_T_CMB],
            t_um_K: y[IDX_T_UM],
            pool: MolePool::from_independent(&independent),
        }
    }

    /// Encode for the stepper.
    pub fn to_vector(&self) -> StateVector {
        let mut y = [0.0; STATE_LEN];
        y[IDX_T_CMB] = self.t_cmb_K;
        y[IDX_T_UM] = self.t_um_K;
        y[IDX_SPECIES..]
            .copy_from_slice(&self.pool.moles[..INDEPENDENT_SPECIES_COUNT]);
        y
    }

    /// Reject states outside the physical domain.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.t_cmb_K > 0.0 && self.t_um_K > 0.0)
            || !self.t_cmb_K.is_finite()
            || !self.t_um_K.is_finite()
        {
            return Err(ModelError::non_physical(format!(
                "temperatures must be finite and positive: T_cmb = {:.3e} K, T_um = {:.3e} K",
                self.t_cmb_K, self.t_um_K
            )));
        }
        if !self.pool.is_physical() {
            return Err(ModelError::non_physical(
                "negative molar amount in state vector",
            ));
        }
        Ok(())
    }
}

/// Flat, serializable snapshot of `(t, state)` for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Time (s)
    pub time_sec: f64,
    /// The 11-entry state vector
    pub state: Vec<f64>,
}

impl StateRecord {
    pub fn new(time_sec: f64, y: &StateVector) -> Self {
        Self {
            time_sec,
            state: y.to_vec(),
        }
    }

    /// Recover the state vector, or `None` if the record length is wrong.
    pub fn to_vector(&self) -> Option<StateVector> {
        if self.state.len() != STATE_LEN {
            return None;
        }
        let mut y = [0.0; STATE_LEN];
        y.copy_from_slice(&self.state);
        Some(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::Species;

    #[test]
    fn vector_roundtrip_preserves_pools() {
        let state = PlanetState::initial(4100.0, 1800.0, &ChemistryParameters::default());
        let y = state.to_vector();
        let back = PlanetState::from_vector(0.0, &y);
        assert_eq!(back, state);
        assert!(back.pool.pool_identity_error() < 1e-15);
    }

    #[test]
    fn negative_moles_rejected() {
        let mut state = PlanetState::initial(4100.0, 1800.0, &ChemistryParameters::default());
        state.pool.set(Species::FeO, -1.0);
        assert!(state.validate().is_err());
    }

    #[test]
    fn record_roundtrips_through_json() {
        let state = PlanetState::initial(4100.0, 1800.0, &ChemistryParameters::default());
        let record = StateRecord::new(3.2e16, &state.to_vector());
        let json = serde_json::to_string(&record).unwrap();
        let back: StateRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_vector().unwrap(), state.to_vector());
    }

    #[test]
    fn short_record_is_rejected() {
        let record = StateRecord {
            time_sec: 0.0,
            state: vec![1.0, 2.0],
        };
        assert!(record.to_vector().is_none());
    }
}
