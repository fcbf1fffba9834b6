//! Reaction-equilibrium linearization engine.
//!
//! Given the current molar amounts `M` and the relative rates of change of
//! the five equilibrium constants (`dK/K`, supplied by the thermodynamics
//! collaborator), this engine solves for the instantaneous rates `dM/dt` of
//! all eleven tracked quantities simultaneously.
//!
//! The rates satisfy, by construction:
//! 1. element conservation - four rows, one per element, stoichiometry
//!    weighted;
//! 2. pool consistency - two rows tying `dM_c/dt` and `dM_m/dt` to their
//!    members;
//! 3. linearized equilibrium - five rows obtained by differentiating
//!    `ln K_i` for each mole-fraction-ratio constant, giving coefficients
//!    that are reciprocals of the current amounts and right-hand sides
//!    `dK_i/K_i`.
//!
//! That is a square 11×11 linear system assembled fresh from the state at
//! every call and solved with a dense LU factorization. The closed-form
//! solution of this system exists but is a maintenance hazard and silently
//! produces Inf/NaN when a shared denominator degenerates; the matrix route
//! detects that case and reports [`ModelError::NumericalSingularity`]
//! instead.

use nalgebra::{DMatrix, DVector};

use crate::error::ModelError;

use super::species::{
    Element, MolePool, MoleRates, Reaction, Species, REACTION_COUNT, SPECIES_COUNT,
};

/// Pivot-ratio threshold below which the factorization is treated as
/// singular. Applied after row equilibration, so it measures genuine rank
/// deficiency rather than row scaling.
const PIVOT_RATIO_FLOOR: f64 = 1e-12;

/// The assembled linear system `A · dM/dt = b`.
///
/// Kept public so tests can inspect individual rows against the conservation
/// and equilibrium definitions.
#[derive(Debug, Clone)]
pub struct ReactionSystem {
    /// 11×11 coefficient matrix, rows ordered: 4 element-conservation rows,
    /// 2 pool-consistency rows, 5 equilibrium rows.
    pub matrix: DMatrix<f64>,
    /// Right-hand side: zeros for the conservation/pool rows, `dK_i/K_i` for
    /// the equilibrium rows.
    pub rhs: DVector<f64>,
}

impl ReactionSystem {
    /// Assemble the system from the current amounts and forcing.
    pub fn assemble(pool: &MolePool, dk_over_k: &[f64; REACTION_COUNT]) -> Self {
        let mut matrix = DMatrix::<f64>::zeros(SPECIES_COUNT, SPECIES_COUNT);
        let mut rhs = DVector::<f64>::zeros(SPECIES_COUNT);

        // Rows 0-3: element conservation. The derived pools contribute no
        // element content, so the loop over all species is safe.
        for element in Element::ALL {
            let row = element as usize;
            for species in Species::ALL {
                matrix[(row, species.index())] = element.moles_in(species);
            }
        }

        // Rows 4-5: pool consistency.
        let core_row = 4;
        matrix[(core_row, Species::CoreAlloy.index())] = 1.0;
        for species in Species::CORE {
            matrix[(core_row, species.index())] = -1.0;
        }
        let melt_row = 5;
        matrix[(melt_row, Species::SilicateMelt.index())] = 1.0;
        for species in Species::MANTLE {
            matrix[(melt_row, species.index())] = -1.0;
        }

        // Rows 6-10: d(ln K_i)/dt for each reaction. Each mole fraction
        // x_s = M_s / M_pool contributes +1/M_s on the species and -1/M_pool
        // on its pool, with multiplicity from the exponent in K.
        for reaction in Reaction::ALL {
            let row = 6 + reaction.index();
            for (species, exponent) in log_k_terms(reaction) {
                matrix[(row, species.index())] += exponent / pool.get(*species);
            }
            rhs[row] = dk_over_k[reaction.index()];
        }

        Self { matrix, rhs }
    }

    /// Solve for the rates.
    ///
    /// Rows are equilibrated to unit max-norm before factorization so that
    /// the pivot-ratio singularity test is independent of the (huge) scale
    /// difference between conservation rows and 1/M equilibrium rows.
    pub fn solve(mut self) -> Result<MoleRates, ModelError> {
        for row in 0..SPECIES_COUNT {
            let scale = self.matrix.row(row).amax();
            if !scale.is_finite() {
                return Err(ModelError::singular(format!(
                    "non-finite coefficient in row {row}; a molar amount is zero or invalid"
                )));
            }
            if scale == 0.0 {
                return Err(ModelError::singular(format!("row {row} is identically zero")));
            }
            for col in 0..SPECIES_COUNT {
                self.matrix[(row, col)] /= scale;
            }
            self.rhs[row] /= scale;
        }

        let lu = self.matrix.lu();
        let u_diag = lu.u().diagonal();
        let max_pivot = u_diag.amax();
        let min_pivot = u_diag.iter().fold(f64::INFINITY, |m, p| m.min(p.abs()));
        if max_pivot == 0.0 || min_pivot / max_pivot < PIVOT_RATIO_FLOOR {
            return Err(ModelError::singular(format!(
                "pivot ratio {:.3e} below threshold {PIVOT_RATIO_FLOOR:.0e}",
                min_pivot / max_pivot
            )));
        }

        let solution = lu.solve(&self.rhs).ok_or_else(|| {
            ModelError::singular("LU back-substitution failed (exactly singular matrix)")
        })?;

        let mut rates = [0.0; SPECIES_COUNT];
        for (i, value) in solution.iter().enumerate() {
            if !value.is_finite() {
                return Err(ModelError::singular(format!(
                    "non-finite rate for {}",
                    Species::ALL[i].name()
                )));
            }
            rates[i] = *value;
        }
        Ok(MoleRates { rates })
    }
}

/// Solve for the instantaneous species rates.
///
/// Pure function of `(pool, dk_over_k)`: no state is read or written
/// anywhere else. `dk_over_k` is dimensionless per second, ordered as
/// [`Reaction::ALL`].
pub fn solve_rates(
    pool: &MolePool,
    dk_over_k: &[f64; REACTION_COUNT],
) -> Result<MoleRates, ModelError> {
    ReactionSystem::assemble(pool, dk_over_k).solve()
}

/// Terms of `ln K_i` as (species, exponent) pairs.
///
/// `K` for the three dissolution reactions is a product of metal mole
/// fractions over one melt mole fraction; for the two breakdown reactions it
/// lives entirely in the melt. Expanding each mole fraction brings in the
/// corresponding pool with opposite sign.
fn log_k_terms(reaction: Reaction) -> &'static [(Species, f64)] {
    use Species::*;
    match reaction {
        // ln K = ln Mg + ln O - 2 ln M_c - ln MgO + ln M_m
        Reaction::MgODissolution => &[
            (Mg, 1.0),
            (O, 1.0),
            (CoreAlloy, -2.0),
            (MgO, -1.0),
            (SilicateMelt, 1.0),
        ],
        // ln K = ln Si + 2 ln O - 3 ln M_c - ln SiO2 + ln M_m
        Reaction::SiO2Dissolution => &[
            (Si, 1.0),
            (O, 2.0),
            (CoreAlloy, -3.0),
            (SiO2, -1.0),
            (SilicateMelt, 1.0),
        ],
        // ln K = ln Fe + ln O - 2 ln M_c - ln FeO + ln M_m
        Reaction::FeODissolution => &[
            (Fe, 1.0),
            (O, 1.0),
            (CoreAlloy, -2.0),
            (FeO, -1.0),
            (SilicateMelt, 1.0),
        ],
        // ln K = ln MgO + ln SiO2 - ln MgSiO3 - ln M_m
        Reaction::MgSiO3Breakdown => &[
            (MgO, 1.0),
            (SiO2, 1.0),
            (MgSiO3, -1.0),
            (SilicateMelt, -1.0),
        ],
        // ln K = ln FeO + ln SiO2 - ln FeSiO3 - ln M_m
        Reaction::FeSiO3Breakdown => &[
            (FeO, 1.0),
            (SiO2, 1.0),
            (FeSiO3, -1.0),
            (SilicateMelt, -1.0),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_pool() -> MolePool {
        MolePool::from_independent(&[
            1.2e21, 4.1e21, 7.7e22, 2.5e21, // core
            4.9e22, 1.1e22, 7.8e21, 3.2e22, 5.5e21, // mantle
        ])
    }

    #[test]
    fn conservation_rows_use_stoichiometry() {
        let system = ReactionSystem::assemble(&sample_pool(), &[0.0; REACTION_COUNT]);
        // Oxygen row: O=1, MgO=1, SiO2=2, FeO=1, MgSiO3=3, FeSiO3=3
        let row = Element::O as usize;
        assert_eq!(system.matrix[(row, Species::SiO2.index())], 2.0);
        assert_eq!(system.matrix[(row, Species::MgSiO3.index())], 3.0);
        assert_eq!(system.matrix[(row, Species::Mg.index())], 0.0);
        assert_eq!(system.matrix[(row, Species::CoreAlloy.index())], 0.0);
    }

    #[test]
    fn equilibrium_row_matches_log_derivative() {
        let pool = sample_pool();
        let system = ReactionSystem::assemble(&pool, &[0.0; REACTION_COUNT]);
        let row = 6 + Reaction::MgODissolution.index();
        assert_relative_eq!(
            system.matrix[(row, Species::Mg.index())],
            1.0 / pool.get(Species::Mg),
            max_relative = 1e-14
        );
        assert_relative_eq!(
            system.matrix[(row, Species::CoreAlloy.index())],
            -2.0 / pool.get(Species::CoreAlloy),
            max_relative = 1e-14
        );
    }

    #[test]
    fn zero_forcing_returns_zero_rates() {
        let rates = solve_rates(&sample_pool(), &[0.0; REACTION_COUNT]).unwrap();
        for species in Species::ALL {
            assert_eq!(rates.get(species), 0.0, "nonzero rate for {}", species.name());
        }
    }

    #[test]
    fn rates_conserve_every_element() {
        let pool = sample_pool();
        let dk = [1.0e-16, -3.0e-17, 2.0e-16, 5.0e-17, -8.0e-17];
        let rates = solve_rates(&pool, &dk).unwrap();
        for element in Element::ALL {
            let total: f64 = Species::ALL
                .iter()
                .map(|s| element.moles_in(*s) * rates.get(*s))
                .sum();
            let scale: f64 = Species::ALL
                .iter()
                .map(|s| (element.moles_in(*s) * rates.get(*s)).abs())
                .sum();
            assert!(
                total.abs() <= 1e-10 * scale.max(1e-300),
                "element {:?} drifts at {:.3e} mol/s",
                element,
                total
            );
        }
    }

    #[test]
    fn exhausted_phase_is_singular() {
        let mut pool = sample_pool();
        pool.set(Species::MgO, 0.0);
        pool.set(Species::SiO2, 0.0);
        pool.set(Species::FeO, 0.0);
        let err = solve_rates(&pool, &[1e-16; REACTION_COUNT]).unwrap_err();
        assert!(matches!(err, ModelError::NumericalSingularity { .. }));
    }
}
