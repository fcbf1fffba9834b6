//! Analytic-ICB core model.
//!
//! The simpler energy balance of Stevenson, Spohn & Schubert, Icarus 1983:
//! both the liquidus and the adiabat are quadratics in pressure, so the ICB
//! pressure solves a quadratic equation analytically instead of requiring a
//! radial root-find. Latent and gravitational energies are lumped into one
//! specific energy, and there are no exsolution terms - the variant predates
//! that physics.

use std::f64::consts::PI;

use crate::cache::{compute_uncached, EvalCache, Quantity};
use crate::config::{GeometryParameters, StevensonCoreParameters};
use crate::error::ModelError;
use crate::geometry::SphericalShell;
use crate::thermal::adiabat::{pressure_at_radius_Pa, radius_at_pressure_m};
use crate::thermal::{
    CoreState, EtCoefficients, ExsolutionCoefficients, QtCoefficients, ThermalModel, FD_DELTA_K,
};

/// Stevenson-style core: pressure-quadratic profiles, analytic ICB.
#[derive(Debug, Clone)]
pub struct StevensonCoreModel {
    params: StevensonCoreParameters,
    shell: SphericalShell,
}

impl StevensonCoreModel {
    pub fn new(geometry: &GeometryParameters, params: StevensonCoreParameters) -> Self {
        Self {
            params,
            shell: SphericalShell::sphere(geometry.core_radius_m),
        }
    }

    /// Validated constructor.
    pub fn validated(
        geometry: &GeometryParameters,
        params: StevensonCoreParameters,
    ) -> Result<Self, ModelError> {
        geometry.validate()?;
        params.validate()?;
        Ok(Self::new(geometry, params))
    }

    pub fn params(&self) -> &StevensonCoreParameters {
        &self.params
    }

    /// Pressure at the planet center (Pa).
    pub fn center_pressure_Pa(&self) -> f64 {
        pressure_at_radius_Pa(
            self.params.cmb_pressure_Pa,
            self.params.density_kg_per_m3,
            self.shell.outer_radius_m,
            0.0,
        )
    }

    /// Liquidus temperature at pressure `p` (K).
    /// Source: Stevenson et al. 1983, eq. 3.
    pub fn liquidus_K(&self, pressure_Pa: f64) -> f64 {
        let p = &self.params;
        p.liquidus_t0_K
            * (1.0
                + p.liquidus_t1_per_Pa * pressure_Pa
                + p.liquidus_t2_per_Pa2 * pressure_Pa * pressure_Pa)
    }

    /// Adiabat temperature at pressure `p`, anchored at the CMB (K).
    /// Source: Stevenson et al. 1983, eq. 4.
    pub fn adiabat_K(&self, pressure_Pa: f64, t_cmb_K: f64) -> f64 {
        let p = &self.params;
        let shape = |pr: f64| 1.0 + p.adiabat_t1_per_Pa * pr + p.adiabat_t2_per_Pa2 * pr * pr;
        t_cmb_K * shape(pressure_Pa) / shape(p.cmb_pressure_Pa)
    }

    /// ICB pressure (Pa) from the liquidus/adiabat intersection.
    ///
    /// The fully-solid and fully-liquid short-circuits run before the
    /// quadratic is touched, mirroring the bisection variant: they are what
    /// guarantees a crossing inside `[P_cmb, P_center]`.
    pub fn icb_pressure_Pa(&self, t_cmb_K: f64) -> Result<f64, ModelError> {
        let p = &self.params;
        let p_cmb = p.cmb_pressure_Pa;
        let p_center = self.center_pressure_Pa();

        match self.core_state(t_cmb_K) {
            CoreState::FullySolid => return Ok(p_cmb),
            CoreState::FullyLiquid => return Ok(p_center),
            CoreState::PartiallySolidified => {}
        }

        // T_m(P) = T_a(P) rearranged to a·P² + b·P + c = 0.
        let shape_cmb = 1.0 + p.adiabat_t1_per_Pa * p_cmb + p.adiabat_t2_per_Pa2 * p_cmb * p_cmb;
        let s = t_cmb_K / shape_cmb;
        let a = p.liquidus_t0_K * p.liquidus_t2_per_Pa2 - s * p.adiabat_t2_per_Pa2;
        let b = p.liquidus_t0_K * p.liquidus_t1_per_Pa - s * p.adiabat_t1_per_Pa;
        let c = p.liquidus_t0_K - s;

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return Err(ModelError::BracketError {
                lo: p_cmb,
                hi: p_center,
            });
        }
        // Numerically stable pair of roots.
        let q = -0.5 * (b + b.signum() * disc.sqrt());
        let roots = [q / a, c / q];
        roots
            .into_iter()
            .filter(|r| r.is_finite())
            .find(|r| (p_cmb..=p_center).contains(r))
            .ok_or(ModelError::BracketError {
                lo: p_cmb,
                hi: p_center,
            })
    }

    fn inner_core_radius_uncached(&self, t_cmb_K: f64) -> Result<f64, ModelError> {
        match self.core_state(t_cmb_K) {
            CoreState::FullySolid => Ok(self.shell.outer_radius_m),
            CoreState::FullyLiquid => Ok(0.0),
            CoreState::PartiallySolidified => {
                let p_icb = self.icb_pressure_Pa(t_cmb_K)?;
                // radius_at_pressure_m clamps an over-center pressure to
                // zero and warns; the short-circuits above keep physical
                // states off that path.
                Ok(radius_at_pressure_m(
                    self.params.cmb_pressure_Pa,
                    self.params.density_kg_per_m3,
                    self.shell.outer_radius_m,
                    p_icb,
                ))
            }
        }
    }

    fn inner_core_radius_sensitivity(
        &self,
        t_cmb_K: f64,
        cache: &mut EvalCache,
    ) -> Result<f64, ModelError> {
        cache.get_or_compute(Quantity::InnerCoreRadiusSensitivity, |c| {
            let r0 = c.get_or_compute(Quantity::InnerCoreRadius, |_| {
                self.inner_core_radius_uncached(t_cmb_K)
            })?;
            let r1 = compute_uncached(|_| self.inner_core_radius_uncached(t_cmb_K + FD_DELTA_K))?;
            Ok((r1 - r0) / FD_DELTA_K)
        })
    }
}

impl ThermalModel for StevensonCoreModel {
    fn core_state(&self, t_cmb_K: f64) -> CoreState {
        let p_cmb = self.params.cmb_pressure_Pa;
        let p_center = self.center_pressure_Pa();
        if t_cmb_K <= self.liquidus_K(p_cmb) {
            CoreState::FullySolid
        } else if self.adiabat_K(p_center, t_cmb_K) >= self.liquidus_K(p_center) {
            CoreState::FullyLiquid
        } else {
            CoreState::PartiallySolidified
        }
    }

    fn inner_core_radius_m(
        &self,
        t_cmb_K: f64,
        cache: &mut EvalCache,
    ) -> Result<f64, ModelError> {
        cache.get_or_compute(Quantity::InnerCoreRadius, |_| {
            self.inner_core_radius_uncached(t_cmb_K)
        })
    }

    fn qt_coefficients(
        &self,
        t_cmb_K: f64,
        _exsolution: &ExsolutionCoefficients,
        cache: &mut EvalCache,
    ) -> Result<QtCoefficients, ModelError> {
        let p = &self.params;

        let secular_J_per_K = cache.get_or_compute(Quantity::SecularCoefficient, |_| {
            Ok(-(self.shell.mass_kg(p.density_kg_per_m3)
                * p.specific_heat_J_per_kgK
                * p.mean_temperature_ratio))
        })?;

        // Latent and gravitational energy lumped into one specific energy
        // (Stevenson et al. 1983, eq. 10).
        let latent_J_per_K = cache.get_or_compute(Quantity::LatentCoefficient, |c| {
            let r_i = c.get_or_compute(Quantity::InnerCoreRadius, |_| {
                self.inner_core_radius_uncached(t_cmb_K)
            })?;
            let dri_dt = self.inner_core_radius_sensitivity(t_cmb_K, c)?;
            Ok(p.latent_gravitational_J_per_kg
                * p.density_kg_per_m3
                * 4.0
                * PI
                * r_i
                * r_i
                * dri_dt)
        })?;

        Ok(QtCoefficients {
            secular_J_per_K,
            latent_J_per_K,
            ..Default::default()
        })
    }

    fn et_coefficients(
        &self,
        t_cmb_K: f64,
        exsolution: &ExsolutionCoefficients,
        cache: &mut EvalCache,
    ) -> Result<EtCoefficients, ModelError> {
        let qt = self.qt_coefficients(t_cmb_K, exsolution, cache)?;
        let t_mean_K = self.params.mean_temperature_ratio * t_cmb_K;
        let efficiency = (t_mean_K - t_cmb_K) / (t_mean_K * t_cmb_K);
        Ok(EtCoefficients {
            secular_J_per_K2: qt.secular_J_per_K * efficiency,
            latent_J_per_K2: qt.latent_J_per_K * efficiency,
            gravitational_J_per_K2: 0.0,
            exsolution_J_per_K2: 0.0,
        })
    }

    fn radiogenic_present_W(&self) -> f64 {
        self.params.radiogenic_present_W
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> StevensonCoreModel {
        StevensonCoreModel::new(
            &GeometryParameters::default(),
            StevensonCoreParameters::default(),
        )
    }

    #[test]
    fn cold_core_is_fully_solid_at_cmb_pressure() {
        let m = model();
        let threshold = m.liquidus_K(m.params().cmb_pressure_Pa);
        let mut cache = EvalCache::new();
        let r_i = m.inner_core_radius_m(threshold - 100.0, &mut cache).unwrap();
        assert_relative_eq!(r_i, 3480.0e3, max_relative = 1e-12);
    }

    #[test]
    fn hot_core_is_fully_liquid() {
        let m = model();
        let mut cache = EvalCache::new();
        let r_i = m.inner_core_radius_m(8000.0, &mut cache).unwrap();
        assert_eq!(r_i, 0.0);
        assert_eq!(m.core_state(8000.0), CoreState::FullyLiquid);
    }

    #[test]
    fn icb_pressure_sits_on_the_crossing() {
        let m = model();
        // Pick a temperature in the partial regime.
        let t_cmb = {
            let lo = m.liquidus_K(m.params().cmb_pressure_Pa);
            let mut t = lo + 50.0;
            while m.core_state(t) != CoreState::PartiallySolidified {
                t += 50.0;
                assert!(t < 10000.0, "no partial regime found");
            }
            t
        };
        let p_icb = m.icb_pressure_Pa(t_cmb).unwrap();
        assert!(p_icb > m.params().cmb_pressure_Pa && p_icb < m.center_pressure_Pa());
        assert_relative_eq!(
            m.adiabat_K(p_icb, t_cmb),
            m.liquidus_K(p_icb),
            max_relative = 1e-9
        );
    }

    #[test]
    fn inner_core_shrinks_with_warming() {
        let m = model();
        let lo = m.liquidus_K(m.params().cmb_pressure_Pa);
        let mut last = f64::INFINITY;
        let mut t = lo - 200.0;
        while t < 8000.0 {
            let mut cache = EvalCache::new();
            let r_i = m.inner_core_radius_m(t, &mut cache).unwrap();
            assert!(r_i <= last + 1e-6, "r_i grew with temperature at {t} K");
            last = r_i;
            t += 100.0;
        }
    }
}
