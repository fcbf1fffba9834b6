//! Entropy-budget core model with oxide exsolution.
//!
//! Energy bookkeeping after Nimmo et al., GJI 2004: the heat flowing out of
//! the CMB is paid for by secular cooling, radiogenic decay, inner-core
//! latent heat, gravitational energy of light-element release at the ICB,
//! and - the extension of this variant - latent heat and compositional
//! buoyancy from MgO/SiO₂/FeO exsolving out of the cooling alloy
//! (O'Rourke & Stevenson, Nature 2016; Hirose et al., Nature 2017).
//!
//! Each per-kelvin coefficient is memoized in the per-evaluation cache:
//! the latent and gravitational terms both need the inner-core radius (one
//! bisection) and its temperature sensitivity (a second, uncached bisection
//! at a perturbed temperature).

use std::f64::consts::PI;

use crate::cache::{compute_uncached, EvalCache, Oxide, Quantity};
use crate::config::{GeometryParameters, NimmoCoreParameters};
use crate::error::ModelError;
use crate::geometry::SphericalShell;
use crate::thermal::{
    CoreProfile, CoreState, EtCoefficients, ExsolutionCoefficients, QtCoefficients, ThermalModel,
    FD_DELTA_K,
};

/// Nimmo-style core: exponential adiabat, bisection phase boundary,
/// exsolution-extended entropy budget.
#[derive(Debug, Clone)]
pub struct NimmoCoreModel {
    params: NimmoCoreParameters,
    profile: CoreProfile,
    shell: SphericalShell,
}

impl NimmoCoreModel {
    pub fn new(geometry: &GeometryParameters, params: NimmoCoreParameters) -> Self {
        let profile = CoreProfile::from_parameters(geometry, &params);
        let shell = SphericalShell::sphere(geometry.core_radius_m);
        Self {
            params,
            profile,
            shell,
        }
    }

    /// Validated constructor.
    pub fn validated(
        geometry: &GeometryParameters,
        params: NimmoCoreParameters,
    ) -> Result<Self, ModelError> {
        geometry.validate()?;
        params.validate()?;
        Ok(Self::new(geometry, params))
    }

    pub fn params(&self) -> &NimmoCoreParameters {
        &self.params
    }

    pub fn profile(&self) -> &CoreProfile {
        &self.profile
    }

    /// dr_i/dT_cmb (m/K) by forward difference. The perturbed evaluation
    /// runs uncached so it cannot pollute the entry for the unperturbed
    /// state.
    fn inner_core_radius_sensitivity(
        &self,
        t_cmb_K: f64,
        cache: &mut EvalCache,
    ) -> Result<f64, ModelError> {
        cache.get_or_compute(Quantity::InnerCoreRadiusSensitivity, |c| {
            let r0 = c.get_or_compute(Quantity::InnerCoreRadius, |_| {
                self.profile.inner_core_radius_m(t_cmb_K)
            })?;
            let r1 =
                compute_uncached(|_| self.profile.inner_core_radius_m(t_cmb_K + FD_DELTA_K))?;
            Ok((r1 - r0) / FD_DELTA_K)
        })
    }

    /// Adiabat temperature at the ICB (K).
    fn icb_temperature_K(&self, t_cmb_K: f64, cache: &mut EvalCache) -> Result<f64, ModelError> {
        cache.get_or_compute(Quantity::IcbTemperature, |c| {
            let r_i = c.get_or_compute(Quantity::InnerCoreRadius, |_| {
                self.profile.inner_core_radius_m(t_cmb_K)
            })?;
            Ok(self.profile.adiabat_K(r_i, t_cmb_K))
        })
    }
}

impl ThermalModel for NimmoCoreModel {
    fn core_state(&self, t_cmb_K: f64) -> CoreState {
        self.profile.core_state(t_cmb_K)
    }

    fn inner_core_radius_m(
        &self,
        t_cmb_K: f64,
        cache: &mut EvalCache,
    ) -> Result<f64, ModelError> {
        cache.get_or_compute(Quantity::InnerCoreRadius, |_| {
            self.profile.inner_core_radius_m(t_cmb_K)
        })
    }

    fn qt_coefficients(
        &self,
        t_cmb_K: f64,
        exsolution: &ExsolutionCoefficients,
        cache: &mut EvalCache,
    ) -> Result<QtCoefficients, ModelError> {
        let p = &self.params;

        // Secular: the whole core mass cools with the CMB, scaled by the
        // mass-averaged temperature ratio (Nimmo 2004, eq. 2).
        let secular_J_per_K = cache.get_or_compute(Quantity::SecularCoefficient, |_| {
            Ok(-(self.shell.mass_kg(p.density_kg_per_m3)
                * p.specific_heat_J_per_kgK
                * p.mean_temperature_ratio))
        })?;

        // Latent: heat released by freezing the shell dr_i thick per kelvin
        // of CMB cooling (Nimmo 2004, eq. 4). dr_i/dT ≤ 0, so the
        // coefficient is ≤ 0 like the others.
        let latent_J_per_K = cache.get_or_compute(Quantity::LatentCoefficient, |c| {
            let r_i = c.get_or_compute(Quantity::InnerCoreRadius, |_| {
                self.profile.inner_core_radius_m(t_cmb_K)
            })?;
            let dri_dt = self.inner_core_radius_sensitivity(t_cmb_K, c)?;
            Ok(p.latent_heat_J_per_kg
                * p.inner_core_density_kg_per_m3
                * 4.0
                * PI
                * r_i
                * r_i
                * dri_dt)
        })?;

        // Gravitational: light elements expelled at the freezing front rise
        // and stir the outer core (Nimmo 2004, eq. 5).
        let gravitational_J_per_K = cache.get_or_compute(Quantity::GravitationalCoefficient, |c| {
            let r_i = c.get_or_compute(Quantity::InnerCoreRadius, |_| {
                self.profile.inner_core_radius_m(t_cmb_K)
            })?;
            let dri_dt = self.inner_core_radius_sensitivity(t_cmb_K, c)?;
            Ok(p.gravitational_energy_J_per_kg
                * p.inner_core_density_kg_per_m3
                * 4.0
                * PI
                * r_i
                * r_i
                * dri_dt)
        })?;

        // Exsolution: the collaborator supplies kg of oxide leaving the
        // alloy per kelvin of cooling; each kg carries latent heat plus the
        // buoyancy work of its rise to the CMB.
        let mut exso = [0.0; 3];
        for (slot, oxide) in exso.iter_mut().zip(Oxide::ALL) {
            let energies = match oxide {
                Oxide::MgO => p.exsolution.mgo,
                Oxide::SiO2 => p.exsolution.sio2,
                Oxide::FeO => p.exsolution.feo,
            };
            *slot = cache.get_or_compute(Quantity::ExsolutionCoefficient(oxide), |_| {
                Ok(-(exsolution.get(oxide) * energies.total_J_per_kg()))
            })?;
        }

        Ok(QtCoefficients {
            secular_J_per_K,
            latent_J_per_K,
            gravitational_J_per_K,
            exsolution_mgo_J_per_K: exso[0],
            exsolution_sio2_J_per_K: exso[1],
            exsolution_feo_J_per_K: exso[2],
        })
    }

    fn et_coefficients(
        &self,
        t_cmb_K: f64,
        exsolution: &ExsolutionCoefficients,
        cache: &mut EvalCache,
    ) -> Result<EtCoefficients, ModelError> {
        let qt = self.qt_coefficients(t_cmb_K, exsolution, cache)?;
        let t_icb_K = self.icb_temperature_K(t_cmb_K, cache)?;
        let t_mean_K = self.params.mean_temperature_ratio * t_cmb_K;

        // Carnot-style efficiency factors: heat delivered at T_source but
        // rejected at T_cmb (Nimmo 2004, §2.3).
        let efficiency = |t_source_K: f64| (t_source_K - t_cmb_K) / (t_source_K * t_cmb_K);

        Ok(EtCoefficients {
            secular_J_per_K2: qt.secular_J_per_K * efficiency(t_mean_K),
            latent_J_per_K2: qt.latent_J_per_K * efficiency(t_icb_K),
            gravitational_J_per_K2: qt.gravitational_J_per_K * efficiency(t_icb_K),
            exsolution_J_per_K2: (qt.exsolution_mgo_J_per_K
                + qt.exsolution_sio2_J_per_K
                + qt.exsolution_feo_J_per_K)
                * efficiency(t_mean_K),
        })
    }

    fn radiogenic_present_W(&self) -> f64 {
        self.params.radiogenic_present_W
    }
}
