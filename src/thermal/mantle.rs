//! Mantle energy balance via parameterized boundary-layer convection.
//!
//! Whole-mantle convection after Stevenson, Spohn & Schubert, Icarus 1983:
//! the interior convects vigorously and all temperature drops are taken
//! across two conductive boundary layers. Layer thicknesses follow the
//! Nusselt-Rayleigh scaling `δ ∝ d·(Ra_crit/Ra)^β`; the lower layer
//! additionally respects a local-critical-Rayleigh-number estimate, and the
//! thinner of the two wins. That min-of-two-estimates policy controls how
//! much core heat can enter the mantle and is kept exactly.

use crate::config::{GeometryParameters, MantleParameters};
use crate::error::ModelError;
use crate::geometry::SphericalShell;

/// Floor on boundary-layer temperature drops when forming thickness
/// estimates, to keep the cube root finite while a drop passes through zero.
const MIN_DELTA_T_K: f64 = 1e-6;

/// One evaluation of the mantle energy balance.
#[derive(Debug, Clone, Copy)]
pub struct MantleBalance {
    /// Whole-layer Rayleigh number
    pub rayleigh: f64,
    /// Upper boundary-layer thickness (m)
    pub upper_layer_m: f64,
    /// Lower boundary-layer thickness (m), after the min-of-two policy
    pub lower_layer_m: f64,
    /// Conductive flux through the upper layer (W/m²)
    pub surface_flux_W_per_m2: f64,
    /// Conductive flux through the lower layer (W/m²), positive into the
    /// mantle
    pub cmb_flux_W_per_m2: f64,
    /// Total heat leaving through the surface (W)
    pub q_surface_W: f64,
    /// Total heat entering from the core (W); this is the core's Q_cmb
    pub q_cmb_W: f64,
    /// Upper-mantle temperature rate (K/s)
    pub dt_um_dt_K_per_s: f64,
}

/// Boundary-layer convection model of the mantle shell.
#[derive(Debug, Clone)]
pub struct MantleModel {
    params: MantleParameters,
    shell: SphericalShell,
    surface_temperature_K: f64,
}

impl MantleModel {
    pub fn new(geometry: &GeometryParameters, params: MantleParameters) -> Self {
        let shell = SphericalShell::new(geometry.core_radius_m, geometry.planet_radius_m);
        Self {
            params,
            shell,
            surface_temperature_K: geometry.surface_temperature_K,
        }
    }

    pub fn params(&self) -> &MantleParameters {
        &self.params
    }

    /// Arrhenius-type kinematic viscosity ν(T) = ν₀·exp(A/T) (m²/s).
    /// Source: Stevenson et al. 1983, eq. 20.
    pub fn viscosity_m2_per_s(&self, temperature_K: f64) -> f64 {
        self.params.viscosity_prefactor_m2_per_s
            * (self.params.activation_temperature_K / temperature_K).exp()
    }

    /// Temperature at the top of the lower boundary layer (K): the
    /// upper-mantle temperature carried down the mantle adiabat.
    pub fn lower_mantle_temperature_K(&self, t_um_K: f64) -> f64 {
        t_um_K * self.params.adiabatic_temperature_ratio
    }

    /// Evaluate the balance at the given temperatures and internal heating.
    pub fn balance(&self, t_um_K: f64, t_cmb_K: f64, q_radiogenic_W: f64) -> MantleBalance {
        let p = &self.params;
        let d = self.shell.thickness_m();

        let t_lower_K = self.lower_mantle_temperature_K(t_um_K);
        let delta_t_upper_K = t_um_K - self.surface_temperature_K;
        let delta_t_lower_K = t_cmb_K - t_lower_K;

        // Whole-layer Rayleigh number on the interior viscosity. The driving
        // drop is the sum of both boundary drops (Stevenson et al. 1983,
        // eq. 23). Sub-critical states degenerate to conduction across the
        // whole layer.
        let nu_interior = self.viscosity_m2_per_s(t_um_K);
        let driving_drop_K = (delta_t_upper_K + delta_t_lower_K).max(MIN_DELTA_T_K);
        let rayleigh = (p.gravity_m_per_s2 * p.expansivity_per_K * driving_drop_K * d.powi(3)
            / (p.diffusivity_m2_per_s * nu_interior))
            .max(p.ra_critical);

        let upper_layer_m = d * (p.ra_critical / rayleigh).powf(p.beta);

        // Lower layer: the same Nu-Ra scaling estimate vs the local
        // critical-Rayleigh-number estimate on the (hotter, softer) layer
        // viscosity. Take the minimum.
        let nu_lower = self.viscosity_m2_per_s(0.5 * (t_lower_K + t_cmb_K));
        let bl_estimate_m = upper_layer_m;
        let crit_estimate_m = (p.ra_boundary_critical * p.diffusivity_m2_per_s * nu_lower
            / (p.gravity_m_per_s2 * p.expansivity_per_K * delta_t_lower_K.abs().max(MIN_DELTA_T_K)))
        .cbrt();
        let lower_layer_m = bl_estimate_m.min(crit_estimate_m);

        let surface_flux_W_per_m2 = p.conductivity_W_per_mK * delta_t_upper_K / upper_layer_m;
        let cmb_flux_W_per_m2 = p.conductivity_W_per_mK * delta_t_lower_K / lower_layer_m;

        let q_surface_W = surface_flux_W_per_m2 * self.shell.outer_area_m2();
        let q_cmb_W = cmb_flux_W_per_m2 * self.shell.inner_area_m2();

        let heat_capacity_J_per_K = self.shell.mass_kg(p.density_kg_per_m3)
            * p.specific_heat_J_per_kgK
            * p.bulk_to_upper_ratio;
        let dt_um_dt_K_per_s = (q_radiogenic_W + q_cmb_W - q_surface_W) / heat_capacity_J_per_K;

        MantleBalance {
            rayleigh,
            upper_layer_m,
            lower_layer_m,
            surface_flux_W_per_m2,
            cmb_flux_W_per_m2,
            q_surface_W,
            q_cmb_W,
            dt_um_dt_K_per_s,
        }
    }

    /// Validate the parameter set at construction time.
    pub fn validated(
        geometry: &GeometryParameters,
        params: MantleParameters,
    ) -> Result<Self, ModelError> {
        geometry.validate()?;
        params.validate()?;
        Ok(Self::new(geometry, params))
    }
}
