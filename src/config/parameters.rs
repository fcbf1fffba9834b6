//! Parameter structures with citation metadata.
//!
//! All physical parameters carry their literature source. Each model variant
//! gets its own explicit, typed struct validated at construction; there is no
//! open attribute bag.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ModelError;

/// Top-level parameters container
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Parameters {
    /// Planet and core radii, surface temperature
    pub geometry: GeometryParameters,
    /// Mantle boundary-layer convection parameters
    pub mantle: MantleParameters,
    /// Entropy-budget core model parameters (Nimmo-style, default model)
    pub core: NimmoCoreParameters,
    /// Initial molar inventory of the chemical pools
    pub chemistry: ChemistryParameters,
    /// Thermo-chemical coupling knobs
    pub coupling: CouplingParameters,
}

impl Parameters {
    /// Load parameters from JSON files, or use defaults if files don't exist
    pub fn load_or_default() -> Self {
        Self::load_from_dir("data/parameters")
    }

    /// Load parameters from a specific directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            geometry: load_json_or_default(dir.join("geometry.json"), "geometry"),
            mantle: load_json_or_default(dir.join("mantle.json"), "mantle"),
            core: load_json_or_default(dir.join("core.json"), "core"),
            chemistry: load_json_or_default(dir.join("chemistry.json"), "chemistry"),
            coupling: load_json_or_default(dir.join("coupling.json"), "coupling"),
        }
    }

    /// Check the whole set for internal consistency.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.geometry.validate()?;
        self.mantle.validate()?;
        self.core.validate()?;
        self.chemistry.validate()?;
        Ok(())
    }
}

fn load_json_or_default<T>(path: impl AsRef<Path>, what: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match std::fs::read_to_string(path.as_ref()) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(params) => {
                log::info!("Loaded {} parameters from {:?}", what, path.as_ref());
                params
            }
            Err(e) => {
                log::warn!("Failed to parse {} parameters: {}, using defaults", what, e);
                T::default()
            }
        },
        Err(_) => {
            log::info!("{} parameters file not found, using defaults", what);
            T::default()
        }
    }
}

/// Planet-scale geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryParameters {
    /// Planetary radius (m)
    /// Source: Earth reference value
    pub planet_radius_m: f64,

    /// Core radius (m)
    /// Source: PREM, Dziewonski & Anderson, PEPI 1981
    pub core_radius_m: f64,

    /// Fixed surface temperature (K)
    /// Source: Stevenson et al., Icarus 1983, Table I
    pub surface_temperature_K: f64,
}

impl Default for GeometryParameters {
    fn default() -> Self {
        Self {
            planet_radius_m: 6371.0e3,
            core_radius_m: 3480.0e3,
            surface_temperature_K: 300.0,
        }
    }
}

impl GeometryParameters {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.core_radius_m <= 0.0 || self.planet_radius_m <= self.core_radius_m {
            return Err(ModelError::non_physical(format!(
                "shell radii unordered: r_c = {:.3e} m, r_p = {:.3e} m",
                self.core_radius_m, self.planet_radius_m
            )));
        }
        if self.surface_temperature_K <= 0.0 {
            return Err(ModelError::non_physical("surface temperature must be positive"));
        }
        Ok(())
    }
}

/// Mantle boundary-layer convection parameters
///
/// Parameterized convection after Stevenson, Spohn & Schubert, Icarus 1983.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MantleParameters {
    /// Mantle density (kg/m³)
    /// Source: Stevenson et al. 1983, Table I
    pub density_kg_per_m3: f64,

    /// Mantle specific heat (J/(kg·K))
    /// Source: Stevenson et al. 1983, Table I
    pub specific_heat_J_per_kgK: f64,

    /// Thermal conductivity (W/(m·K))
    /// Source: Stevenson et al. 1983, Table I
    pub conductivity_W_per_mK: f64,

    /// Thermal diffusivity (m²/s)
    /// Source: Stevenson et al. 1983, Table I
    pub diffusivity_m2_per_s: f64,

    /// Thermal expansivity (1/K)
    /// Source: Schubert, Turcotte & Olson, Mantle Convection, 2001
    pub expansivity_per_K: f64,

    /// Gravitational acceleration across the mantle (m/s²)
    pub gravity_m_per_s2: f64,

    /// Critical Rayleigh number for the whole layer
    /// Source: Schubert, Turcotte & Olson 2001, §13.2
    pub ra_critical: f64,

    /// Local critical Rayleigh number for the lower boundary layer
    /// Source: Stevenson et al. 1983, eq. 24
    pub ra_boundary_critical: f64,

    /// Nusselt-Rayleigh exponent β in Nu ∝ Ra^β
    /// Source: Stevenson et al. 1983 (β = 0.3)
    pub beta: f64,

    /// Viscosity prefactor ν₀ (m²/s) in ν = ν₀ exp(A/T)
    /// Source: Stevenson et al. 1983, Table I
    pub viscosity_prefactor_m2_per_s: f64,

    /// Viscosity activation temperature A (K)
    /// Source: Stevenson et al. 1983, Table I
    pub activation_temperature_K: f64,

    /// Lower-mantle temperature over upper-mantle temperature along the
    /// mantle adiabat (dimensionless, > 1)
    /// Source: Stevenson et al. 1983 (adiabatic scaling factors)
    pub adiabatic_temperature_ratio: f64,

    /// Bulk mean mantle temperature rate over upper-mantle rate
    /// Source: Stevenson et al. 1983 (ε factor)
    pub bulk_to_upper_ratio: f64,

    /// Present-day mantle radiogenic heat production (W)
    /// Source: Korenaga, Rev Geophys 2008 (~13 TW)
    pub radiogenic_present_W: f64,
}

impl Default for MantleParameters {
    fn default() -> Self {
        Self {
            density_kg_per_m3: 4500.0,
            specific_heat_J_per_kgK: 1250.0,
            conductivity_W_per_mK: 4.0,
            diffusivity_m2_per_s: 1.0e-6,
            expansivity_per_K: 3.0e-5,
            gravity_m_per_s2: 10.0,
            ra_critical: 1100.0,
            ra_boundary_critical: 2000.0,
            beta: 0.3,
            viscosity_prefactor_m2_per_s: 4.0e3,
            activation_temperature_K: 5.2e4,
            adiabatic_temperature_ratio: 1.3,
            bulk_to_upper_ratio: 1.2,
            radiogenic_present_W: 1.3e13,
        }
    }
}

impl MantleParameters {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.beta <= 0.0 || self.beta >= 1.0 {
            return Err(ModelError::non_physical("β must lie in (0, 1)"));
        }
        if self.adiabatic_temperature_ratio < 1.0 {
            return Err(ModelError::non_physical(
                "adiabatic temperature ratio must be ≥ 1",
            ));
        }
        if self.ra_critical <= 0.0 || self.ra_boundary_critical <= 0.0 {
            return Err(ModelError::non_physical("critical Rayleigh numbers must be positive"));
        }
        Ok(())
    }
}

/// Entropy-budget core model parameters (Nimmo-style)
///
/// Liquidus polynomial and energy partitioning after Nimmo et al., GJI 2004
/// with the liquidus fit of Davies, PEPI 2015.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NimmoCoreParameters {
    /// Outer-core density (kg/m³)
    /// Source: Nimmo et al., GJI 2004
    pub density_kg_per_m3: f64,

    /// Inner-core density (kg/m³)
    /// Source: PREM
    pub inner_core_density_kg_per_m3: f64,

    /// Core specific heat (J/(kg·K))
    /// Source: Nimmo et al. 2004
    pub specific_heat_J_per_kgK: f64,

    /// Pressure at the core-mantle boundary (Pa)
    /// Source: PREM
    pub cmb_pressure_Pa: f64,

    /// Adiabatic length scale D in T(r) = T_c·exp(−r²/D²) (m)
    /// Source: Labrosse, PEPI 2015
    pub adiabatic_length_m: f64,

    /// Liquidus constant term T_m0 (K)
    /// Source: Davies, PEPI 2015 (core liquidus fit)
    pub liquidus_t0_K: f64,

    /// Liquidus linear coefficient T_m1 (1/Pa)
    /// Source: Davies, PEPI 2015
    pub liquidus_t1_per_Pa: f64,

    /// Liquidus quadratic coefficient T_m2 (1/Pa²)
    /// Source: Davies, PEPI 2015
    pub liquidus_t2_per_Pa2: f64,

    /// Latent heat of inner-core freezing (J/kg)
    /// Source: Nimmo et al. 2004 (~750 kJ/kg)
    pub latent_heat_J_per_kg: f64,

    /// Gravitational energy released per kg of inner-core growth (J/kg)
    /// Source: Nimmo et al. 2004
    pub gravitational_energy_J_per_kg: f64,

    /// Mass-averaged core temperature over CMB temperature
    /// Source: Labrosse 2015 (adiabatic profile average)
    pub mean_temperature_ratio: f64,

    /// Present-day core radiogenic heat production (W)
    /// Source: Nimmo et al. 2004 (potassium in the core, upper range 0.2 TW)
    pub radiogenic_present_W: f64,

    /// Latent/gravitational energies for oxide exsolution
    pub exsolution: ExsolutionEnergies,
}

impl Default for NimmoCoreParameters {
    fn default() -> Self {
        Self {
            density_kg_per_m3: 10900.0,
            inner_core_density_kg_per_m3: 12500.0,
            specific_heat_J_per_kgK: 840.0,
            cmb_pressure_Pa: 136.0e9,
            adiabatic_length_m: 6203.0e3,
            liquidus_t0_K: 2677.0,
            liquidus_t1_per_Pa: 2.95e-12,
            liquidus_t2_per_Pa2: 8.37e-25,
            latent_heat_J_per_kg: 750.0e3,
            gravitational_energy_J_per_kg: 3.0e5,
            mean_temperature_ratio: 1.2,
            radiogenic_present_W: 2.0e11,
            exsolution: ExsolutionEnergies::default(),
        }
    }
}

impl NimmoCoreParameters {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.liquidus_t0_K <= 0.0 {
            return Err(ModelError::non_physical("liquidus T_m0 must be positive"));
        }
        if self.adiabatic_length_m <= 0.0 {
            return Err(ModelError::non_physical("adiabatic length must be positive"));
        }
        if self.mean_temperature_ratio < 1.0 {
            return Err(ModelError::non_physical("mean temperature ratio must be ≥ 1"));
        }
        Ok(())
    }
}

/// Specific energies for one exsolving oxide
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OxideEnergies {
    /// Latent heat of exsolution (J/kg)
    pub latent_heat_J_per_kg: f64,
    /// Gravitational energy of buoyant rise to the CMB (J/kg)
    pub gravitational_energy_J_per_kg: f64,
}

impl OxideEnergies {
    /// Total heat released per kg exsolved (J/kg).
    pub fn total_J_per_kg(&self) -> f64 {
        self.latent_heat_J_per_kg + self.gravitational_energy_J_per_kg
    }
}

/// Exsolution energetics for the three oxides that can leave the core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExsolutionEnergies {
    /// MgO precipitation
    /// Source: O'Rourke & Stevenson, Nature 2016; Badro et al., PNAS 2016
    pub mgo: OxideEnergies,
    /// SiO₂ crystallization
    /// Source: Hirose et al., Nature 2017
    pub sio2: OxideEnergies,
    /// FeO transfer
    /// Source: Du et al., GRL 2017
    pub feo: OxideEnergies,
}

impl Default for ExsolutionEnergies {
    fn default() -> Self {
        Self {
            mgo: OxideEnergies {
                latent_heat_J_per_kg: 9.0e5,
                gravitational_energy_J_per_kg: 5.5e5,
            },
            sio2: OxideEnergies {
                latent_heat_J_per_kg: 7.3e5,
                gravitational_energy_J_per_kg: 4.1e5,
            },
            feo: OxideEnergies {
                latent_heat_J_per_kg: 3.2e5,
                gravitational_energy_J_per_kg: 1.6e5,
            },
        }
    }
}

/// Analytic-ICB core model parameters (Stevenson-style)
///
/// Liquidus and adiabat quadratics in pressure after Stevenson, Spohn &
/// Schubert, Icarus 1983, Table II (Earth case E1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StevensonCoreParameters {
    /// Core density (kg/m³)
    /// Source: Stevenson et al. 1983, Table I
    pub density_kg_per_m3: f64,

    /// Core specific heat (J/(kg·K))
    /// Source: Stevenson et al. 1983, Table I
    pub specific_heat_J_per_kgK: f64,

    /// Pressure at the core-mantle boundary (Pa)
    pub cmb_pressure_Pa: f64,

    /// Liquidus T_m0 (K) - light-element depressed
    /// Source: Stevenson et al. 1983, Table II, E1
    pub liquidus_t0_K: f64,

    /// Liquidus T_m1 (1/Pa)
    /// Source: Stevenson et al. 1983, Table II
    pub liquidus_t1_per_Pa: f64,

    /// Liquidus T_m2 (1/Pa²)
    /// Source: Stevenson et al. 1983, Table II
    pub liquidus_t2_per_Pa2: f64,

    /// Adiabat T_a1 (1/Pa)
    /// Source: Stevenson et al. 1983, Table II
    pub adiabat_t1_per_Pa: f64,

    /// Adiabat T_a2 (1/Pa²)
    /// Source: Stevenson et al. 1983, Table II
    pub adiabat_t2_per_Pa2: f64,

    /// Combined latent plus gravitational energy of freezing (J/kg)
    /// Source: Stevenson et al. 1983 (L + E_G ≈ 1 MJ/kg)
    pub latent_gravitational_J_per_kg: f64,

    /// Mass-averaged core temperature over CMB temperature
    pub mean_temperature_ratio: f64,

    /// Present-day core radiogenic heat production (W)
    pub radiogenic_present_W: f64,
}

impl Default for StevensonCoreParameters {
    fn default() -> Self {
        Self {
            density_kg_per_m3: 13000.0,
            specific_heat_J_per_kgK: 670.0,
            cmb_pressure_Pa: 136.0e9,
            liquidus_t0_K: 1950.0,
            liquidus_t1_per_Pa: 6.14e-12,
            liquidus_t2_per_Pa2: -4.5e-24,
            adiabat_t1_per_Pa: 3.96e-12,
            adiabat_t2_per_Pa2: -3.3e-24,
            latent_gravitational_J_per_kg: 1.0e6,
            mean_temperature_ratio: 1.2,
            radiogenic_present_W: 0.0,
        }
    }
}

impl StevensonCoreParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "stevenson core")
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.liquidus_t0_K <= 0.0 {
            return Err(ModelError::non_physical("liquidus T_m0 must be positive"));
        }
        Ok(())
    }
}

/// Initial molar inventory (mol)
///
/// Earth-scale magnitudes after the bulk compositions of McDonough, Treatise
/// on Geochemistry 2003 (core) and McDonough & Sun, Chem Geol 1995 (mantle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemistryParameters {
    /// Mg dissolved in the core (mol)
    pub core_mg_mol: f64,
    /// Si dissolved in the core (mol)
    pub core_si_mol: f64,
    /// Fe in the core (mol)
    pub core_fe_mol: f64,
    /// O dissolved in the core (mol)
    pub core_o_mol: f64,
    /// Mantle MgO (mol)
    pub mantle_mgo_mol: f64,
    /// Mantle SiO₂ (mol)
    pub mantle_sio2_mol: f64,
    /// Mantle FeO (mol)
    pub mantle_feo_mol: f64,
    /// Mantle MgSiO₃ (mol)
    pub mantle_mgsio3_mol: f64,
    /// Mantle FeSiO₃ (mol)
    pub mantle_fesio3_mol: f64,
}

impl Default for ChemistryParameters {
    fn default() -> Self {
        Self {
            core_mg_mol: 3.0e23,
            core_si_mol: 2.0e24,
            core_fe_mol: 3.2e25,
            core_o_mol: 3.5e24,
            mantle_mgo_mol: 1.2e25,
            mantle_sio2_mol: 6.0e24,
            mantle_feo_mol: 3.0e24,
            mantle_mgsio3_mol: 3.0e25,
            mantle_fesio3_mol: 2.5e24,
        }
    }
}

impl ChemistryParameters {
    /// The nine independent amounts in species index order.
    pub fn initial_inventory(&self) -> [f64; 9] {
        [
            self.core_mg_mol,
            self.core_si_mol,
            self.core_fe_mol,
            self.core_o_mol,
            self.mantle_mgo_mol,
            self.mantle_sio2_mol,
            self.mantle_feo_mol,
            self.mantle_mgsio3_mol,
            self.mantle_fesio3_mol,
        ]
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.initial_inventory().iter().any(|m| *m < 0.0) {
            return Err(ModelError::non_physical("initial molar amounts must be non-negative"));
        }
        Ok(())
    }
}

/// Thermo-chemical coupling knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingParameters {
    /// A-priori estimate of dT_cmb/dt (K/s) used when computing the
    /// exsolution-rate coefficients. The true rate depends on those same
    /// coefficients; this one-step lag breaks the cycle. ≈ −100 K/Gyr.
    pub dt_cmb_dt_estimate_K_per_s: f64,

    /// Reference epoch (s) at which radiogenic production equals its
    /// present-day value (4.5 Gyr)
    pub present_time_sec: f64,
}

impl Default for CouplingParameters {
    fn default() -> Self {
        Self {
            dt_cmb_dt_estimate_K_per_s: -3.0e-15,
            present_time_sec: 1.42e17,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Parameters::default().validate().unwrap();
        StevensonCoreParameters::default().validate().unwrap();
    }

    #[test]
    fn unordered_radii_rejected() {
        let geom = GeometryParameters {
            planet_radius_m: 1000.0,
            core_radius_m: 2000.0,
            ..Default::default()
        };
        assert!(geom.validate().is_err());
    }

    #[test]
    fn parameters_roundtrip_json() {
        let params = Parameters::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back.core.liquidus_t0_K, params.core.liquidus_t0_K);
        assert_eq!(back.chemistry.core_fe_mol, params.chemistry.core_fe_mol);
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let params = Parameters::load_from_dir("definitely/not/a/real/dir");
        assert_eq!(params.geometry.core_radius_m, 3480.0e3);
    }
}
