//! Planet Thermochem - coupled thermal and chemical evolution engine
//! for differentiated rocky planets.
//!
//! This library integrates a core-mantle energy balance with light-element
//! exchange chemistry (Mg, Si, Fe, O) to model how a metallic core cools,
//! freezes and exsolves oxides into the overlying silicate mantle.

// Allow non-snake-case for unit suffixes in field names (K, Pa, W, etc.)
// This follows the project convention of including units in names.
#![allow(non_snake_case)]

pub mod cache;
pub mod chemistry;
pub mod config;
pub mod coupling;
pub mod error;
pub mod geometry;
pub mod integrator;
pub mod state;
pub mod thermal;

pub use cache::{compute_uncached, EvalCache, Oxide, Quantity};
pub use chemistry::{
    solve_rates, Element, MolePool, MoleRates, Reaction, Species, REACTION_COUNT, SPECIES_COUNT,
};
pub use config::Parameters;
pub use coupling::{
    EquilibriumResponse, EvolutionModel, ExponentialDecayRadiogenics, Radiogenics, Thermodynamics,
    VantHoffThermodynamics,
};
pub use error::ModelError;
pub use geometry::SphericalShell;
pub use integrator::{IntegratorConfig, Rk4Integrator};
pub use state::{PlanetState, StateRecord, StateVector, STATE_LEN};
pub use thermal::{
    CoreBalance, CoreState, EtCoefficients, ExsolutionCoefficients, MantleModel, NimmoCoreModel,
    QtCoefficients, StevensonCoreModel, ThermalModel,
};
