//! Chemical bookkeeping for core-mantle light-element exchange.
//!
//! Tracks eleven molar quantities (four core-dissolved elements, five mantle
//! phases, two derived pools) and solves for their simultaneous rates of
//! change under externally supplied equilibrium-constant forcing.
//!
//! The engine here does mass bookkeeping only; what the equilibrium
//! constants *are* physically (activity ratios, pressure/temperature
//! dependence) belongs to the thermodynamics collaborator in
//! [`crate::coupling`].

pub mod equilibrium;
pub mod species;

pub use equilibrium::{solve_rates, ReactionSystem};
pub use species::{
    Element, MolePool, MoleRates, Reaction, Species, ELEMENT_COUNT, INDEPENDENT_SPECIES_COUNT,
    REACTION_COUNT, SPECIES_COUNT,
};
