//! Configuration module - physical parameters with citations.

pub mod parameters;

pub use parameters::{
    ChemistryParameters, CouplingParameters, ExsolutionEnergies, GeometryParameters,
    MantleParameters, NimmoCoreParameters, OxideEnergies, Parameters, StevensonCoreParameters,
};
