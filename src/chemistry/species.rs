//! Species bookkeeping: tracked molar pools and their stoichiometry.
//!
//! Eleven quantities are tracked. Nine are independent molar amounts - four
//! light/major elements dissolved in the core metal (Mg, Si, Fe, O) and five
//! mantle phases (MgO, SiO₂, FeO, MgSiO₃, FeSiO₃). The remaining two are
//! *definitional* pools:
//!
//! - `CoreAlloy`    = Mg + Si + Fe + O
//! - `SilicateMelt` = MgO + SiO₂ + FeO + MgSiO₃ + FeSiO₃
//!
//! The pool identities are not independent state; any correct set of rates
//! preserves them to floating tolerance, and `MolePool` can verify that.
//!
//! Partitioning framework references:
//! - Fischer RA et al. GCA. 2015;167:177-194 (Si/O metal-silicate partitioning)
//! - Badro J et al. PNAS. 2016;113:12310-12314 (Mg exsolution)
//! - O'Rourke JG, Stevenson DJ. Nature. 2016;529:387-389 (MgO precipitation)

use serde::{Deserialize, Serialize};

/// Number of tracked species, derived pools included.
pub const SPECIES_COUNT: usize = 11;
/// Number of independently integrated species (pools excluded).
pub const INDEPENDENT_SPECIES_COUNT: usize = 9;
/// Number of conserved elements.
pub const ELEMENT_COUNT: usize = 4;
/// Number of partitioning reactions carrying an equilibrium constant.
pub const REACTION_COUNT: usize = 5;

/// Index of every tracked quantity in a [`MolePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum Species {
    /// Mg dissolved in the core metal
    Mg = 0,
    /// Si dissolved in the core metal
    Si = 1,
    /// Fe in the core metal
    Fe = 2,
    /// O dissolved in the core metal
    O = 3,
    /// Mantle periclase component
    MgO = 4,
    /// Mantle free-silica component
    SiO2 = 5,
    /// Mantle wüstite component
    FeO = 6,
    /// Mantle bridgmanite (enstatite) component
    MgSiO3 = 7,
    /// Mantle ferrosilite component
    FeSiO3 = 8,
    /// Derived pool: total moles of core alloy
    CoreAlloy = 9,
    /// Derived pool: total moles of silicate melt
    SilicateMelt = 10,
}

impl Species {
    /// All tracked quantities in index order.
    pub const ALL: [Species; SPECIES_COUNT] = [
        Species::Mg,
        Species::Si,
        Species::Fe,
        Species::O,
        Species::MgO,
        Species::SiO2,
        Species::FeO,
        Species::MgSiO3,
        Species::FeSiO3,
        Species::CoreAlloy,
        Species::SilicateMelt,
    ];

    /// The four core-dissolved elemental species.
    pub const CORE: [Species; 4] = [Species::Mg, Species::Si, Species::Fe, Species::O];

    /// The five mantle phase species.
    pub const MANTLE: [Species; 5] = [
        Species::MgO,
        Species::SiO2,
        Species::FeO,
        Species::MgSiO3,
        Species::FeSiO3,
    ];

    /// Position in the pool vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Species::Mg => "Mg",
            Species::Si => "Si",
            Species::Fe => "Fe",
            Species::O => "O",
            Species::MgO => "MgO",
            Species::SiO2 => "SiO2",
            Species::FeO => "FeO",
            Species::MgSiO3 => "MgSiO3",
            Species::FeSiO3 => "FeSiO3",
            Species::CoreAlloy => "M_c",
            Species::SilicateMelt => "M_m",
        }
    }
}

/// Conserved elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Element {
    Mg = 0,
    Si = 1,
    Fe = 2,
    O = 3,
}

impl Element {
    pub const ALL: [Element; ELEMENT_COUNT] = [Element::Mg, Element::Si, Element::Fe, Element::O];

    /// Moles of this element per mole of `species`.
    ///
    /// The derived pools carry no element content of their own; their element
    /// budget is already counted through their members.
    pub fn moles_in(self, species: Species) -> f64 {
        use Species::*;
        match (self, species) {
            (Element::Mg, Mg) | (Element::Mg, MgO) | (Element::Mg, MgSiO3) => 1.0,
            (Element::Si, Si) | (Element::Si, SiO2) | (Element::Si, MgSiO3)
            | (Element::Si, FeSiO3) => 1.0,
            (Element::Fe, Fe) | (Element::Fe, FeO) | (Element::Fe, FeSiO3) => 1.0,
            (Element::O, O) | (Element::O, MgO) | (Element::O, FeO) => 1.0,
            (Element::O, SiO2) => 2.0,
            (Element::O, MgSiO3) | (Element::O, FeSiO3) => 3.0,
            _ => 0.0,
        }
    }
}

/// The five partitioning reactions, in equilibrium-constant order.
///
/// The first three exchange material across the core-mantle boundary; the
/// last two redistribute oxides within the silicate melt:
///
/// | reaction | equilibrium constant |
/// |---|---|
/// | MgO ⇌ Mg + O          | K = x_Mg·x_O / y_MgO |
/// | SiO₂ ⇌ Si + 2O        | K = x_Si·x_O² / y_SiO2 |
/// | FeO ⇌ Fe + O          | K = x_Fe·x_O / y_FeO |
/// | MgSiO₃ ⇌ MgO + SiO₂   | K = y_MgO·y_SiO2 / y_MgSiO3 |
/// | FeSiO₃ ⇌ FeO + SiO₂   | K = y_FeO·y_SiO2 / y_FeSiO3 |
///
/// with `x` mole fractions in the metal (relative to `M_c`) and `y` mole
/// fractions in the melt (relative to `M_m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Reaction {
    MgODissolution = 0,
    SiO2Dissolution = 1,
    FeODissolution = 2,
    MgSiO3Breakdown = 3,
    FeSiO3Breakdown = 4,
}

impl Reaction {
    pub const ALL: [Reaction; REACTION_COUNT] = [
        Reaction::MgODissolution,
        Reaction::SiO2Dissolution,
        Reaction::FeODissolution,
        Reaction::MgSiO3Breakdown,
        Reaction::FeSiO3Breakdown,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Molar amounts of all tracked quantities (mol).
///
/// Stored as a contiguous vector so the reaction engine and the ODE driver
/// can address species by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MolePool {
    /// Molar amounts in [`Species`] index order (mol)
    pub moles: [f64; SPECIES_COUNT],
}

impl MolePool {
    /// Build a pool from the nine independent amounts; the two derived pools
    /// are filled in from their definitions.
    pub fn from_independent(independent: &[f64; INDEPENDENT_SPECIES_COUNT]) -> Self {
        let mut moles = [0.0; SPECIES_COUNT];
        moles[..INDEPENDENT_SPECIES_COUNT].copy_from_slice(independent);
        let mut pool = Self { moles };
        pool.refresh_derived_pools();
        pool
    }

    /// Recompute `M_c` and `M_m` from their members.
    pub fn refresh_derived_pools(&mut self) {
        self.moles[Species::CoreAlloy.index()] =
            Species::CORE.iter().map(|s| self.moles[s.index()]).sum();
        self.moles[Species::SilicateMelt.index()] =
            Species::MANTLE.iter().map(|s| self.moles[s.index()]).sum();
    }

    /// Molar amount of one species (mol).
    pub fn get(&self, species: Species) -> f64 {
        self.moles[species.index()]
    }

    /// Set one independent amount and refresh the derived pools.
    pub fn set(&mut self, species: Species, amount_mol: f64) {
        debug_assert!(!matches!(
            species,
            Species::CoreAlloy | Species::SilicateMelt
        ));
        self.moles[species.index()] = amount_mol;
        self.refresh_derived_pools();
    }

    /// Planet-wide moles of one element across every phase.
    pub fn element_total_mol(&self, element: Element) -> f64 {
        Species::ALL[..INDEPENDENT_SPECIES_COUNT]
            .iter()
            .map(|s| element.moles_in(*s) * self.moles[s.index()])
            .sum()
    }

    /// Largest relative violation of the two pool identities.
    pub fn pool_identity_error(&self) -> f64 {
        let core_sum: f64 = Species::CORE.iter().map(|s| self.get(*s)).sum();
        let mantle_sum: f64 = Species::MANTLE.iter().map(|s| self.get(*s)).sum();
        let core_err =
            (self.get(Species::CoreAlloy) - core_sum).abs() / core_sum.abs().max(f64::MIN_POSITIVE);
        let mantle_err = (self.get(Species::SilicateMelt) - mantle_sum).abs()
            / mantle_sum.abs().max(f64::MIN_POSITIVE);
        core_err.max(mantle_err)
    }

    /// True if every amount is non-negative.
    pub fn is_physical(&self) -> bool {
        self.moles.iter().all(|m| *m >= 0.0)
    }
}

/// Instantaneous rates of change for all tracked quantities (mol/s), as
/// produced by the reaction engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleRates {
    /// Rates in [`Species`] index order (mol/s)
    pub rates: [f64; SPECIES_COUNT],
}

impl MoleRates {
    pub fn get(&self, species: Species) -> f64 {
        self.rates[species.index()]
    }

    /// The nine independent rates, for handing to the ODE driver.
    pub fn independent(&self) -> [f64; INDEPENDENT_SPECIES_COUNT] {
        let mut out = [0.0; INDEPENDENT_SPECIES_COUNT];
        out.copy_from_slice(&self.rates[..INDEPENDENT_SPECIES_COUNT]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_pool() -> MolePool {
        MolePool::from_independent(&[
            1.0e21, 3.0e21, 7.0e22, 2.0e21, // core: Mg Si Fe O
            5.0e22, 1.0e22, 8.0e21, 3.0e22, 6.0e21, // mantle oxides
        ])
    }

    #[test]
    fn derived_pools_follow_members() {
        let pool = sample_pool();
        assert_relative_eq!(pool.get(Species::CoreAlloy), 7.6e22, max_relative = 1e-14);
        assert_relative_eq!(
            pool.get(Species::SilicateMelt),
            1.04e23,
            max_relative = 1e-14
        );
        assert!(pool.pool_identity_error() < 1e-14);
    }

    #[test]
    fn set_refreshes_pools() {
        let mut pool = sample_pool();
        pool.set(Species::Mg, 2.0e21);
        assert_relative_eq!(pool.get(Species::CoreAlloy), 7.7e22, max_relative = 1e-14);
    }

    #[test]
    fn oxygen_stoichiometry_counts_silicates() {
        let pool = sample_pool();
        // O total = O + MgO + 2 SiO2 + FeO + 3 MgSiO3 + 3 FeSiO3
        let expect = 2.0e21 + 5.0e22 + 2.0 * 1.0e22 + 8.0e21 + 3.0 * 3.0e22 + 3.0 * 6.0e21;
        assert_relative_eq!(
            pool.element_total_mol(Element::O),
            expect,
            max_relative = 1e-14
        );
    }

    #[test]
    fn pools_carry_no_element_content() {
        for el in Element::ALL {
            assert_eq!(el.moles_in(Species::CoreAlloy), 0.0);
            assert_eq!(el.moles_in(Species::SilicateMelt), 0.0);
        }
    }
}
