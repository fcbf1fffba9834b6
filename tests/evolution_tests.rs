//! Integration tests for the coupled evolution model.
//!
//! Tests verify:
//! - The derivative contract (purity, shape, error on bad states)
//! - Element totals stay fixed over an integrated trajectory
//! - The planet actually cools under default parameters
//! - The lagged exsolution estimate is pinned to its configured value

use planet_thermochem::{
    Element, EvolutionModel, IntegratorConfig, ModelError, Parameters, PlanetState, Rk4Integrator,
    Species,
};

const SECONDS_PER_YEAR: f64 = 3.156e7;

fn default_model() -> EvolutionModel {
    EvolutionModel::with_defaults(Parameters::default()).unwrap()
}

fn initial_state() -> PlanetState {
    PlanetState::initial(4300.0, 2000.0, &Parameters::default().chemistry)
}

// ============================================================================
// Derivative Contract
// ============================================================================

#[test]
fn derivative_is_finite_everywhere_in_range() {
    let model = default_model();
    let state = initial_state();
    for t_cmb in [2200.0, 3950.0, 4300.0, 6000.0] {
        let mut y = state.to_vector();
        y[0] = t_cmb;
        let dy = model.derivative(0.0, &y).unwrap();
        assert!(
            dy.iter().all(|v| v.is_finite()),
            "non-finite derivative at T_cmb = {t_cmb}"
        );
    }
}

#[test]
fn negative_moles_are_rejected() {
    let model = default_model();
    let mut y = initial_state().to_vector();
    y[4] = -1.0e20; // core Fe
    let err = model.derivative(0.0, &y).unwrap_err();
    assert!(matches!(err, ModelError::NonPhysicalState { .. }));
}

#[test]
fn negative_temperature_is_rejected() {
    let model = default_model();
    let mut y = initial_state().to_vector();
    y[0] = -10.0;
    let err = model.derivative(0.0, &y).unwrap_err();
    assert!(matches!(err, ModelError::NonPhysicalState { .. }));
}

#[test]
fn chemistry_rates_respond_to_the_thermal_side() {
    let model = default_model();
    let y = initial_state().to_vector();
    let dy = model.derivative(0.0, &y).unwrap();
    // The core cools under default parameters, the constants move, and the
    // species must move with them.
    assert!(dy[0] < 0.0, "expected a cooling CMB, got {:+.3e} K/s", dy[0]);
    let species_motion: f64 = dy[2..].iter().map(|r| r.abs()).sum();
    assert!(
        species_motion > 0.0,
        "equilibrium forcing produced no chemical response"
    );
}

// ============================================================================
// Integrated Trajectory
// ============================================================================

#[test]
fn element_totals_survive_integration() {
    let model = default_model();
    let state = initial_state();
    let initial_totals: Vec<f64> = Element::ALL
        .iter()
        .map(|e| state.pool.element_total_mol(*e))
        .collect();

    let mut integrator = Rk4Integrator::new(IntegratorConfig {
        dt_sec: 1.0e5 * SECONDS_PER_YEAR,
    });
    let mut y = state.to_vector();
    for _ in 0..25 {
        integrator
            .step(&mut y, |t, y| model.derivative(t, y))
            .unwrap();
    }

    let final_state = PlanetState::from_vector(integrator.time_sec, &y);
    for (element, initial) in Element::ALL.iter().zip(initial_totals) {
        let total = final_state.pool.element_total_mol(*element);
        assert!(
            ((total - initial) / initial).abs() < 1e-8,
            "element {element:?} drifted from {initial:.6e} to {total:.6e} mol"
        );
    }
}

#[test]
fn pool_identities_hold_along_the_trajectory() {
    let model = default_model();
    let mut integrator = Rk4Integrator::new(IntegratorConfig {
        dt_sec: 1.0e5 * SECONDS_PER_YEAR,
    });
    let mut y = initial_state().to_vector();
    for _ in 0..10 {
        integrator
            .step(&mut y, |t, y| model.derivative(t, y))
            .unwrap();
        let state = PlanetState::from_vector(integrator.time_sec, &y);
        assert!(state.pool.pool_identity_error() < 1e-10);
    }
}

#[test]
fn planet_cools_over_a_long_run() {
    let model = default_model();
    let mut integrator = Rk4Integrator::new(IntegratorConfig {
        dt_sec: 2.0e5 * SECONDS_PER_YEAR,
    });
    let mut y = initial_state().to_vector();
    let t_cmb_start = y[0];
    for _ in 0..50 {
        integrator
            .step(&mut y, |t, y| model.derivative(t, y))
            .unwrap();
    }
    assert!(
        y[0] < t_cmb_start,
        "CMB failed to cool: {t_cmb_start} K → {} K",
        y[0]
    );
}

#[test]
fn cooling_lowers_the_mgo_partitioning_ratio() {
    // The MgO equilibrium constant K = (x_Mg·x_O)/y_MgO must track its
    // forcing: cooling makes dK/K negative, so the mole-fraction ratio
    // reconstructed from the integrated pools has to fall.
    let mgo_ratio = |state: &PlanetState| {
        let m_c = state.pool.get(Species::CoreAlloy);
        let m_m = state.pool.get(Species::SilicateMelt);
        let x_mg = state.pool.get(Species::Mg) / m_c;
        let x_o = state.pool.get(Species::O) / m_c;
        let y_mgo = state.pool.get(Species::MgO) / m_m;
        x_mg * x_o / y_mgo
    };

    let model = default_model();
    let mut integrator = Rk4Integrator::new(IntegratorConfig {
        dt_sec: 1.0e5 * SECONDS_PER_YEAR,
    });
    let mut y = initial_state().to_vector();
    let ratio_start = mgo_ratio(&PlanetState::from_vector(0.0, &y));
    for _ in 0..25 {
        integrator
            .step(&mut y, |t, y| model.derivative(t, y))
            .unwrap();
    }
    let ratio_end = mgo_ratio(&PlanetState::from_vector(integrator.time_sec, &y));
    assert!(
        ratio_end < ratio_start,
        "K ratio rose from {ratio_start:.6e} to {ratio_end:.6e} while cooling"
    );
}

// ============================================================================
// Diagnostics & Coupling
// ============================================================================

#[test]
fn diagnostics_agree_with_derivative() {
    let model = default_model();
    let y = initial_state().to_vector();
    let dy = model.derivative(0.0, &y).unwrap();
    let diag = model.diagnostics(0.0, &y).unwrap();
    assert_eq!(diag.core.dt_cmb_dt_K_per_s, dy[0]);
    assert_eq!(diag.mantle.dt_um_dt_K_per_s, dy[1]);
}

#[test]
fn radiogenic_heating_decays_with_time() {
    let model = default_model();
    let y = initial_state().to_vector();
    let early = model.diagnostics(0.0, &y).unwrap();
    let late = model.diagnostics(1.42e17, &y).unwrap();
    assert!(early.q_radiogenic_mantle_W > late.q_radiogenic_mantle_W);
}
