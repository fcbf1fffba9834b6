//! Integration tests for the thermal models.
//!
//! Tests verify:
//! - Boundary short-circuits of the phase-boundary solver against the
//!   published constants (r_c = 3480 km, T_m0 = 2677 K)
//! - Monotonic inner-core growth as the core cools
//! - The min-of-two-estimates policy for the lower boundary layer
//! - Core state machine transitions

use planet_thermochem::config::{
    GeometryParameters, MantleParameters, NimmoCoreParameters, StevensonCoreParameters,
};
use planet_thermochem::thermal::{
    CoreState, ExsolutionCoefficients, MantleModel, NimmoCoreModel, StevensonCoreModel,
    ThermalModel,
};
use planet_thermochem::EvalCache;

fn nimmo_model() -> NimmoCoreModel {
    NimmoCoreModel::new(
        &GeometryParameters::default(),
        NimmoCoreParameters::default(),
    )
}

fn radius_at(model: &NimmoCoreModel, t_cmb_K: f64) -> f64 {
    let mut cache = EvalCache::new();
    model.inner_core_radius_m(t_cmb_K, &mut cache).unwrap()
}

// ============================================================================
// Phase-Boundary Short-Circuits
// ============================================================================

#[test]
fn cold_cmb_freezes_the_whole_core() {
    let model = nimmo_model();
    // At 2000 K the CMB sits below the liquidus at full radius: the
    // short-circuit must return exactly r_c without running the root-finder.
    assert_eq!(radius_at(&model, 2000.0), 3480.0e3);
    assert_eq!(model.core_state(2000.0), CoreState::FullySolid);
}

#[test]
fn hot_cmb_melts_the_whole_core() {
    let model = nimmo_model();
    // At 6500 K the center adiabat clears the center liquidus: exactly 0.
    assert_eq!(radius_at(&model, 6500.0), 0.0);
    assert_eq!(model.core_state(6500.0), CoreState::FullyLiquid);
}

#[test]
fn partial_regime_exists_between_the_thresholds() {
    let model = nimmo_model();
    let r_i = radius_at(&model, 3950.0);
    assert!(
        r_i > 0.0 && r_i < 3480.0e3,
        "expected interior boundary, got {r_i} m"
    );
    assert_eq!(model.core_state(3950.0), CoreState::PartiallySolidified);
}

// ============================================================================
// Monotonic Inner-Core Growth
// ============================================================================

#[test]
fn inner_core_radius_is_nonincreasing_in_temperature() {
    let model = nimmo_model();
    let mut last = f64::INFINITY;
    let mut t_cmb = 2000.0;
    while t_cmb <= 6500.0 {
        let r_i = radius_at(&model, t_cmb);
        assert!(
            r_i <= last + 1e-3,
            "r_i grew from {last:.3} to {r_i:.3} m at {t_cmb} K"
        );
        assert!((0.0..=3480.0e3).contains(&r_i));
        last = r_i;
        t_cmb += 25.0;
    }
}

#[test]
fn state_machine_transitions_once_while_cooling() {
    let model = nimmo_model();
    let mut seen = vec![model.core_state(6400.0)];
    let mut t_cmb = 6400.0;
    while t_cmb >= 2000.0 {
        let state = model.core_state(t_cmb);
        if *seen.last().unwrap() != state {
            seen.push(state);
        }
        t_cmb -= 10.0;
    }
    assert_eq!(
        seen,
        vec![
            CoreState::FullyLiquid,
            CoreState::PartiallySolidified,
            CoreState::FullySolid
        ],
        "cooling must pass each state exactly once"
    );
}

// ============================================================================
// Stevenson Variant
// ============================================================================

#[test]
fn stevenson_short_circuits_match_bisection_variant_contract() {
    let model = StevensonCoreModel::new(
        &GeometryParameters::default(),
        StevensonCoreParameters::default(),
    );
    let mut cache = EvalCache::new();
    // Below the CMB liquidus: fully solid at exactly r_c.
    let cold = model.inner_core_radius_m(3000.0, &mut cache).unwrap();
    assert_eq!(cold, 3480.0e3);
    // Far above the center crossing: fully liquid at exactly zero.
    let mut cache = EvalCache::new();
    let hot = model.inner_core_radius_m(8000.0, &mut cache).unwrap();
    assert_eq!(hot, 0.0);
}

#[test]
fn stevenson_balance_cools_with_strong_cmb_flow() {
    let model = StevensonCoreModel::new(
        &GeometryParameters::default(),
        StevensonCoreParameters::default(),
    );
    let mut cache = EvalCache::new();
    let balance = model
        .energy_balance(3600.0, 6.0e12, 0.0, &ExsolutionCoefficients::ZERO, &mut cache)
        .unwrap();
    assert!(balance.dt_cmb_dt_K_per_s < 0.0);
    assert!(balance.qt_total_J_per_K < 0.0);
}

// ============================================================================
// Mantle Boundary Layers
// ============================================================================

#[test]
fn lower_layer_never_exceeds_boundary_layer_estimate() {
    let geometry = GeometryParameters::default();
    let params = MantleParameters::default();
    let model = MantleModel::new(&geometry, params.clone());
    let d = geometry.planet_radius_m - geometry.core_radius_m;

    for (t_um, t_cmb) in [(1600.0, 3800.0), (1800.0, 4100.0), (2100.0, 4800.0)] {
        let balance = model.balance(t_um, t_cmb, 1.3e13);
        let bl_estimate = d * (params.ra_critical / balance.rayleigh).powf(params.beta);
        assert!(
            balance.lower_layer_m <= bl_estimate + 1e-9,
            "min-of-two policy violated at T_um = {t_um}"
        );
    }
}

#[test]
fn hotter_upper_mantle_raises_surface_heat_flow() {
    let model = MantleModel::new(&GeometryParameters::default(), MantleParameters::default());
    let cool = model.balance(1700.0, 4100.0, 1.3e13);
    let warm = model.balance(1900.0, 4100.0, 1.3e13);
    assert!(warm.q_surface_W > cool.q_surface_W);
}

#[test]
fn exsolution_terms_deepen_the_heat_budget() {
    let model = nimmo_model();
    let exso = ExsolutionCoefficients {
        mgo_kg_per_K: 1.8e19,
        sio2_kg_per_K: 9.0e18,
        feo_kg_per_K: 2.0e18,
    };
    let mut cache = EvalCache::new();
    let with = model.qt_coefficients(3950.0, &exso, &mut cache).unwrap();
    let mut cache = EvalCache::new();
    let without = model
        .qt_coefficients(3950.0, &ExsolutionCoefficients::ZERO, &mut cache)
        .unwrap();
    assert!(
        with.total_J_per_K() < without.total_J_per_K(),
        "exsolution must add (negative) per-kelvin capacity"
    );
}
