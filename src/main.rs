//! Planet Thermochem - Entry point
//!
//! Headless thermal/chemical cooling history.
//!
//! CLI Usage:
//!   cargo run --release                      # Default 4.5 Gyr history
//!   cargo run --release -- -n 1000 -d 1e6    # Custom step count and step (yr)
//!   cargo run --release -- --sample 100      # CSV row every 100 steps

use anyhow::{Context, Result};

use planet_thermochem::{
    EvolutionModel, IntegratorConfig, Parameters, PlanetState, Rk4Integrator, Species,
};

const SECONDS_PER_YEAR: f64 = 3.156e7;

struct CliOptions {
    steps: usize,
    step_years: f64,
    sample_every: usize,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            steps: 45_000,
            step_years: 1.0e5,
            sample_every: 450,
        }
    }
}

fn parse_args() -> Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut args = std::env::args().skip(1);
    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .with_context(|| format!("missing value for {name}"))
        };
        match flag.as_str() {
            "-n" | "--steps" => options.steps = value("-n")?.parse()?,
            "-d" | "--step-years" => options.step_years = value("-d")?.parse()?,
            "--sample" => options.sample_every = value("--sample")?.parse()?,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(options)
}

fn main() -> Result<()> {
    env_logger::init();
    let options = parse_args()?;

    let params = Parameters::load_or_default();
    params.validate().context("invalid parameters")?;
    let initial = PlanetState::initial(4800.0, 2100.0, &params.chemistry);
    let model = EvolutionModel::with_defaults(params).context("failed to build model")?;

    let mut integrator = Rk4Integrator::new(IntegratorConfig {
        dt_sec: options.step_years * SECONDS_PER_YEAR,
    });
    let mut y = initial.to_vector();

    println!("time_gyr,t_cmb_K,t_um_K,r_i_km,q_cmb_TW,q_surface_TW,core_mg_mol,mantle_mgo_mol");
    for step in 0..options.steps {
        if step % options.sample_every == 0 {
            let diag = model
                .diagnostics(integrator.time_sec, &y)
                .context("diagnostics failed")?;
            let state = PlanetState::from_vector(integrator.time_sec, &y);
            println!(
                "{:.4},{:.1},{:.1},{:.1},{:.3},{:.3},{:.4e},{:.4e}",
                integrator.time_sec / SECONDS_PER_YEAR / 1.0e9,
                state.t_cmb_K,
                state.t_um_K,
                diag.core.inner_core_radius_m / 1.0e3,
                diag.mantle.q_cmb_W / 1.0e12,
                diag.mantle.q_surface_W / 1.0e12,
                state.pool.get(Species::Mg),
                state.pool.get(Species::MgO),
            );
        }
        integrator
            .step(&mut y, |t, y| model.derivative(t, y))
            .with_context(|| format!("integration failed at step {step}"))?;
    }

    let final_state = PlanetState::from_vector(integrator.time_sec, &y);
    log::info!(
        "finished: {} steps, T_cmb = {:.1} K, pool identity error = {:.2e}",
        integrator.step_count,
        final_state.t_cmb_K,
        final_state.pool.pool_identity_error()
    );
    Ok(())
}
