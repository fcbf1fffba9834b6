//! Fixed-step RK4 driver for the evolution state vector.
//!
//! The derivative contract in [`crate::coupling`] is stepper-agnostic; any
//! external integrator (adaptive, implicit) can call it. This module is the
//! in-crate convenience driver used by the integration tests and the
//! diagnostics binary.
//!
//! Standard 4th-order Runge-Kutta:
//! k1 = f(t, y)
//! k2 = f(t + dt/2, y + dt/2·k1)
//! k3 = f(t + dt/2, y + dt/2·k2)
//! k4 = f(t + dt, y + dt·k3)
//! y ← y + dt/6·(k1 + 2k2 + 2k3 + k4)
//!
//! Reference: Press et al., Numerical Recipes, 3rd ed., Cambridge University
//! Press 2007

use crate::error::ModelError;
use crate::state::{StateVector, STATE_LEN};

/// Configuration for the fixed-step driver
#[derive(Debug, Clone)]
pub struct IntegratorConfig {
    /// Integration timestep (s). Geological problems want 10⁴-10⁶ yr steps.
    pub dt_sec: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            dt_sec: 3.15e12, // 100 kyr
        }
    }
}

/// Fixed-step RK4 integrator over the 11-entry state vector.
pub struct Rk4Integrator {
    /// Configuration
    pub config: IntegratorConfig,
    /// Current simulation time (s)
    pub time_sec: f64,
    /// Number of steps taken
    pub step_count: u64,
}

impl Rk4Integrator {
    pub fn new(config: IntegratorConfig) -> Self {
        Self {
            config,
            time_sec: 0.0,
            step_count: 0,
        }
    }

    /// Advance `y` by one step.
    ///
    /// The derivative may fail (singular chemistry, non-physical probe
    /// state); the error propagates and `y` is left unmodified so the
    /// caller can shrink the step and retry.
    pub fn step<F>(&mut self, y: &mut StateVector, derivative: F) -> Result<(), ModelError>
    where
        F: Fn(f64, &StateVector) -> Result<StateVector, ModelError>,
    {
        let dt = self.config.dt_sec;
        let t = self.time_sec;

        let k1 = derivative(t, y)?;
        let k2 = derivative(t + 0.5 * dt, &offset(y, &k1, 0.5 * dt))?;
        let k3 = derivative(t + 0.5 * dt, &offset(y, &k2, 0.5 * dt))?;
        let k4 = derivative(t + dt, &offset(y, &k3, dt))?;

        for i in 0..STATE_LEN {
            y[i] += dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }
        self.time_sec += dt;
        self.step_count += 1;
        Ok(())
    }
}

fn offset(y: &StateVector, k: &StateVector, scale: f64) -> StateVector {
    let mut out = *y;
    for i in 0..STATE_LEN {
        out[i] += scale * k[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exponential_decay_fourth_order() {
        // dy/dt = -y on every component; exact solution e^{-t}.
        let mut integrator = Rk4Integrator::new(IntegratorConfig { dt_sec: 0.1 });
        let mut y = [1.0; STATE_LEN];
        for _ in 0..10 {
            integrator
                .step(&mut y, |_, y| {
                    let mut dy = [0.0; STATE_LEN];
                    for i in 0..STATE_LEN {
                        dy[i] = -y[i];
                    }
                    Ok(dy)
                })
                .unwrap();
        }
        assert_relative_eq!(y[0], (-1.0_f64).exp(), max_relative = 1e-5);
        assert_eq!(integrator.step_count, 10);
    }

    #[test]
    fn failed_derivative_leaves_state_untouched() {
        let mut integrator = Rk4Integrator::new(IntegratorConfig { dt_sec: 1.0 });
        let mut y = [2.0; STATE_LEN];
        let before = y;
        let result = integrator.step(&mut y, |_, _| {
            Err(ModelError::NonConvergence { iterations: 1 })
        });
        assert!(result.is_err());
        assert_eq!(y, before);
        assert_eq!(integrator.step_count, 0);
    }
}
