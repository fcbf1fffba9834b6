//! Spherical-shell geometry for the core and mantle reservoirs.
//!
//! The planet is modeled as concentric spherical shells: an inner metallic
//! core of radius `r_c` and a silicate mantle from `r_c` out to the planetary
//! radius `r_p`. Only radii, volumes and bounding areas are needed by the
//! energy balances; everything here is closed-form.

use std::f64::consts::PI;

/// A spherical shell bounded by two radii (meters).
///
/// A full sphere is the degenerate case `inner_radius_m == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalShell {
    /// Inner bounding radius (m)
    pub inner_radius_m: f64,
    /// Outer bounding radius (m)
    pub outer_radius_m: f64,
}

impl SphericalShell {
    /// Create a shell; panics in debug builds if the radii are unordered.
    pub fn new(inner_radius_m: f64, outer_radius_m: f64) -> Self {
        debug_assert!(inner_radius_m >= 0.0);
        debug_assert!(outer_radius_m >= inner_radius_m);
        Self {
            inner_radius_m,
            outer_radius_m,
        }
    }

    /// Full sphere of the given radius.
    pub fn sphere(radius_m: f64) -> Self {
        Self::new(0.0, radius_m)
    }

    /// Shell thickness (m).
    pub fn thickness_m(&self) -> f64 {
        self.outer_radius_m - self.inner_radius_m
    }

    /// Shell volume (m³).
    pub fn volume_m3(&self) -> f64 {
        4.0 / 3.0 * PI * (self.outer_radius_m.powi(3) - self.inner_radius_m.powi(3))
    }

    /// Area of the outer bounding sphere (m²).
    pub fn outer_area_m2(&self) -> f64 {
        4.0 * PI * self.outer_radius_m * self.outer_radius_m
    }

    /// Area of the inner bounding sphere (m²). Zero for a full sphere.
    pub fn inner_area_m2(&self) -> f64 {
        4.0 * PI * self.inner_radius_m * self.inner_radius_m
    }

    /// Mass of the shell at uniform density (kg).
    pub fn mass_kg(&self, density_kg_per_m3: f64) -> f64 {
        self.volume_m3() * density_kg_per_m3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_volume_matches_closed_form() {
        let s = SphericalShell::sphere(2.0);
        assert_relative_eq!(s.volume_m3(), 4.0 / 3.0 * PI * 8.0, epsilon = 1e-12);
    }

    #[test]
    fn shell_volume_is_difference_of_spheres() {
        let shell = SphericalShell::new(1.0, 3.0);
        let outer = SphericalShell::sphere(3.0);
        let inner = SphericalShell::sphere(1.0);
        assert_relative_eq!(
            shell.volume_m3(),
            outer.volume_m3() - inner.volume_m3(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn areas_and_mass() {
        let shell = SphericalShell::new(1.0, 2.0);
        assert_relative_eq!(shell.outer_area_m2(), 16.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(shell.inner_area_m2(), 4.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(
            shell.mass_kg(1000.0),
            shell.volume_m3() * 1000.0,
            epsilon = 1e-12
        );
    }
}
