pub mod density;
pub mod pressure;
pub mod viscosity;

use glam::Vec3;
use std::f32::consts::PI;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::FluidConfig;
use crate::particle::ParticleSet;

pub use density::compute_density_pressure;
pub use pressure::pressure_acceleration;
pub use viscosity::viscosity_acceleration;

/// Smoothing kernels for one support radius `h`, with the normalisation
/// constants computed once.
///
/// Every kernel is exactly `0.0` outside its support.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphKernels {
    h: f32,
    h2: f32,
    poly6_coeff: f32,
    spiky_grad_coeff: f32,
    visc_lap_coeff: f32,
}

impl SphKernels {
    pub fn new(h: f32) -> Self {
        let h2 = h * h;
        let h3 = h2 * h;
        Self {
            h,
            h2,
            poly6_coeff: 315.0 / (64.0 * PI * h3),
            spiky_grad_coeff: -45.0 / (PI * h2 * h2),
            visc_lap_coeff: 45.0 / (PI * h3 * h3),
        }
    }

    pub fn radius(&self) -> f32 {
        self.h
    }

    /// Poly6 density kernel of the squared distance `r2`:
    /// `315 / (64 PI h^3) * (1 - r2 / h^2)^3`, zero for `r2 >= h^2`.
    #[inline]
    pub fn poly6(&self, r2: f32) -> f32 {
        if r2 >= self.h2 {
            return 0.0;
        }
        let x = 1.0 - r2 / self.h2;
        self.poly6_coeff * x * x * x
    }

    /// First derivative of the spiky kernel:
    /// `-45 / (PI h^4) * (1 - dist / h)^2`, zero for `dist >= h`.
    #[inline]
    pub fn spiky_gradient_magnitude(&self, dist: f32) -> f32 {
        if dist >= self.h {
            return 0.0;
        }
        let x = 1.0 - dist / self.h;
        self.spiky_grad_coeff * x * x
    }

    /// Spiky gradient along `dir`, the unit vector from the particle toward
    /// its neighbor. The magnitude is negative, so the result points away
    /// from the neighbor.
    #[inline]
    pub fn spiky_gradient(&self, dist: f32, dir: Vec3) -> Vec3 {
        self.spiky_gradient_magnitude(dist) * dir
    }

    /// Viscosity kernel laplacian: `45 / (PI h^6) * (h - dist)` on `[0, h)`,
    /// zero elsewhere.
    #[inline]
    pub fn viscosity_laplacian(&self, dist: f32) -> f32 {
        if !(0.0..self.h).contains(&dist) {
            return 0.0;
        }
        self.visc_lap_coeff * (self.h - dist)
    }
}

/// Poly6 kernel for a one-off evaluation; see [`SphKernels::poly6`].
#[inline]
pub fn poly6(r2: f32, h: f32) -> f32 {
    SphKernels::new(h).poly6(r2)
}

/// See [`SphKernels::spiky_gradient_magnitude`].
#[inline]
pub fn spiky_gradient_magnitude(dist: f32, h: f32) -> f32 {
    SphKernels::new(h).spiky_gradient_magnitude(dist)
}

/// See [`SphKernels::spiky_gradient`].
#[inline]
pub fn spiky_gradient(dist: f32, dir: Vec3, h: f32) -> Vec3 {
    SphKernels::new(h).spiky_gradient(dist, dir)
}

/// See [`SphKernels::viscosity_laplacian`].
#[inline]
pub fn viscosity_laplacian(dist: f32, h: f32) -> f32 {
    SphKernels::new(h).viscosity_laplacian(dist)
}

/// Unit vector from `from` toward `to` and the distance between them, or
/// `None` when they are closer than `epsilon`.
#[inline]
pub fn direction_and_distance(from: Vec3, to: Vec3, epsilon: f32) -> Option<(Vec3, f32)> {
    let offset = to - from;
    let dist = offset.length();
    if dist < epsilon {
        return None;
    }
    Some((offset / dist, dist))
}

/// Add `dt` times the pressure and viscosity accelerations to every velocity.
///
/// All accelerations are gathered into `scratch` against the velocities from
/// before the stage, then applied, so the result does not depend on particle
/// order.
pub fn apply_pressure_viscosity(
    particles: &mut ParticleSet,
    kernels: &SphKernels,
    config: &FluidConfig,
    dt: f32,
    scratch: &mut Vec<Vec3>,
) {
    let count = particles.count;
    scratch.resize(count, Vec3::ZERO);

    {
        let particles = &*particles;
        let accel = |i: usize| {
            pressure_acceleration(particles, i, kernels, config)
                + viscosity_acceleration(particles, i, kernels, config)
        };

        #[cfg(feature = "parallel")]
        scratch
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, acc)| *acc = accel(i));

        #[cfg(not(feature = "parallel"))]
        for (i, acc) in scratch.iter_mut().enumerate() {
            *acc = accel(i);
        }
    }

    for (vel, acc) in particles.velocity.iter_mut().zip(scratch.iter()) {
        *vel += *acc * dt;
    }
}
