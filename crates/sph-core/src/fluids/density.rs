#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::FluidConfig;
use crate::fluids::SphKernels;
use crate::particle::ParticleSet;

/// Density and pressure of every particle from its current neighbor set.
///
/// density  = mass * (sum_j poly6(scale * |x_i - x_j|^2) [+ poly6(0)]) + epsilon
/// pressure = gas_constant * (density - rest_density)
///
/// Neighbors at or beyond the support radius are filtered on the unscaled
/// distance. Pressure is negative below rest density.
pub fn compute_density_pressure(
    particles: &mut ParticleSet,
    kernels: &SphKernels,
    config: &FluidConfig,
) {
    let ParticleSet {
        position,
        density,
        pressure,
        neighbors,
        ..
    } = particles;
    let position = &*position;
    let neighbors = &*neighbors;

    let h2 = kernels.radius() * kernels.radius();
    let self_term = if config.include_self_density {
        kernels.poly6(0.0)
    } else {
        0.0
    };

    let evaluate = |i: usize| -> (f32, f32) {
        let pos_i = position[i];
        let mut sum = self_term;
        for &j in neighbors.get(i) {
            let r2 = pos_i.distance_squared(position[j as usize]);
            if r2 < h2 {
                sum += kernels.poly6(r2 * config.density_distance_scale);
            }
        }
        let rho = sum * config.particle_mass + config.density_epsilon;
        (rho, config.gas_constant * (rho - config.rest_density))
    };

    #[cfg(feature = "parallel")]
    {
        density
            .par_iter_mut()
            .zip(pressure.par_iter_mut())
            .enumerate()
            .for_each(|(i, (rho, p))| (*rho, *p) = evaluate(i));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, (rho, p)) in density.iter_mut().zip(pressure.iter_mut()).enumerate() {
            (*rho, *p) = evaluate(i);
        }
    }
}
