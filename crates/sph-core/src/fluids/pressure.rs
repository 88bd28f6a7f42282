use glam::Vec3;

use crate::config::FluidConfig;
use crate::fluids::{direction_and_distance, SphKernels};
use crate::particle::ParticleSet;

/// Pressure acceleration of particle `i`.
///
/// a_i = 1/rho_i * sum_j (p_i + p_j) / (2 rho_j) * m * grad_spiky(|x_j - x_i|, dir_ij)
///
/// `dir_ij` points from `i` toward `j`; with the negative spiky derivative a
/// positive pressure pair pushes `i` away from `j`, a negative one pulls it in.
/// Pairs closer than the distance epsilon are skipped.
pub fn pressure_acceleration(
    particles: &ParticleSet,
    i: usize,
    kernels: &SphKernels,
    config: &FluidConfig,
) -> Vec3 {
    let pos_i = particles.position[i];
    let p_i = particles.pressure[i];
    let mut acc = Vec3::ZERO;

    for &j in particles.neighbors_of(i) {
        let j = j as usize;
        if particles.id[j] == particles.id[i] {
            continue;
        }
        let Some((dir, dist)) =
            direction_and_distance(pos_i, particles.position[j], config.distance_epsilon)
        else {
            continue;
        };
        let shared = (p_i + particles.pressure[j]) / (2.0 * particles.density[j]);
        acc += shared * config.particle_mass * kernels.spiky_gradient(dist, dir);
    }

    acc / particles.density[i]
}
