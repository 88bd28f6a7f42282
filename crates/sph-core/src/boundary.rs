use glam::Vec3;

use crate::config::BoundaryBox;
use crate::particle::ParticleSet;

/// Clamp one particle into `bounds`, bouncing off every wall it touches.
///
/// On each axis where the position is at or past a wall, the position is set
/// to the wall and that velocity component is multiplied by `damping`
/// (negative, so it reverses). Bounced components slower than
/// `rest_threshold` are zeroed to stop endless micro-bounces.
#[inline]
pub fn resolve_collision(
    position: &mut Vec3,
    velocity: &mut Vec3,
    bounds: &BoundaryBox,
    damping: f32,
    rest_threshold: f32,
) {
    for axis in 0..3 {
        let wall = if position[axis] <= bounds.min[axis] {
            bounds.min[axis]
        } else if position[axis] >= bounds.max[axis] {
            bounds.max[axis]
        } else {
            continue;
        };
        position[axis] = wall;
        velocity[axis] *= damping;
        if velocity[axis].abs() < rest_threshold {
            velocity[axis] = 0.0;
        }
    }
}

/// Resolve wall contacts for the whole store.
pub fn resolve_boundaries(
    particles: &mut ParticleSet,
    bounds: &BoundaryBox,
    damping: f32,
    rest_threshold: f32,
) {
    for (pos, vel) in particles
        .position
        .iter_mut()
        .zip(particles.velocity.iter_mut())
    {
        resolve_collision(pos, vel, bounds, damping, rest_threshold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundaryBox {
        BoundaryBox::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_floor_bounce_reverses_and_damps() {
        let mut pos = Vec3::new(0.5, -0.2, 0.5);
        let mut vel = Vec3::new(0.0, -2.0, 0.0);
        resolve_collision(&mut pos, &mut vel, &unit_box(), -0.5, 0.0);
        assert_eq!(pos.y, 0.0);
        assert_eq!(vel.y, 1.0);
    }

    #[test]
    fn test_corner_hits_every_axis() {
        let mut pos = Vec3::new(1.5, -1.0, 2.0);
        let mut vel = Vec3::new(1.0, -1.0, 1.0);
        resolve_collision(&mut pos, &mut vel, &unit_box(), -0.3, 0.0);
        assert_eq!(pos, Vec3::new(1.0, 0.0, 1.0));
        assert!(vel.x < 0.0 && vel.y > 0.0 && vel.z < 0.0);
    }

    #[test]
    fn test_slow_bounce_comes_to_rest() {
        let mut pos = Vec3::new(0.5, 0.0, 0.5);
        let mut vel = Vec3::new(0.0, -0.05, 0.0);
        resolve_collision(&mut pos, &mut vel, &unit_box(), -0.9, 0.1);
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn test_interior_untouched() {
        let mut pos = Vec3::splat(0.5);
        let mut vel = Vec3::new(3.0, -3.0, 1.0);
        resolve_collision(&mut pos, &mut vel, &unit_box(), -0.3, 0.5);
        assert_eq!(pos, Vec3::splat(0.5));
        assert_eq!(vel, Vec3::new(3.0, -3.0, 1.0));
    }
}
