use glam::Vec3;
use std::f32::consts::PI;
use sph_core::fluids::{
    poly6, spiky_gradient, spiky_gradient_magnitude, viscosity_laplacian, SphKernels,
};

#[test]
fn test_poly6_kernel_zero_distance() {
    let h = 0.1_f32;
    let result = poly6(0.0, h);
    let expected = 315.0 / (64.0 * PI * h.powi(3));
    assert!(
        (result - expected).abs() < expected * 1e-5,
        "poly6(0, {h}) = {result}, expected {expected}"
    );
}

#[test]
fn test_poly6_kernel_at_boundary() {
    let h = 0.1_f32;
    assert_eq!(poly6(h * h, h), 0.0, "poly6(h^2) should be 0.0");
}

#[test]
fn test_poly6_kernel_beyond_boundary() {
    let h = 0.1_f32;
    assert_eq!(poly6(0.011, h), 0.0, "poly6 beyond h^2 should be 0.0");
    assert_eq!(poly6(1.0e6, h), 0.0);
}

#[test]
fn test_poly6_kernel_midpoint() {
    let h = 1.5_f32;
    let k = SphKernels::new(h);
    let r = h / 2.0;
    let mid = k.poly6(r * r);
    // (1 - 1/4)^3 of the peak
    let expected = k.poly6(0.0) * 0.75_f32.powi(3);
    assert!(mid > 0.0, "poly6(h/2) should be positive");
    assert!((mid - expected).abs() < expected * 1e-5, "got {mid}, expected {expected}");
}

#[test]
fn test_spiky_gradient_magnitude_formula() {
    let h = 1.5_f32;
    let dist = 0.5_f32;
    let expected = -45.0 / (PI * h.powi(4)) * (1.0 - dist / h).powi(2);
    let got = spiky_gradient_magnitude(dist, h);
    assert!((got - expected).abs() < expected.abs() * 1e-5, "got {got}, expected {expected}");
    assert!(got < 0.0);
}

#[test]
fn test_spiky_gradient_at_and_beyond_boundary() {
    let h = 0.1_f32;
    assert_eq!(spiky_gradient_magnitude(h, h), 0.0);
    assert_eq!(spiky_gradient_magnitude(h + 0.01, h), 0.0);
    assert_eq!(spiky_gradient(h, Vec3::X, h), Vec3::ZERO);
}

#[test]
fn test_spiky_gradient_direction() {
    let h = 0.1_f32;
    // dir points from the particle toward its neighbor at +x
    let grad = spiky_gradient(0.05, Vec3::X, h);

    // Negative derivative: the gradient points away from the neighbor.
    assert!(grad.x < 0.0, "gradient x should be negative, got {}", grad.x);
    assert_eq!(grad.y, 0.0);
    assert_eq!(grad.z, 0.0);
}

#[test]
fn test_viscosity_laplacian_support() {
    let h = 1.5_f32;
    let expected_peak = 45.0 / (PI * h.powi(6)) * h;
    let peak = viscosity_laplacian(0.0, h);
    assert!((peak - expected_peak).abs() < expected_peak * 1e-5);
    assert!(viscosity_laplacian(0.75, h) > 0.0);
    assert_eq!(viscosity_laplacian(h, h), 0.0);
    assert_eq!(viscosity_laplacian(2.0 * h, h), 0.0);
    assert_eq!(viscosity_laplacian(-0.1, h), 0.0);
}

#[test]
fn test_kernels_decrease_toward_support() {
    let k = SphKernels::new(1.0);
    let mut last_poly = f32::INFINITY;
    let mut last_spiky = f32::INFINITY;
    let mut last_visc = f32::INFINITY;
    for step in 0..=20 {
        let r = step as f32 / 20.0;
        let poly = k.poly6(r * r);
        let spiky = k.spiky_gradient_magnitude(r).abs();
        let visc = k.viscosity_laplacian(r);
        assert!(poly <= last_poly && spiky <= last_spiky && visc <= last_visc);
        last_poly = poly;
        last_spiky = spiky;
        last_visc = visc;
    }
    assert_eq!(last_poly, 0.0);
    assert_eq!(last_spiky, 0.0);
    assert_eq!(last_visc, 0.0);
}
