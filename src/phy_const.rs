#![allow(non_upper_case_globals)]
//! Physical constants in the eV-based units used by the current integrators.

/// Reduced Planck constant in eV s.
pub const hbar_ev: f64 = 6.58211951440e-16;
/// Boltzmann constant in eV/K.
pub const k_B_ev: f64 = 8.617333262e-5;
