/// Fermi-Dirac occupation of a level at `energy` (eV) for chemical potential `mu` (eV)
/// and temperature `temperature` (K). At zero temperature this is a step, with 1/2 at `mu`.
pub fn fermi_dirac(energy: f64, mu: f64, temperature: f64) -> f64 {
    let x = energy - mu;
    if temperature <= 0.0 {
        return if x < 0.0 {
            1.0
        } else if x > 0.0 {
            0.0
        } else {
            0.5
        };
    }
    let beta = 1.0 / (crate::phy_const::k_B_ev * temperature);
    1.0 / ((x * beta).exp() + 1.0)
}
