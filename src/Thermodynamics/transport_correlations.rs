//! # Transport Correlations
//!
//! Dimensionless groups of a packed bed and the gas/solid transfer coefficients.
//!
//! ```text
//! Re = ρ v dp / μ          Sc = μ / (ρ D)         Pr = Cp μ / (λ M)
//! k_g = Sh D / dp          h = Nu λ / dp
//! Pe_m = v L / D           Pe_h = ρ Cp v L / (λ M)
//! ```
//!
//! Sherwood and Nusselt numbers are selected by name:
//!
//! | Name | Sherwood | Nusselt |
//! |------|----------|---------|
//! | `Frossling` / `RanzMarshall` | 2 + 0.6 Re^½ Sc^⅓ | 2 + 0.6 Re^½ Pr^⅓ |
//! | `WakaoFunazkri` | 2 + 1.1 Re^0.6 Sc^⅓ | 2 + 1.1 Re^0.6 Pr^⅓ |
//!
//! Gas diffusivities are estimated with the Chapman-Enskog theory when the feed does not give
//! them. Lennard-Jones parameters come from the critical constants (σ = 2.44 (Tc/Pc)^⅓ with Pc
//! in atm, ε/k = 0.77 Tc), the collision integral from the Neufeld fit, and the diffusivity of a
//! species in the mixture from Wilke's rule D_im = (1 - y_i) / Σ_{j≠i} y_j / D_ij.
use crate::ReactorModels::reactor_error::ReactorError;
use crate::Thermodynamics::component_data::ComponentData;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reynolds number
pub fn reynolds(density: f64, velocity: f64, particle_diameter: f64, viscosity: f64) -> f64 {
    density * velocity * particle_diameter / viscosity
}

/// Schmidt number
pub fn schmidt(density: f64, viscosity: f64, diffusivity: f64) -> f64 {
    viscosity / (density * diffusivity)
}

/// Prandtl number, `heat_capacity` molar (J/mol/K), `molar_mass` in kg/mol
pub fn prandtl(heat_capacity: f64, viscosity: f64, thermal_conductivity: f64, molar_mass: f64) -> f64 {
    heat_capacity * viscosity / (thermal_conductivity * molar_mass)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SherwoodCorrelation {
    #[default]
    Frossling,
    WakaoFunazkri,
}

impl SherwoodCorrelation {
    pub fn sherwood(&self, reynolds: f64, schmidt: f64) -> f64 {
        match self {
            SherwoodCorrelation::Frossling => 2.0 + 0.6 * reynolds.sqrt() * schmidt.cbrt(),
            SherwoodCorrelation::WakaoFunazkri => 2.0 + 1.1 * reynolds.powf(0.6) * schmidt.cbrt(),
        }
    }
}

impl FromStr for SherwoodCorrelation {
    type Err = ReactorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' ', 'ö'], "").as_str() {
            "frossling" | "frssling" => Ok(SherwoodCorrelation::Frossling),
            "wakaofunazkri" => Ok(SherwoodCorrelation::WakaoFunazkri),
            _ => Err(ReactorError::InvalidConfiguration(format!(
                "unknown Sherwood correlation '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NusseltCorrelation {
    #[default]
    RanzMarshall,
    WakaoFunazkri,
}

impl NusseltCorrelation {
    pub fn nusselt(&self, reynolds: f64, prandtl: f64) -> f64 {
        match self {
            NusseltCorrelation::RanzMarshall => 2.0 + 0.6 * reynolds.sqrt() * prandtl.cbrt(),
            NusseltCorrelation::WakaoFunazkri => 2.0 + 1.1 * reynolds.powf(0.6) * prandtl.cbrt(),
        }
    }
}

impl FromStr for NusseltCorrelation {
    type Err = ReactorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "ranzmarshall" => Ok(NusseltCorrelation::RanzMarshall),
            "wakaofunazkri" => Ok(NusseltCorrelation::WakaoFunazkri),
            _ => Err(ReactorError::InvalidConfiguration(format!(
                "unknown Nusselt correlation '{}'",
                s
            ))),
        }
    }
}

/// choice of correlations for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CorrelationSettings {
    pub sherwood: SherwoodCorrelation,
    pub nusselt: NusseltCorrelation,
}

/// gas/solid mass transfer coefficient, m/s
pub fn mass_transfer_coefficient(sherwood: f64, diffusivity: f64, particle_diameter: f64) -> f64 {
    sherwood * diffusivity / particle_diameter
}

/// gas/solid heat transfer coefficient, W/m^2/K
pub fn heat_transfer_coefficient(nusselt: f64, thermal_conductivity: f64, particle_diameter: f64) -> f64 {
    nusselt * thermal_conductivity / particle_diameter
}

/// axial mass Peclet number v L / D
pub fn peclet_mass(velocity: f64, length: f64, diffusivity: f64) -> f64 {
    velocity * length / diffusivity
}

/// axial heat Peclet number ρ (Cp/M) v L / λ
pub fn peclet_heat(
    density: f64,
    heat_capacity: f64,
    molar_mass: f64,
    velocity: f64,
    length: f64,
    thermal_conductivity: f64,
) -> f64 {
    density * (heat_capacity / molar_mass) * velocity * length / thermal_conductivity
}

const ATM: f64 = 101_325.0;

/// Lennard-Jones (σ in Å, ε/k in K) estimated from the critical point
#[allow(non_snake_case)]
pub fn lennard_jones_from_critical(Tc: f64, Pc: f64) -> (f64, f64) {
    (2.44 * (Tc / (Pc / ATM)).cbrt(), 0.77 * Tc)
}

/// Neufeld fit of the diffusion collision integral Ω_D(T*)
pub fn diffusion_collision_integral(reduced_temperature: f64) -> f64 {
    let t = reduced_temperature;
    1.06036 / t.powf(0.15610) + 0.19300 / (0.47635 * t).exp() + 1.03587 / (1.52996 * t).exp()
        + 1.76474 / (3.89411 * t).exp()
}

/// Chapman-Enskog binary diffusivity of a dilute gas pair, m^2/s; T in K, P in Pa
#[allow(non_snake_case)]
pub fn binary_diffusivity(T: f64, P: f64, a: &ComponentData, b: &ComponentData) -> f64 {
    let (sigma_a, eps_a) = lennard_jones_from_critical(a.Tc, a.Pc);
    let (sigma_b, eps_b) = lennard_jones_from_critical(b.Tc, b.Pc);
    let sigma = 0.5 * (sigma_a + sigma_b);
    let omega = diffusion_collision_integral(T / (eps_a * eps_b).sqrt());
    // cm^2/s
    let d = 1.8583e-3 * T.powf(1.5) * (1.0 / a.molar_mass + 1.0 / b.molar_mass).sqrt() / (P / ATM * sigma.powi(2) * omega);
    d * 1e-4
}

/// diffusivity of every species in the mixture, m^2/s
#[allow(non_snake_case)]
pub fn mixture_diffusivities(
    y: &[f64],
    T: f64,
    P: f64,
    components: &[ComponentData],
) -> Result<Vec<f64>, ReactorError> {
    if y.len() != components.len() {
        return Err(ReactorError::IndexOutOfBounds(format!(
            "{} mole fractions for {} components",
            y.len(),
            components.len()
        )));
    }
    if components.iter().any(|c| !(c.Tc > 0.0) || !(c.Pc > 0.0) || !(c.molar_mass > 0.0)) {
        return Err(ReactorError::MissingData(
            "critical constants and molar masses are needed to estimate diffusivities".to_string(),
        ));
    }
    let diffusivities = components
        .iter()
        .enumerate()
        .map(|(i, ci)| {
            let resistance: f64 = components
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, cj)| y[j] / binary_diffusivity(T, P, ci, cj))
                .sum();
            if resistance > 0.0 {
                (1.0 - y[i]) / resistance
            } else {
                // pure gas
                binary_diffusivity(T, P, ci, ci)
            }
        })
        .collect();
    Ok(diffusivities)
}

/// Ergun pressure gradient, Pa/m: `-[150 μ v (1-ε)^2 / (dp^2 ε^3) + 1.75 ρ v^2 (1-ε) / (dp ε^3)]`
pub fn ergun_pressure_gradient(
    viscosity: f64,
    density: f64,
    velocity: f64,
    particle_diameter: f64,
    void_fraction: f64,
) -> f64 {
    let eps3 = void_fraction.powi(3);
    let viscous = 150.0 * viscosity * velocity / particle_diameter.powi(2) * (1.0 - void_fraction).powi(2) / eps3;
    let inertial = 1.75 * density * velocity.powi(2) / particle_diameter * (1.0 - void_fraction) / eps3;
    -(viscous + inertial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Thermodynamics::component_data::ComponentDataStore;
    use approx::assert_relative_eq;

    fn components(species: &[&str]) -> Vec<ComponentData> {
        let species: Vec<String> = species.iter().map(|s| s.to_string()).collect();
        ComponentDataStore::with_builtin().select(&species).unwrap()
    }

    #[test]
    fn test_binary_diffusivity_against_measurements() {
        // measured at 298 K and 1 atm, cm^2/s: CO2-N2 0.165, H2-CO2 0.646, H2-N2 0.78
        let c = components(&["CO2", "N2", "H2"]);
        let cases = [(0, 1, 0.165e-4), (2, 0, 0.646e-4), (2, 1, 0.78e-4)];
        for (a, b, measured) in cases {
            let d = binary_diffusivity(298.15, ATM, &c[a], &c[b]);
            assert_relative_eq!(d, measured, max_relative = 0.2);
            assert_relative_eq!(d, binary_diffusivity(298.15, ATM, &c[b], &c[a]), max_relative = 1e-12);
        }
        assert_relative_eq!(binary_diffusivity(298.15, ATM, &c[0], &c[1]), 1.43454e-5, max_relative = 1e-4);
    }

    #[test]
    fn test_binary_diffusivity_scaling() {
        let c = components(&["H2", "CO"]);
        let d1 = binary_diffusivity(523.0, 1e5, &c[0], &c[1]);
        assert_relative_eq!(binary_diffusivity(523.0, 5e6, &c[0], &c[1]), d1 / 50.0, max_relative = 1e-12);
        assert!(binary_diffusivity(623.0, 1e5, &c[0], &c[1]) > d1);
        // Ω_D falls with T* and stays near 1 at T* = 1.5
        assert!(diffusion_collision_integral(1.0) > diffusion_collision_integral(3.0));
        assert_relative_eq!(diffusion_collision_integral(1.5), 1.198, max_relative = 5e-3);
    }

    #[test]
    fn test_mixture_diffusivities_of_syngas_feed() {
        let species = ["H2", "CO2", "H2O", "CO", "CH3OH", "DME"];
        let y = [0.50, 0.25, 0.0001, 0.25, 0.0001, 0.0001];
        let d = mixture_diffusivities(&y, 523.0, 3.5e6, &components(&species)).unwrap();
        let expected = [4.6652e-6, 2.2314e-6, 1.9575e-6, 2.3161e-6, 1.3536e-6, 1.2305e-6];
        for (di, ei) in d.iter().zip(expected) {
            assert_relative_eq!(*di, ei, max_relative = 1e-3);
        }
        // hydrogen is the fastest, DME the slowest
        assert!(d.iter().all(|x| *x <= d[0]));
        assert!(d.iter().all(|x| *x >= d[5]));
    }

    #[test]
    fn test_mixture_diffusivities_edge_cases() {
        let c = components(&["CO2", "N2"]);
        let pure = mixture_diffusivities(&[1.0, 0.0], 298.15, ATM, &c).unwrap();
        assert_relative_eq!(pure[0], binary_diffusivity(298.15, ATM, &c[0], &c[0]));
        // trace CO2 in N2 diffuses with the binary coefficient
        assert_relative_eq!(pure[1], binary_diffusivity(298.15, ATM, &c[0], &c[1]), max_relative = 1e-12);
        assert!(matches!(
            mixture_diffusivities(&[1.0], 298.15, ATM, &c),
            Err(ReactorError::IndexOutOfBounds(_))
        ));
    }

    #[test]
    fn test_ergun_sign_and_zero_limit() {
        for &eps in &[0.2, 0.39, 0.6, 0.9] {
            for &v in &[1e-4, 0.2, 3.0] {
                assert!(ergun_pressure_gradient(1.8e-5, 20.0, v, 4.5e-3, eps) < 0.0);
            }
            assert_eq!(ergun_pressure_gradient(1.8e-5, 20.0, 0.0, 4.5e-3, eps), 0.0);
        }
    }

    #[test]
    fn test_ergun_value() {
        let (mu, rho, v, dp, eps) = (2e-5, 10.0, 0.5, 2e-3, 0.4);
        let expected = -(150.0 * mu * v / (dp * dp) * 0.36 / 0.064 + 1.75 * rho * v * v / dp * 0.6 / 0.064);
        assert_relative_eq!(ergun_pressure_gradient(mu, rho, v, dp, eps), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_sherwood_strategies() {
        let (re, sc) = (100.0, 0.8);
        let fr = SherwoodCorrelation::Frossling.sherwood(re, sc);
        assert_relative_eq!(fr, 2.0 + 0.6 * 10.0 * 0.8_f64.cbrt());
        let wf = SherwoodCorrelation::WakaoFunazkri.sherwood(re, sc);
        assert!(wf > fr);
        // stagnant limit
        assert_relative_eq!(SherwoodCorrelation::Frossling.sherwood(0.0, sc), 2.0);
        assert_relative_eq!(NusseltCorrelation::RanzMarshall.nusselt(0.0, 0.7), 2.0);
    }

    #[test]
    fn test_correlation_names() {
        assert_eq!("Frossling".parse::<SherwoodCorrelation>().unwrap(), SherwoodCorrelation::Frossling);
        assert_eq!("wakao-funazkri".parse::<SherwoodCorrelation>().unwrap(), SherwoodCorrelation::WakaoFunazkri);
        assert_eq!("Ranz-Marshall".parse::<NusseltCorrelation>().unwrap(), NusseltCorrelation::RanzMarshall);
        assert!("Chilton".parse::<SherwoodCorrelation>().is_err());
        let settings: CorrelationSettings =
            serde_json::from_str(r#"{"sherwood":"WakaoFunazkri","nusselt":"RanzMarshall"}"#).unwrap();
        assert_eq!(settings.sherwood, SherwoodCorrelation::WakaoFunazkri);
    }

    #[test]
    fn test_transfer_coefficients() {
        let re = reynolds(20.0, 0.2, 4.5e-3, 1e-5);
        assert_relative_eq!(re, 1800.0);
        let sc = schmidt(20.0, 1e-5, 1e-6);
        assert_relative_eq!(sc, 0.5);
        let sh = SherwoodCorrelation::Frossling.sherwood(re, sc);
        assert_relative_eq!(mass_transfer_coefficient(sh, 1e-6, 4.5e-3), sh * 1e-6 / 4.5e-3);
        let pr = prandtl(30.0, 1e-5, 0.05, 0.02);
        assert_relative_eq!(pr, 0.3);
        let nu = NusseltCorrelation::RanzMarshall.nusselt(re, pr);
        assert_relative_eq!(heat_transfer_coefficient(nu, 0.05, 4.5e-3), nu * 0.05 / 4.5e-3);
        assert_relative_eq!(peclet_mass(0.2, 1.0, 1e-5), 2e4);
        let pe_h = peclet_heat(20.0, 30.0, 0.02, 0.2, 1.0, 0.05);
        // u L / (λ M / ρ Cp)
        assert_relative_eq!(pe_h, 0.2 * 20.0 * 30.0 / (0.05 * 0.02), max_relative = 1e-12);
    }
}
