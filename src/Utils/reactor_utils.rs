//! Unit conversions and small closed-form relations of a tubular reactor.
use crate::ReactorModels::reactor_error::ReactorError;
use crate::Thermodynamics::thermo_properties::R_G;
use std::f64::consts::PI;

/// standard pressure, Pa
pub const P_STP: f64 = 101_325.0;
/// standard temperature, K
pub const T_STP: f64 = 273.15;
/// molar volume of an ideal gas at STP, m^3/mol
pub const MOLAR_VOLUME_STP: f64 = 0.02241;

/// Σ y_i M_i in the units of `molar_masses`
pub fn mixture_molar_mass(mole_fractions: &[f64], molar_masses: &[f64]) -> Result<f64, ReactorError> {
    if mole_fractions.len() != molar_masses.len() {
        return Err(ReactorError::InvalidConfiguration(format!(
            "{} mole fractions but {} molar masses",
            mole_fractions.len(),
            molar_masses.len()
        )));
    }
    Ok(mole_fractions
        .iter()
        .zip(molar_masses.iter())
        .map(|(y, m)| y * m)
        .sum())
}

/// volumetric flowrate at (P, T) referred to STP
#[allow(non_snake_case)]
pub fn volumetric_flowrate_stp(volumetric_flowrate: f64, P: f64, T: f64) -> f64 {
    volumetric_flowrate * (P / P_STP) * (T_STP / T)
}

/// m^3/s at STP -> mol/s
pub fn stp_volumetric_to_molar_flowrate(volumetric_flowrate_stp: f64) -> f64 {
    volumetric_flowrate_stp / MOLAR_VOLUME_STP
}

/// empty tube cross section πD²/4
pub fn reactor_cross_section_area(diameter: f64) -> f64 {
    PI * diameter.powi(2) / 4.0
}

/// cross section open to the gas, ε πD²/4
pub fn free_cross_section_area(void_fraction: f64, diameter: f64) -> f64 {
    void_fraction * reactor_cross_section_area(diameter)
}

/// wall heat transfer area per unit volume of a tube, 4/D
pub fn tube_heat_transfer_area(diameter: f64) -> f64 {
    4.0 / diameter
}

/// y_i = C_i / Σ C
pub fn mole_fractions_from_concentrations(concentrations: &[f64]) -> Result<Vec<f64>, ReactorError> {
    let total: f64 = concentrations.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return Err(ReactorError::InvalidLocalState {
            location: "mole fractions".to_string(),
            message: format!("total concentration {} is not positive", total),
        });
    }
    Ok(concentrations.iter().map(|c| c / total).collect())
}

/// superficial velocity from the molar flux and the ideal-gas law, v = F R T / P
#[allow(non_snake_case)]
pub fn superficial_velocity_from_flux(molar_flux: f64, P: f64, T: f64) -> f64 {
    molar_flux * R_G * T / P
}

/// v = v0 (C0/C)(P0/P)
#[allow(non_snake_case)]
pub fn velocity_from_eos(v0: f64, C0: f64, C: f64, P0: f64, P: f64) -> f64 {
    v0 * (C0 / C) * (P0 / P)
}

/// space velocity, 1/s
pub fn space_velocity(volumetric_flowrate: f64, reactor_volume: f64) -> f64 {
    volumetric_flowrate / reactor_volume
}

/// gas hourly space velocity, 1/h, from a volumetric flowrate in m^3/s
pub fn gas_hourly_space_velocity(volumetric_flowrate: f64, reactor_volume: f64) -> f64 {
    3600.0 * volumetric_flowrate / reactor_volume
}

/// heat added through the wall, W/m^3; positive when the medium is hotter than the gas
#[allow(non_snake_case)]
pub fn heat_exchange(T_medium: f64, T: f64, U: f64, a: f64) -> f64 {
    U * a * (T_medium - T)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mixture_molar_mass() {
        let mw = mixture_molar_mass(&[0.5, 0.5], &[2.016, 28.01]).unwrap();
        assert_relative_eq!(mw, 15.013);
        assert!(matches!(
            mixture_molar_mass(&[1.0], &[2.0, 3.0]),
            Err(ReactorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_stp_conversions() {
        assert_relative_eq!(volumetric_flowrate_stp(1.0, P_STP, T_STP), 1.0);
        assert_relative_eq!(volumetric_flowrate_stp(1.0, 2.0 * P_STP, 2.0 * T_STP), 1.0);
        assert_relative_eq!(stp_volumetric_to_molar_flowrate(0.02241), 1.0);
    }

    #[test]
    fn test_geometry() {
        assert_relative_eq!(reactor_cross_section_area(2.0), PI);
        assert_relative_eq!(free_cross_section_area(0.4, 2.0), 0.4 * PI);
        assert_relative_eq!(tube_heat_transfer_area(0.05), 80.0);
        assert_relative_eq!(space_velocity(2.0, 4.0), 0.5);
        assert_relative_eq!(gas_hourly_space_velocity(2.0, 4.0), 1800.0);
    }

    #[test]
    fn test_mole_fractions() {
        let y = mole_fractions_from_concentrations(&[1.0, 3.0]).unwrap();
        assert_relative_eq!(y[0], 0.25);
        assert_relative_eq!(y[1], 0.75);
        assert!(matches!(
            mole_fractions_from_concentrations(&[0.0, 0.0]),
            Err(ReactorError::InvalidLocalState { .. })
        ));
    }

    #[test]
    fn test_velocity_relations() {
        // 1 mol/m^2/s at 1 bar and 300 K
        let v = superficial_velocity_from_flux(1.0, 1e5, 300.0);
        assert_relative_eq!(v, 8.314 * 300.0 / 1e5);
        assert_relative_eq!(velocity_from_eos(0.2, 100.0, 100.0, 5e6, 5e6), 0.2);
        // halving the moles doubles the velocity at fixed pressure
        assert_relative_eq!(velocity_from_eos(0.2, 100.0, 50.0, 5e6, 5e6), 0.4);
        assert_relative_eq!(velocity_from_eos(0.2, 100.0, 100.0, 5e6, 2.5e6), 0.4);
    }

    #[test]
    fn test_heat_exchange_sign() {
        assert!(heat_exchange(600.0, 500.0, 50.0, 80.0) > 0.0);
        assert!(heat_exchange(400.0, 500.0, 50.0, 80.0) < 0.0);
        assert_eq!(heat_exchange(600.0, 500.0, 0.0, 80.0), 0.0);
    }
}
