//! # Dimensionless Scaling
//!
//! Feed-referenced characteristic values of the scaled models.
//!
//! | Quantity | Scaled form |
//! |----------|-------------|
//! | concentration | `C* = C / C_ref` (per species feed value, or the largest one) |
//! | temperature | `T* = (T - Tf) / Tf` |
//! | pressure | `P* = P / Pf` |
//! | velocity | `v* = v / vf` |
//! | length | `z* = z / zf` |
//!
//! Reference rates used to scale the balances:
//! ```text
//! mass convective   (vf/zf) C_ref,i          mol/m^3/s
//! heat convective   Cf vf Tf Cpf / zf        W/m^3
//! mass diffusive    D_i C_ref,i / zf^2       mol/m^3/s
//! heat diffusive    λ Tf / zf^2              W/m^3
//! ```
use super::reactor_config::{ConcentrationReference, FeedState, ReactorSpec};
use super::reactor_error::ReactorError;
use crate::Thermodynamics::transport_correlations::{peclet_heat, peclet_mass};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleKind {
    /// x* = x / ref
    Linear,
    /// x* = (x - ref) / ref
    Affine,
}

pub fn to_dimensionless(value: f64, reference: f64, kind: ScaleKind) -> f64 {
    match kind {
        ScaleKind::Linear => value / reference,
        ScaleKind::Affine => (value - reference) / reference,
    }
}

pub fn to_physical(value: f64, reference: f64, kind: ScaleKind) -> f64 {
    match kind {
        ScaleKind::Linear => value * reference,
        ScaleKind::Affine => value * reference + reference,
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingFactors {
    /// feed concentrations, mol/m^3
    pub Cif: Vec<f64>,
    /// reference concentration per species, mol/m^3
    pub Cref: Vec<f64>,
    /// total feed concentration, mol/m^3
    pub Cf: f64,
    pub Tf: f64,
    pub Pf: f64,
    /// feed superficial velocity, m/s
    pub vf: f64,
    /// reactor length, m
    pub zf: f64,
    /// feed mixture heat capacity, J/mol/K
    pub Cpf: f64,
    pub mass_convective: Vec<f64>,
    pub heat_convective: f64,
    /// present when diffusivities are known
    pub mass_diffusive: Option<Vec<f64>>,
    /// present when the thermal conductivity is known
    pub heat_diffusive: Option<f64>,
    /// vf zf / D_i
    pub peclet_mass: Option<Vec<f64>>,
    /// Cf Cpf vf zf / λ
    pub peclet_heat: Option<f64>,
}

impl ScalingFactors {
    /// `feed_heat_capacity` is the mixture Cp at feed composition and temperature
    pub fn new(
        feed: &FeedState,
        reactor: &ReactorSpec,
        feed_heat_capacity: f64,
        reference: ConcentrationReference,
    ) -> Result<Self, ReactorError> {
        let cif = feed.concentrations();
        let cf: f64 = cif.iter().sum();
        let cref = match reference {
            ConcentrationReference::PerSpecies => cif.clone(),
            ConcentrationReference::Max => {
                let max = cif.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                vec![max; cif.len()]
            }
        };
        if let Some(i) = cref.iter().position(|c| !(*c > 0.0)) {
            return Err(ReactorError::InvalidConfiguration(format!(
                "species {} has a zero feed concentration and cannot be its own reference; use ConcentrationReference::Max",
                feed.species[i]
            )));
        }
        let vf = feed.superficial_velocity(reactor);
        let zf = reactor.length;
        let mass_convective = cref.iter().map(|c| vf / zf * c).collect();
        let heat_convective = cf * vf * feed.T * feed_heat_capacity / zf;
        let mass_diffusive = feed
            .diffusivity
            .as_ref()
            .map(|d| d.iter().zip(cref.iter()).map(|(di, c)| di * c / zf.powi(2)).collect());
        let heat_diffusive = feed.thermal_conductivity.map(|l| l * feed.T / zf.powi(2));
        let peclet_m = feed
            .diffusivity
            .as_ref()
            .map(|d| d.iter().map(|di| peclet_mass(vf, zf, *di)).collect());
        // molar density times molar Cp equals ρ Cp_mass
        let peclet_h = feed
            .thermal_conductivity
            .map(|l| peclet_heat(cf, feed_heat_capacity, 1.0, vf, zf, l));
        Ok(Self {
            Cif: cif,
            Cref: cref,
            Cf: cf,
            Tf: feed.T,
            Pf: feed.P,
            vf,
            zf,
            Cpf: feed_heat_capacity,
            mass_convective,
            heat_convective,
            mass_diffusive,
            heat_diffusive,
            peclet_mass: peclet_m,
            peclet_heat: peclet_h,
        })
    }

    pub fn concentration_to_dimensionless(&self, c: &[f64]) -> Vec<f64> {
        c.iter()
            .zip(self.Cref.iter())
            .map(|(ci, r)| to_dimensionless(*ci, *r, ScaleKind::Linear))
            .collect()
    }

    pub fn concentration_to_physical(&self, c: &[f64]) -> Vec<f64> {
        c.iter()
            .zip(self.Cref.iter())
            .map(|(ci, r)| to_physical(*ci, *r, ScaleKind::Linear))
            .collect()
    }

    #[allow(non_snake_case)]
    pub fn temperature_to_dimensionless(&self, T: f64) -> f64 {
        to_dimensionless(T, self.Tf, ScaleKind::Affine)
    }

    #[allow(non_snake_case)]
    pub fn temperature_to_physical(&self, T: f64) -> f64 {
        to_physical(T, self.Tf, ScaleKind::Affine)
    }

    #[allow(non_snake_case)]
    pub fn pressure_to_dimensionless(&self, P: f64) -> f64 {
        to_dimensionless(P, self.Pf, ScaleKind::Linear)
    }

    #[allow(non_snake_case)]
    pub fn pressure_to_physical(&self, P: f64) -> f64 {
        to_physical(P, self.Pf, ScaleKind::Linear)
    }

    pub fn velocity_to_dimensionless(&self, v: f64) -> f64 {
        to_dimensionless(v, self.vf, ScaleKind::Linear)
    }

    pub fn length_to_physical(&self, z: f64) -> f64 {
        to_physical(z, self.zf, ScaleKind::Linear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReactorModels::reactor_config::{FeedComposition, FeedFlow};
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip_linear_and_affine() {
        for &(x, r) in &[(12.5, 40.0), (0.0, 3.0), (-7.0, 2.0), (1e-9, 1e3)] {
            let lin = to_dimensionless(x, r, ScaleKind::Linear);
            assert_relative_eq!(to_physical(lin, r, ScaleKind::Linear), x, epsilon = 1e-15, max_relative = 1e-14);
        }
        for &(t, tf) in &[(523.0, 500.0), (300.0, 523.0), (523.0, 523.0)] {
            let scaled = to_dimensionless(t, tf, ScaleKind::Affine);
            assert_relative_eq!(to_physical(scaled, tf, ScaleKind::Affine), t, max_relative = 1e-14);
        }
        assert_eq!(to_dimensionless(523.0, 523.0, ScaleKind::Affine), 0.0);
    }

    fn feed(c: Vec<f64>) -> FeedState {
        FeedState {
            species: vec!["A".to_string(), "B".to_string()],
            composition: FeedComposition::Concentrations(c),
            flow: FeedFlow::SuperficialVelocity(0.5),
            T: 500.0,
            P: 1e5,
            viscosity: 1e-5,
            diffusivity: Some(vec![1e-5, 2e-5]),
            thermal_conductivity: Some(0.05),
        }
    }

    fn reactor() -> ReactorSpec {
        ReactorSpec {
            diameter: 0.05,
            length: 2.0,
            void_fraction: 0.4,
            particle_diameter: 4e-3,
            catalyst_bulk_density: 1000.0,
            particle_density: 1800.0,
            particle_heat_capacity: 900.0,
            particle_porosity: None,
            particle_tortuosity: None,
            particle_thermal_conductivity: None,
        }
    }

    #[test]
    fn test_reference_rates() {
        let s = ScalingFactors::new(&feed(vec![10.0, 14.0]), &reactor(), 30.0, ConcentrationReference::PerSpecies)
            .unwrap();
        assert_relative_eq!(s.Cf, 24.0);
        assert_relative_eq!(s.mass_convective[0], 0.25 * 10.0);
        assert_relative_eq!(s.heat_convective, 24.0 * 0.5 * 500.0 * 30.0 / 2.0);
        assert_relative_eq!(s.peclet_mass.as_ref().unwrap()[1], 0.5 * 2.0 / 2e-5);
        assert_relative_eq!(s.mass_diffusive.as_ref().unwrap()[0], 1e-5 * 10.0 / 4.0);
        let c = s.concentration_to_dimensionless(&[5.0, 14.0]);
        assert_relative_eq!(c[0], 0.5);
        assert_relative_eq!(s.concentration_to_physical(&c)[0], 5.0);
        assert_relative_eq!(s.temperature_to_physical(s.temperature_to_dimensionless(610.0)), 610.0);
        assert_relative_eq!(s.pressure_to_physical(s.pressure_to_dimensionless(9e4)), 9e4);
    }

    #[test]
    fn test_zero_feed_species_needs_max_reference() {
        let f = feed(vec![10.0, 0.0]);
        assert!(ScalingFactors::new(&f, &reactor(), 30.0, ConcentrationReference::PerSpecies).is_err());
        let s = ScalingFactors::new(&f, &reactor(), 30.0, ConcentrationReference::Max).unwrap();
        assert_eq!(s.Cref, vec![10.0, 10.0]);
    }
}
