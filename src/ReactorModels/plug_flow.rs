//! # Steady Plug Flow
//!
//! Lumped models integrated along the reactor length z.
//!
//! ## M1, species flowrates and total flux
//! ```text
//! C_i = y_i P/(R T),  y_i = F_i / Σ F,  v = flux R T / P
//! dF_i/dz   = A r_i
//! dflux/dz  = Σ r_i
//! dT/dz     = (-Σ R_j ΔH_j + Q) / (flux Cp)
//! dP/dz     = Ergun
//! ```
//! ## M3, concentrations, velocity from the equation of state
//! ```text
//! v = v0 (C0/Ct)(P0/P)
//! dC_i/dz = r_i / v
//! dT/dz   = (-Σ R_j ΔH_j + Q) / (Ct v Cp)
//! ```
//! ## M4, velocity as an unknown
//! ```text
//! dv/dz   = (1/Ct) [ -(v/R) ( (1/T) dP/dz - (P/T^2) dT/dz ) + Σ r_i ]
//! dC_i/dz = (-C_i dv/dz + r_i) / v
//! ```
//! `A` is the empty tube cross section, `Q = U a (Tm - T)`.
use super::local_state::{DerivedLocalState, Location, RunParameters, invalid_state};
use super::model_assembler::{PhysicalProfile, RhsAssembler};
use super::reactor_error::ReactorError;
use super::state_layout::{StateLayout, StateRecord};
use crate::Thermodynamics::thermo_properties::R_G;
use crate::Utils::reactor_utils::{superficial_velocity_from_flux, velocity_from_eos};
use nalgebra::DVector;

/// single value of an optional lumped field
pub(crate) fn lumped(field: &Option<Vec<f64>>, name: &str) -> Result<f64, ReactorError> {
    field
        .as_ref()
        .and_then(|v| v.first().copied())
        .ok_or_else(|| ReactorError::IndexOutOfBounds(format!("state has no {} field", name)))
}

pub(crate) fn species_at(record: &StateRecord, node: usize) -> Vec<f64> {
    record.species.iter().map(|s| s[node]).collect()
}

/// dT/dz or dT/dt with the energy balance switched off is zero
fn energy_term(params: &RunParameters, value: f64) -> f64 {
    if params.options.energy_balance { value } else { 0.0 }
}

#[derive(Debug, Clone)]
pub struct PlugFlowFluxModel {
    params: RunParameters,
    layout: StateLayout,
}

impl PlugFlowFluxModel {
    pub fn new(params: RunParameters) -> Self {
        let layout = StateLayout::for_variant(&params.variant, params.n_species(), 1);
        Self { params, layout }
    }

    /// concentrations from species flowrates with the ideal-gas law
    #[allow(non_snake_case)]
    fn concentrations(&self, flowrates: &[f64], T: f64, P: f64, at: Location) -> Result<Vec<f64>, ReactorError> {
        let total: f64 = flowrates.iter().sum();
        if !(total > 0.0) {
            return Err(invalid_state(at, format!("total molar flowrate is {}", total)));
        }
        let ct = P / (R_G * T);
        Ok(flowrates.iter().map(|f| f / total * ct).collect())
    }
}

impl RhsAssembler for PlugFlowFluxModel {
    fn params(&self) -> &RunParameters {
        &self.params
    }

    fn layout(&self) -> StateLayout {
        self.layout
    }

    fn initial_state(&self) -> Result<DVector<f64>, ReactorError> {
        let feed = &self.params.feed;
        let mut record = self.layout.zeros();
        for (i, y) in feed.y.iter().enumerate() {
            record.species[i][0] = y * feed.flux * self.params.area;
        }
        record.flux = Some(vec![feed.flux]);
        record.temperature[0] = feed.T;
        record.pressure = Some(vec![feed.P]);
        self.layout.pack_new(&record)
    }

    #[allow(non_snake_case)]
    fn evaluate(&self, x: f64, state: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), ReactorError> {
        let at = Location::at(x);
        let record = self.layout.unpack(state)?;
        let flux = lumped(&record.flux, "flux")?;
        let T = record.temperature[0];
        let P = lumped(&record.pressure, "pressure")?;
        let c = self.concentrations(&species_at(&record, 0), T, P, at)?;
        let v = superficial_velocity_from_flux(flux, P, T);
        let ls = DerivedLocalState::evaluate(&self.params, &c, T, P, v, at)?;

        let mut d = self.layout.zeros();
        for (i, r) in ls.formation_rates.iter().enumerate() {
            d.species[i][0] = self.params.area * r;
        }
        d.flux = Some(vec![ls.total_formation_rate]);
        d.temperature[0] = energy_term(&self.params, ls.heat_source() / (flux * ls.Cp));
        d.pressure = Some(vec![ls.pressure_gradient]);
        self.layout.pack(&d, out)
    }

    #[allow(non_snake_case)]
    fn physical_profile(&self, state: &DVector<f64>) -> Result<PhysicalProfile, ReactorError> {
        let record = self.layout.unpack(state)?;
        let flux = lumped(&record.flux, "flux")?;
        let T = record.temperature[0];
        let P = lumped(&record.pressure, "pressure")?;
        let c = self.concentrations(&species_at(&record, 0), T, P, Location::at(f64::NAN))?;
        Ok(PhysicalProfile {
            concentrations: c.into_iter().map(|ci| vec![ci]).collect(),
            temperature: vec![T],
            pressure: vec![P],
            velocity: vec![superficial_velocity_from_flux(flux, P, T)],
        })
    }
}

#[derive(Debug, Clone)]
pub struct PlugFlowConcentrationModel {
    params: RunParameters,
    layout: StateLayout,
}

impl PlugFlowConcentrationModel {
    pub fn new(params: RunParameters) -> Self {
        let layout = StateLayout::for_variant(&params.variant, params.n_species(), 1);
        Self { params, layout }
    }

    #[allow(non_snake_case)]
    fn velocity(&self, c: &[f64], P: f64) -> f64 {
        let feed = &self.params.feed;
        velocity_from_eos(feed.v, feed.Ct, self.params.floored_total(c), feed.P, P)
    }
}

impl RhsAssembler for PlugFlowConcentrationModel {
    fn params(&self) -> &RunParameters {
        &self.params
    }

    fn layout(&self) -> StateLayout {
        self.layout
    }

    fn initial_state(&self) -> Result<DVector<f64>, ReactorError> {
        let feed = &self.params.feed;
        let mut record = self.layout.zeros();
        for (i, c) in feed.C.iter().enumerate() {
            record.species[i][0] = *c;
        }
        record.temperature[0] = feed.T;
        record.pressure = Some(vec![feed.P]);
        self.layout.pack_new(&record)
    }

    #[allow(non_snake_case)]
    fn evaluate(&self, x: f64, state: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), ReactorError> {
        let at = Location::at(x);
        let record = self.layout.unpack(state)?;
        let c = species_at(&record, 0);
        let T = record.temperature[0];
        let P = lumped(&record.pressure, "pressure")?;
        let v = self.velocity(&c, P);
        let ls = DerivedLocalState::evaluate(&self.params, &c, T, P, v, at)?;

        let mut d = self.layout.zeros();
        for (i, r) in ls.formation_rates.iter().enumerate() {
            d.species[i][0] = r / v;
        }
        d.temperature[0] = energy_term(&self.params, ls.heat_source() / (ls.Ct * v * ls.Cp));
        d.pressure = Some(vec![ls.pressure_gradient]);
        self.layout.pack(&d, out)
    }

    #[allow(non_snake_case)]
    fn physical_profile(&self, state: &DVector<f64>) -> Result<PhysicalProfile, ReactorError> {
        let record = self.layout.unpack(state)?;
        let c = species_at(&record, 0);
        let P = lumped(&record.pressure, "pressure")?;
        let v = self.velocity(&c, P);
        Ok(PhysicalProfile {
            concentrations: record.species,
            temperature: record.temperature,
            pressure: vec![P],
            velocity: vec![v],
        })
    }
}

#[derive(Debug, Clone)]
pub struct PlugFlowVariableVelocityModel {
    params: RunParameters,
    layout: StateLayout,
}

impl PlugFlowVariableVelocityModel {
    pub fn new(params: RunParameters) -> Self {
        let layout = StateLayout::for_variant(&params.variant, params.n_species(), 1);
        Self { params, layout }
    }
}

/// dv/dz from the differential ideal-gas law at total concentration `ct`
#[allow(non_snake_case)]
pub(crate) fn velocity_gradient(ct: f64, v: f64, T: f64, P: f64, dPdz: f64, dTdz: f64, total_formation: f64) -> f64 {
    (1.0 / ct) * ((-v / R_G) * ((1.0 / T) * dPdz - (P / T.powi(2)) * dTdz) + total_formation)
}

impl RhsAssembler for PlugFlowVariableVelocityModel {
    fn params(&self) -> &RunParameters {
        &self.params
    }

    fn layout(&self) -> StateLayout {
        self.layout
    }

    fn initial_state(&self) -> Result<DVector<f64>, ReactorError> {
        let feed = &self.params.feed;
        let mut record = self.layout.zeros();
        for (i, c) in feed.C.iter().enumerate() {
            record.species[i][0] = *c;
        }
        record.temperature[0] = feed.T;
        record.pressure = Some(vec![feed.P]);
        record.velocity = Some(vec![feed.v]);
        self.layout.pack_new(&record)
    }

    #[allow(non_snake_case)]
    fn evaluate(&self, x: f64, state: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), ReactorError> {
        let at = Location::at(x);
        let record = self.layout.unpack(state)?;
        let T = record.temperature[0];
        let P = lumped(&record.pressure, "pressure")?;
        let v = lumped(&record.velocity, "velocity")?;
        if !(v > 0.0) {
            return Err(invalid_state(at, format!("superficial velocity is {}", v)));
        }
        let ls = DerivedLocalState::evaluate(&self.params, &species_at(&record, 0), T, P, v, at)?;

        let dTdz = energy_term(&self.params, ls.heat_source() / (ls.Ct * v * ls.Cp));
        let dPdz = ls.pressure_gradient;
        let dvdz = velocity_gradient(ls.Ct, v, T, P, dPdz, dTdz, ls.total_formation_rate);

        let mut d = self.layout.zeros();
        for (i, r) in ls.formation_rates.iter().enumerate() {
            d.species[i][0] = (-ls.C[i] * dvdz + r) / v;
        }
        d.temperature[0] = dTdz;
        d.pressure = Some(vec![dPdz]);
        d.velocity = Some(vec![dvdz]);
        self.layout.pack(&d, out)
    }

    fn physical_profile(&self, state: &DVector<f64>) -> Result<PhysicalProfile, ReactorError> {
        let record = self.layout.unpack(state)?;
        Ok(PhysicalProfile {
            pressure: vec![lumped(&record.pressure, "pressure")?],
            velocity: vec![lumped(&record.velocity, "velocity")?],
            concentrations: record.species,
            temperature: record.temperature,
        })
    }
}
