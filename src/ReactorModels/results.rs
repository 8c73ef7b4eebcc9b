//! # Simulation Results
//!
//! Physical series of a finished run, reshaped from the raw solver output.
//!
//! - steady marching models (M1, M3, M4, N1): one sample per axial position `z`
//! - steady residual model (T1): one sample per grid node `z`
//! - dynamic models (M2, M5): outlet values at every time sample `t`, plus the complete axial
//!   profile at the end of every time window
//!
//! A failed steady run carries a `FailureReport` and empty series.
//!
//! Every run reports the feed flow (actual and STP flowrates, space velocity, GHSV). A successful
//! run also reports the transport groups at the outlet and, when the reactor has pellet porosity
//! and tortuosity, the pellet profile at the outlet state.
use super::local_state::{DerivedLocalState, Location, RunParameters, TransportNumbers};
use super::model_assembler::{PhysicalProfile, ReactorModel, RhsAssembler};
use super::pellet::PelletProfile;
use super::reactor_config::ModelVariant;
use super::reactor_error::{FailureStage, ReactorError};
use crate::Utils::reactor_utils::{
    free_cross_section_area, gas_hourly_space_velocity, mole_fractions_from_concentrations, space_velocity,
    stp_volumetric_to_molar_flowrate, volumetric_flowrate_stp,
};
use log::warn;
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub variant: String,
    pub stage: FailureStage,
    pub message: String,
}

/// flowrates of the feed and space velocities of the bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedFlowSummary {
    /// at feed T and P, m^3/s
    pub volumetric_flowrate: f64,
    /// m^3/s
    pub volumetric_flowrate_stp: f64,
    /// mol/s
    pub molar_flowrate_stp: f64,
    /// 1/s
    pub space_velocity: f64,
    /// STP flowrate over bed volume, 1/h
    pub gas_hourly_space_velocity: f64,
}

impl FeedFlowSummary {
    pub fn new(params: &RunParameters) -> Self {
        let reactor = &params.reactor;
        let feed = &params.feed;
        // interstitial velocity through the free cross-section
        let interstitial = feed.v / reactor.void_fraction;
        let q = interstitial * free_cross_section_area(reactor.void_fraction, reactor.diameter);
        let q_stp = volumetric_flowrate_stp(q, feed.P, feed.T);
        let volume = reactor.volume();
        Self {
            volumetric_flowrate: q,
            volumetric_flowrate_stp: q_stp,
            molar_flowrate_stp: stp_volumetric_to_molar_flowrate(q_stp),
            space_velocity: space_velocity(q, volume),
            gas_hourly_space_velocity: gas_hourly_space_velocity(q_stp, volume),
        }
    }
}

/// axial profile of the bed at time `t`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeProfile {
    pub t: f64,
    /// m
    pub z: Vec<f64>,
    /// `concentrations[i][node]`, mol/m^3
    pub concentrations: Vec<Vec<f64>>,
    pub mole_fractions: Vec<Vec<f64>>,
    pub temperature: Vec<f64>,
    pub pressure: Vec<f64>,
    pub velocity: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub variant: String,
    pub success: bool,
    pub failure: Option<FailureReport>,
    pub species: Vec<String>,
    /// axial positions of the series, m; grid nodes for dynamic runs
    pub z: Vec<f64>,
    /// time samples of a dynamic run, s
    pub t: Vec<f64>,
    /// `concentrations[i][sample]`, mol/m^3
    pub concentrations: Vec<Vec<f64>>,
    pub mole_fractions: Vec<Vec<f64>>,
    /// K
    pub temperature: Vec<f64>,
    /// Pa
    pub pressure: Vec<f64>,
    /// m/s
    pub velocity: Option<Vec<f64>>,
    /// dynamic runs: bed profile at the end of every time window
    pub profiles: Vec<TimeProfile>,
    /// dimensionless groups at the last sample
    pub outlet_transport: Option<TransportNumbers>,
    pub feed_flow: Option<FeedFlowSummary>,
    /// pellet at the last sample
    pub outlet_pellet: Option<PelletProfile>,
}

/// one sample of every series
struct Sample {
    c: Vec<f64>,
    y: Vec<f64>,
    t: f64,
    p: f64,
    v: f64,
}

fn node_sample(profile: &PhysicalProfile, node: usize) -> Result<Sample, ReactorError> {
    let c: Vec<f64> = profile.concentrations.iter().map(|s| s[node]).collect();
    let y = mole_fractions_from_concentrations(&c)?;
    Ok(Sample {
        c,
        y,
        t: profile.temperature[node],
        p: profile.pressure[node],
        v: profile.velocity[node],
    })
}

impl SimulationResult {
    fn empty(variant: &ModelVariant, species: Vec<String>) -> Self {
        let n = species.len();
        Self {
            variant: variant.id().to_string(),
            success: true,
            failure: None,
            species,
            z: Vec::new(),
            t: Vec::new(),
            concentrations: vec![Vec::new(); n],
            mole_fractions: vec![Vec::new(); n],
            temperature: Vec::new(),
            pressure: Vec::new(),
            velocity: None,
            profiles: Vec::new(),
            outlet_transport: None,
            feed_flow: None,
            outlet_pellet: None,
        }
    }

    /// failed run: report and empty series
    pub fn failed(variant: &ModelVariant, species: Vec<String>, stage: FailureStage, message: String) -> Self {
        let mut result = Self::empty(variant, species);
        result.success = false;
        result.failure = Some(FailureReport {
            variant: variant.id().to_string(),
            stage,
            message,
        });
        result.concentrations.clear();
        result.mole_fractions.clear();
        result
    }

    fn push(&mut self, sample: Sample, velocity: &mut Vec<f64>) {
        for (i, (c, y)) in sample.c.into_iter().zip(sample.y).enumerate() {
            self.concentrations[i].push(c);
            self.mole_fractions[i].push(y);
        }
        self.temperature.push(sample.t);
        self.pressure.push(sample.p);
        velocity.push(sample.v);
    }

    /// series of a steady marching model from the sampled states
    pub(crate) fn from_steady_profiles(
        model: &ReactorModel,
        z: Vec<f64>,
        profiles: &[PhysicalProfile],
    ) -> Result<Self, ReactorError> {
        let params = model.params();
        let mut result = Self::empty(&params.variant, params.reaction_set.species.clone());
        let mut velocity = Vec::with_capacity(profiles.len());
        for profile in profiles {
            result.push(node_sample(profile, 0)?, &mut velocity);
        }
        result.z = z;
        result.velocity = Some(velocity);
        result.attach_outlet_transport(model);
        Ok(result)
    }

    /// series along the grid of a single axial profile
    pub(crate) fn from_grid_profile(model: &ReactorModel, profile: &PhysicalProfile) -> Result<Self, ReactorError> {
        let params = model.params();
        let mut result = Self::empty(&params.variant, params.reaction_set.species.clone());
        let mut velocity = Vec::with_capacity(profile.temperature.len());
        for node in 0..profile.temperature.len() {
            result.push(node_sample(profile, node)?, &mut velocity);
        }
        result.z = model.axial_nodes();
        result.velocity = Some(velocity);
        result.attach_outlet_transport(model);
        Ok(result)
    }

    /// outlet series over time and the bed profile at every window end
    pub(crate) fn from_dynamic(
        model: &ReactorModel,
        samples: &[(f64, PhysicalProfile)],
        window_ends: &[(f64, PhysicalProfile)],
    ) -> Result<Self, ReactorError> {
        let params = model.params();
        let mut result = Self::empty(&params.variant, params.reaction_set.species.clone());
        let mut velocity = Vec::with_capacity(samples.len());
        for (t, profile) in samples {
            let outlet = profile.temperature.len().saturating_sub(1);
            result.push(node_sample(profile, outlet)?, &mut velocity);
            result.t.push(*t);
        }
        result.velocity = Some(velocity);
        result.z = model.axial_nodes();
        for (t, profile) in window_ends {
            let mole_fractions = (0..profile.temperature.len())
                .map(|node| node_sample(profile, node).map(|s| s.y))
                .collect::<Result<Vec<_>, _>>()?;
            let n_species = profile.concentrations.len();
            result.profiles.push(TimeProfile {
                t: *t,
                z: result.z.clone(),
                concentrations: profile.concentrations.clone(),
                mole_fractions: (0..n_species)
                    .map(|i| mole_fractions.iter().map(|y| y[i]).collect())
                    .collect(),
                temperature: profile.temperature.clone(),
                pressure: profile.pressure.clone(),
                velocity: profile.velocity.clone(),
            });
        }
        result.attach_outlet_transport(model);
        Ok(result)
    }

    /// location and local state of the last sample; None for a failed run
    pub(crate) fn outlet_state(&self, params: &RunParameters) -> Option<(Location, DerivedLocalState)> {
        let (Some(t), Some(p), Some(v)) = (
            self.temperature.last(),
            self.pressure.last(),
            self.velocity.as_ref().and_then(|v| v.last()),
        ) else {
            return None;
        };
        let c: Vec<f64> = self.concentrations.iter().filter_map(|s| s.last().copied()).collect();
        let at = Location::at(self.z.last().copied().unwrap_or(f64::NAN));
        match DerivedLocalState::evaluate(params, &c, *t, *p, *v, at) {
            Ok(ls) => Some((at, ls)),
            Err(e) => {
                warn!("no local state at the outlet: {}", e);
                None
            }
        }
    }

    fn attach_outlet_transport(&mut self, model: &ReactorModel) {
        let params = model.params();
        self.outlet_transport = self.outlet_state(params).map(|(_, ls)| ls.transport_numbers(params));
    }

    pub fn n_samples(&self) -> usize {
        self.temperature.len()
    }

    /// last value of the concentration series of `species`
    pub fn outlet_concentration(&self, species: &str) -> Option<f64> {
        let i = self.species.iter().position(|s| s == species)?;
        self.concentrations.get(i)?.last().copied()
    }

    pub fn outlet_temperature(&self) -> Option<f64> {
        self.temperature.last().copied()
    }

    pub fn outlet_pressure(&self) -> Option<f64> {
        self.pressure.last().copied()
    }

    pub fn to_json_string(&self) -> Result<String, ReactorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Prints the series as a table, every `stride`-th sample plus the last one.
    pub fn print_table(&self, stride: usize) {
        println!("\n=== MODEL {} ===", self.variant);
        if let Some(flow) = &self.feed_flow {
            let mut table = Table::new();
            table.add_row(row!["Feed", "Value"]);
            table.add_row(row!["Q, m3/s", format!("{:.4e}", flow.volumetric_flowrate)]);
            table.add_row(row!["Q STP, m3/s", format!("{:.4e}", flow.volumetric_flowrate_stp)]);
            table.add_row(row!["F STP, mol/s", format!("{:.4e}", flow.molar_flowrate_stp)]);
            table.add_row(row!["SV, 1/s", format!("{:.4e}", flow.space_velocity)]);
            table.add_row(row!["GHSV, 1/h", format!("{:.4e}", flow.gas_hourly_space_velocity)]);
            table.printstd();
        }
        if let Some(failure) = &self.failure {
            let mut table = Table::new();
            table.add_row(row!["Variant", "Stage", "Message"]);
            table.add_row(row![failure.variant, failure.stage, failure.message]);
            table.printstd();
            return;
        }
        let dynamic = !self.t.is_empty();
        let mut header = vec![if dynamic { "t, s".to_string() } else { "z, m".to_string() }];
        header.extend(self.species.iter().map(|s| format!("C {}, mol/m3", s)));
        header.extend(["T, K".to_string(), "P, Pa".to_string(), "v, m/s".to_string()]);

        let mut table = Table::new();
        table.add_row(prettytable::Row::from(header));
        let n = self.n_samples();
        let stride = stride.max(1);
        for k in (0..n).filter(|k| k % stride == 0 || *k == n - 1) {
            let x = if dynamic { self.t[k] } else { self.z.get(k).copied().unwrap_or(f64::NAN) };
            let mut cells = vec![format!("{:.4}", x)];
            cells.extend(self.concentrations.iter().map(|c| format!("{:.4e}", c[k])));
            cells.push(format!("{:.2}", self.temperature[k]));
            cells.push(format!("{:.5e}", self.pressure[k]));
            let v = self.velocity.as_ref().map(|v| v[k]).unwrap_or(f64::NAN);
            cells.push(format!("{:.4e}", v));
            table.add_row(prettytable::Row::from(cells));
        }
        table.printstd();

        if let Some(tn) = &self.outlet_transport {
            let mut transport = Table::new();
            transport.add_row(row!["Outlet group", "Value"]);
            transport.add_row(row!["Re", format!("{:.4e}", tn.reynolds)]);
            if let Some(pr) = tn.prandtl {
                transport.add_row(row!["Pr", format!("{:.4e}", pr)]);
            }
            if let Some(h) = tn.heat_transfer_coefficient {
                transport.add_row(row!["h, W/m2/K", format!("{:.4e}", h)]);
            }
            for (s, v) in self.species.iter().zip(&tn.sherwood) {
                transport.add_row(row![format!("Sh {}", s), format!("{:.4e}", v)]);
            }
            transport.printstd();
        }

        if let Some(pellet) = &self.outlet_pellet {
            let mut table = Table::new();
            table.add_row(row!["Outlet pellet", "Value"]);
            for (j, eta) in pellet.effectiveness.iter().enumerate() {
                let value = eta.map_or("-".to_string(), |e| format!("{:.4}", e));
                table.add_row(row![format!("effectiveness r{}", j + 1), value]);
            }
            for (i, s) in self.species.iter().enumerate() {
                if let Some(c) = pellet.centre_concentration(i) {
                    table.add_row(row![format!("centre C {}, mol/m3", s), format!("{:.4e}", c)]);
                }
            }
            table.printstd();
        }
    }
}
