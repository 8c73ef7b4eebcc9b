//! # Component Data Store
//!
//! Read-only lookup of pure-component data by species symbol: molecular weight, critical
//! constants, heat capacity correlation and standard heat of formation at 298.15 K.
//!
//! Built-in entries cover the methanol/DME synthesis species. Heat capacity polynomials are
//! the ideal-gas fits of Reid, Prausnitz and Poling (`Cp = a + bT + cT^2 + dT^3`, J/mol/K);
//! heats of formation are gas-phase values in J/mol.
//!
//! # Examples
//! ```
//! use PackedBedSim::Thermodynamics::component_data::ComponentDataStore;
//! let store = ComponentDataStore::with_builtin();
//! let co2 = store.get("CO2").unwrap();
//! assert!((co2.molar_mass - 44.01).abs() < 1e-9);
//! ```
use crate::ReactorModels::reactor_error::ReactorError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// heat capacity model of a pure component, J/mol/K
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeatCapacityModel {
    /// a + bT + cT^2 + dT^3
    Polynomial { a: f64, b: f64, c: f64, d: f64 },
    Constant(f64),
}

impl HeatCapacityModel {
    #[allow(non_snake_case)]
    pub fn Cp(&self, T: f64) -> f64 {
        match self {
            HeatCapacityModel::Polynomial { a, b, c, d } => a + T * (b + T * (c + T * d)),
            HeatCapacityModel::Constant(cp) => *cp,
        }
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    pub symbol: String,
    /// g/mol
    pub molar_mass: f64,
    /// critical temperature, K
    pub Tc: f64,
    /// critical pressure, Pa
    pub Pc: f64,
    pub Cp: HeatCapacityModel,
    /// standard heat of formation at 298.15 K, J/mol
    pub dHf25: f64,
}

impl ComponentData {
    #[allow(non_snake_case)]
    pub fn new(symbol: &str, molar_mass: f64, Tc: f64, Pc: f64, Cp: HeatCapacityModel, dHf25: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            molar_mass,
            Tc,
            Pc,
            Cp,
            dHf25,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentDataStore {
    components: HashMap<String, ComponentData>,
}

fn poly(a: f64, b: f64, c: f64, d: f64) -> HeatCapacityModel {
    HeatCapacityModel::Polynomial { a, b, c, d }
}

impl ComponentDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Self {
        let mut store = Self::new();
        let builtin = vec![
            ComponentData::new("H2", 2.016, 33.19, 1.313e6, poly(27.14, 9.274e-3, -1.381e-5, 7.645e-9), 0.0),
            ComponentData::new("CO", 28.010, 132.9, 3.499e6, poly(30.87, -1.285e-2, 2.789e-5, -1.272e-8), -110.53e3),
            ComponentData::new("CO2", 44.010, 304.1, 7.38e6, poly(19.80, 7.344e-2, -5.602e-5, 1.715e-8), -393.51e3),
            ComponentData::new("H2O", 18.015, 647.1, 22.06e6, poly(32.24, 1.924e-3, 1.055e-5, -3.596e-9), -241.82e3),
            ComponentData::new("CH3OH", 32.042, 512.6, 8.09e6, poly(21.15, 7.092e-2, 2.587e-5, -2.852e-8), -200.94e3),
            ComponentData::new("DME", 46.069, 400.1, 5.37e6, poly(17.02, 1.791e-1, -5.234e-5, -1.918e-9), -184.1e3),
            ComponentData::new("CH4", 16.043, 190.6, 4.599e6, poly(19.25, 5.213e-2, 1.197e-5, -1.132e-8), -74.87e3),
            ComponentData::new("N2", 28.014, 126.2, 3.39e6, poly(31.15, -1.357e-2, 2.680e-5, -1.168e-8), 0.0),
        ];
        for c in builtin {
            store.insert(c);
        }
        store
    }

    /// adds or replaces an entry
    pub fn insert(&mut self, data: ComponentData) {
        self.components.insert(data.symbol.clone(), data);
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.components.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Result<&ComponentData, ReactorError> {
        self.components
            .get(symbol)
            .ok_or_else(|| ReactorError::UnknownSpecies(format!("no component data for {}", symbol)))
    }

    /// entries for `species`, in that order
    pub fn select(&self, species: &[String]) -> Result<Vec<ComponentData>, ReactorError> {
        species.iter().map(|s| self.get(s).cloned()).collect()
    }

    /// molar masses in g/mol, in the order of `species`
    pub fn molar_masses(&self, species: &[String]) -> Result<Vec<f64>, ReactorError> {
        species.iter().map(|s| self.get(s).map(|c| c.molar_mass)).collect()
    }

    /// loads a JSON array of `ComponentData` and adds it to the store
    pub fn extend_from_json_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, ReactorError> {
        let file = File::open(path)?;
        let entries: Vec<ComponentData> = serde_json::from_reader(BufReader::new(file))?;
        let n = entries.len();
        for e in entries {
            self.insert(e);
        }
        Ok(n)
    }
}
