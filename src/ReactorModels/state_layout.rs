//! # State Layout
//!
//! Named state records and the one mapping between a record and the flat vector handed to
//! the integrator or root solver.
//!
//! Fields are stored variable-major: every variable owns a contiguous block of `n_nodes`
//! values (one value for lumped models), in the order
//!
//! ```text
//! species 0 .. species n-1 | flux | temperature | pressure | velocity
//! ```
//!
//! where flux, pressure and velocity are present only when the model carries them.
//! `index(var, node) = var * n_nodes + node`.
use super::reactor_config::ModelVariant;
use super::reactor_error::ReactorError;
use nalgebra::DVector;

/// one unknown of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// species flowrate, concentration or scaled concentration, by component index
    Species(usize),
    /// total molar flux
    Flux,
    Temperature,
    Pressure,
    Velocity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    pub n_species: usize,
    pub n_nodes: usize,
    pub has_flux: bool,
    pub has_pressure: bool,
    pub has_velocity: bool,
}

/// values of every field at every node
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    /// `species[i][node]`
    pub species: Vec<Vec<f64>>,
    pub flux: Option<Vec<f64>>,
    pub temperature: Vec<f64>,
    pub pressure: Option<Vec<f64>>,
    pub velocity: Option<Vec<f64>>,
}

impl StateLayout {
    pub fn for_variant(variant: &ModelVariant, n_species: usize, z_no: usize) -> Self {
        let lumped = |has_flux, has_pressure, has_velocity| StateLayout {
            n_species,
            n_nodes: 1,
            has_flux,
            has_pressure,
            has_velocity,
        };
        match variant {
            ModelVariant::PlugFlowFlux => lumped(true, true, false),
            ModelVariant::PlugFlowConcentration | ModelVariant::DimensionlessPlugFlow => {
                lumped(false, true, false)
            }
            ModelVariant::PlugFlowVariableVelocity => lumped(false, true, true),
            ModelVariant::DynamicDispersed { .. } | ModelVariant::SteadyDispersedDimensionless => {
                StateLayout {
                    n_species,
                    n_nodes: z_no,
                    has_flux: false,
                    has_pressure: false,
                    has_velocity: false,
                }
            }
        }
    }

    /// number of variables per node
    pub fn n_vars(&self) -> usize {
        self.n_species + 1 + self.has_flux as usize + self.has_pressure as usize + self.has_velocity as usize
    }

    /// length of the flat vector
    pub fn len(&self) -> usize {
        self.n_vars() * self.n_nodes
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// position of the variable block of `field`
    pub fn var_index(&self, field: Field) -> Option<usize> {
        let flux = self.n_species;
        let temperature = flux + self.has_flux as usize;
        let pressure = temperature + 1;
        let velocity = pressure + self.has_pressure as usize;
        match field {
            Field::Species(i) if i < self.n_species => Some(i),
            Field::Species(_) => None,
            Field::Flux => self.has_flux.then_some(flux),
            Field::Temperature => Some(temperature),
            Field::Pressure => self.has_pressure.then_some(pressure),
            Field::Velocity => self.has_velocity.then_some(velocity),
        }
    }

    pub fn index(&self, field: Field, node: usize) -> Result<usize, ReactorError> {
        if node >= self.n_nodes {
            return Err(ReactorError::IndexOutOfBounds(format!(
                "node {} of a layout with {} nodes",
                node, self.n_nodes
            )));
        }
        let var = self.var_index(field).ok_or_else(|| {
            ReactorError::IndexOutOfBounds(format!("field {:?} is not part of this layout", field))
        })?;
        Ok(var * self.n_nodes + node)
    }

    fn block<'a>(&self, flat: &'a [f64], var: usize) -> &'a [f64] {
        &flat[var * self.n_nodes..(var + 1) * self.n_nodes]
    }

    fn optional_block(&self, flat: &[f64], field: Field) -> Option<Vec<f64>> {
        self.var_index(field).map(|v| self.block(flat, v).to_vec())
    }

    /// flat vector -> record
    pub fn unpack(&self, flat: &DVector<f64>) -> Result<StateRecord, ReactorError> {
        if flat.len() != self.len() {
            return Err(ReactorError::IndexOutOfBounds(format!(
                "state vector has {} entries, layout expects {}",
                flat.len(),
                self.len()
            )));
        }
        let flat = flat.as_slice();
        let species = (0..self.n_species)
            .map(|i| self.block(flat, i).to_vec())
            .collect();
        let t = self.n_species + self.has_flux as usize;
        Ok(StateRecord {
            species,
            flux: self.optional_block(flat, Field::Flux),
            temperature: self.block(flat, t).to_vec(),
            pressure: self.optional_block(flat, Field::Pressure),
            velocity: self.optional_block(flat, Field::Velocity),
        })
    }

    /// record -> flat vector; `out` must already have the layout length
    pub fn pack(&self, record: &StateRecord, out: &mut DVector<f64>) -> Result<(), ReactorError> {
        if out.len() != self.len() {
            return Err(ReactorError::IndexOutOfBounds(format!(
                "output vector has {} entries, layout expects {}",
                out.len(),
                self.len()
            )));
        }
        let shape_error = |what: &str| {
            ReactorError::IndexOutOfBounds(format!("record field {} does not match the layout", what))
        };
        if record.species.len() != self.n_species {
            return Err(shape_error("species"));
        }
        let n = self.n_nodes;
        let mut write = |var: usize, values: &[f64], what: &str| -> Result<(), ReactorError> {
            if values.len() != n {
                return Err(shape_error(what));
            }
            out.as_mut_slice()[var * n..(var + 1) * n].copy_from_slice(values);
            Ok(())
        };
        for (i, values) in record.species.iter().enumerate() {
            write(i, values, "species")?;
        }
        for (field, values, what) in [
            (Field::Flux, &record.flux, "flux"),
            (Field::Pressure, &record.pressure, "pressure"),
            (Field::Velocity, &record.velocity, "velocity"),
        ] {
            match (self.var_index(field), values) {
                (Some(var), Some(v)) => write(var, v, what)?,
                (None, None) => {}
                _ => return Err(shape_error(what)),
            }
        }
        let t = self.n_species + self.has_flux as usize;
        write(t, &record.temperature, "temperature")?;
        Ok(())
    }

    pub fn pack_new(&self, record: &StateRecord) -> Result<DVector<f64>, ReactorError> {
        let mut out = DVector::zeros(self.len());
        self.pack(record, &mut out)?;
        Ok(out)
    }

    /// record of zeros with the fields of this layout
    pub fn zeros(&self) -> StateRecord {
        let block = || vec![0.0; self.n_nodes];
        StateRecord {
            species: (0..self.n_species).map(|_| block()).collect(),
            flux: self.has_flux.then(block),
            temperature: block(),
            pressure: self.has_pressure.then(block),
            velocity: self.has_velocity.then(block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReactorModels::reactor_config::VelocityTreatment;

    #[test]
    fn test_lumped_offsets() {
        let m1 = StateLayout::for_variant(&ModelVariant::PlugFlowFlux, 3, 25);
        assert_eq!(m1.len(), 6);
        assert_eq!(m1.index(Field::Flux, 0).unwrap(), 3);
        assert_eq!(m1.index(Field::Temperature, 0).unwrap(), 4);
        assert_eq!(m1.index(Field::Pressure, 0).unwrap(), 5);
        assert!(m1.index(Field::Velocity, 0).is_err());

        let m4 = StateLayout::for_variant(&ModelVariant::PlugFlowVariableVelocity, 2, 25);
        assert_eq!(m4.len(), 5);
        assert_eq!(m4.index(Field::Temperature, 0).unwrap(), 2);
        assert_eq!(m4.index(Field::Velocity, 0).unwrap(), 4);
    }

    #[test]
    fn test_grid_layout_is_variable_major() {
        let m2 = StateLayout::for_variant(
            &ModelVariant::DynamicDispersed { velocity: VelocityTreatment::Marching },
            2,
            4,
        );
        assert_eq!(m2.len(), 12);
        assert_eq!(m2.index(Field::Species(1), 2).unwrap(), 6);
        assert_eq!(m2.index(Field::Temperature, 3).unwrap(), 11);
        assert!(m2.index(Field::Species(2), 0).is_err());
        assert!(m2.index(Field::Temperature, 4).is_err());
        assert!(m2.index(Field::Pressure, 0).is_err());
    }

    #[test]
    fn test_pack_unpack_share_the_mapping() {
        let layout = StateLayout::for_variant(&ModelVariant::PlugFlowVariableVelocity, 2, 1);
        let flat = DVector::from_vec(vec![1.0, 2.0, 300.0, 1e5, 0.5]);
        let record = layout.unpack(&flat).unwrap();
        assert_eq!(record.species, vec![vec![1.0], vec![2.0]]);
        assert_eq!(record.temperature, vec![300.0]);
        assert_eq!(record.pressure, Some(vec![1e5]));
        assert_eq!(record.velocity, Some(vec![0.5]));
        assert_eq!(record.flux, None);
        assert_eq!(layout.pack_new(&record).unwrap(), flat);
        for field in [Field::Species(1), Field::Temperature, Field::Pressure, Field::Velocity] {
            let i = layout.index(field, 0).unwrap();
            let value = match field {
                Field::Species(k) => record.species[k][0],
                Field::Temperature => record.temperature[0],
                Field::Pressure => record.pressure.as_ref().unwrap()[0],
                Field::Velocity => record.velocity.as_ref().unwrap()[0],
                Field::Flux => unreachable!(),
            };
            assert_eq!(flat[i], value);
        }
    }

    #[test]
    fn test_shape_errors() {
        let layout = StateLayout::for_variant(&ModelVariant::PlugFlowConcentration, 2, 1);
        assert!(layout.unpack(&DVector::zeros(5)).is_err());
        let mut record = layout.zeros();
        record.velocity = Some(vec![1.0]);
        assert!(layout.pack_new(&record).is_err());
        let mut record = layout.zeros();
        record.temperature = vec![1.0, 2.0];
        assert!(layout.pack_new(&record).is_err());
    }
}
