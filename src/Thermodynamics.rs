/// read-only lookup of pure-component data: molar mass, critical constants, heat capacity
/// correlation, standard heat of formation
pub mod component_data;
/// heat capacities, heats of reaction, ideal-gas density and concentration
pub mod thermo_properties;
/// Reynolds/Schmidt/Prandtl numbers, Sherwood and Nusselt correlations selected by name,
/// transfer coefficients, Peclet numbers and the Ergun pressure gradient
///
/// # Examples
/// ```
/// use PackedBedSim::Thermodynamics::transport_correlations::{SherwoodCorrelation, reynolds, schmidt};
/// let re = reynolds(20.0, 0.2, 4.5e-3, 1e-5);
/// let sc = schmidt(20.0, 1e-5, 1e-6);
/// let corr: SherwoodCorrelation = "Frossling".parse().unwrap();
/// assert!(corr.sherwood(re, sc) > 2.0);
/// ```
pub mod transport_correlations;
