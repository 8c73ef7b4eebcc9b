/// derivative stencils and ghost points on uniform 1-D grids (reactor axis, pellet radius)
pub mod finite_difference;
/// logger initialisation
pub mod logging;
/// flowrate, area, velocity and heat exchange relations of a tubular reactor
pub mod reactor_utils;
