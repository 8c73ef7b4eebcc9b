//! # Finite Differences on Uniform 1-D Grids
//!
//! Derivative stencils and ghost points shared by every discretised field (species
//! concentration, temperature, catalyst-pellet profiles).
//!
//! First derivative, 3-point values `[b, c, f]` around node i:
//! ```text
//! backward: (c - b)/dz      central: (f - b)/(2 dz)      forward: (f - c)/dz
//! ```
//! Second derivative, 5-point values `[bb, b, c, f, ff]`:
//! ```text
//! backward: (c - 2b + bb)/dz^2   central: (f - 2c + b)/dz^2   forward: (ff - 2f + c)/dz^2
//! ```
//!
//! Axial boundaries:
//! - inlet with a fixed feed value: the ghost point is the feed value itself;
//! - inlet of Danckwerts type: `y_ghost = (y_feed + β y_1)/(β + 1)`, `β = 1/(Pe dz)`;
//! - outlet with zero gradient: `y_{N+1} = y_{N-1}`;
//! - outlet with linear extrapolation: `y_{N+1} = 2 y_N - y_{N-1}`.
//!
//! Pellet surface (Robin condition `D dy/dr = k (y_bulk - y)` on the dimensionless radius):
//! ```text
//! y_{N+1} = y_{N-1} + 2 dr α (y_bulk - y_N),    α = rp k / D  (or rp h / λ)
//! ```
use crate::ReactorModels::reactor_error::ReactorError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FdScheme {
    #[default]
    Backward,
    Central,
    Forward,
}

/// uniform grid of `n` nodes over `[0, length]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformGrid {
    pub n: usize,
    pub length: f64,
    pub dz: f64,
}

impl UniformGrid {
    pub fn new(n: usize, length: f64) -> Result<Self, ReactorError> {
        if n < 2 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "a finite difference grid needs at least 2 nodes, got {}",
                n
            )));
        }
        if !(length > 0.0) || !length.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "grid length must be positive, got {}",
                length
            )));
        }
        Ok(Self {
            n,
            length,
            dz: length / (n - 1) as f64,
        })
    }

    /// grid over the dimensionless pellet radius [0, 1]
    pub fn radial(n: usize) -> Result<Self, ReactorError> {
        Self::new(n, 1.0)
    }

    pub fn nodes(&self) -> Vec<f64> {
        (0..self.n).map(|i| i as f64 * self.dz).collect()
    }

    fn check_field(&self, field: &[f64]) -> Result<(), ReactorError> {
        if field.len() != self.n {
            return Err(ReactorError::IndexOutOfBounds(format!(
                "field has {} values on a grid of {} nodes",
                field.len(),
                self.n
            )));
        }
        Ok(())
    }
}

pub fn first_derivative(values: [f64; 3], dz: f64, scheme: FdScheme) -> f64 {
    let [b, c, f] = values;
    match scheme {
        FdScheme::Backward => (c - b) / dz,
        FdScheme::Central => (f - b) / (2.0 * dz),
        FdScheme::Forward => (f - c) / dz,
    }
}

pub fn second_derivative(values: [f64; 5], dz: f64, scheme: FdScheme) -> f64 {
    let [bb, b, c, f, ff] = values;
    let dz2 = dz * dz;
    match scheme {
        FdScheme::Backward => (c - 2.0 * b + bb) / dz2,
        FdScheme::Central => (f - 2.0 * c + b) / dz2,
        FdScheme::Forward => (ff - 2.0 * f + c) / dz2,
    }
}

/// condition at z = 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InletCondition {
    /// the feed value closes the stencil
    Feed(f64),
    /// Danckwerts condition with the axial Peclet number of the field
    Danckwerts { feed: f64, peclet: f64 },
}

/// condition at z = L
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutletCondition {
    #[default]
    ZeroGradient,
    /// flux continuity through the outlet, linear extrapolation of the profile
    Extrapolated,
}

pub fn danckwerts_inlet_ghost(feed: f64, forward: f64, peclet: f64, dz: f64) -> f64 {
    let beta = 1.0 / (peclet * dz);
    (feed + beta * forward) / (beta + 1.0)
}

/// three-point neighbourhood of one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    pub back: f64,
    pub center: f64,
    pub forward: f64,
}

impl Stencil {
    pub fn first(&self, dz: f64, scheme: FdScheme) -> f64 {
        first_derivative([self.back, self.center, self.forward], dz, scheme)
    }

    pub fn second(&self, dz: f64) -> f64 {
        (self.back - 2.0 * self.center + self.forward) / (dz * dz)
    }
}

/// Neighbourhood of node `i` of an axial field with ghost points at both ends.
/// `neighbour_floor` clamps interior neighbours from below (boundary values are used as given).
pub fn axial_stencil(
    grid: &UniformGrid,
    field: &[f64],
    i: usize,
    inlet: InletCondition,
    outlet: OutletCondition,
    neighbour_floor: Option<f64>,
) -> Result<Stencil, ReactorError> {
    grid.check_field(field)?;
    if i >= grid.n {
        return Err(ReactorError::IndexOutOfBounds(format!(
            "node {} outside a grid of {} nodes",
            i, grid.n
        )));
    }
    let floor = |v: f64| match neighbour_floor {
        Some(eps) => v.max(eps),
        None => v,
    };
    let center = field[i];
    let last = grid.n - 1;
    let forward = if i < last {
        floor(field[i + 1])
    } else {
        match outlet {
            OutletCondition::ZeroGradient => floor(field[i - 1]),
            OutletCondition::Extrapolated => 2.0 * center - field[i - 1],
        }
    };
    let back = if i > 0 {
        floor(field[i - 1])
    } else {
        match inlet {
            InletCondition::Feed(feed) => feed,
            InletCondition::Danckwerts { feed, peclet } => {
                danckwerts_inlet_ghost(feed, field[1], peclet, grid.dz)
            }
        }
    };
    Ok(Stencil {
        back,
        center,
        forward,
    })
}

/// Robin ghost value beyond the pellet surface
pub fn surface_ghost(inner: f64, surface: f64, bulk: f64, alpha: f64, dr: f64) -> f64 {
    inner + 2.0 * dr * alpha * (bulk - surface)
}

/// Coefficients of a diffusion-reaction field inside a spherical pellet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PelletParameters {
    /// effective diffusivity (or thermal conductivity)
    pub diffusivity: f64,
    /// surface flux-matching coefficient α = rp k / D (or rp h / λ)
    pub alpha: f64,
    /// value in the surrounding bulk gas
    pub bulk: f64,
    pub porosity: f64,
    /// pellet radius, m
    pub radius: f64,
}

/// Residual of `D ∇²y + (1-εp) R rp^2` on the dimensionless pellet radius, node 0 at the centre.
/// `source` holds the volumetric source R at every node.
pub fn pellet_residual(
    grid: &UniformGrid,
    y: &[f64],
    source: &[f64],
    params: &PelletParameters,
) -> Result<Vec<f64>, ReactorError> {
    grid.check_field(y)?;
    grid.check_field(source)?;
    let dr = grid.dz;
    let n = grid.n;
    let d = params.diffusivity;
    let mut out = vec![0.0; n];
    for i in 0..n {
        let r = if i == 0 { 1.0 } else { i as f64 * dr };
        let diffusive = d / (dr * dr);
        let spherical = 2.0 * d / (r * 2.0 * dr);
        let reaction = (1.0 - params.porosity) * source[i] * params.radius.powi(2);
        out[i] = if i == 0 {
            // symmetry at the centre: ∇²y -> 3 d²y/dr²
            3.0 * diffusive * (2.0 * y[1] - 2.0 * y[0]) + reaction
        } else {
            let forward = if i < n - 1 {
                y[i + 1]
            } else {
                surface_ghost(y[i - 1], y[i], params.bulk, params.alpha, dr)
            };
            diffusive * (y[i - 1] - 2.0 * y[i] + forward) + spherical * (forward - y[i - 1]) + reaction
        };
    }
    Ok(out)
}

/// Linear form `A y + f + s` of [`pellet_residual`]: returns `(A, f + s)`.
pub fn pellet_system(
    grid: &UniformGrid,
    source: &[f64],
    params: &PelletParameters,
) -> Result<(DMatrix<f64>, DVector<f64>), ReactorError> {
    grid.check_field(source)?;
    let dr = grid.dz;
    let n = grid.n;
    let d = params.diffusivity;
    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut b = DVector::<f64>::zeros(n);
    for i in 0..n {
        let r = if i == 0 { 1.0 } else { i as f64 * dr };
        let diffusive = d / (dr * dr);
        let spherical = 2.0 * d / (r * 2.0 * dr);
        b[i] = (1.0 - params.porosity) * source[i] * params.radius.powi(2);
        if i == 0 {
            a[(0, 0)] = -6.0 * diffusive;
            a[(0, 1)] = 6.0 * diffusive;
        } else if i < n - 1 {
            a[(i, i - 1)] = diffusive - spherical;
            a[(i, i)] = -2.0 * diffusive;
            a[(i, i + 1)] = diffusive + spherical;
        } else {
            // ghost eliminated: y_{N+1} = y_{N-1} + 2 dr α (bulk - y_N)
            let alpha_star = 2.0 * dr * params.alpha;
            a[(i, i - 1)] = 2.0 * diffusive;
            a[(i, i)] = -2.0 * diffusive - alpha_star * (diffusive + spherical);
            b[i] += alpha_star * (diffusive + spherical) * params.bulk;
        }
    }
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_needs_two_nodes() {
        assert!(matches!(
            UniformGrid::new(1, 1.0),
            Err(ReactorError::InvalidConfiguration(_))
        ));
        assert!(UniformGrid::new(0, 1.0).is_err());
        assert!(UniformGrid::new(5, 0.0).is_err());
        let grid = UniformGrid::new(5, 2.0).unwrap();
        assert_relative_eq!(grid.dz, 0.5);
        assert_eq!(grid.nodes(), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_derivatives_of_quadratic() {
        // y = z^2 around z = 1
        let dz = 0.1;
        let y = |z: f64| z * z;
        let three = [y(0.9), y(1.0), y(1.1)];
        assert_relative_eq!(first_derivative(three, dz, FdScheme::Central), 2.0, epsilon = 1e-12);
        assert_relative_eq!(first_derivative(three, dz, FdScheme::Backward), 1.9, epsilon = 1e-12);
        assert_relative_eq!(first_derivative(three, dz, FdScheme::Forward), 2.1, epsilon = 1e-12);
        let five = [y(0.8), y(0.9), y(1.0), y(1.1), y(1.2)];
        for scheme in [FdScheme::Backward, FdScheme::Central, FdScheme::Forward] {
            assert_relative_eq!(second_derivative(five, dz, scheme), 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_uniform_field_has_zero_boundary_derivatives() {
        let grid = UniformGrid::new(6, 1.0).unwrap();
        let field = vec![3.0; 6];
        let inlet = InletCondition::Danckwerts { feed: 3.0, peclet: 50.0 };
        for outlet in [OutletCondition::ZeroGradient, OutletCondition::Extrapolated] {
            for i in [0, 5] {
                let s = axial_stencil(&grid, &field, i, inlet, outlet, None).unwrap();
                assert_relative_eq!(s.first(grid.dz, FdScheme::Backward), 0.0, epsilon = 1e-12);
                assert_relative_eq!(s.first(grid.dz, FdScheme::Central), 0.0, epsilon = 1e-12);
                assert_relative_eq!(s.second(grid.dz), 0.0, epsilon = 1e-10);
            }
        }
        // pellet with zero flux-matching coefficient
        let radial = UniformGrid::radial(5).unwrap();
        let params = PelletParameters {
            diffusivity: 1e-6,
            alpha: 0.0,
            bulk: 10.0,
            porosity: 0.4,
            radius: 2e-3,
        };
        let res = pellet_residual(&radial, &[2.0; 5], &[0.0; 5], &params).unwrap();
        for r in res {
            assert_eq!(r, 0.0);
        }
    }

    #[test]
    fn test_inlet_ghost_points() {
        let grid = UniformGrid::new(11, 1.0).unwrap();
        let field: Vec<f64> = (0..11).map(|i| 1.0 + i as f64).collect();
        let feed = axial_stencil(&grid, &field, 0, InletCondition::Feed(0.5), OutletCondition::ZeroGradient, None)
            .unwrap();
        assert_eq!(feed.back, 0.5);
        let pe = 20.0;
        let dw = axial_stencil(
            &grid,
            &field,
            0,
            InletCondition::Danckwerts { feed: 0.5, peclet: pe },
            OutletCondition::ZeroGradient,
            None,
        )
        .unwrap();
        let beta = 1.0 / (pe * 0.1);
        assert_relative_eq!(dw.back, (0.5 + beta * 2.0) / (beta + 1.0));
        // large Peclet number approaches the feed value
        assert_relative_eq!(danckwerts_inlet_ghost(0.5, 2.0, 1e12, 0.1), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_outlet_and_floor() {
        let grid = UniformGrid::new(4, 3.0).unwrap();
        let field = [1.0, -1.0, 4.0, 6.0];
        let zg = axial_stencil(&grid, &field, 3, InletCondition::Feed(0.0), OutletCondition::ZeroGradient, None)
            .unwrap();
        assert_eq!(zg.forward, 4.0);
        let ex = axial_stencil(&grid, &field, 3, InletCondition::Feed(0.0), OutletCondition::Extrapolated, None)
            .unwrap();
        assert_eq!(ex.forward, 8.0);
        let floored =
            axial_stencil(&grid, &field, 2, InletCondition::Feed(0.0), OutletCondition::ZeroGradient, Some(1e-10))
                .unwrap();
        assert_eq!(floored.back, 1e-10);
        assert_eq!(floored.center, 4.0);
        assert!(axial_stencil(&grid, &field, 4, InletCondition::Feed(0.0), OutletCondition::ZeroGradient, None).is_err());
        assert!(axial_stencil(&grid, &field[..3], 0, InletCondition::Feed(0.0), OutletCondition::ZeroGradient, None).is_err());
    }

    #[test]
    fn test_surface_flux_direction() {
        // bulk richer than the surface: the ghost lies above the inner node, flux enters the pellet
        let ghost = surface_ghost(1.0, 1.0, 2.0, 5.0, 0.25);
        assert!(ghost > 1.0);
        assert_relative_eq!(ghost, 1.0 + 2.0 * 0.25 * 5.0 * 1.0);
    }

    #[test]
    fn test_pellet_system_matches_residual() {
        let grid = UniformGrid::radial(6).unwrap();
        let params = PelletParameters {
            diffusivity: 2e-6,
            alpha: 3.0,
            bulk: 5.0,
            porosity: 0.35,
            radius: 1.5e-3,
        };
        let y = [1.0, 1.2, 1.5, 2.1, 2.9, 3.8];
        let source = [-1e3, -1.1e3, -1.2e3, -1.4e3, -1.5e3, -1.7e3];
        let res = pellet_residual(&grid, &y, &source, &params).unwrap();
        let (a, b) = pellet_system(&grid, &source, &params).unwrap();
        let linear = &a * DVector::from_row_slice(&y) + b;
        for i in 0..6 {
            assert_relative_eq!(linear[i], res[i], max_relative = 1e-10, epsilon = 1e-12);
        }
    }
}
