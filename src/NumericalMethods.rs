//! # Numerical Methods
//!
//! Thin layer between the reactor models and the numerical crates:
//!
//! - **`ode_api`**: the `OdeSystem` trait, integrator settings and the `solve_ivp` entry point
//!   that samples an `ode_solvers` integration (Dopri5, Dop853, RK4) at user-given points
//! - **`root_solver`**: the `AlgebraicSystem` trait and `solve_root`, a `levenberg_marquardt`
//!   minimisation of the squared residual
//!
//! A right-hand side that cannot be evaluated (NaN, Inf, invalid local state) reports an error
//! and the integration or minimisation stops at once.
pub mod ode_api;
pub mod root_solver;
