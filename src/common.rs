pub mod basis_points;
pub mod error;
