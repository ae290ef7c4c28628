pub mod empleados;
pub mod legal;
pub mod nomina;
pub mod vacaciones;
