pub mod empleado;
pub mod empresa;
pub mod legal;
pub mod nomina;
pub mod tablas;
pub mod vacaciones;
