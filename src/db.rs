pub mod empleados_repo;
pub use empleados_repo::EmpleadosRepository;
pub mod tablas_repo;
pub use tablas_repo::TablasRepository;
pub mod vacaciones_repo;
pub use vacaciones_repo::VacacionesRepository;
pub mod nomina_repo;
pub use nomina_repo::NominaRepository;
pub mod legal_repo;
pub use legal_repo::LegalRepository;
