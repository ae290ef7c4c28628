pub mod imss;
pub mod isn;
pub mod isr;
pub mod kardex;
pub mod legal_service;
pub mod nomina_service;
pub mod vacaciones_service;
