// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::db::{
    EmpleadosRepository, LegalRepository, NominaRepository, TablasRepository,
    VacacionesRepository,
};
use crate::services::{
    legal_service::LegalService, nomina_service::NominaService,
    vacaciones_service::VacacionesService,
};

// El estado compartido accesible en toda la aplicación.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub empleados_repo: EmpleadosRepository,
    pub tablas_repo: TablasRepository,
    pub vacaciones_service: VacacionesService,
    pub nomina_service: NominaService,
    pub legal_service: LegalService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL debe estar definida");

        // Conecta a la base de datos, propagando errores con '?'
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida");

        // --- Arma el grafo de dependencias ---
        let empleados_repo = EmpleadosRepository::new(db_pool.clone());
        let tablas_repo = TablasRepository::new(db_pool.clone());
        let vacaciones_repo = VacacionesRepository::new(db_pool.clone());
        let nomina_repo = NominaRepository::new(db_pool.clone());
        let legal_repo = LegalRepository::new(db_pool.clone());

        let vacaciones_service = VacacionesService::new(
            vacaciones_repo.clone(),
            empleados_repo.clone(),
            tablas_repo.clone(),
        );
        let nomina_service = NominaService::new(
            nomina_repo,
            empleados_repo.clone(),
            tablas_repo.clone(),
            vacaciones_service.clone(),
        );
        let legal_service = LegalService::new(
            legal_repo,
            empleados_repo.clone(),
            tablas_repo.clone(),
            vacaciones_repo,
        );

        Ok(Self {
            db_pool,
            empleados_repo,
            tablas_repo,
            vacaciones_service,
            nomina_service,
            legal_service,
        })
    }
}
