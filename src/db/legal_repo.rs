// src/db/legal_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::legal::{CasoLegal, TipoTerminacion},
};

const COLUMNAS_CASO: &str = r#"
    id, empleado_id, tipo, fecha_baja, estimado_total_bp, desglose, created_at
"#;

#[derive(Clone)]
pub struct LegalRepository {
    pool: PgPool,
}

impl LegalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn crear_caso<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
        tipo: TipoTerminacion,
        fecha_baja: NaiveDate,
        estimado_total_bp: i64,
        desglose: serde_json::Value,
    ) -> Result<CasoLegal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "INSERT INTO casos_legales (empleado_id, tipo, fecha_baja, estimado_total_bp, desglose)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNAS_CASO}"
        );
        let caso = sqlx::query_as::<_, CasoLegal>(&consulta)
            .bind(empleado_id)
            .bind(tipo)
            .bind(fecha_baja)
            .bind(estimado_total_bp)
            .bind(desglose)
            .fetch_one(executor)
            .await?;

        Ok(caso)
    }

    pub async fn casos_por_empresa(&self, empresa_id: Uuid) -> Result<Vec<CasoLegal>, AppError> {
        let casos = sqlx::query_as::<_, CasoLegal>(
            r#"
            SELECT c.id, c.empleado_id, c.tipo, c.fecha_baja, c.estimado_total_bp,
                   c.desglose, c.created_at
            FROM casos_legales c
            JOIN empleados e ON e.id = c.empleado_id
            WHERE e.empresa_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(casos)
    }
}
