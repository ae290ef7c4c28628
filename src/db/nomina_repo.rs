// src/db/nomina_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::nomina::{PeriodoNomina, ResumenNomina},
};

const COLUMNAS_PERIODO: &str = r#"
    id, empresa_id, fecha_inicio, fecha_fin, periodicidad, estatus, created_at
"#;

const COLUMNAS_RESUMEN: &str = r#"
    id, periodo_id, empleado_id, base_gravable_bp, isr_bp, subsidio_bp,
    imss_obrero_bp, imss_patron_bp, isn_bp, neto_bp, estado_isn, created_at
"#;

#[derive(Clone)]
pub struct NominaRepository {
    pool: PgPool,
}

impl NominaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn periodo_por_id<'e, E>(
        &self,
        executor: E,
        periodo_id: Uuid,
    ) -> Result<Option<PeriodoNomina>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "SELECT {COLUMNAS_PERIODO} FROM periodos_nomina WHERE id = $1"
        );
        let periodo = sqlx::query_as::<_, PeriodoNomina>(&consulta)
            .bind(periodo_id)
            .fetch_optional(executor)
            .await?;

        Ok(periodo)
    }

    /// Resúmenes históricos de un periodo procesado, tal como se guardaron.
    pub async fn resumenes_por_periodo<'e, E>(
        &self,
        executor: E,
        periodo_id: Uuid,
    ) -> Result<Vec<ResumenNomina>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "SELECT {COLUMNAS_RESUMEN} FROM resumenes_nomina
             WHERE periodo_id = $1
             ORDER BY created_at ASC"
        );
        let resumenes = sqlx::query_as::<_, ResumenNomina>(&consulta)
            .bind(periodo_id)
            .fetch_all(executor)
            .await?;

        Ok(resumenes)
    }

    pub async fn insertar_resumen<'e, E>(
        &self,
        executor: E,
        resumen: &ResumenNomina,
    ) -> Result<ResumenNomina, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "INSERT INTO resumenes_nomina (
                periodo_id, empleado_id, base_gravable_bp, isr_bp, subsidio_bp,
                imss_obrero_bp, imss_patron_bp, isn_bp, neto_bp, estado_isn
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNAS_RESUMEN}"
        );
        let guardado = sqlx::query_as::<_, ResumenNomina>(&consulta)
            .bind(resumen.periodo_id)
            .bind(resumen.empleado_id)
            .bind(resumen.base_gravable_bp)
            .bind(resumen.isr_bp)
            .bind(resumen.subsidio_bp)
            .bind(resumen.imss_obrero_bp)
            .bind(resumen.imss_patron_bp)
            .bind(resumen.isn_bp)
            .bind(resumen.neto_bp)
            .bind(resumen.estado_isn.as_deref())
            .fetch_one(executor)
            .await?;

        Ok(guardado)
    }

    pub async fn marcar_procesado<'e, E>(
        &self,
        executor: E,
        periodo_id: Uuid,
    ) -> Result<PeriodoNomina, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "UPDATE periodos_nomina
             SET estatus = 'PROCESADO'
             WHERE id = $1
             RETURNING {COLUMNAS_PERIODO}"
        );
        let periodo = sqlx::query_as::<_, PeriodoNomina>(&consulta)
            .bind(periodo_id)
            .fetch_one(executor)
            .await?;

        Ok(periodo)
    }
}
