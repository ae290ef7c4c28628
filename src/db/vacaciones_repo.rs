// src/db/vacaciones_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::vacaciones::{
        EstatusSolicitud, MovimientoKardex, SolicitudVacaciones, TipoMovimientoKardex,
    },
    services::kardex::AplicacionDias,
};

const COLUMNAS_KARDEX: &str = r#"
    id, empleado_id, tipo, dias, fecha, anio_aniversario,
    otorgamiento_id, solicitud_id, created_at
"#;

const COLUMNAS_SOLICITUD: &str = r#"
    id, empleado_id, dias, fecha_inicio, estatus, resuelta_en, created_at
"#;

#[derive(Clone)]
pub struct VacacionesRepository {
    pool: PgPool,
}

impl VacacionesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn kardex_por_empleado<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
    ) -> Result<Vec<MovimientoKardex>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "SELECT {COLUMNAS_KARDEX} FROM kardex_vacaciones
             WHERE empleado_id = $1
             ORDER BY fecha ASC, created_at ASC"
        );
        let kardex = sqlx::query_as::<_, MovimientoKardex>(&consulta)
            .bind(empleado_id)
            .fetch_all(executor)
            .await?;

        Ok(kardex)
    }

    /// Igual que `kardex_por_empleado` pero con candado de renglón: serializa
    /// consumos y barridos de caducidad concurrentes del mismo empleado.
    pub async fn kardex_por_empleado_con_candado<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
    ) -> Result<Vec<MovimientoKardex>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "SELECT {COLUMNAS_KARDEX} FROM kardex_vacaciones
             WHERE empleado_id = $1
             ORDER BY fecha ASC, created_at ASC
             FOR UPDATE"
        );
        let kardex = sqlx::query_as::<_, MovimientoKardex>(&consulta)
            .bind(empleado_id)
            .fetch_all(executor)
            .await?;

        Ok(kardex)
    }

    pub async fn insertar_otorgamiento<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
        dias: i64,
        fecha: NaiveDate,
        anio_aniversario: i32,
    ) -> Result<MovimientoKardex, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "INSERT INTO kardex_vacaciones (empleado_id, tipo, dias, fecha, anio_aniversario)
             VALUES ($1, 'OTORGAMIENTO', $2, $3, $4)
             RETURNING {COLUMNAS_KARDEX}"
        );
        let movimiento = sqlx::query_as::<_, MovimientoKardex>(&consulta)
            .bind(empleado_id)
            .bind(dias)
            .bind(fecha)
            .bind(anio_aniversario)
            .fetch_one(executor)
            .await?;

        Ok(movimiento)
    }

    /// Un otorgamiento por año de aniversario: evita duplicar la acumulación
    /// si el proceso corre dos veces para el mismo aniversario.
    pub async fn existe_otorgamiento_del_anio<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
        anio_aniversario: i32,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let existe: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM kardex_vacaciones
                WHERE empleado_id = $1
                  AND tipo = 'OTORGAMIENTO'
                  AND anio_aniversario = $2
            )
            "#,
        )
        .bind(empleado_id)
        .bind(anio_aniversario)
        .fetch_one(executor)
        .await?;

        Ok(existe.0)
    }

    /// Inserta un consumo o caducidad contra un otorgamiento concreto.
    pub async fn insertar_aplicacion<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
        tipo: TipoMovimientoKardex,
        aplicacion: &AplicacionDias,
        fecha: NaiveDate,
        solicitud_id: Option<Uuid>,
    ) -> Result<MovimientoKardex, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "INSERT INTO kardex_vacaciones (empleado_id, tipo, dias, fecha, otorgamiento_id, solicitud_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNAS_KARDEX}"
        );
        let movimiento = sqlx::query_as::<_, MovimientoKardex>(&consulta)
            .bind(empleado_id)
            .bind(tipo)
            .bind(aplicacion.dias)
            .bind(fecha)
            .bind(aplicacion.otorgamiento_id)
            .bind(solicitud_id)
            .fetch_one(executor)
            .await?;

        Ok(movimiento)
    }

    pub async fn crear_solicitud<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
        dias: i64,
        fecha_inicio: NaiveDate,
    ) -> Result<SolicitudVacaciones, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "INSERT INTO solicitudes_vacaciones (empleado_id, dias, fecha_inicio)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNAS_SOLICITUD}"
        );
        let solicitud = sqlx::query_as::<_, SolicitudVacaciones>(&consulta)
            .bind(empleado_id)
            .bind(dias)
            .bind(fecha_inicio)
            .fetch_one(executor)
            .await?;

        Ok(solicitud)
    }

    /// La solicitud se lee con candado al resolverla para que dos aprobaciones
    /// simultáneas no consuman el saldo dos veces.
    pub async fn solicitud_con_candado<'e, E>(
        &self,
        executor: E,
        solicitud_id: Uuid,
    ) -> Result<Option<SolicitudVacaciones>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "SELECT {COLUMNAS_SOLICITUD} FROM solicitudes_vacaciones
             WHERE id = $1
             FOR UPDATE"
        );
        let solicitud = sqlx::query_as::<_, SolicitudVacaciones>(&consulta)
            .bind(solicitud_id)
            .fetch_optional(executor)
            .await?;

        Ok(solicitud)
    }

    pub async fn solicitudes_pendientes<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
    ) -> Result<Vec<SolicitudVacaciones>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let solicitudes = sqlx::query_as::<_, SolicitudVacaciones>(
            r#"
            SELECT s.id, s.empleado_id, s.dias, s.fecha_inicio, s.estatus,
                   s.resuelta_en, s.created_at
            FROM solicitudes_vacaciones s
            JOIN empleados e ON e.id = s.empleado_id
            WHERE e.empresa_id = $1 AND s.estatus = 'PENDIENTE'
            ORDER BY s.created_at ASC
            "#,
        )
            .bind(empresa_id)
            .fetch_all(executor)
            .await?;

        Ok(solicitudes)
    }

    pub async fn dias_pendientes<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(dias), 0)::BIGINT
            FROM solicitudes_vacaciones
            WHERE empleado_id = $1 AND estatus = 'PENDIENTE'
            "#,
        )
        .bind(empleado_id)
        .fetch_one(executor)
        .await?;

        Ok(total.0)
    }

    pub async fn marcar_resuelta<'e, E>(
        &self,
        executor: E,
        solicitud_id: Uuid,
        estatus: EstatusSolicitud,
    ) -> Result<SolicitudVacaciones, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "UPDATE solicitudes_vacaciones
             SET estatus = $2, resuelta_en = now()
             WHERE id = $1
             RETURNING {COLUMNAS_SOLICITUD}"
        );
        let solicitud = sqlx::query_as::<_, SolicitudVacaciones>(&consulta)
            .bind(solicitud_id)
            .bind(estatus)
            .fetch_one(executor)
            .await?;

        Ok(solicitud)
    }
}
