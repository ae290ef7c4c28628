// src/db/tablas_repo.rs

use chrono::{Datelike, NaiveDate};
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tablas::{
        vigente_en, ConfigImss, ParametrosFiscales, Periodicidad, RamoImss, RenglonIsr,
        RenglonSubsidio, RenglonVacaciones, TablaIsr, TablaSubsidio, TablaVacaciones, TasaIsn,
    },
};

// Las tablas fiscales son configuración versionada con fecha: el renglón
// aplicable siempre se selecciona por la fecha de cómputo, nunca "el más
// nuevo que haya". La selección por vigencia ocurre aquí en código
// (`vigente_en`), no en un ORDER BY ... LIMIT 1 enterrado en SQL.

#[derive(sqlx::FromRow)]
struct CabeceraTabla {
    id: Uuid,
    vigente_desde: NaiveDate,
}

#[derive(Clone)]
pub struct TablasRepository {
    pool: PgPool,
}

impl TablasRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tarifa de ISR del ejercicio de la fecha dada y la periodicidad pedida.
    pub async fn tabla_isr<'e, E>(
        &self,
        executor: E,
        fecha: NaiveDate,
        periodicidad: Periodicidad,
    ) -> Result<TablaIsr, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let renglones = sqlx::query_as::<_, RenglonIsr>(
            r#"
            SELECT r.limite_inferior_bp, r.cuota_fija_bp, r.tasa_bp
            FROM renglones_isr r
            JOIN tablas_isr t ON r.tabla_id = t.id
            WHERE t.ejercicio = $1 AND t.periodicidad = $2
            ORDER BY r.limite_inferior_bp ASC
            "#,
        )
        .bind(fecha.year())
        .bind(periodicidad)
        .fetch_all(executor)
        .await?;

        if renglones.is_empty() {
            return Err(AppError::MissingRateTable {
                tabla: "tablas_isr",
                fecha,
            });
        }

        Ok(TablaIsr {
            ejercicio: fecha.year(),
            periodicidad,
            renglones,
        })
    }

    pub async fn tabla_subsidio<'e, E>(
        &self,
        executor: E,
        fecha: NaiveDate,
        periodicidad: Periodicidad,
    ) -> Result<TablaSubsidio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let renglones = sqlx::query_as::<_, RenglonSubsidio>(
            r#"
            SELECT r.limite_inferior_bp, r.subsidio_bp
            FROM renglones_subsidio r
            JOIN tablas_subsidio t ON r.tabla_id = t.id
            WHERE t.ejercicio = $1 AND t.periodicidad = $2
            ORDER BY r.limite_inferior_bp ASC
            "#,
        )
        .bind(fecha.year())
        .bind(periodicidad)
        .fetch_all(executor)
        .await?;

        if renglones.is_empty() {
            return Err(AppError::MissingRateTable {
                tabla: "tablas_subsidio",
                fecha,
            });
        }

        Ok(TablaSubsidio {
            ejercicio: fecha.year(),
            periodicidad,
            renglones,
        })
    }

    /// Parámetros y ramos IMSS vigentes a la fecha.
    pub async fn config_imss<'e, A>(
        &self,
        conexion: A,
        fecha: NaiveDate,
    ) -> Result<ConfigImss, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conexion = conexion.acquire().await?;

        let parametros = sqlx::query_as::<_, ParametrosFiscales>(
            r#"
            SELECT id, vigente_desde, uma_diaria_bp, salario_minimo_diario_bp,
                   tope_sbc_umas, umbral_excedente_umas
            FROM parametros_fiscales
            ORDER BY vigente_desde ASC
            "#,
        )
        .fetch_all(&mut *conexion)
        .await?;

        let vigentes = vigente_en(&parametros, fecha, |p| p.vigente_desde)
            .cloned()
            .ok_or(AppError::MissingRateTable {
                tabla: "parametros_fiscales",
                fecha,
            })?;

        let ramos = sqlx::query_as::<_, RamoImss>(
            r#"
            SELECT clave, base, tasa_patron_bp, tasa_obrero_bp
            FROM ramos_imss
            WHERE parametros_id = $1
            ORDER BY clave ASC
            "#,
        )
        .bind(vigentes.id)
        .fetch_all(&mut *conexion)
        .await?;

        if ramos.is_empty() {
            return Err(AppError::MissingRateTable {
                tabla: "ramos_imss",
                fecha,
            });
        }

        Ok(ConfigImss {
            parametros: vigentes,
            ramos,
        })
    }

    /// Registra una nueva tasa estatal con su vigencia. Las tasas anteriores
    /// se conservan; la selección por fecha decide cuál aplica.
    pub async fn insertar_tasa_isn<'e, E>(
        &self,
        executor: E,
        estado: &str,
        tasa_bp: i64,
        vigente_desde: NaiveDate,
    ) -> Result<TasaIsn, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tasa = sqlx::query_as::<_, TasaIsn>(
            r#"
            INSERT INTO tasas_isn (estado, tasa_bp, vigente_desde)
            VALUES ($1, $2, $3)
            RETURNING estado, tasa_bp, vigente_desde
            "#,
        )
        .bind(estado)
        .bind(tasa_bp)
        .bind(vigente_desde)
        .fetch_one(executor)
        .await?;

        Ok(tasa)
    }

    /// Todas las tasas de ISN, ordenadas para la búsqueda por vigencia.
    pub async fn tasas_isn<'e, E>(&self, executor: E) -> Result<Vec<TasaIsn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tasas = sqlx::query_as::<_, TasaIsn>(
            r#"
            SELECT estado, tasa_bp, vigente_desde
            FROM tasas_isn
            ORDER BY estado ASC, vigente_desde ASC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(tasas)
    }

    /// Tabla legal de días de vacaciones vigente a la fecha.
    pub async fn tabla_vacaciones<'e, A>(
        &self,
        conexion: A,
        fecha: NaiveDate,
    ) -> Result<TablaVacaciones, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conexion = conexion.acquire().await?;

        let cabeceras = sqlx::query_as::<_, CabeceraTabla>(
            "SELECT id, vigente_desde FROM tablas_vacaciones ORDER BY vigente_desde ASC",
        )
        .fetch_all(&mut *conexion)
        .await?;

        let cabecera = vigente_en(&cabeceras, fecha, |c| c.vigente_desde)
            .ok_or(AppError::MissingRateTable {
                tabla: "tablas_vacaciones",
                fecha,
            })?;

        let renglones = sqlx::query_as::<_, RenglonVacaciones>(
            r#"
            SELECT anios_servicio, dias
            FROM renglones_vacaciones
            WHERE tabla_id = $1
            ORDER BY anios_servicio ASC
            "#,
        )
        .bind(cabecera.id)
        .fetch_all(&mut *conexion)
        .await?;

        Ok(TablaVacaciones {
            vigente_desde: cabecera.vigente_desde,
            renglones,
        })
    }
}
