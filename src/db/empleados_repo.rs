// src/db/empleados_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{basis_points, error::AppError},
    models::empleado::Empleado,
    models::empresa::{CentroTrabajo, Empresa, EsquemaPrestaciones},
};

const COLUMNAS_EMPLEADO: &str = r#"
    id, empresa_id, centro_trabajo_id, esquema_id, nombre, rfc, nss,
    salario_mensual, salario_mensual_bp,
    salario_diario, salario_diario_bp,
    salario_diario_integrado, salario_diario_integrado_bp,
    salario_base_cotizacion, salario_base_cotizacion_bp,
    saldo_vacaciones_actual,
    fecha_ingreso, fecha_alta_imss, fecha_baja, fecha_reconocimiento_antiguedad,
    created_at
"#;

#[derive(Clone)]
pub struct EmpleadosRepository {
    pool: PgPool,
}

impl EmpleadosRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn empresa_por_id(&self, empresa_id: Uuid) -> Result<Option<Empresa>, AppError> {
        let empresa = sqlx::query_as::<_, Empresa>(
            r#"
            SELECT id, razon_social, rfc, estado_default, aguinaldo_dias, created_at
            FROM empresas
            WHERE id = $1
            "#,
        )
        .bind(empresa_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(empresa)
    }

    pub async fn empleado_por_id<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
    ) -> Result<Option<Empleado>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "SELECT {COLUMNAS_EMPLEADO} FROM empleados WHERE id = $1"
        );
        let empleado = sqlx::query_as::<_, Empleado>(&consulta)
            .bind(empleado_id)
            .fetch_optional(executor)
            .await?;

        Ok(empleado)
    }

    /// Empleados activos de la empresa (sin fecha de baja).
    pub async fn empleados_activos<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
    ) -> Result<Vec<Empleado>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "SELECT {COLUMNAS_EMPLEADO} FROM empleados
             WHERE empresa_id = $1 AND fecha_baja IS NULL
             ORDER BY nombre ASC"
        );
        let empleados = sqlx::query_as::<_, Empleado>(&consulta)
            .bind(empresa_id)
            .fetch_all(executor)
            .await?;

        Ok(empleados)
    }

    pub async fn empleados_paginados(
        &self,
        empresa_id: Uuid,
        limite: i64,
        desplazamiento: i64,
    ) -> Result<Vec<Empleado>, AppError> {
        let consulta = format!(
            "SELECT {COLUMNAS_EMPLEADO} FROM empleados
             WHERE empresa_id = $1
             ORDER BY nombre ASC
             LIMIT $2 OFFSET $3"
        );
        let empleados = sqlx::query_as::<_, Empleado>(&consulta)
            .bind(empresa_id)
            .bind(limite)
            .bind(desplazamiento)
            .fetch_all(&self.pool)
            .await?;

        Ok(empleados)
    }

    pub async fn contar_empleados(&self, empresa_id: Uuid) -> Result<i64, AppError> {
        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM empleados WHERE empresa_id = $1")
                .bind(empresa_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total.0)
    }

    pub async fn centros_por_empresa<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
    ) -> Result<Vec<CentroTrabajo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let centros = sqlx::query_as::<_, CentroTrabajo>(
            r#"
            SELECT id, empresa_id, nombre, estado
            FROM centros_trabajo
            WHERE empresa_id = $1
            ORDER BY nombre ASC
            "#,
        )
        .bind(empresa_id)
        .fetch_all(executor)
        .await?;

        Ok(centros)
    }

    pub async fn esquema_por_id<'e, E>(
        &self,
        executor: E,
        esquema_id: Uuid,
    ) -> Result<Option<EsquemaPrestaciones>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let esquema = sqlx::query_as::<_, EsquemaPrestaciones>(
            r#"
            SELECT id, empresa_id, nombre, dias_vacaciones_extra, prima_vacacional_bp, aguinaldo_dias
            FROM esquemas_prestaciones
            WHERE id = $1
            "#,
        )
        .bind(esquema_id)
        .fetch_optional(executor)
        .await?;

        Ok(esquema)
    }

    /// Actualiza los salarios del empleado: la forma en puntos base es la
    /// autoritativa y el espejo decimal se deriva de ella, nunca al revés.
    pub async fn actualizar_salarios<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
        salario_mensual_bp: Option<i64>,
        salario_diario_bp: Option<i64>,
        sdi_bp: Option<i64>,
        sbc_bp: Option<i64>,
    ) -> Result<Empleado, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let consulta = format!(
            "UPDATE empleados SET
                salario_mensual_bp = COALESCE($2, salario_mensual_bp),
                salario_mensual = COALESCE($3, salario_mensual),
                salario_diario_bp = COALESCE($4, salario_diario_bp),
                salario_diario = COALESCE($5, salario_diario),
                salario_diario_integrado_bp = COALESCE($6, salario_diario_integrado_bp),
                salario_diario_integrado = COALESCE($7, salario_diario_integrado),
                salario_base_cotizacion_bp = COALESCE($8, salario_base_cotizacion_bp),
                salario_base_cotizacion = COALESCE($9, salario_base_cotizacion)
             WHERE id = $1
             RETURNING {COLUMNAS_EMPLEADO}"
        );
        let empleado = sqlx::query_as::<_, Empleado>(&consulta)
            .bind(empleado_id)
            .bind(salario_mensual_bp)
            .bind(salario_mensual_bp.map(basis_points::bp_a_decimal))
            .bind(salario_diario_bp)
            .bind(salario_diario_bp.map(basis_points::bp_a_decimal))
            .bind(sdi_bp)
            .bind(sdi_bp.map(basis_points::bp_a_decimal))
            .bind(sbc_bp)
            .bind(sbc_bp.map(basis_points::bp_a_decimal))
            .fetch_one(executor)
            .await?;

        Ok(empleado)
    }

    /// Única escritura permitida sobre el saldo cacheado: la resincronización
    /// desde el kardex. Ningún otro camino toca esta columna.
    pub async fn actualizar_saldo_cacheado<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
        saldo: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE empleados SET saldo_vacaciones_actual = $2 WHERE id = $1")
            .bind(empleado_id)
            .bind(saldo)
            .execute(executor)
            .await?;

        Ok(())
    }
}
