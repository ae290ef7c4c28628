// src/handlers/empleados.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::{basis_points, error::AppError},
    config::AppState,
    models::empleado::Empleado,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EmpleadosQuery {
    pub empresa_id: Uuid,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmpleadosPaginados {
    pub data: Vec<Empleado>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[utoipa::path(
    get,
    path = "/api/empleados",
    tag = "Empleados",
    params(EmpleadosQuery),
    responses(
        (status = 200, description = "Listado paginado de empleados", body = EmpleadosPaginados)
    )
)]
pub async fn listar_empleados(
    State(app_state): State<AppState>,
    Query(query): Query<EmpleadosQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let desplazamiento = ((page - 1) * per_page) as i64;

    let total = app_state
        .empleados_repo
        .contar_empleados(query.empresa_id)
        .await?;
    let data = app_state
        .empleados_repo
        .empleados_paginados(query.empresa_id, per_page as i64, desplazamiento)
        .await?;

    Ok((
        StatusCode::OK,
        Json(EmpleadosPaginados {
            data,
            page,
            per_page,
            total,
        }),
    ))
}

/// Montos como cadenas decimales; se normalizan a puntos base al entrar y el
/// espejo decimal se deriva de la forma entera.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarSalariosPayload {
    #[schema(example = "18500.00")]
    pub salario_mensual: Option<String>,

    #[schema(example = "616.67")]
    pub salario_diario: Option<String>,

    #[schema(example = "645.33")]
    pub salario_diario_integrado: Option<String>,

    #[schema(example = "645.33")]
    pub salario_base_cotizacion: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/empleados/{empleado_id}/salarios",
    tag = "Empleados",
    params(("empleado_id" = Uuid, Path, description = "ID del empleado")),
    request_body = ActualizarSalariosPayload,
    responses(
        (status = 200, description = "Salarios normalizados y actualizados", body = Empleado),
        (status = 400, description = "Monto malformado o negativo"),
        (status = 404, description = "Empleado no encontrado")
    )
)]
pub async fn actualizar_salarios(
    State(app_state): State<AppState>,
    Path(empleado_id): Path<Uuid>,
    Json(payload): Json<ActualizarSalariosPayload>,
) -> Result<impl IntoResponse, AppError> {
    let parsear = |texto: &Option<String>| -> Result<Option<i64>, AppError> {
        texto
            .as_deref()
            .map(basis_points::parse_monto_bp)
            .transpose()
    };

    let salario_mensual_bp = parsear(&payload.salario_mensual)?;
    let salario_diario_bp = parsear(&payload.salario_diario)?;
    let sdi_bp = parsear(&payload.salario_diario_integrado)?;
    let sbc_bp = parsear(&payload.salario_base_cotizacion)?;

    app_state
        .empleados_repo
        .empleado_por_id(&app_state.db_pool, empleado_id)
        .await?
        .ok_or(AppError::EmpleadoNotFound)?;

    let empleado = app_state
        .empleados_repo
        .actualizar_salarios(
            &app_state.db_pool,
            empleado_id,
            salario_mensual_bp,
            salario_diario_bp,
            sdi_bp,
            sbc_bp,
        )
        .await?;

    Ok((StatusCode::OK, Json(empleado)))
}

#[utoipa::path(
    get,
    path = "/api/empleados/{empleado_id}",
    tag = "Empleados",
    params(("empleado_id" = Uuid, Path, description = "ID del empleado")),
    responses(
        (status = 200, description = "Ficha del empleado", body = Empleado),
        (status = 404, description = "Empleado no encontrado")
    )
)]
pub async fn obtener_empleado(
    State(app_state): State<AppState>,
    Path(empleado_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let empleado = app_state
        .empleados_repo
        .empleado_por_id(&app_state.db_pool, empleado_id)
        .await?
        .ok_or(AppError::EmpleadoNotFound)?;

    Ok((StatusCode::OK, Json(empleado)))
}
