// src/handlers/vacaciones.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::vacaciones::{SaldoVacaciones, SolicitudVacaciones},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SaldoQuery {
    /// Limita los días usados al año indicado.
    pub anio: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaQuery {
    pub empresa_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrearSolicitudPayload {
    pub empleado_id: Uuid,

    #[validate(range(min = 1, message = "Se debe solicitar al menos un día."))]
    #[schema(example = 5)]
    pub dias: i64,

    #[schema(value_type = String, format = Date, example = "2026-08-17")]
    pub fecha_inicio: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaducidadesPayload {
    pub empresa_id: Uuid,

    /// Fecha de corte del barrido; hoy si se omite.
    #[schema(value_type = Option<String>, format = Date)]
    pub fecha: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtorgamientoPayload {
    pub empleado_id: Uuid,

    /// Fecha de corte para evaluar el aniversario; hoy si se omite.
    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_corte: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/vacaciones/saldo/{empleado_id}",
    tag = "Vacaciones",
    params(
        ("empleado_id" = Uuid, Path, description = "ID del empleado"),
        SaldoQuery
    ),
    responses(
        (status = 200, description = "Saldo derivado del kardex", body = SaldoVacaciones),
        (status = 404, description = "Empleado no encontrado")
    )
)]
pub async fn obtener_saldo(
    State(app_state): State<AppState>,
    Path(empleado_id): Path<Uuid>,
    Query(query): Query<SaldoQuery>,
) -> Result<impl IntoResponse, AppError> {
    let hoy = Utc::now().date_naive();
    let saldo = app_state
        .vacaciones_service
        .saldo_empleado(&app_state.db_pool, empleado_id, query.anio, hoy)
        .await?;

    Ok((StatusCode::OK, Json(saldo)))
}

#[utoipa::path(
    get,
    path = "/api/vacaciones/solicitudes/pendientes",
    tag = "Vacaciones",
    params(EmpresaQuery),
    responses(
        (status = 200, description = "Solicitudes pendientes de resolución", body = Vec<SolicitudVacaciones>)
    )
)]
pub async fn listar_pendientes(
    State(app_state): State<AppState>,
    Query(query): Query<EmpresaQuery>,
) -> Result<impl IntoResponse, AppError> {
    let solicitudes = app_state
        .vacaciones_service
        .solicitudes_pendientes(&app_state.db_pool, query.empresa_id)
        .await?;

    Ok((StatusCode::OK, Json(solicitudes)))
}

#[utoipa::path(
    post,
    path = "/api/vacaciones/solicitudes",
    tag = "Vacaciones",
    request_body = CrearSolicitudPayload,
    responses(
        (status = 201, description = "Solicitud registrada", body = SolicitudVacaciones),
        (status = 409, description = "Saldo insuficiente")
    )
)]
pub async fn crear_solicitud(
    State(app_state): State<AppState>,
    Json(payload): Json<CrearSolicitudPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let solicitud = app_state
        .vacaciones_service
        .crear_solicitud(
            &app_state.db_pool,
            payload.empleado_id,
            payload.dias,
            payload.fecha_inicio,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(solicitud)))
}

#[utoipa::path(
    post,
    path = "/api/vacaciones/solicitudes/{solicitud_id}/aprobar",
    tag = "Vacaciones",
    params(("solicitud_id" = Uuid, Path, description = "ID de la solicitud")),
    responses(
        (status = 200, description = "Solicitud aprobada y saldo recalculado", body = SolicitudVacaciones),
        (status = 404, description = "Solicitud no encontrada"),
        (status = 409, description = "Ya resuelta o saldo insuficiente")
    )
)]
pub async fn aprobar_solicitud(
    State(app_state): State<AppState>,
    Path(solicitud_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let solicitud = app_state
        .vacaciones_service
        .aprobar(&app_state.db_pool, solicitud_id)
        .await?;

    Ok((StatusCode::OK, Json(solicitud)))
}

#[utoipa::path(
    post,
    path = "/api/vacaciones/solicitudes/{solicitud_id}/rechazar",
    tag = "Vacaciones",
    params(("solicitud_id" = Uuid, Path, description = "ID de la solicitud")),
    responses(
        (status = 200, description = "Solicitud rechazada", body = SolicitudVacaciones),
        (status = 404, description = "Solicitud no encontrada"),
        (status = 409, description = "Ya resuelta")
    )
)]
pub async fn rechazar_solicitud(
    State(app_state): State<AppState>,
    Path(solicitud_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let solicitud = app_state
        .vacaciones_service
        .rechazar(&app_state.db_pool, solicitud_id)
        .await?;

    Ok((StatusCode::OK, Json(solicitud)))
}

#[utoipa::path(
    post,
    path = "/api/vacaciones/caducidades",
    tag = "Vacaciones",
    request_body = CaducidadesPayload,
    responses(
        (status = 200, description = "Días caducados por el barrido")
    )
)]
pub async fn ejecutar_caducidades(
    State(app_state): State<AppState>,
    Json(payload): Json<CaducidadesPayload>,
) -> Result<impl IntoResponse, AppError> {
    let fecha = payload.fecha.unwrap_or_else(|| Utc::now().date_naive());
    let dias_caducados = app_state
        .vacaciones_service
        .caducar(&app_state.db_pool, payload.empresa_id, fecha)
        .await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "diasCaducados": dias_caducados })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/vacaciones/otorgamientos",
    tag = "Vacaciones",
    request_body = OtorgamientoPayload,
    responses(
        (status = 200, description = "Otorgamiento del aniversario, si corresponde")
    )
)]
pub async fn otorgar_aniversario(
    State(app_state): State<AppState>,
    Json(payload): Json<OtorgamientoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let fecha_corte = payload.fecha_corte.unwrap_or_else(|| Utc::now().date_naive());
    let movimiento = app_state
        .vacaciones_service
        .otorgar_aniversario(&app_state.db_pool, payload.empleado_id, fecha_corte)
        .await?;

    Ok((StatusCode::OK, Json(movimiento)))
}
