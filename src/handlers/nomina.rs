// src/handlers/nomina.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::{basis_points, error::AppError},
    config::AppState,
    models::nomina::{PeriodoNomina, ReporteCostoNomina},
    models::tablas::TasaIsn,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CostosQuery {
    pub empresa_id: Uuid,
    pub periodo_id: Uuid,
    /// Incluye el desglose de ISN por estado.
    pub por_estado: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CerrarPeriodoPayload {
    pub empresa_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AltaTasaIsnPayload {
    #[schema(example = "CMX")]
    pub estado: String,

    /// Porcentaje como cadena, con o sin signo: "4" o "4%".
    #[schema(example = "4%")]
    pub tasa: String,

    #[schema(value_type = String, format = Date, example = "2026-01-01")]
    pub vigente_desde: NaiveDate,
}

#[utoipa::path(
    get,
    path = "/api/nomina/costos",
    tag = "Nomina",
    params(CostosQuery),
    responses(
        (status = 200, description = "Reporte de costos del periodo (histórico o estimado)", body = ReporteCostoNomina),
        (status = 404, description = "Periodo no encontrado"),
        (status = 500, description = "Tabla de tasas faltante para la fecha")
    )
)]
pub async fn reporte_costos(
    State(app_state): State<AppState>,
    Query(query): Query<CostosQuery>,
) -> Result<impl IntoResponse, AppError> {
    let reporte = app_state
        .nomina_service
        .reporte_costos(
            &app_state.db_pool,
            query.empresa_id,
            query.periodo_id,
            query.por_estado.unwrap_or(false),
        )
        .await?;

    Ok((StatusCode::OK, Json(reporte)))
}

#[utoipa::path(
    post,
    path = "/api/nomina/periodos/{periodo_id}/cerrar",
    tag = "Nomina",
    params(("periodo_id" = Uuid, Path, description = "ID del periodo")),
    request_body = CerrarPeriodoPayload,
    responses(
        (status = 200, description = "Periodo procesado y resumen congelado", body = PeriodoNomina),
        (status = 409, description = "El periodo ya fue procesado o hay saldos desviados"),
        (status = 422, description = "Empleado sin estado ISN resoluble")
    )
)]
pub async fn cerrar_periodo(
    State(app_state): State<AppState>,
    Path(periodo_id): Path<Uuid>,
    Json(payload): Json<CerrarPeriodoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let periodo = app_state
        .nomina_service
        .cerrar_periodo(&app_state.db_pool, payload.empresa_id, periodo_id)
        .await?;

    Ok((StatusCode::OK, Json(periodo)))
}

#[utoipa::path(
    post,
    path = "/api/nomina/tasas-isn",
    tag = "Nomina",
    request_body = AltaTasaIsnPayload,
    responses(
        (status = 201, description = "Tasa registrada con su vigencia", body = TasaIsn),
        (status = 400, description = "Porcentaje malformado")
    )
)]
pub async fn alta_tasa_isn(
    State(app_state): State<AppState>,
    Json(payload): Json<AltaTasaIsnPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tasa_bp = basis_points::parse_tasa_bp(&payload.tasa)?;

    let tasa = app_state
        .tablas_repo
        .insertar_tasa_isn(
            &app_state.db_pool,
            &payload.estado,
            tasa_bp,
            payload.vigente_desde,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(tasa)))
}
