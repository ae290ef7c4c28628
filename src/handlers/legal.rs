// src/handlers/legal.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::legal::{CasoLegal, LiquidacionDesglose, TipoTerminacion},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulacionPayload {
    pub empleado_id: Uuid,

    pub tipo: TipoTerminacion,

    #[schema(value_type = String, format = Date, example = "2026-09-30")]
    pub fecha_baja: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CasosQuery {
    pub empresa_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/legal/simulacion",
    tag = "Legal",
    request_body = SimulacionPayload,
    responses(
        (status = 200, description = "Estimado de liquidación, sin persistir", body = LiquidacionDesglose),
        (status = 404, description = "Empleado no encontrado")
    )
)]
pub async fn simular_liquidacion(
    State(app_state): State<AppState>,
    Json(payload): Json<SimulacionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let liquidacion = app_state
        .legal_service
        .simular(
            &app_state.db_pool,
            payload.empleado_id,
            payload.tipo,
            payload.fecha_baja,
        )
        .await?;

    Ok((StatusCode::OK, Json(LiquidacionDesglose::from(&liquidacion))))
}

#[utoipa::path(
    post,
    path = "/api/legal/casos",
    tag = "Legal",
    request_body = SimulacionPayload,
    responses(
        (status = 201, description = "Caso creado con estimado congelado", body = CasoLegal),
        (status = 404, description = "Empleado no encontrado")
    )
)]
#[axum::debug_handler]
pub async fn crear_caso(
    State(app_state): State<AppState>,
    Json(payload): Json<SimulacionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let caso = app_state
        .legal_service
        .crear_caso(
            &app_state.db_pool,
            payload.empleado_id,
            payload.tipo,
            payload.fecha_baja,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(caso)))
}

#[utoipa::path(
    get,
    path = "/api/legal/casos",
    tag = "Legal",
    params(CasosQuery),
    responses(
        (status = 200, description = "Casos de la empresa", body = Vec<CasoLegal>)
    )
)]
pub async fn listar_casos(
    State(app_state): State<AppState>,
    Query(query): Query<CasosQuery>,
) -> Result<impl IntoResponse, AppError> {
    let casos = app_state.legal_service.casos_por_empresa(query.empresa_id).await?;

    Ok((StatusCode::OK, Json(casos)))
}
