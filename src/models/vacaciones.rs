// src/models/vacaciones.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_movimiento_kardex", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum TipoMovimientoKardex {
    /// Alta de días por aniversario laboral.
    Otorgamiento,
    /// Descuento contra un otorgamiento (referenciado).
    Consumo,
    /// Prescripción del remanente de un otorgamiento.
    Caducidad,
}

/// Renglón del kardex de vacaciones. El kardex es un libro mayor de sólo
/// inserción: el saldo se reconcilia siempre desde estos renglones, nunca
/// se ajusta editando el campo cacheado del empleado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovimientoKardex {
    pub id: Uuid,

    #[schema(ignore)]
    pub empleado_id: Uuid,

    pub tipo: TipoMovimientoKardex,

    pub dias: i64,

    #[schema(value_type = String, format = Date)]
    pub fecha: NaiveDate,

    /// Año de aniversario que generó el otorgamiento.
    pub anio_aniversario: Option<i32>,

    /// Otorgamiento contra el que se aplica un consumo o caducidad.
    pub otorgamiento_id: Option<Uuid>,

    /// Solicitud aprobada que originó el consumo.
    pub solicitud_id: Option<Uuid>,

    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estatus_solicitud", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum EstatusSolicitud {
    Pendiente,
    Aprobada,
    Rechazada,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolicitudVacaciones {
    pub id: Uuid,

    pub empleado_id: Uuid,

    #[schema(example = 5)]
    pub dias: i64,

    #[schema(value_type = String, format = Date, example = "2026-07-20")]
    pub fecha_inicio: NaiveDate,

    pub estatus: EstatusSolicitud,

    pub resuelta_en: Option<DateTime<Utc>>,

    pub created_at: Option<DateTime<Utc>>,
}

/// Respuesta de la consulta de saldo: siempre derivada del kardex.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaldoVacaciones {
    pub empleado_id: Uuid,

    /// Días vigentes listos para solicitarse.
    pub disponibles: i64,

    /// Días ya consumidos (histórico completo o del año consultado).
    pub usados: i64,

    /// Días comprometidos en solicitudes aún pendientes.
    pub pendientes: i64,

    /// true cuando el saldo cacheado estaba desviado y fue corregido al leer.
    pub resincronizado: bool,
}
