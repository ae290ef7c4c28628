// src/models/nomina.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::tablas::Periodicidad;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estatus_periodo", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum EstatusPeriodo {
    Abierto,
    Procesado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodoNomina {
    pub id: Uuid,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-07-01")]
    pub fecha_inicio: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2026-07-15")]
    pub fecha_fin: NaiveDate,

    pub periodicidad: Periodicidad,

    pub estatus: EstatusPeriodo,

    pub created_at: Option<DateTime<Utc>>,
}

impl PeriodoNomina {
    /// Días naturales cubiertos por el periodo, extremos inclusive.
    pub fn dias(&self) -> i64 {
        (self.fecha_fin - self.fecha_inicio).num_days() + 1
    }
}

/// Resumen histórico por empleado y periodo procesado. Inmutable una vez
/// cerrado el periodo; los reportes de periodos procesados lo leen tal cual.
/// Todos los montos se guardan en puntos base (BIGINT).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumenNomina {
    pub id: Uuid,
    pub periodo_id: Uuid,
    pub empleado_id: Uuid,
    pub base_gravable_bp: i64,
    pub isr_bp: i64,
    pub subsidio_bp: i64,
    pub imss_obrero_bp: i64,
    pub imss_patron_bp: i64,
    pub isn_bp: i64,
    pub neto_bp: i64,
    /// Estado que absorbió el ISN de este empleado.
    pub estado_isn: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

// --- Tipos del reporte de costos (frontera de presentación: Decimal) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OrigenReporte {
    /// Leído del resumen histórico de un periodo procesado.
    Historico,
    /// Estimación en vivo del periodo abierto con el estado actual.
    Estimado,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostoEmpleado {
    pub empleado_id: Uuid,
    pub nombre: Option<String>,
    pub base_gravable: Decimal,
    pub isr: Decimal,
    pub subsidio: Decimal,
    pub imss_obrero: Decimal,
    pub imss_patron: Decimal,
    pub isn: Decimal,
    pub neto: Decimal,
    pub estado_isn: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostoIsnEstado {
    #[schema(example = "JAL")]
    pub estado: String,
    pub base_gravable: Decimal,
    /// Tasa como porcentaje (3.00 = 3%).
    pub tasa: Decimal,
    pub impuesto: Decimal,
}

/// Empleados cuyo estado no pudo resolverse: se reportan explícitamente,
/// nunca se omiten ni se les inventa una tasa.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IsnSinJurisdiccion {
    pub empleado_id: Uuid,
    pub base_gravable: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReporteCostoNomina {
    pub empresa_id: Uuid,
    pub periodo_id: Uuid,
    pub origen: OrigenReporte,
    pub total_base_gravable: Decimal,
    pub total_isr: Decimal,
    pub total_subsidio: Decimal,
    pub total_imss_obrero: Decimal,
    pub total_imss_patron: Decimal,
    pub total_isn: Decimal,
    pub total_neto: Decimal,
    /// Costo total patronal: neto + retenciones enteradas + cargas patronales.
    pub costo_total: Decimal,
    pub empleados: Vec<CostoEmpleado>,
    /// Desglose de ISN por estado; presente cuando se pide `porEstado`.
    pub isn_por_estado: Option<Vec<CostoIsnEstado>>,
    pub isn_sin_jurisdiccion: Vec<IsnSinJurisdiccion>,
}
