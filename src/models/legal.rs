// src/models/legal.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::basis_points::bp_a_decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_terminacion", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum TipoTerminacion {
    DespidoInjustificado,
    DespidoJustificado,
    Renuncia,
}

/// Caso de terminación laboral con el estimado de liquidación congelado al
/// momento de crearlo. Consume salario y antigüedad del empleado; nunca los
/// modifica.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CasoLegal {
    pub id: Uuid,

    pub empleado_id: Uuid,

    pub tipo: TipoTerminacion,

    #[schema(value_type = String, format = Date)]
    pub fecha_baja: NaiveDate,

    pub estimado_total_bp: i64,

    /// Desglose por concepto serializado, tal como se calculó.
    #[schema(value_type = Object)]
    pub desglose: serde_json::Value,

    pub created_at: Option<DateTime<Utc>>,
}

/// Desglose interno de la liquidación, en puntos base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidacion {
    pub tres_meses_bp: i64,
    pub veinte_dias_por_anio_bp: i64,
    pub prima_antiguedad_bp: i64,
    pub aguinaldo_proporcional_bp: i64,
    pub vacaciones_pendientes_bp: i64,
    pub prima_vacacional_bp: i64,
}

impl Liquidacion {
    pub fn total_bp(&self) -> i64 {
        self.tres_meses_bp
            + self.veinte_dias_por_anio_bp
            + self.prima_antiguedad_bp
            + self.aguinaldo_proporcional_bp
            + self.vacaciones_pendientes_bp
            + self.prima_vacacional_bp
    }
}

/// Versión de presentación del desglose, en pesos.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiquidacionDesglose {
    pub tres_meses: Decimal,
    pub veinte_dias_por_anio: Decimal,
    pub prima_antiguedad: Decimal,
    pub aguinaldo_proporcional: Decimal,
    pub vacaciones_pendientes: Decimal,
    pub prima_vacacional: Decimal,
    pub total: Decimal,
}

impl From<&Liquidacion> for LiquidacionDesglose {
    fn from(liq: &Liquidacion) -> Self {
        Self {
            tres_meses: bp_a_decimal(liq.tres_meses_bp),
            veinte_dias_por_anio: bp_a_decimal(liq.veinte_dias_por_anio_bp),
            prima_antiguedad: bp_a_decimal(liq.prima_antiguedad_bp),
            aguinaldo_proporcional: bp_a_decimal(liq.aguinaldo_proporcional_bp),
            vacaciones_pendientes: bp_a_decimal(liq.vacaciones_pendientes_bp),
            prima_vacacional: bp_a_decimal(liq.prima_vacacional_bp),
            total: bp_a_decimal(liq.total_bp()),
        }
    }
}
