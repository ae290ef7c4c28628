// src/models/empresa.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    pub id: Uuid,

    #[schema(example = "Operadora de Servicios del Centro SA de CV")]
    pub razon_social: String,

    #[schema(example = "OSC010203AB4")]
    pub rfc: Option<String>,

    /// Estado por omisión para ISN cuando el empleado no tiene centro de
    /// trabajo asignado.
    #[schema(example = "CMX")]
    pub estado_default: Option<String>,

    #[schema(example = 15)]
    pub aguinaldo_dias: i32,

    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CentroTrabajo {
    pub id: Uuid,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    #[schema(example = "Planta Norte")]
    pub nombre: String,

    /// Clave de entidad federativa donde se presta el trabajo; determina el
    /// estado aplicable para ISN.
    #[schema(example = "JAL")]
    pub estado: String,
}

/// Esquema de prestaciones superiores a las de ley, opcional por empresa.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EsquemaPrestaciones {
    pub id: Uuid,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    #[schema(example = "Ejecutivo")]
    pub nombre: String,

    /// Días de vacaciones adicionales a la tabla legal.
    #[schema(example = 5)]
    pub dias_vacaciones_extra: i32,

    /// Prima vacacional en puntos base; nunca menor al 25% legal (2500 pb).
    #[schema(example = 2500)]
    pub prima_vacacional_bp: i64,

    #[schema(example = 15)]
    pub aguinaldo_dias: i32,
}
