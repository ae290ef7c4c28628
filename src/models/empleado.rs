// src/models/empleado.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::{basis_points, error::AppError};

// Los campos salariales existen por duplicado: el espejo `Decimal` es
// presentación/legado y la forma entera en puntos base es la autoritativa.
// Ningún cálculo debe leer el espejo si la forma en pb está presente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Empleado {
    pub id: Uuid,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    pub centro_trabajo_id: Option<Uuid>,
    pub esquema_id: Option<Uuid>,

    #[schema(example = "María Fernanda López Ruiz")]
    pub nombre: String,

    #[schema(example = "LORM850214AB1")]
    pub rfc: Option<String>,

    #[schema(example = "12345678901")]
    pub nss: Option<String>,

    #[schema(example = "18500.00")]
    pub salario_mensual: Option<Decimal>,
    pub salario_mensual_bp: Option<i64>,

    #[schema(example = "616.67")]
    pub salario_diario: Option<Decimal>,
    pub salario_diario_bp: Option<i64>,

    /// SDI: salario diario integrado.
    pub salario_diario_integrado: Option<Decimal>,
    pub salario_diario_integrado_bp: Option<i64>,

    /// SBC: salario base de cotización para cuotas IMSS.
    pub salario_base_cotizacion: Option<Decimal>,
    pub salario_base_cotizacion_bp: Option<i64>,

    /// Proyección derivada del kardex; jamás se edita a mano.
    pub saldo_vacaciones_actual: i64,

    #[schema(value_type = String, format = Date, example = "2019-03-01")]
    pub fecha_ingreso: NaiveDate,

    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_alta_imss: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_baja: Option<NaiveDate>,

    /// Si existe, la antigüedad se cuenta desde aquí en lugar de la fecha de
    /// ingreso (sustituciones patronales, recontrataciones).
    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_reconocimiento_antiguedad: Option<NaiveDate>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Empleado {
    /// Fecha desde la que corre la antigüedad.
    pub fn fecha_antiguedad(&self) -> NaiveDate {
        self.fecha_reconocimiento_antiguedad
            .unwrap_or(self.fecha_ingreso)
    }

    /// Años de servicio cumplidos a la fecha dada.
    pub fn anios_cumplidos(&self, a_fecha: NaiveDate) -> i32 {
        a_fecha
            .years_since(self.fecha_antiguedad())
            .map(|a| a as i32)
            .unwrap_or(0)
    }

    pub fn salario_mensual_efectivo_bp(&self) -> Result<i64, AppError> {
        salario_efectivo(self.salario_mensual_bp, self.salario_mensual, "salario mensual")
    }

    pub fn salario_diario_efectivo_bp(&self) -> Result<i64, AppError> {
        salario_efectivo(self.salario_diario_bp, self.salario_diario, "salario diario")
    }

    pub fn sdi_efectivo_bp(&self) -> Result<i64, AppError> {
        salario_efectivo(
            self.salario_diario_integrado_bp,
            self.salario_diario_integrado,
            "salario diario integrado",
        )
    }

    pub fn sbc_efectivo_bp(&self) -> Result<i64, AppError> {
        salario_efectivo(
            self.salario_base_cotizacion_bp,
            self.salario_base_cotizacion,
            "salario base de cotización",
        )
    }
}

// La forma en puntos base manda; el espejo decimal sólo respalda registros
// que aún no han sido normalizados.
fn salario_efectivo(
    bp: Option<i64>,
    espejo: Option<Decimal>,
    campo: &str,
) -> Result<i64, AppError> {
    if let Some(valor) = bp {
        return Ok(valor);
    }
    match espejo {
        Some(decimal) => basis_points::decimal_a_bp(decimal),
        None => Err(AppError::InvalidAmount(format!("{campo} ausente"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empleado_base() -> Empleado {
        Empleado {
            id: Uuid::new_v4(),
            empresa_id: Uuid::new_v4(),
            centro_trabajo_id: None,
            esquema_id: None,
            nombre: "Prueba".to_string(),
            rfc: None,
            nss: None,
            salario_mensual: None,
            salario_mensual_bp: None,
            salario_diario: None,
            salario_diario_bp: None,
            salario_diario_integrado: None,
            salario_diario_integrado_bp: None,
            salario_base_cotizacion: None,
            salario_base_cotizacion_bp: None,
            saldo_vacaciones_actual: 0,
            fecha_ingreso: NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
            fecha_alta_imss: None,
            fecha_baja: None,
            fecha_reconocimiento_antiguedad: None,
            created_at: None,
        }
    }

    #[test]
    fn la_forma_en_pb_manda_sobre_el_espejo() {
        let mut empleado = empleado_base();
        empleado.salario_diario = Some(Decimal::new(99999, 2));
        empleado.salario_diario_bp = Some(6_166_700);
        assert_eq!(empleado.salario_diario_efectivo_bp().unwrap(), 6_166_700);
    }

    #[test]
    fn cae_al_espejo_decimal_si_no_hay_pb() {
        let mut empleado = empleado_base();
        empleado.salario_diario = Some(Decimal::new(61667, 2));
        assert_eq!(empleado.salario_diario_efectivo_bp().unwrap(), 6_166_700);
    }

    #[test]
    fn sin_salario_es_monto_invalido() {
        let empleado = empleado_base();
        assert!(matches!(
            empleado.salario_diario_efectivo_bp(),
            Err(AppError::InvalidAmount(_))
        ));
    }

    #[test]
    fn anios_cumplidos_respeta_reconocimiento() {
        let mut empleado = empleado_base();
        empleado.fecha_reconocimiento_antiguedad =
            Some(NaiveDate::from_ymd_opt(2015, 6, 15).unwrap());
        let corte = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        assert_eq!(empleado.anios_cumplidos(corte), 9);
        let corte = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(empleado.anios_cumplidos(corte), 10);
    }
}
