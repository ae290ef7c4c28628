// src/models/tablas.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Selección por vigencia ---

/// Dado un arreglo ordenado ascendentemente por fecha de vigencia, devuelve el
/// renglón más reciente con vigencia <= `fecha`. Búsqueda binaria, nunca
/// "el último que haya": la fecha de cómputo decide.
pub fn vigente_en<T>(renglones: &[T], fecha: NaiveDate, vigencia: impl Fn(&T) -> NaiveDate) -> Option<&T> {
    let corte = renglones.partition_point(|r| vigencia(r) <= fecha);
    if corte == 0 { None } else { renglones.get(corte - 1) }
}

// --- ISR ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "periodicidad", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum Periodicidad {
    Semanal,
    Quincenal,
    Mensual,
}

impl Periodicidad {
    /// Días nominales del periodo para proyectar salarios diarios.
    pub fn dias_nominales(&self) -> i64 {
        match self {
            Periodicidad::Semanal => 7,
            Periodicidad::Quincenal => 15,
            Periodicidad::Mensual => 30,
        }
    }
}

/// Renglón de la tarifa de ISR: el tramo aplicable es el de mayor límite
/// inferior <= ingreso.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenglonIsr {
    pub limite_inferior_bp: i64,
    pub cuota_fija_bp: i64,
    pub tasa_bp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TablaIsr {
    pub ejercicio: i32,
    pub periodicidad: Periodicidad,
    /// Ordenados por límite inferior ascendente.
    pub renglones: Vec<RenglonIsr>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenglonSubsidio {
    pub limite_inferior_bp: i64,
    pub subsidio_bp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TablaSubsidio {
    pub ejercicio: i32,
    pub periodicidad: Periodicidad,
    pub renglones: Vec<RenglonSubsidio>,
}

// --- IMSS ---

/// Base sobre la que cotiza cada ramo del seguro social.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "base_cotizacion", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum BaseCotizacion {
    /// Cuota fija sobre la UMA diaria (art. 106 fracción I LSS).
    CuotaFija,
    /// Sólo sobre el excedente de tres UMA (art. 106 fracción II).
    Excedente,
    /// Sobre el salario base de cotización completo.
    SalarioBase,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RamoImss {
    #[schema(example = "ENFERMEDAD_MATERNIDAD_EXCEDENTE")]
    pub clave: String,
    pub base: BaseCotizacion,
    pub tasa_patron_bp: i64,
    pub tasa_obrero_bp: i64,
}

/// Valores de referencia con vigencia: UMA y salario mínimo cambian cada año.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParametrosFiscales {
    pub id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub vigente_desde: NaiveDate,
    pub uma_diaria_bp: i64,
    pub salario_minimo_diario_bp: i64,
    /// Tope del SBC en múltiplos de UMA (25).
    pub tope_sbc_umas: i32,
    /// Umbral del ramo excedente en múltiplos de UMA (3).
    pub umbral_excedente_umas: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigImss {
    pub parametros: ParametrosFiscales,
    pub ramos: Vec<RamoImss>,
}

// --- ISN ---

/// Tasa estatal de impuesto sobre nómina con vigencia. Las tasas cambian en
/// el tiempo: la aplicable es la más reciente con vigencia <= fecha de pago.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TasaIsn {
    #[schema(example = "CMX")]
    pub estado: String,
    pub tasa_bp: i64,
    #[schema(value_type = String, format = Date)]
    pub vigente_desde: NaiveDate,
}

// --- Vacaciones ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenglonVacaciones {
    pub anios_servicio: i32,
    pub dias: i32,
}

/// Tabla legal de días de vacaciones por antigüedad, con vigencia para
/// absorber reformas (la de 2023 duplicó el primer año).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TablaVacaciones {
    #[schema(value_type = String, format = Date)]
    pub vigente_desde: NaiveDate,
    /// Ordenados por años de servicio ascendente.
    pub renglones: Vec<RenglonVacaciones>,
}

impl TablaVacaciones {
    /// Días que corresponden a un empleado con `anios` cumplidos: el renglón
    /// de mayor antigüedad <= anios. Cero años aún no genera derecho.
    pub fn dias_por_anios(&self, anios: i32) -> i32 {
        let corte = self.renglones.partition_point(|r| r.anios_servicio <= anios);
        if corte == 0 {
            0
        } else {
            self.renglones[corte - 1].dias
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fecha(anio: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(anio, mes, dia).unwrap()
    }

    #[test]
    fn vigente_en_elige_el_renglon_mas_reciente() {
        let tasas = vec![
            TasaIsn { estado: "CMX".into(), tasa_bp: 250, vigente_desde: fecha(2020, 1, 1) },
            TasaIsn { estado: "CMX".into(), tasa_bp: 300, vigente_desde: fecha(2022, 1, 1) },
            TasaIsn { estado: "CMX".into(), tasa_bp: 400, vigente_desde: fecha(2025, 1, 1) },
        ];
        let elegido = vigente_en(&tasas, fecha(2024, 6, 30), |t| t.vigente_desde).unwrap();
        assert_eq!(elegido.tasa_bp, 300);
        // exactamente en la fecha de vigencia aplica el renglón nuevo
        let elegido = vigente_en(&tasas, fecha(2025, 1, 1), |t| t.vigente_desde).unwrap();
        assert_eq!(elegido.tasa_bp, 400);
    }

    #[test]
    fn vigente_en_sin_renglon_anterior_devuelve_none() {
        let tasas = vec![TasaIsn {
            estado: "CMX".into(),
            tasa_bp: 300,
            vigente_desde: fecha(2022, 1, 1),
        }];
        assert!(vigente_en(&tasas, fecha(2021, 12, 31), |t| t.vigente_desde).is_none());
    }

    #[test]
    fn tabla_vacaciones_por_rangos() {
        let tabla = TablaVacaciones {
            vigente_desde: fecha(2023, 1, 1),
            renglones: vec![
                RenglonVacaciones { anios_servicio: 1, dias: 12 },
                RenglonVacaciones { anios_servicio: 2, dias: 14 },
                RenglonVacaciones { anios_servicio: 3, dias: 16 },
                RenglonVacaciones { anios_servicio: 4, dias: 18 },
                RenglonVacaciones { anios_servicio: 5, dias: 20 },
                RenglonVacaciones { anios_servicio: 6, dias: 22 },
                RenglonVacaciones { anios_servicio: 11, dias: 24 },
            ],
        };
        assert_eq!(tabla.dias_por_anios(0), 0);
        assert_eq!(tabla.dias_por_anios(1), 12);
        assert_eq!(tabla.dias_por_anios(5), 20);
        assert_eq!(tabla.dias_por_anios(8), 22);
        assert_eq!(tabla.dias_por_anios(11), 24);
        assert_eq!(tabla.dias_por_anios(14), 24);
    }
}
