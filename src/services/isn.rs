// src/services/isn.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::common::basis_points::aplicar_tasa;
use crate::common::error::AppError;
use crate::models::tablas::{vigente_en, TasaIsn};

/// Insumo por empleado para la agregación estatal: el estado ya viene
/// resuelto (o no) por `resolver_estado`.
#[derive(Debug, Clone)]
pub struct IsnEmpleadoInput {
    pub empleado_id: Uuid,
    pub estado: Option<String>,
    pub base_gravable_bp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsnEstado {
    pub base_gravable_bp: i64,
    pub tasa_bp: i64,
    pub impuesto_bp: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ReporteIsn {
    /// Desglose por estado resuelto, ordenado por clave.
    pub por_estado: BTreeMap<String, IsnEstado>,
    /// Empleados sin estado resoluble: se reportan, no se omiten ni se les
    /// asigna tasa alguna.
    pub sin_jurisdiccion: Vec<(Uuid, i64)>,
    /// Suma de impuesto de los estados resueltos.
    pub total_bp: i64,
}

/// Estado aplicable para ISN: el del centro de trabajo si existe, si no el
/// estado por omisión de la empresa.
pub fn resolver_estado(
    estado_centro: Option<&str>,
    estado_default_empresa: Option<&str>,
) -> Option<String> {
    estado_centro
        .or(estado_default_empresa)
        .map(|e| e.to_string())
}

/// Tasa vigente de un estado a la fecha dada. Las tasas deben venir
/// ordenadas por `vigente_desde` ascendente.
pub fn tasa_vigente(tasas: &[TasaIsn], estado: &str, fecha: NaiveDate) -> Result<i64, AppError> {
    let del_estado: Vec<&TasaIsn> = tasas.iter().filter(|t| t.estado == estado).collect();
    vigente_en(&del_estado, fecha, |t| t.vigente_desde)
        .map(|t| t.tasa_bp)
        .ok_or(AppError::MissingRateTable {
            tabla: "tasas_isn",
            fecha,
        })
}

/// ISN de un solo empleado; sin estado resoluble el error es explícito.
pub fn isn_empleado(
    empleado_id: Uuid,
    estado: Option<&str>,
    base_gravable_bp: i64,
    tasas: &[TasaIsn],
    fecha: NaiveDate,
) -> Result<i64, AppError> {
    let estado = estado.ok_or(AppError::UnresolvedJurisdiction { empleado_id })?;
    let tasa = tasa_vigente(tasas, estado, fecha)?;
    Ok(aplicar_tasa(base_gravable_bp, tasa))
}

/// Agrupa la nómina gravable por estado resuelto y aplica a cada grupo su
/// tasa vigente. Un estado presente sin tasa configurada es fatal
/// (`MissingRateTable`); un empleado sin estado cae al bloque
/// `sin_jurisdiccion` del reporte.
pub fn agregar_isn(
    inputs: &[IsnEmpleadoInput],
    tasas: &[TasaIsn],
    fecha: NaiveDate,
) -> Result<ReporteIsn, AppError> {
    let mut bases: BTreeMap<String, i64> = BTreeMap::new();
    let mut reporte = ReporteIsn::default();

    for input in inputs {
        match &input.estado {
            Some(estado) => {
                *bases.entry(estado.clone()).or_insert(0) += input.base_gravable_bp;
            }
            None => {
                reporte
                    .sin_jurisdiccion
                    .push((input.empleado_id, input.base_gravable_bp));
            }
        }
    }

    for (estado, base_bp) in bases {
        let tasa_bp = tasa_vigente(tasas, &estado, fecha)?;
        let impuesto_bp = aplicar_tasa(base_bp, tasa_bp);
        reporte.total_bp += impuesto_bp;
        reporte.por_estado.insert(
            estado,
            IsnEstado {
                base_gravable_bp: base_bp,
                tasa_bp,
                impuesto_bp,
            },
        );
    }

    Ok(reporte)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fecha(anio: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(anio, mes, dia).unwrap()
    }

    fn tasas() -> Vec<TasaIsn> {
        vec![
            TasaIsn { estado: "DF".into(), tasa_bp: 300, vigente_desde: fecha(2022, 1, 1) },
            TasaIsn { estado: "JC".into(), tasa_bp: 200, vigente_desde: fecha(2020, 1, 1) },
            TasaIsn { estado: "JC".into(), tasa_bp: 250, vigente_desde: fecha(2023, 1, 1) },
        ]
    }

    #[test]
    fn el_centro_de_trabajo_manda_sobre_el_default() {
        assert_eq!(resolver_estado(Some("JC"), Some("DF")).as_deref(), Some("JC"));
        assert_eq!(resolver_estado(None, Some("DF")).as_deref(), Some("DF"));
        assert_eq!(resolver_estado(None, None), None);
    }

    #[test]
    fn tasa_vigente_elige_por_fecha() {
        assert_eq!(tasa_vigente(&tasas(), "JC", fecha(2022, 6, 1)).unwrap(), 200);
        assert_eq!(tasa_vigente(&tasas(), "JC", fecha(2023, 1, 1)).unwrap(), 250);
        assert!(matches!(
            tasa_vigente(&tasas(), "DF", fecha(2021, 12, 31)),
            Err(AppError::MissingRateTable { .. })
        ));
    }

    #[test]
    fn agrega_por_estado_con_totales_correctos() {
        // DF: 100,000.00 al 3% = 3,000.00; JC: 50,000.00 al 2.5% = 1,250.00
        let inputs = vec![
            IsnEmpleadoInput {
                empleado_id: Uuid::new_v4(),
                estado: Some("DF".into()),
                base_gravable_bp: 1_000_000_000,
            },
            IsnEmpleadoInput {
                empleado_id: Uuid::new_v4(),
                estado: Some("JC".into()),
                base_gravable_bp: 500_000_000,
            },
        ];
        let reporte = agregar_isn(&inputs, &tasas(), fecha(2026, 1, 31)).unwrap();
        assert_eq!(reporte.por_estado["DF"].impuesto_bp, 30_000_000);
        assert_eq!(reporte.por_estado["JC"].impuesto_bp, 12_500_000);
        assert_eq!(reporte.total_bp, 42_500_000);
        assert!(reporte.sin_jurisdiccion.is_empty());
    }

    #[test]
    fn varios_empleados_del_mismo_estado_suman_su_base() {
        let inputs: Vec<IsnEmpleadoInput> = (0..3)
            .map(|_| IsnEmpleadoInput {
                empleado_id: Uuid::new_v4(),
                estado: Some("DF".into()),
                base_gravable_bp: 100_000_000,
            })
            .collect();
        let reporte = agregar_isn(&inputs, &tasas(), fecha(2026, 1, 31)).unwrap();
        assert_eq!(reporte.por_estado["DF"].base_gravable_bp, 300_000_000);
        assert_eq!(reporte.por_estado["DF"].impuesto_bp, 9_000_000);
    }

    #[test]
    fn sin_estado_cae_al_bloque_explicito() {
        let sin_centro = Uuid::new_v4();
        let inputs = vec![IsnEmpleadoInput {
            empleado_id: sin_centro,
            estado: None,
            base_gravable_bp: 700_000_000,
        }];
        let reporte = agregar_isn(&inputs, &tasas(), fecha(2026, 1, 31)).unwrap();
        assert!(reporte.por_estado.is_empty());
        assert_eq!(reporte.total_bp, 0);
        assert_eq!(reporte.sin_jurisdiccion, vec![(sin_centro, 700_000_000)]);
    }

    #[test]
    fn estado_sin_tasa_configurada_es_fatal() {
        let inputs = vec![IsnEmpleadoInput {
            empleado_id: Uuid::new_v4(),
            estado: Some("NL".into()),
            base_gravable_bp: 100_000_000,
        }];
        assert!(matches!(
            agregar_isn(&inputs, &tasas(), fecha(2026, 1, 31)),
            Err(AppError::MissingRateTable { .. })
        ));
    }

    #[test]
    fn isn_de_un_empleado_sin_estado_es_error() {
        let id = Uuid::new_v4();
        match isn_empleado(id, None, 100, &tasas(), fecha(2026, 1, 1)) {
            Err(AppError::UnresolvedJurisdiction { empleado_id }) => {
                assert_eq!(empleado_id, id)
            }
            otro => panic!("se esperaba UnresolvedJurisdiction, se obtuvo {otro:?}"),
        }
    }
}
