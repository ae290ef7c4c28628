// src/services/kardex.rs
//
// Núcleo puro del kardex de vacaciones: todas las reglas de saldo, consumo
// FIFO y prescripción operan sobre los renglones del libro mayor en memoria.
// La capa de servicio sólo carga renglones bajo candado, pide aquí el plan y
// persiste el resultado; así el saldo nunca se "desliza" por ediciones
// directas al campo cacheado.

use chrono::{Months, NaiveDate};
use uuid::Uuid;

use crate::common::basis_points::{aplicar_tasa, ESCALA_TASA};
use crate::common::error::AppError;
use crate::models::vacaciones::{MovimientoKardex, TipoMovimientoKardex};

/// El patrón cuenta con seis meses tras el aniversario para conceder los
/// días (LFT art. 81); los días se vuelven exigibles al vencer ese plazo.
pub const MESES_PARA_EXIGIBLE: u32 = 6;

/// La acción para reclamarlos prescribe un año después de ser exigibles
/// (LFT art. 516): dieciocho meses desde el otorgamiento.
pub const MESES_PRESCRIPCION: u32 = 12;

/// Prima vacacional mínima de ley: 25% (LFT art. 80).
pub const PRIMA_VACACIONAL_MINIMA_BP: i64 = 2_500;

pub fn fecha_exigible(fecha_otorgamiento: NaiveDate) -> NaiveDate {
    fecha_otorgamiento + Months::new(MESES_PARA_EXIGIBLE)
}

pub fn fecha_caducidad(fecha_otorgamiento: NaiveDate) -> NaiveDate {
    fecha_exigible(fecha_otorgamiento) + Months::new(MESES_PRESCRIPCION)
}

/// Estado reconstruido de un otorgamiento a partir de sus renglones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstadoOtorgamiento {
    pub otorgamiento_id: Uuid,
    pub fecha: NaiveDate,
    pub otorgados: i64,
    pub consumidos: i64,
    pub caducados: i64,
}

impl EstadoOtorgamiento {
    pub fn restante(&self) -> i64 {
        self.otorgados - self.consumidos - self.caducados
    }

    pub fn prescrito(&self, hoy: NaiveDate) -> bool {
        hoy >= fecha_caducidad(self.fecha)
    }
}

/// Consumo o caducidad a aplicar contra un otorgamiento específico.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AplicacionDias {
    pub otorgamiento_id: Uuid,
    pub dias: i64,
}

/// Reconstruye el estado de cada otorgamiento, en orden de fecha (FIFO).
pub fn estados_por_otorgamiento(kardex: &[MovimientoKardex]) -> Vec<EstadoOtorgamiento> {
    let mut estados: Vec<EstadoOtorgamiento> = kardex
        .iter()
        .filter(|m| m.tipo == TipoMovimientoKardex::Otorgamiento)
        .map(|m| EstadoOtorgamiento {
            otorgamiento_id: m.id,
            fecha: m.fecha,
            otorgados: m.dias,
            consumidos: 0,
            caducados: 0,
        })
        .collect();
    estados.sort_by_key(|e| (e.fecha, e.otorgamiento_id));

    for movimiento in kardex {
        let Some(referencia) = movimiento.otorgamiento_id else {
            continue;
        };
        if let Some(estado) = estados
            .iter_mut()
            .find(|e| e.otorgamiento_id == referencia)
        {
            match movimiento.tipo {
                TipoMovimientoKardex::Consumo => estado.consumidos += movimiento.dias,
                TipoMovimientoKardex::Caducidad => estado.caducados += movimiento.dias,
                TipoMovimientoKardex::Otorgamiento => {}
            }
        }
    }
    estados
}

/// Identidad contable del libro mayor:
/// saldo = otorgamientos - consumos - caducidades, nunca negativo.
pub fn saldo_contable(kardex: &[MovimientoKardex]) -> i64 {
    let saldo: i64 = kardex
        .iter()
        .map(|m| match m.tipo {
            TipoMovimientoKardex::Otorgamiento => m.dias,
            TipoMovimientoKardex::Consumo | TipoMovimientoKardex::Caducidad => -m.dias,
        })
        .sum();
    saldo.max(0)
}

/// Días realmente solicitables hoy: el remanente de otorgamientos vigentes.
/// Un otorgamiento más viejo que la ventana de prescripción no cuenta como
/// disponible aunque el barrido de caducidad aún no lo haya tocado.
pub fn saldo_disponible(kardex: &[MovimientoKardex], hoy: NaiveDate) -> i64 {
    estados_por_otorgamiento(kardex)
        .iter()
        .filter(|e| !e.prescrito(hoy))
        .map(|e| e.restante().max(0))
        .sum()
}

pub fn dias_usados(kardex: &[MovimientoKardex]) -> i64 {
    kardex
        .iter()
        .filter(|m| m.tipo == TipoMovimientoKardex::Consumo)
        .map(|m| m.dias)
        .sum()
}

/// Plan de consumo FIFO: descuenta del otorgamiento vigente más antiguo con
/// remanente, partiéndolo si la solicitud sólo lo consume en parte.
pub fn plan_consumo(
    kardex: &[MovimientoKardex],
    dias_solicitados: i64,
    fecha: NaiveDate,
) -> Result<Vec<AplicacionDias>, AppError> {
    let disponibles = saldo_disponible(kardex, fecha);
    if dias_solicitados > disponibles {
        return Err(AppError::InsufficientBalance {
            solicitados: dias_solicitados,
            disponibles,
        });
    }

    let mut plan = Vec::new();
    let mut faltan = dias_solicitados;
    for estado in estados_por_otorgamiento(kardex) {
        if faltan == 0 {
            break;
        }
        if estado.prescrito(fecha) || estado.restante() <= 0 {
            continue;
        }
        let tomar = estado.restante().min(faltan);
        plan.push(AplicacionDias {
            otorgamiento_id: estado.otorgamiento_id,
            dias: tomar,
        });
        faltan -= tomar;
    }
    Ok(plan)
}

/// Plan de caducidad: el remanente de cada otorgamiento ya prescrito.
/// Idempotente: tras aplicarlo, una segunda corrida no planea nada.
pub fn plan_caducidad(kardex: &[MovimientoKardex], hoy: NaiveDate) -> Vec<AplicacionDias> {
    estados_por_otorgamiento(kardex)
        .iter()
        .filter(|e| e.prescrito(hoy) && e.restante() > 0)
        .map(|e| AplicacionDias {
            otorgamiento_id: e.otorgamiento_id,
            dias: e.restante(),
        })
        .collect()
}

/// Prima vacacional: días × salario diario × porcentaje, nunca por debajo
/// del 25% de ley aunque el esquema configure menos.
pub fn prima_vacacional(dias: i64, salario_diario_bp: i64, porcentaje_bp: i64) -> i64 {
    let porcentaje = porcentaje_bp.max(PRIMA_VACACIONAL_MINIMA_BP).min(ESCALA_TASA);
    aplicar_tasa(dias * salario_diario_bp, porcentaje)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn fecha(anio: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(anio, mes, dia).unwrap()
    }

    fn otorgamiento(dias: i64, en: NaiveDate) -> MovimientoKardex {
        MovimientoKardex {
            id: Uuid::new_v4(),
            empleado_id: Uuid::nil(),
            tipo: TipoMovimientoKardex::Otorgamiento,
            dias,
            fecha: en,
            anio_aniversario: Some(en.year()),
            otorgamiento_id: None,
            solicitud_id: None,
            created_at: None,
        }
    }

    fn aplicar(kardex: &mut Vec<MovimientoKardex>, tipo: TipoMovimientoKardex, plan: &[AplicacionDias], en: NaiveDate) {
        for aplicacion in plan {
            kardex.push(MovimientoKardex {
                id: Uuid::new_v4(),
                empleado_id: Uuid::nil(),
                tipo,
                dias: aplicacion.dias,
                fecha: en,
                anio_aniversario: None,
                otorgamiento_id: Some(aplicacion.otorgamiento_id),
                solicitud_id: None,
                created_at: None,
            });
        }
    }

    fn consumir(kardex: &mut Vec<MovimientoKardex>, dias: i64, en: NaiveDate) -> Result<(), AppError> {
        let plan = plan_consumo(kardex, dias, en)?;
        aplicar(kardex, TipoMovimientoKardex::Consumo, &plan, en);
        Ok(())
    }

    #[test]
    fn fechas_de_exigibilidad_y_prescripcion() {
        let otorgado = fecha(2024, 3, 1);
        assert_eq!(fecha_exigible(otorgado), fecha(2024, 9, 1));
        assert_eq!(fecha_caducidad(otorgado), fecha(2025, 9, 1));
    }

    #[test]
    fn otorgar_12_consumir_5_y_7_deja_cero_y_el_siguiente_falla() {
        let mut kardex = vec![otorgamiento(12, fecha(2025, 3, 1))];
        let hoy = fecha(2025, 4, 1);

        consumir(&mut kardex, 5, hoy).unwrap();
        consumir(&mut kardex, 7, hoy).unwrap();
        assert_eq!(saldo_disponible(&kardex, hoy), 0);
        assert_eq!(saldo_contable(&kardex), 0);

        match consumir(&mut kardex, 1, hoy) {
            Err(AppError::InsufficientBalance { solicitados, disponibles }) => {
                assert_eq!(solicitados, 1);
                assert_eq!(disponibles, 0);
            }
            otro => panic!("se esperaba InsufficientBalance, se obtuvo {otro:?}"),
        }
    }

    #[test]
    fn el_consumo_es_fifo_y_parte_otorgamientos() {
        let viejo = otorgamiento(12, fecha(2024, 6, 1));
        let nuevo = otorgamiento(14, fecha(2025, 6, 1));
        let viejo_id = viejo.id;
        let nuevo_id = nuevo.id;
        let kardex = vec![nuevo, viejo]; // desordenados a propósito

        let plan = plan_consumo(&kardex, 15, fecha(2025, 7, 1)).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], AplicacionDias { otorgamiento_id: viejo_id, dias: 12 });
        assert_eq!(plan[1], AplicacionDias { otorgamiento_id: nuevo_id, dias: 3 });
    }

    #[test]
    fn los_otorgamientos_prescritos_no_estan_disponibles() {
        // otorgado el 1/ene/2023: caduca el 1/jul/2024
        let kardex = vec![
            otorgamiento(12, fecha(2023, 1, 1)),
            otorgamiento(14, fecha(2024, 1, 1)),
        ];
        assert_eq!(saldo_disponible(&kardex, fecha(2024, 6, 30)), 26);
        assert_eq!(saldo_disponible(&kardex, fecha(2024, 7, 1)), 14);
        // la identidad contable no cambia hasta que corra el barrido
        assert_eq!(saldo_contable(&kardex), 26);
    }

    #[test]
    fn el_barrido_de_caducidad_es_idempotente() {
        let mut kardex = vec![
            otorgamiento(12, fecha(2023, 1, 1)),
            otorgamiento(14, fecha(2024, 1, 1)),
        ];
        let hoy = fecha(2024, 8, 1);
        consumir(&mut kardex, 4, hoy).unwrap(); // consume del otorgamiento vigente

        let primera = plan_caducidad(&kardex, hoy);
        assert_eq!(primera.len(), 1);
        assert_eq!(primera[0].dias, 12);
        aplicar(&mut kardex, TipoMovimientoKardex::Caducidad, &primera, hoy);

        let saldo_tras_barrido = saldo_contable(&kardex);
        let segunda = plan_caducidad(&kardex, hoy);
        assert!(segunda.is_empty());
        aplicar(&mut kardex, TipoMovimientoKardex::Caducidad, &segunda, hoy);
        assert_eq!(saldo_contable(&kardex), saldo_tras_barrido);
        assert_eq!(saldo_disponible(&kardex, hoy), 10);
    }

    #[test]
    fn consumo_parcial_luego_caducidad_solo_barre_el_remanente() {
        let mut kardex = vec![otorgamiento(12, fecha(2023, 1, 1))];
        consumir(&mut kardex, 5, fecha(2023, 8, 1)).unwrap();

        let plan = plan_caducidad(&kardex, fecha(2024, 7, 1));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].dias, 7);
    }

    #[test]
    fn dias_usados_solo_cuenta_consumos() {
        let mut kardex = vec![otorgamiento(12, fecha(2023, 1, 1))];
        consumir(&mut kardex, 5, fecha(2023, 8, 1)).unwrap();
        aplicar(
            &mut kardex,
            TipoMovimientoKardex::Caducidad,
            &plan_caducidad(&kardex, fecha(2024, 7, 1)),
            fecha(2024, 7, 1),
        );
        assert_eq!(dias_usados(&kardex), 5);
    }

    #[test]
    fn prima_vacacional_respeta_el_minimo_legal() {
        // 10 días a 600.00 diarios: base 6,000.00; al 25% = 1,500.00
        let base_dias = 10;
        let salario = 6_000_000;
        assert_eq!(prima_vacacional(base_dias, salario, 0), 15_000_000);
        assert_eq!(prima_vacacional(base_dias, salario, 2_500), 15_000_000);
        // esquema con 30% paga más
        assert_eq!(prima_vacacional(base_dias, salario, 3_000), 18_000_000);
    }
}
