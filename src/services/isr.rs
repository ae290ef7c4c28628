// src/services/isr.rs

use crate::common::basis_points::aplicar_tasa;
use crate::models::tablas::{TablaIsr, TablaSubsidio};

/// Resultado del cálculo de retención por empleado y periodo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalculoIsr {
    /// Impuesto según tarifa, antes de subsidio.
    pub isr_bp: i64,
    /// Subsidio para el empleo que corresponde al ingreso.
    pub subsidio_bp: i64,
    /// Lo efectivamente retenido: max(isr - subsidio, 0).
    pub retencion_bp: i64,
    /// Subsidio que excede al impuesto y se entrega al trabajador.
    pub subsidio_entregado_bp: i64,
}

/// ISR según la tarifa progresiva: se ubica el renglón de mayor límite
/// inferior <= ingreso y se aplica cuota fija + tasa marginal al excedente.
pub fn calcular_isr(ingreso_bp: i64, tabla: &TablaIsr) -> i64 {
    let corte = tabla
        .renglones
        .partition_point(|r| r.limite_inferior_bp <= ingreso_bp);
    if corte == 0 {
        // ingreso por debajo del primer límite: no hay impuesto
        return 0;
    }
    let renglon = &tabla.renglones[corte - 1];
    let excedente = ingreso_bp - renglon.limite_inferior_bp;
    renglon.cuota_fija_bp + aplicar_tasa(excedente, renglon.tasa_bp)
}

/// Subsidio para el empleo con la misma regla de selección de renglón.
pub fn calcular_subsidio(ingreso_bp: i64, tabla: &TablaSubsidio) -> i64 {
    let corte = tabla
        .renglones
        .partition_point(|r| r.limite_inferior_bp <= ingreso_bp);
    if corte == 0 {
        return 0;
    }
    tabla.renglones[corte - 1].subsidio_bp
}

pub fn calcular_retencion(
    ingreso_bp: i64,
    tabla_isr: &TablaIsr,
    tabla_subsidio: &TablaSubsidio,
) -> CalculoIsr {
    let isr_bp = calcular_isr(ingreso_bp, tabla_isr);
    let subsidio_bp = calcular_subsidio(ingreso_bp, tabla_subsidio);
    CalculoIsr {
        isr_bp,
        subsidio_bp,
        retencion_bp: (isr_bp - subsidio_bp).max(0),
        subsidio_entregado_bp: (subsidio_bp - isr_bp).max(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tablas::{Periodicidad, RenglonIsr, RenglonSubsidio};
    use proptest::prelude::*;

    // Tarifa mensual recortada con límites y tasas reales; la cuota fija se
    // acumula desde los tramos anteriores para que la tarifa sea continua.
    fn tabla_mensual() -> TablaIsr {
        let limites_y_tasas: [(i64, i64); 5] = [
            (100, 192),
            (7_460_500, 640),
            (63_320_600, 1_088),
            (111_280_200, 1_600),
            (129_358_300, 1_792),
        ];
        let mut renglones = Vec::new();
        let mut cuota = 0i64;
        let mut previo: Option<(i64, i64)> = None;
        for (limite, tasa) in limites_y_tasas {
            if let Some((limite_previo, tasa_previa)) = previo {
                cuota += aplicar_tasa(limite - limite_previo, tasa_previa);
            }
            renglones.push(RenglonIsr {
                limite_inferior_bp: limite,
                cuota_fija_bp: cuota,
                tasa_bp: tasa,
            });
            previo = Some((limite, tasa));
        }
        TablaIsr {
            ejercicio: 2025,
            periodicidad: Periodicidad::Mensual,
            renglones,
        }
    }

    fn tabla_subsidio() -> TablaSubsidio {
        TablaSubsidio {
            ejercicio: 2025,
            periodicidad: Periodicidad::Mensual,
            renglones: vec![
                RenglonSubsidio { limite_inferior_bp: 0, subsidio_bp: 4_759_000 },
                RenglonSubsidio { limite_inferior_bp: 101_710_100, subsidio_bp: 0 },
            ],
        }
    }

    #[test]
    fn ingreso_cero_no_causa_impuesto() {
        assert_eq!(calcular_isr(0, &tabla_mensual()), 0);
    }

    #[test]
    fn primer_tramo_aplica_solo_tasa_marginal() {
        // 500.00 pesos en el primer tramo: (5_000_000 - 100) * 1.92%
        let esperado = aplicar_tasa(5_000_000 - 100, 192);
        assert_eq!(calcular_isr(5_000_000, &tabla_mensual()), esperado);
    }

    #[test]
    fn tramo_intermedio_suma_cuota_fija() {
        // 18,500.00 pesos cae en el tramo que inicia en 6,332.06
        let tabla = tabla_mensual();
        let ingreso = 185_000_000;
        let renglon = &tabla.renglones[2];
        let esperado = renglon.cuota_fija_bp + aplicar_tasa(ingreso - renglon.limite_inferior_bp, renglon.tasa_bp);
        assert_eq!(calcular_isr(ingreso, &tabla), esperado);
    }

    #[test]
    fn limite_exacto_de_tramo_usa_ese_tramo() {
        let tabla = tabla_mensual();
        let renglon = &tabla.renglones[2];
        // sin excedente, el impuesto es exactamente la cuota fija del tramo
        assert_eq!(
            calcular_isr(renglon.limite_inferior_bp, &tabla),
            renglon.cuota_fija_bp
        );
    }

    #[test]
    fn subsidio_se_entrega_cuando_excede_al_impuesto() {
        let calculo = calcular_retencion(3_000_000, &tabla_mensual(), &tabla_subsidio());
        assert_eq!(calculo.retencion_bp, 0);
        assert!(calculo.subsidio_entregado_bp > 0);
        assert_eq!(
            calculo.subsidio_entregado_bp,
            calculo.subsidio_bp - calculo.isr_bp
        );
    }

    #[test]
    fn ingresos_altos_no_reciben_subsidio() {
        let calculo = calcular_retencion(150_000_000, &tabla_mensual(), &tabla_subsidio());
        assert_eq!(calculo.subsidio_bp, 0);
        assert_eq!(calculo.retencion_bp, calculo.isr_bp);
    }

    proptest! {
        // La retención es monótona no decreciente en el ingreso: a ingresos
        // mayores nunca corresponde menos impuesto.
        #[test]
        fn isr_monotono_en_el_ingreso(
            ingreso in 0i64..=500_000_000,
            delta in 0i64..=100_000_000,
        ) {
            let tabla = tabla_mensual();
            let menor = calcular_isr(ingreso, &tabla);
            let mayor = calcular_isr(ingreso + delta, &tabla);
            prop_assert!(menor >= 0);
            prop_assert!(mayor >= menor);
        }

        #[test]
        fn retencion_nunca_negativa(ingreso in 0i64..=500_000_000) {
            let calculo = calcular_retencion(ingreso, &tabla_mensual(), &tabla_subsidio());
            prop_assert!(calculo.retencion_bp >= 0);
            prop_assert!(calculo.subsidio_entregado_bp >= 0);
        }
    }
}
