// src/services/imss.rs

use crate::common::basis_points::aplicar_tasa;
use crate::models::tablas::{BaseCotizacion, ConfigImss};

/// Cuota de un ramo, ya separada en parte patronal y obrera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuotaRamo {
    pub clave: String,
    pub patron_bp: i64,
    pub obrero_bp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CuotasImss {
    /// Costo patronal total del periodo.
    pub patron_bp: i64,
    /// Deducción al trabajador del periodo.
    pub obrero_bp: i64,
    pub ramos: Vec<CuotaRamo>,
    /// SBC diario ya topado que se usó para cotizar.
    pub sbc_topado_bp: i64,
}

/// Cuotas obrero-patronales del periodo: el SBC diario se topa a los
/// múltiplos de UMA configurados y cada ramo cotiza sobre su propia base
/// (UMA para la cuota fija, el excedente de tres UMA, o el SBC completo),
/// multiplicada por los días del periodo.
pub fn calcular_cuotas(sbc_diario_bp: i64, dias: i64, config: &ConfigImss) -> CuotasImss {
    let parametros = &config.parametros;
    let uma = parametros.uma_diaria_bp;
    let tope = uma * parametros.tope_sbc_umas as i64;
    let sbc_topado = sbc_diario_bp.min(tope);
    let umbral_excedente = uma * parametros.umbral_excedente_umas as i64;

    let mut cuotas = CuotasImss {
        sbc_topado_bp: sbc_topado,
        ..Default::default()
    };

    for ramo in &config.ramos {
        let base_diaria = match ramo.base {
            BaseCotizacion::CuotaFija => uma,
            BaseCotizacion::Excedente => (sbc_topado - umbral_excedente).max(0),
            BaseCotizacion::SalarioBase => sbc_topado,
        };
        let base_periodo = base_diaria * dias;
        let patron = aplicar_tasa(base_periodo, ramo.tasa_patron_bp);
        let obrero = aplicar_tasa(base_periodo, ramo.tasa_obrero_bp);
        cuotas.patron_bp += patron;
        cuotas.obrero_bp += obrero;
        cuotas.ramos.push(CuotaRamo {
            clave: ramo.clave.clone(),
            patron_bp: patron,
            obrero_bp: obrero,
        });
    }

    cuotas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tablas::{ParametrosFiscales, RamoImss};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use uuid::Uuid;

    // UMA 2025: 113.14 diarios. Tasas vigentes de la LSS.
    fn config() -> ConfigImss {
        let ramo = |clave: &str, base, patron, obrero| RamoImss {
            clave: clave.to_string(),
            base,
            tasa_patron_bp: patron,
            tasa_obrero_bp: obrero,
        };
        ConfigImss {
            parametros: ParametrosFiscales {
                id: Uuid::nil(),
                vigente_desde: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                uma_diaria_bp: 1_131_400,
                salario_minimo_diario_bp: 2_788_000,
                tope_sbc_umas: 25,
                umbral_excedente_umas: 3,
            },
            ramos: vec![
                ramo("EYM_CUOTA_FIJA", BaseCotizacion::CuotaFija, 2_040, 0),
                ramo("EYM_EXCEDENTE", BaseCotizacion::Excedente, 110, 40),
                ramo("EYM_PRESTACIONES_DINERO", BaseCotizacion::SalarioBase, 70, 25),
                ramo("EYM_GASTOS_MEDICOS", BaseCotizacion::SalarioBase, 105, 38),
                ramo("INVALIDEZ_VIDA", BaseCotizacion::SalarioBase, 175, 63),
                ramo("GUARDERIAS", BaseCotizacion::SalarioBase, 100, 0),
                ramo("RETIRO", BaseCotizacion::SalarioBase, 200, 0),
                ramo("CESANTIA_VEJEZ", BaseCotizacion::SalarioBase, 315, 113),
                ramo("INFONAVIT", BaseCotizacion::SalarioBase, 500, 0),
                ramo("RIESGO_TRABAJO", BaseCotizacion::SalarioBase, 54, 0),
            ],
        }
    }

    #[test]
    fn sbc_se_topa_a_25_umas() {
        let cfg = config();
        let tope = cfg.parametros.uma_diaria_bp * 25;
        let cuotas = calcular_cuotas(tope * 10, 15, &cfg);
        assert_eq!(cuotas.sbc_topado_bp, tope);
        // mismas cuotas que cotizar exactamente en el tope
        let en_tope = calcular_cuotas(tope, 15, &cfg);
        assert_eq!(cuotas.patron_bp, en_tope.patron_bp);
        assert_eq!(cuotas.obrero_bp, en_tope.obrero_bp);
    }

    #[test]
    fn excedente_no_cotiza_bajo_tres_umas() {
        let cfg = config();
        let sbc = cfg.parametros.uma_diaria_bp * 2;
        let cuotas = calcular_cuotas(sbc, 30, &cfg);
        let excedente = cuotas
            .ramos
            .iter()
            .find(|r| r.clave == "EYM_EXCEDENTE")
            .unwrap();
        assert_eq!(excedente.patron_bp, 0);
        assert_eq!(excedente.obrero_bp, 0);
    }

    #[test]
    fn cuota_fija_cotiza_sobre_uma_no_sobre_sbc() {
        let cfg = config();
        let chica = calcular_cuotas(cfg.parametros.uma_diaria_bp, 30, &cfg);
        let grande = calcular_cuotas(cfg.parametros.uma_diaria_bp * 10, 30, &cfg);
        let fija = |c: &CuotasImss| {
            c.ramos
                .iter()
                .find(|r| r.clave == "EYM_CUOTA_FIJA")
                .unwrap()
                .patron_bp
        };
        assert_eq!(fija(&chica), fija(&grande));
    }

    #[test]
    fn desglose_por_ramo_suma_los_totales() {
        let cfg = config();
        let cuotas = calcular_cuotas(5_000_000, 15, &cfg);
        let patron: i64 = cuotas.ramos.iter().map(|r| r.patron_bp).sum();
        let obrero: i64 = cuotas.ramos.iter().map(|r| r.obrero_bp).sum();
        assert_eq!(patron, cuotas.patron_bp);
        assert_eq!(obrero, cuotas.obrero_bp);
    }

    proptest! {
        // Con la tabla de tasas vigente, el costo patronal domina a la
        // deducción del trabajador para cualquier SBC realista.
        #[test]
        fn patron_mayor_o_igual_que_obrero(
            sbc in 0i64..=50_000_000,
            dias in 1i64..=31,
        ) {
            let cuotas = calcular_cuotas(sbc, dias, &config());
            prop_assert!(cuotas.patron_bp >= cuotas.obrero_bp);
            prop_assert!(cuotas.obrero_bp >= 0);
        }
    }
}
