// src/common/basis_points.rs

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::error::AppError;

// Toda la aritmética monetaria del motor ocurre sobre enteros en puntos base:
// 1 peso = 10 000 pb (centésimas de centavo). Las tasas usan la misma escala:
// 100% = 10 000 pb (centésimas de punto porcentual). `Decimal` aparece
// únicamente en las fronteras de API y base de datos.

/// Puntos base por peso (centésimas de centavo).
pub const ESCALA_MONTO: i64 = 10_000;

/// Puntos base equivalentes al 100% (centésimas de punto porcentual).
pub const ESCALA_TASA: i64 = 10_000;

/// Convierte una cadena decimal no negativa ("1234.56") a puntos base.
pub fn parse_monto_bp(texto: &str) -> Result<i64, AppError> {
    let decimal: Decimal = texto
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidAmount(texto.to_string()))?;
    if decimal.is_sign_negative() {
        return Err(AppError::InvalidAmount(texto.to_string()));
    }
    decimal_a_bp(decimal)
}

/// Convierte una cadena de porcentaje ("3.5" o "3.5%") a puntos base de tasa.
pub fn parse_tasa_bp(texto: &str) -> Result<i64, AppError> {
    let limpio = texto.trim().trim_end_matches('%').trim_end();
    let decimal: Decimal = limpio
        .parse()
        .map_err(|_| AppError::InvalidAmount(texto.to_string()))?;
    if decimal.is_sign_negative() {
        return Err(AppError::InvalidAmount(texto.to_string()));
    }
    // 1% = 100 pb
    let escalado = decimal
        .checked_mul(Decimal::from(100))
        .ok_or_else(|| AppError::InvalidAmount(texto.to_string()))?;
    escalado
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::InvalidAmount(texto.to_string()))
}

/// Convierte un `Decimal` en pesos a puntos base. Exacto hasta 4 decimales;
/// más allá se redondea a la centésima de centavo.
pub fn decimal_a_bp(monto: Decimal) -> Result<i64, AppError> {
    let escalado = monto
        .checked_mul(Decimal::from(ESCALA_MONTO))
        .ok_or_else(|| AppError::InvalidAmount(monto.to_string()))?;
    escalado
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::InvalidAmount(monto.to_string()))
}

/// Convierte puntos base a `Decimal` en pesos, para presentación.
pub fn bp_a_decimal(bp: i64) -> Decimal {
    Decimal::new(bp, 4)
}

/// Multiplica un monto por una tasa, ambos en puntos base, redondeando a la
/// mitad hacia arriba. El producto intermedio vive en i128 para que el tope
/// de SBC por 25 UMA anuales no desborde.
pub fn aplicar_tasa(monto_bp: i64, tasa_bp: i64) -> i64 {
    let producto = monto_bp as i128 * tasa_bp as i128;
    let mitad = ESCALA_TASA as i128 / 2;
    let redondeado = if producto >= 0 {
        (producto + mitad) / ESCALA_TASA as i128
    } else {
        (producto - mitad) / ESCALA_TASA as i128
    };
    redondeado as i64
}

/// Redondea puntos base al centavo entero más cercano (100 pb), mitad hacia
/// arriba. Se usa sólo al fijar montos finales de presentación.
pub fn redondear_centavos(bp: i64) -> i64 {
    let resto = bp.rem_euclid(100);
    if resto >= 50 { bp - resto + 100 } else { bp - resto }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parsea_montos_validos() {
        assert_eq!(parse_monto_bp("0").unwrap(), 0);
        assert_eq!(parse_monto_bp("1").unwrap(), 10_000);
        assert_eq!(parse_monto_bp("1234.56").unwrap(), 12_345_600);
        assert_eq!(parse_monto_bp("  207.44 ").unwrap(), 2_074_400);
        assert_eq!(parse_monto_bp("0.0001").unwrap(), 1);
    }

    #[test]
    fn rechaza_montos_malformados() {
        for caso in ["", "abc", "12,5", "1.2.3", "-5", "-0.01"] {
            match parse_monto_bp(caso) {
                Err(AppError::InvalidAmount(_)) => {}
                otro => panic!("se esperaba InvalidAmount para {caso:?}, se obtuvo {otro:?}"),
            }
        }
    }

    #[test]
    fn parsea_tasas_con_y_sin_signo_de_porcentaje() {
        assert_eq!(parse_tasa_bp("3").unwrap(), 300);
        assert_eq!(parse_tasa_bp("3%").unwrap(), 300);
        assert_eq!(parse_tasa_bp("2.5 %").unwrap(), 250);
        assert_eq!(parse_tasa_bp("25").unwrap(), 2_500);
        assert_eq!(parse_tasa_bp("100").unwrap(), ESCALA_TASA);
        assert!(matches!(
            parse_tasa_bp("-1"),
            Err(AppError::InvalidAmount(_))
        ));
    }

    #[test]
    fn aplicar_tasa_redondea_a_la_mitad_hacia_arriba() {
        // 100.00 pesos al 16% = 16.00 pesos
        assert_eq!(aplicar_tasa(1_000_000, 1_600), 160_000);
        // 0.0001 pesos al 50%: 0.5 pb redondea a 1 pb
        assert_eq!(aplicar_tasa(1, 5_000), 1);
        // tasa cero
        assert_eq!(aplicar_tasa(1_000_000, 0), 0);
    }

    #[test]
    fn redondeo_a_centavos() {
        assert_eq!(redondear_centavos(12_345_649), 12_345_600);
        assert_eq!(redondear_centavos(12_345_650), 12_345_700);
        assert_eq!(redondear_centavos(0), 0);
    }

    proptest! {
        // Todo monto con dos decimales sobrevive el viaje redondo
        // Decimal -> puntos base -> Decimal sin perder valor.
        #[test]
        fn ida_y_vuelta_con_dos_decimales(centavos in 0i64..=10_000_000_000) {
            let original = Decimal::new(centavos, 2);
            let bp = decimal_a_bp(original).unwrap();
            prop_assert_eq!(bp_a_decimal(bp), original);
        }

        // aplicar_tasa nunca produce negativos sobre insumos no negativos y
        // es monótona en el monto.
        #[test]
        fn aplicar_tasa_monotona(
            monto_a in 0i64..=1_000_000_000_000,
            delta in 0i64..=1_000_000_000,
            tasa in 0i64..=ESCALA_TASA,
        ) {
            let chico = aplicar_tasa(monto_a, tasa);
            let grande = aplicar_tasa(monto_a + delta, tasa);
            prop_assert!(chico >= 0);
            prop_assert!(grande >= chico);
        }
    }
}
