// src/services/legal_service.rs

use chrono::{Datelike, NaiveDate};
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EmpleadosRepository, LegalRepository, TablasRepository, VacacionesRepository},
    models::empleado::Empleado,
    models::legal::{CasoLegal, Liquidacion, TipoTerminacion},
    services::kardex,
};

/// Antigüedad mínima para que la renuncia genere prima de antigüedad
/// (LFT art. 162 fracción III).
const ANIOS_PRIMA_EN_RENUNCIA: i32 = 15;

/// Insumos ya resueltos para la simulación; el cálculo en sí es puro.
#[derive(Debug, Clone)]
pub struct InsumosLiquidacion {
    pub tipo: TipoTerminacion,
    pub fecha_baja: NaiveDate,
    pub anios_cumplidos: i32,
    pub salario_diario_bp: i64,
    pub sdi_bp: i64,
    pub salario_minimo_diario_bp: i64,
    pub aguinaldo_dias: i32,
    pub dias_vacaciones_pendientes: i64,
    pub prima_vacacional_bp: i64,
}

/// Liquidación conforme a LFT: el finiquito (aguinaldo proporcional,
/// vacaciones pendientes y su prima) se paga siempre; la indemnización de
/// tres meses y veinte días por año sólo en despido injustificado; la prima
/// de antigüedad (doce días por año, salario topado a dos mínimos) en ambos
/// despidos y en renuncia con quince años cumplidos.
pub fn simular_liquidacion(insumos: &InsumosLiquidacion) -> Liquidacion {
    let mut liquidacion = Liquidacion::default();
    let anios = insumos.anios_cumplidos as i64;

    // finiquito: proporcional del aguinaldo por los días corridos del año
    let inicio_anio = NaiveDate::from_ymd_opt(insumos.fecha_baja.year(), 1, 1)
        .unwrap_or(insumos.fecha_baja);
    let dias_del_anio = (insumos.fecha_baja - inicio_anio).num_days() + 1;
    liquidacion.aguinaldo_proporcional_bp =
        insumos.salario_diario_bp * insumos.aguinaldo_dias as i64 * dias_del_anio / 365;

    liquidacion.vacaciones_pendientes_bp =
        insumos.dias_vacaciones_pendientes * insumos.salario_diario_bp;
    liquidacion.prima_vacacional_bp = kardex::prima_vacacional(
        insumos.dias_vacaciones_pendientes,
        insumos.salario_diario_bp,
        insumos.prima_vacacional_bp,
    );

    if insumos.tipo == TipoTerminacion::DespidoInjustificado {
        liquidacion.tres_meses_bp = insumos.sdi_bp * 90;
        liquidacion.veinte_dias_por_anio_bp = insumos.sdi_bp * 20 * anios;
    }

    let con_prima_antiguedad = match insumos.tipo {
        TipoTerminacion::DespidoInjustificado | TipoTerminacion::DespidoJustificado => true,
        TipoTerminacion::Renuncia => insumos.anios_cumplidos >= ANIOS_PRIMA_EN_RENUNCIA,
    };
    if con_prima_antiguedad {
        // salario topado al doble del mínimo (LFT art. 486)
        let tope = insumos.salario_minimo_diario_bp * 2;
        let salario_prima = insumos.salario_diario_bp.min(tope);
        liquidacion.prima_antiguedad_bp = salario_prima * 12 * anios;
    }

    liquidacion
}

#[derive(Clone)]
pub struct LegalService {
    repo: LegalRepository,
    empleados: EmpleadosRepository,
    tablas: TablasRepository,
    vacaciones: VacacionesRepository,
}

impl LegalService {
    pub fn new(
        repo: LegalRepository,
        empleados: EmpleadosRepository,
        tablas: TablasRepository,
        vacaciones: VacacionesRepository,
    ) -> Self {
        Self {
            repo,
            empleados,
            tablas,
            vacaciones,
        }
    }

    /// Crea un caso de terminación con el estimado congelado al día de hoy.
    pub async fn crear_caso<'e, A>(
        &self,
        conexion: A,
        empleado_id: Uuid,
        tipo: TipoTerminacion,
        fecha_baja: NaiveDate,
    ) -> Result<CasoLegal, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let empleado = self
            .empleados
            .empleado_por_id(&mut *tx, empleado_id)
            .await?
            .ok_or(AppError::EmpleadoNotFound)?;

        let insumos = self
            .preparar_insumos(&mut *tx, &empleado, tipo, fecha_baja)
            .await?;
        let liquidacion = simular_liquidacion(&insumos);
        let desglose = serde_json::to_value(&liquidacion)
            .map_err(|e| AppError::InternalServerError(e.into()))?;

        let caso = self
            .repo
            .crear_caso(
                &mut *tx,
                empleado_id,
                tipo,
                fecha_baja,
                liquidacion.total_bp(),
                desglose,
            )
            .await?;

        tx.commit().await?;
        Ok(caso)
    }

    /// Sólo simula, sin persistir nada.
    pub async fn simular<'e, A>(
        &self,
        conexion: A,
        empleado_id: Uuid,
        tipo: TipoTerminacion,
        fecha_baja: NaiveDate,
    ) -> Result<Liquidacion, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let empleado = self
            .empleados
            .empleado_por_id(&mut *tx, empleado_id)
            .await?
            .ok_or(AppError::EmpleadoNotFound)?;
        let insumos = self
            .preparar_insumos(&mut *tx, &empleado, tipo, fecha_baja)
            .await?;

        tx.commit().await?;
        Ok(simular_liquidacion(&insumos))
    }

    async fn preparar_insumos(
        &self,
        tx: &mut sqlx::PgConnection,
        empleado: &Empleado,
        tipo: TipoTerminacion,
        fecha_baja: NaiveDate,
    ) -> Result<InsumosLiquidacion, AppError> {
        let parametros = self.tablas.config_imss(&mut *tx, fecha_baja).await?.parametros;

        let empresa = self
            .empleados
            .empresa_por_id(empleado.empresa_id)
            .await?
            .ok_or(AppError::EmpresaNotFound)?;

        let (aguinaldo_dias, prima_vacacional_bp) = match empleado.esquema_id {
            Some(esquema_id) => match self.empleados.esquema_por_id(&mut *tx, esquema_id).await? {
                Some(esquema) => (esquema.aguinaldo_dias, esquema.prima_vacacional_bp),
                None => (empresa.aguinaldo_dias, kardex::PRIMA_VACACIONAL_MINIMA_BP),
            },
            None => (empresa.aguinaldo_dias, kardex::PRIMA_VACACIONAL_MINIMA_BP),
        };

        let movimientos = self
            .vacaciones
            .kardex_por_empleado(&mut *tx, empleado.id)
            .await?;
        let dias_pendientes = kardex::saldo_disponible(&movimientos, fecha_baja);

        Ok(InsumosLiquidacion {
            tipo,
            fecha_baja,
            anios_cumplidos: empleado.anios_cumplidos(fecha_baja),
            salario_diario_bp: empleado.salario_diario_efectivo_bp()?,
            sdi_bp: empleado.sdi_efectivo_bp()?,
            salario_minimo_diario_bp: parametros.salario_minimo_diario_bp,
            aguinaldo_dias,
            dias_vacaciones_pendientes: dias_pendientes,
            prima_vacacional_bp,
        })
    }

    pub async fn casos_por_empresa(&self, empresa_id: Uuid) -> Result<Vec<CasoLegal>, AppError> {
        self.repo.casos_por_empresa(empresa_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insumos_base() -> InsumosLiquidacion {
        InsumosLiquidacion {
            tipo: TipoTerminacion::Renuncia,
            fecha_baja: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            anios_cumplidos: 4,
            salario_diario_bp: 6_000_000,        // 600.00 diarios
            sdi_bp: 6_300_000,                   // 630.00 integrado
            salario_minimo_diario_bp: 2_788_000, // 278.80
            aguinaldo_dias: 15,
            dias_vacaciones_pendientes: 6,
            prima_vacacional_bp: 2_500,
        }
    }

    #[test]
    fn renuncia_corta_solo_paga_finiquito() {
        let liquidacion = simular_liquidacion(&insumos_base());
        assert_eq!(liquidacion.tres_meses_bp, 0);
        assert_eq!(liquidacion.veinte_dias_por_anio_bp, 0);
        assert_eq!(liquidacion.prima_antiguedad_bp, 0);
        // 6 días pendientes a 600.00 = 3,600.00; prima 25% = 900.00
        assert_eq!(liquidacion.vacaciones_pendientes_bp, 36_000_000);
        assert_eq!(liquidacion.prima_vacacional_bp, 9_000_000);
        // aguinaldo proporcional al 30/jun (181 días): 15 × 600 × 181/365
        assert_eq!(
            liquidacion.aguinaldo_proporcional_bp,
            6_000_000i64 * 15 * 181 / 365
        );
    }

    #[test]
    fn renuncia_con_quince_anios_gana_prima_de_antiguedad() {
        let mut insumos = insumos_base();
        insumos.anios_cumplidos = 15;
        let liquidacion = simular_liquidacion(&insumos);
        // salario topado a 2 mínimos: 557.60 < 600.00
        let tope = insumos.salario_minimo_diario_bp * 2;
        assert_eq!(liquidacion.prima_antiguedad_bp, tope * 12 * 15);
    }

    #[test]
    fn despido_injustificado_suma_indemnizacion_constitucional() {
        let mut insumos = insumos_base();
        insumos.tipo = TipoTerminacion::DespidoInjustificado;
        let liquidacion = simular_liquidacion(&insumos);
        assert_eq!(liquidacion.tres_meses_bp, 6_300_000 * 90);
        assert_eq!(liquidacion.veinte_dias_por_anio_bp, 6_300_000 * 20 * 4);
        assert!(liquidacion.prima_antiguedad_bp > 0);
        assert_eq!(
            liquidacion.total_bp(),
            liquidacion.tres_meses_bp
                + liquidacion.veinte_dias_por_anio_bp
                + liquidacion.prima_antiguedad_bp
                + liquidacion.aguinaldo_proporcional_bp
                + liquidacion.vacaciones_pendientes_bp
                + liquidacion.prima_vacacional_bp
        );
    }

    #[test]
    fn despido_justificado_no_lleva_tres_meses_pero_si_prima() {
        let mut insumos = insumos_base();
        insumos.tipo = TipoTerminacion::DespidoJustificado;
        let liquidacion = simular_liquidacion(&insumos);
        assert_eq!(liquidacion.tres_meses_bp, 0);
        assert_eq!(liquidacion.veinte_dias_por_anio_bp, 0);
        assert_eq!(
            liquidacion.prima_antiguedad_bp,
            insumos.salario_minimo_diario_bp * 2 * 12 * 4
        );
    }

    #[test]
    fn salario_bajo_no_se_topa_en_la_prima() {
        let mut insumos = insumos_base();
        insumos.tipo = TipoTerminacion::DespidoJustificado;
        insumos.salario_diario_bp = 3_000_000; // 300.00, bajo el tope de 557.60
        let liquidacion = simular_liquidacion(&insumos);
        assert_eq!(liquidacion.prima_antiguedad_bp, 3_000_000 * 12 * 4);
    }
}
