// src/services/nomina_service.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::basis_points::{aplicar_tasa, bp_a_decimal, redondear_centavos},
    common::error::AppError,
    db::{EmpleadosRepository, NominaRepository, TablasRepository},
    models::empresa::Empresa,
    models::nomina::{
        CostoEmpleado, CostoIsnEstado, EstatusPeriodo, IsnSinJurisdiccion, OrigenReporte,
        PeriodoNomina, ReporteCostoNomina, ResumenNomina,
    },
    services::{imss, isn, isr, vacaciones_service::VacacionesService},
};

/// Insumos en vivo de un empleado para estimar el periodo abierto.
#[derive(Debug, Clone)]
pub struct EmpleadoCostoInput {
    pub empleado_id: Uuid,
    pub nombre: String,
    pub estado: Option<String>,
    pub base_gravable_bp: i64,
    pub sbc_diario_bp: i64,
    pub saldo_vacaciones_cacheado: i64,
}

/// El origen de los datos se resuelve una sola vez en esta frontera: un
/// periodo procesado se lee del resumen histórico tal cual; el periodo
/// abierto se estima en vivo con los mismos calculadores. Los calculadores
/// nunca preguntan por el estatus del periodo.
pub enum OrigenPeriodo {
    Cerrado(Vec<ResumenNomina>),
    Abierto(Vec<EmpleadoCostoInput>),
}

#[derive(Default)]
struct TotalesBp {
    base: i64,
    isr: i64,
    subsidio: i64,
    imss_obrero: i64,
    imss_patron: i64,
    isn: i64,
    neto: i64,
}

#[derive(Clone)]
pub struct NominaService {
    repo: NominaRepository,
    empleados: EmpleadosRepository,
    tablas: TablasRepository,
    vacaciones: VacacionesService,
}

impl NominaService {
    pub fn new(
        repo: NominaRepository,
        empleados: EmpleadosRepository,
        tablas: TablasRepository,
        vacaciones: VacacionesService,
    ) -> Self {
        Self {
            repo,
            empleados,
            tablas,
            vacaciones,
        }
    }

    /// Reporte de costos del periodo: histórico si ya se procesó, estimado en
    /// vivo si sigue abierto. Lectura pura; no persiste nada.
    pub async fn reporte_costos<'e, A>(
        &self,
        conexion: A,
        empresa_id: Uuid,
        periodo_id: Uuid,
        por_estado: bool,
    ) -> Result<ReporteCostoNomina, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let empresa = self
            .empleados
            .empresa_por_id(empresa_id)
            .await?
            .ok_or(AppError::EmpresaNotFound)?;
        let periodo = self
            .repo
            .periodo_por_id(&mut *tx, periodo_id)
            .await?
            .filter(|p| p.empresa_id == empresa_id)
            .ok_or(AppError::PeriodoNotFound)?;

        let origen = self.origen_periodo(&mut *tx, &empresa, &periodo).await?;
        let reporte = match origen {
            OrigenPeriodo::Cerrado(resumenes) => {
                self.reporte_historico(&mut *tx, &empresa, &periodo, resumenes, por_estado)
                    .await?
            }
            OrigenPeriodo::Abierto(insumos) => {
                self.reporte_estimado(&mut *tx, &empresa, &periodo, insumos, por_estado)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(reporte)
    }

    /// Cierra el periodo: congela un resumen por empleado y lo marca como
    /// procesado. Un empleado sin estado ISN resoluble o con saldo de
    /// vacaciones desviado aborta el cierre; la obligación fiscal no se
    /// congela con datos dudosos.
    pub async fn cerrar_periodo<'e, A>(
        &self,
        conexion: A,
        empresa_id: Uuid,
        periodo_id: Uuid,
    ) -> Result<PeriodoNomina, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let empresa = self
            .empleados
            .empresa_por_id(empresa_id)
            .await?
            .ok_or(AppError::EmpresaNotFound)?;
        let periodo = self
            .repo
            .periodo_por_id(&mut *tx, periodo_id)
            .await?
            .filter(|p| p.empresa_id == empresa_id)
            .ok_or(AppError::PeriodoNotFound)?;
        if periodo.estatus == EstatusPeriodo::Procesado {
            return Err(AppError::PeriodoYaProcesado);
        }

        let insumos = self.insumos_en_vivo(&mut *tx, &empresa, &periodo).await?;
        let tasas = self.tablas.tasas_isn(&mut *tx).await?;
        let tabla_isr = self
            .tablas
            .tabla_isr(&mut *tx, periodo.fecha_fin, periodo.periodicidad)
            .await?;
        let tabla_subsidio = self
            .tablas
            .tabla_subsidio(&mut *tx, periodo.fecha_fin, periodo.periodicidad)
            .await?;
        let config_imss = self.tablas.config_imss(&mut *tx, periodo.fecha_fin).await?;

        for insumo in &insumos {
            // el saldo cacheado debe coincidir con el kardex antes de congelar
            self.vacaciones
                .verificar_saldo(
                    &mut *tx,
                    insumo.empleado_id,
                    insumo.saldo_vacaciones_cacheado,
                    periodo.fecha_fin,
                )
                .await?;

            let isn_bp = isn::isn_empleado(
                insumo.empleado_id,
                insumo.estado.as_deref(),
                insumo.base_gravable_bp,
                &tasas,
                periodo.fecha_fin,
            )?;
            let calculo = isr::calcular_retencion(
                insumo.base_gravable_bp,
                &tabla_isr,
                &tabla_subsidio,
            );
            let cuotas =
                imss::calcular_cuotas(insumo.sbc_diario_bp, periodo.dias(), &config_imss);
            // el neto pagado se fija a centavos enteros
            let neto_bp = redondear_centavos(
                insumo.base_gravable_bp - calculo.retencion_bp
                    + calculo.subsidio_entregado_bp
                    - cuotas.obrero_bp,
            );

            let resumen = ResumenNomina {
                id: Uuid::nil(), // lo asigna la base de datos
                periodo_id,
                empleado_id: insumo.empleado_id,
                base_gravable_bp: insumo.base_gravable_bp,
                isr_bp: calculo.retencion_bp,
                subsidio_bp: calculo.subsidio_bp,
                imss_obrero_bp: cuotas.obrero_bp,
                imss_patron_bp: cuotas.patron_bp,
                isn_bp,
                neto_bp,
                estado_isn: insumo.estado.clone(),
                created_at: None,
            };
            self.repo.insertar_resumen(&mut *tx, &resumen).await?;
        }

        let procesado = self.repo.marcar_procesado(&mut *tx, periodo_id).await?;
        tx.commit().await?;

        tracing::info!(
            periodo_id = %periodo_id,
            empleados = insumos.len(),
            "periodo de nómina procesado"
        );
        Ok(procesado)
    }

    async fn origen_periodo(
        &self,
        tx: &mut PgConnection,
        empresa: &Empresa,
        periodo: &PeriodoNomina,
    ) -> Result<OrigenPeriodo, AppError> {
        match periodo.estatus {
            EstatusPeriodo::Procesado => {
                let resumenes = self.repo.resumenes_por_periodo(&mut *tx, periodo.id).await?;
                Ok(OrigenPeriodo::Cerrado(resumenes))
            }
            EstatusPeriodo::Abierto => {
                let insumos = self.insumos_en_vivo(tx, empresa, periodo).await?;
                Ok(OrigenPeriodo::Abierto(insumos))
            }
        }
    }

    async fn insumos_en_vivo(
        &self,
        tx: &mut PgConnection,
        empresa: &Empresa,
        periodo: &PeriodoNomina,
    ) -> Result<Vec<EmpleadoCostoInput>, AppError> {
        let empleados = self
            .empleados
            .empleados_activos(&mut *tx, empresa.id)
            .await?;
        let centros = self
            .empleados
            .centros_por_empresa(&mut *tx, empresa.id)
            .await?;
        let estado_por_centro: HashMap<Uuid, String> = centros
            .into_iter()
            .map(|c| (c.id, c.estado))
            .collect();

        let dias = periodo.dias();
        let mut insumos = Vec::with_capacity(empleados.len());
        for empleado in empleados {
            let estado_centro = empleado
                .centro_trabajo_id
                .and_then(|id| estado_por_centro.get(&id))
                .map(|e| e.as_str());
            let estado =
                isn::resolver_estado(estado_centro, empresa.estado_default.as_deref());
            let base_gravable_bp = empleado.salario_diario_efectivo_bp()? * dias;
            let sbc_diario_bp = empleado.sbc_efectivo_bp()?;
            insumos.push(EmpleadoCostoInput {
                empleado_id: empleado.id,
                nombre: empleado.nombre.clone(),
                estado,
                base_gravable_bp,
                sbc_diario_bp,
                saldo_vacaciones_cacheado: empleado.saldo_vacaciones_actual,
            });
        }
        Ok(insumos)
    }

    async fn reporte_historico(
        &self,
        tx: &mut PgConnection,
        empresa: &Empresa,
        periodo: &PeriodoNomina,
        resumenes: Vec<ResumenNomina>,
        por_estado: bool,
    ) -> Result<ReporteCostoNomina, AppError> {
        let nombres = self.nombres_por_empresa(tx, empresa.id).await?;

        let mut totales = TotalesBp::default();
        let mut por_estado_bp: HashMap<String, (i64, i64)> = HashMap::new();
        let mut sin_jurisdiccion = Vec::new();
        let mut empleados = Vec::with_capacity(resumenes.len());

        for resumen in &resumenes {
            totales.base += resumen.base_gravable_bp;
            totales.isr += resumen.isr_bp;
            totales.subsidio += resumen.subsidio_bp;
            totales.imss_obrero += resumen.imss_obrero_bp;
            totales.imss_patron += resumen.imss_patron_bp;
            totales.isn += resumen.isn_bp;
            totales.neto += resumen.neto_bp;

            match &resumen.estado_isn {
                Some(estado) => {
                    let acumulado = por_estado_bp.entry(estado.clone()).or_insert((0, 0));
                    acumulado.0 += resumen.base_gravable_bp;
                    acumulado.1 += resumen.isn_bp;
                }
                None => sin_jurisdiccion.push(IsnSinJurisdiccion {
                    empleado_id: resumen.empleado_id,
                    base_gravable: bp_a_decimal(resumen.base_gravable_bp),
                }),
            }

            empleados.push(CostoEmpleado {
                empleado_id: resumen.empleado_id,
                nombre: nombres.get(&resumen.empleado_id).cloned(),
                base_gravable: bp_a_decimal(resumen.base_gravable_bp),
                isr: bp_a_decimal(resumen.isr_bp),
                subsidio: bp_a_decimal(resumen.subsidio_bp),
                imss_obrero: bp_a_decimal(resumen.imss_obrero_bp),
                imss_patron: bp_a_decimal(resumen.imss_patron_bp),
                isn: bp_a_decimal(resumen.isn_bp),
                neto: bp_a_decimal(resumen.neto_bp),
                estado_isn: resumen.estado_isn.clone(),
            });
        }

        // la tasa reportada se deriva de lo congelado, no de la tabla actual
        let isn_por_estado = por_estado.then(|| {
            let mut desglose: Vec<CostoIsnEstado> = por_estado_bp
                .into_iter()
                .map(|(estado, (base_bp, impuesto_bp))| CostoIsnEstado {
                    estado,
                    base_gravable: bp_a_decimal(base_bp),
                    tasa: tasa_implicita(base_bp, impuesto_bp),
                    impuesto: bp_a_decimal(impuesto_bp),
                })
                .collect();
            desglose.sort_by(|a, b| a.estado.cmp(&b.estado));
            desglose
        });

        Ok(ensamblar_reporte(
            empresa.id,
            periodo.id,
            OrigenReporte::Historico,
            totales,
            empleados,
            isn_por_estado,
            sin_jurisdiccion,
        ))
    }

    async fn reporte_estimado(
        &self,
        tx: &mut PgConnection,
        empresa: &Empresa,
        periodo: &PeriodoNomina,
        insumos: Vec<EmpleadoCostoInput>,
        por_estado: bool,
    ) -> Result<ReporteCostoNomina, AppError> {
        let tabla_isr = self
            .tablas
            .tabla_isr(&mut *tx, periodo.fecha_fin, periodo.periodicidad)
            .await?;
        let tabla_subsidio = self
            .tablas
            .tabla_subsidio(&mut *tx, periodo.fecha_fin, periodo.periodicidad)
            .await?;
        let config_imss = self.tablas.config_imss(&mut *tx, periodo.fecha_fin).await?;
        let tasas = self.tablas.tasas_isn(&mut *tx).await?;

        let entradas_isn: Vec<isn::IsnEmpleadoInput> = insumos
            .iter()
            .map(|i| isn::IsnEmpleadoInput {
                empleado_id: i.empleado_id,
                estado: i.estado.clone(),
                base_gravable_bp: i.base_gravable_bp,
            })
            .collect();
        let reporte_isn = isn::agregar_isn(&entradas_isn, &tasas, periodo.fecha_fin)?;

        let mut totales = TotalesBp::default();
        let mut empleados = Vec::with_capacity(insumos.len());

        for insumo in &insumos {
            let calculo =
                isr::calcular_retencion(insumo.base_gravable_bp, &tabla_isr, &tabla_subsidio);
            let cuotas =
                imss::calcular_cuotas(insumo.sbc_diario_bp, periodo.dias(), &config_imss);
            let isn_bp = match insumo.estado.as_deref() {
                Some(estado) => {
                    let tasa = isn::tasa_vigente(&tasas, estado, periodo.fecha_fin)?;
                    aplicar_tasa(insumo.base_gravable_bp, tasa)
                }
                None => 0,
            };
            let neto_bp = redondear_centavos(
                insumo.base_gravable_bp - calculo.retencion_bp
                    + calculo.subsidio_entregado_bp
                    - cuotas.obrero_bp,
            );

            totales.base += insumo.base_gravable_bp;
            totales.isr += calculo.retencion_bp;
            totales.subsidio += calculo.subsidio_bp;
            totales.imss_obrero += cuotas.obrero_bp;
            totales.imss_patron += cuotas.patron_bp;
            totales.isn += isn_bp;
            totales.neto += neto_bp;

            empleados.push(CostoEmpleado {
                empleado_id: insumo.empleado_id,
                nombre: Some(insumo.nombre.clone()),
                base_gravable: bp_a_decimal(insumo.base_gravable_bp),
                isr: bp_a_decimal(calculo.retencion_bp),
                subsidio: bp_a_decimal(calculo.subsidio_bp),
                imss_obrero: bp_a_decimal(cuotas.obrero_bp),
                imss_patron: bp_a_decimal(cuotas.patron_bp),
                isn: bp_a_decimal(isn_bp),
                neto: bp_a_decimal(neto_bp),
                estado_isn: insumo.estado.clone(),
            });
        }

        let isn_por_estado = por_estado.then(|| {
            reporte_isn
                .por_estado
                .iter()
                .map(|(estado, detalle)| CostoIsnEstado {
                    estado: estado.clone(),
                    base_gravable: bp_a_decimal(detalle.base_gravable_bp),
                    tasa: Decimal::new(detalle.tasa_bp, 2),
                    impuesto: bp_a_decimal(detalle.impuesto_bp),
                })
                .collect()
        });
        let sin_jurisdiccion = reporte_isn
            .sin_jurisdiccion
            .iter()
            .map(|(empleado_id, base_bp)| IsnSinJurisdiccion {
                empleado_id: *empleado_id,
                base_gravable: bp_a_decimal(*base_bp),
            })
            .collect();

        Ok(ensamblar_reporte(
            empresa.id,
            periodo.id,
            OrigenReporte::Estimado,
            totales,
            empleados,
            isn_por_estado,
            sin_jurisdiccion,
        ))
    }

    async fn nombres_por_empresa(
        &self,
        tx: &mut PgConnection,
        empresa_id: Uuid,
    ) -> Result<HashMap<Uuid, String>, AppError> {
        let filas: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, nombre FROM empleados WHERE empresa_id = $1")
                .bind(empresa_id)
                .fetch_all(&mut *tx)
                .await?;
        Ok(filas.into_iter().collect())
    }
}

// La tasa implícita de renglones históricos: impuesto / base, en centésimas
// de punto porcentual.
fn tasa_implicita(base_bp: i64, impuesto_bp: i64) -> Decimal {
    if base_bp == 0 {
        return Decimal::ZERO;
    }
    let tasa_bp = (impuesto_bp as i128 * 10_000 / base_bp as i128) as i64;
    Decimal::new(tasa_bp, 2)
}

fn ensamblar_reporte(
    empresa_id: Uuid,
    periodo_id: Uuid,
    origen: OrigenReporte,
    totales: TotalesBp,
    empleados: Vec<CostoEmpleado>,
    isn_por_estado: Option<Vec<CostoIsnEstado>>,
    sin_jurisdiccion: Vec<IsnSinJurisdiccion>,
) -> ReporteCostoNomina {
    ReporteCostoNomina {
        empresa_id,
        periodo_id,
        origen,
        total_base_gravable: bp_a_decimal(totales.base),
        total_isr: bp_a_decimal(totales.isr),
        total_subsidio: bp_a_decimal(totales.subsidio),
        total_imss_obrero: bp_a_decimal(totales.imss_obrero),
        total_imss_patron: bp_a_decimal(totales.imss_patron),
        total_isn: bp_a_decimal(totales.isn),
        total_neto: bp_a_decimal(totales.neto),
        costo_total: bp_a_decimal(totales.base + totales.imss_patron + totales.isn),
        empleados,
        isn_por_estado,
        isn_sin_jurisdiccion: sin_jurisdiccion,
    }
}
