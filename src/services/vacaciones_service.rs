// src/services/vacaciones_service.rs

use chrono::{Datelike, Months, NaiveDate};
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EmpleadosRepository, TablasRepository, VacacionesRepository},
    models::vacaciones::{
        EstatusSolicitud, MovimientoKardex, SaldoVacaciones, SolicitudVacaciones,
        TipoMovimientoKardex,
    },
    services::kardex,
};

#[derive(Clone)]
pub struct VacacionesService {
    repo: VacacionesRepository,
    empleados: EmpleadosRepository,
    tablas: TablasRepository,
}

impl VacacionesService {
    pub fn new(
        repo: VacacionesRepository,
        empleados: EmpleadosRepository,
        tablas: TablasRepository,
    ) -> Self {
        Self {
            repo,
            empleados,
            tablas,
        }
    }

    /// Otorga los días del aniversario cumplido más reciente a la fecha de
    /// corte. Devuelve None si el empleado aún no cumple un año o si el
    /// otorgamiento de ese aniversario ya existe (la operación es segura de
    /// repetir).
    pub async fn otorgar_aniversario<'e, A>(
        &self,
        conexion: A,
        empleado_id: Uuid,
        fecha_corte: NaiveDate,
    ) -> Result<Option<MovimientoKardex>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let empleado = self
            .empleados
            .empleado_por_id(&mut *tx, empleado_id)
            .await?
            .ok_or(AppError::EmpleadoNotFound)?;

        let anios = empleado.anios_cumplidos(fecha_corte);
        if anios < 1 {
            return Ok(None);
        }

        if self
            .repo
            .existe_otorgamiento_del_anio(&mut *tx, empleado_id, anios)
            .await?
        {
            return Ok(None);
        }

        let aniversario = empleado.fecha_antiguedad() + Months::new(12 * anios as u32);
        let tabla = self.tablas.tabla_vacaciones(&mut *tx, aniversario).await?;
        let mut dias = tabla.dias_por_anios(anios) as i64;
        if dias == 0 {
            return Ok(None);
        }

        if let Some(esquema_id) = empleado.esquema_id {
            if let Some(esquema) = self.empleados.esquema_por_id(&mut *tx, esquema_id).await? {
                dias += esquema.dias_vacaciones_extra as i64;
            }
        }

        let movimiento = self
            .repo
            .insertar_otorgamiento(&mut *tx, empleado_id, dias, aniversario, anios)
            .await?;

        self.resincronizar_bajo_candado(&mut *tx, empleado_id, fecha_corte)
            .await?;

        tx.commit().await?;
        Ok(Some(movimiento))
    }

    /// Consume días contra el kardex (FIFO). Toda la operación corre bajo
    /// candado de los renglones del empleado: un consumo y un barrido de
    /// caducidad concurrentes no pueden descontar el mismo otorgamiento
    /// dos veces.
    pub async fn consumir<'e, A>(
        &self,
        conexion: A,
        empleado_id: Uuid,
        dias: i64,
        fecha: NaiveDate,
    ) -> Result<Vec<MovimientoKardex>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;
        let movimientos = self
            .consumir_bajo_candado(&mut *tx, empleado_id, dias, fecha, None)
            .await?;
        tx.commit().await?;
        Ok(movimientos)
    }

    /// Barrido de caducidad de toda la empresa: prescribe el remanente de
    /// cada otorgamiento fuera de ventana. Correrlo dos veces no produce
    /// efecto adicional.
    pub async fn caducar<'e, A>(
        &self,
        conexion: A,
        empresa_id: Uuid,
        fecha: NaiveDate,
    ) -> Result<i64, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let empleados = self.empleados.empleados_activos(&mut *tx, empresa_id).await?;
        let mut total_caducado = 0i64;

        for empleado in &empleados {
            let movimientos = self
                .repo
                .kardex_por_empleado_con_candado(&mut *tx, empleado.id)
                .await?;
            let plan = kardex::plan_caducidad(&movimientos, fecha);
            if plan.is_empty() {
                continue;
            }
            for aplicacion in &plan {
                self.repo
                    .insertar_aplicacion(
                        &mut *tx,
                        empleado.id,
                        TipoMovimientoKardex::Caducidad,
                        aplicacion,
                        fecha,
                        None,
                    )
                    .await?;
                total_caducado += aplicacion.dias;
            }
            self.resincronizar_bajo_candado(&mut *tx, empleado.id, fecha)
                .await?;
        }

        tx.commit().await?;
        Ok(total_caducado)
    }

    /// Saldo del empleado derivado del kardex. Si el saldo cacheado está
    /// desviado se corrige aquí mismo y se reporta; jamás se devuelve el
    /// valor desviado.
    pub async fn saldo_empleado<'e, A>(
        &self,
        conexion: A,
        empleado_id: Uuid,
        anio: Option<i32>,
        a_fecha: NaiveDate,
    ) -> Result<SaldoVacaciones, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let empleado = self
            .empleados
            .empleado_por_id(&mut *tx, empleado_id)
            .await?
            .ok_or(AppError::EmpleadoNotFound)?;

        let movimientos = self.repo.kardex_por_empleado(&mut *tx, empleado_id).await?;
        let disponibles = kardex::saldo_disponible(&movimientos, a_fecha);
        let usados = match anio {
            Some(anio) => movimientos
                .iter()
                .filter(|m| {
                    m.tipo == TipoMovimientoKardex::Consumo && m.fecha.year() == anio
                })
                .map(|m| m.dias)
                .sum(),
            None => kardex::dias_usados(&movimientos),
        };
        let pendientes = self.repo.dias_pendientes(&mut *tx, empleado_id).await?;

        let resincronizado = if empleado.saldo_vacaciones_actual != disponibles {
            tracing::warn!(
                empleado_id = %empleado_id,
                cacheado = empleado.saldo_vacaciones_actual,
                derivado = disponibles,
                "saldo de vacaciones cacheado desviado del kardex; resincronizando"
            );
            self.empleados
                .actualizar_saldo_cacheado(&mut *tx, empleado_id, disponibles)
                .await?;
            true
        } else {
            false
        };

        tx.commit().await?;

        Ok(SaldoVacaciones {
            empleado_id,
            disponibles,
            usados,
            pendientes,
            resincronizado,
        })
    }

    /// Verificación estricta: un saldo cacheado desviado es un error que el
    /// llamador debe ver (cierres de periodo, auditoría), no corregirse en
    /// silencio.
    pub async fn verificar_saldo<'e, E>(
        &self,
        executor: E,
        empleado_id: Uuid,
        cacheado: i64,
        a_fecha: NaiveDate,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movimientos = self.repo.kardex_por_empleado(executor, empleado_id).await?;
        let derivado = kardex::saldo_disponible(&movimientos, a_fecha);
        if cacheado != derivado {
            return Err(AppError::StaleCachedBalance {
                empleado_id,
                cacheado,
                derivado,
            });
        }
        Ok(())
    }

    pub async fn crear_solicitud<'e, A>(
        &self,
        conexion: A,
        empleado_id: Uuid,
        dias: i64,
        fecha_inicio: NaiveDate,
    ) -> Result<SolicitudVacaciones, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let movimientos = self
            .repo
            .kardex_por_empleado_con_candado(&mut *tx, empleado_id)
            .await?;
        let disponibles = kardex::saldo_disponible(&movimientos, fecha_inicio);
        let pendientes = self.repo.dias_pendientes(&mut *tx, empleado_id).await?;
        // los días ya comprometidos en solicitudes pendientes no se pueden
        // volver a prometer
        if dias > disponibles - pendientes {
            return Err(AppError::InsufficientBalance {
                solicitados: dias,
                disponibles: (disponibles - pendientes).max(0),
            });
        }

        let solicitud = self
            .repo
            .crear_solicitud(&mut *tx, empleado_id, dias, fecha_inicio)
            .await?;

        tx.commit().await?;
        Ok(solicitud)
    }

    pub async fn solicitudes_pendientes<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
    ) -> Result<Vec<SolicitudVacaciones>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.solicitudes_pendientes(executor, empresa_id).await
    }

    /// Aprueba una solicitud pendiente: consume del kardex y marca la
    /// solicitud, todo en la misma transacción, y recalcula el saldo.
    pub async fn aprobar<'e, A>(
        &self,
        conexion: A,
        solicitud_id: Uuid,
    ) -> Result<SolicitudVacaciones, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let solicitud = self
            .repo
            .solicitud_con_candado(&mut *tx, solicitud_id)
            .await?
            .ok_or(AppError::SolicitudNotFound)?;
        if solicitud.estatus != EstatusSolicitud::Pendiente {
            return Err(AppError::SolicitudYaResuelta);
        }

        self.consumir_bajo_candado(
            &mut *tx,
            solicitud.empleado_id,
            solicitud.dias,
            solicitud.fecha_inicio,
            Some(solicitud.id),
        )
        .await?;

        let resuelta = self
            .repo
            .marcar_resuelta(&mut *tx, solicitud_id, EstatusSolicitud::Aprobada)
            .await?;

        tx.commit().await?;
        Ok(resuelta)
    }

    pub async fn rechazar<'e, A>(
        &self,
        conexion: A,
        solicitud_id: Uuid,
    ) -> Result<SolicitudVacaciones, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conexion.begin().await?;

        let solicitud = self
            .repo
            .solicitud_con_candado(&mut *tx, solicitud_id)
            .await?
            .ok_or(AppError::SolicitudNotFound)?;
        if solicitud.estatus != EstatusSolicitud::Pendiente {
            return Err(AppError::SolicitudYaResuelta);
        }

        let resuelta = self
            .repo
            .marcar_resuelta(&mut *tx, solicitud_id, EstatusSolicitud::Rechazada)
            .await?;

        tx.commit().await?;
        Ok(resuelta)
    }

    // Consumo FIFO bajo candado: carga el kardex con FOR UPDATE, calcula el
    // plan en memoria y persiste los renglones resultantes.
    async fn consumir_bajo_candado(
        &self,
        tx: &mut PgConnection,
        empleado_id: Uuid,
        dias: i64,
        fecha: NaiveDate,
        solicitud_id: Option<Uuid>,
    ) -> Result<Vec<MovimientoKardex>, AppError> {
        let movimientos = self
            .repo
            .kardex_por_empleado_con_candado(&mut *tx, empleado_id)
            .await?;
        let plan = kardex::plan_consumo(&movimientos, dias, fecha)?;

        let mut insertados = Vec::with_capacity(plan.len());
        for aplicacion in &plan {
            let movimiento = self
                .repo
                .insertar_aplicacion(
                    &mut *tx,
                    empleado_id,
                    TipoMovimientoKardex::Consumo,
                    aplicacion,
                    fecha,
                    solicitud_id,
                )
                .await?;
            insertados.push(movimiento);
        }

        self.resincronizar_bajo_candado(tx, empleado_id, fecha).await?;
        Ok(insertados)
    }

    // Recalcula el saldo disponible desde el kardex y lo proyecta al campo
    // cacheado. Es la única ruta de escritura de esa columna.
    async fn resincronizar_bajo_candado(
        &self,
        tx: &mut PgConnection,
        empleado_id: Uuid,
        a_fecha: NaiveDate,
    ) -> Result<i64, AppError> {
        let movimientos = self.repo.kardex_por_empleado(&mut *tx, empleado_id).await?;
        let saldo = kardex::saldo_disponible(&movimientos, a_fecha);
        self.empleados
            .actualizar_saldo_cacheado(&mut *tx, empleado_id, saldo)
            .await?;
        Ok(saldo)
    }
}
