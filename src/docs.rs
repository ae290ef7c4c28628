// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Empleados ---
        handlers::empleados::listar_empleados,
        handlers::empleados::obtener_empleado,
        handlers::empleados::actualizar_salarios,

        // --- Vacaciones ---
        handlers::vacaciones::obtener_saldo,
        handlers::vacaciones::listar_pendientes,
        handlers::vacaciones::crear_solicitud,
        handlers::vacaciones::aprobar_solicitud,
        handlers::vacaciones::rechazar_solicitud,
        handlers::vacaciones::ejecutar_caducidades,
        handlers::vacaciones::otorgar_aniversario,

        // --- Nómina ---
        handlers::nomina::reporte_costos,
        handlers::nomina::cerrar_periodo,
        handlers::nomina::alta_tasa_isn,

        // --- Legal ---
        handlers::legal::simular_liquidacion,
        handlers::legal::crear_caso,
        handlers::legal::listar_casos,
    ),
    components(
        schemas(
            // --- Payloads ---
            handlers::empleados::ActualizarSalariosPayload,
            handlers::empleados::EmpleadosPaginados,
            handlers::vacaciones::CrearSolicitudPayload,
            handlers::vacaciones::CaducidadesPayload,
            handlers::vacaciones::OtorgamientoPayload,
            handlers::nomina::CerrarPeriodoPayload,
            handlers::nomina::AltaTasaIsnPayload,
            handlers::legal::SimulacionPayload,

            // --- Empleados ---
            models::empleado::Empleado,
            models::empresa::Empresa,
            models::empresa::CentroTrabajo,
            models::empresa::EsquemaPrestaciones,

            // --- Vacaciones ---
            models::vacaciones::TipoMovimientoKardex,
            models::vacaciones::MovimientoKardex,
            models::vacaciones::EstatusSolicitud,
            models::vacaciones::SolicitudVacaciones,
            models::vacaciones::SaldoVacaciones,

            // --- Nómina ---
            models::nomina::EstatusPeriodo,
            models::nomina::PeriodoNomina,
            models::nomina::ResumenNomina,
            models::nomina::OrigenReporte,
            models::nomina::CostoEmpleado,
            models::nomina::CostoIsnEstado,
            models::nomina::IsnSinJurisdiccion,
            models::nomina::ReporteCostoNomina,
            models::tablas::TasaIsn,

            // --- Legal ---
            models::legal::TipoTerminacion,
            models::legal::CasoLegal,
            models::legal::LiquidacionDesglose,
        )
    ),
    tags(
        (name = "Empleados", description = "Consulta del padrón de empleados"),
        (name = "Vacaciones", description = "Kardex, saldos y solicitudes de vacaciones"),
        (name = "Nomina", description = "Reporte de costos y cierre de periodos"),
        (name = "Legal", description = "Casos de terminación y simulación de liquidaciones")
    )
)]
pub struct ApiDoc;
