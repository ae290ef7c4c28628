use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
// Ninguna de estas variantes se reintenta: todas son deterministas dados sus
// insumos, y un impuesto mal calculado jamás debe degradarse a cero.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Monto inválido: '{0}'")]
    InvalidAmount(String),

    #[error("No se pudo resolver el estado para ISN del empleado {empleado_id}")]
    UnresolvedJurisdiction { empleado_id: Uuid },

    #[error("Saldo de vacaciones insuficiente: se solicitaron {solicitados} días y hay {disponibles}")]
    InsufficientBalance { solicitados: i64, disponibles: i64 },

    #[error("No existe renglón vigente en la tabla '{tabla}' para la fecha {fecha}")]
    MissingRateTable { tabla: &'static str, fecha: NaiveDate },

    #[error("Saldo cacheado desactualizado para el empleado {empleado_id}: cache={cacheado}, kardex={derivado}")]
    StaleCachedBalance {
        empleado_id: Uuid,
        cacheado: i64,
        derivado: i64,
    },

    #[error("Empresa no encontrada")]
    EmpresaNotFound,

    #[error("Empleado no encontrado")]
    EmpleadoNotFound,

    #[error("Periodo de nómina no encontrado")]
    PeriodoNotFound,

    #[error("Solicitud de vacaciones no encontrada")]
    SolicitudNotFound,

    #[error("La solicitud ya fue resuelta")]
    SolicitudYaResuelta,

    #[error("El periodo ya fue procesado")]
    PeriodoYaProcesado,

    // Variante para errores de base de datos (sqlx)
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para cualquier otro error inesperado.
    // `anyhow::Error` captura el contexto completo.
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolvemos todos los detalles de la validación por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidAmount(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::EmpresaNotFound
            | AppError::EmpleadoNotFound
            | AppError::PeriodoNotFound
            | AppError::SolicitudNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InsufficientBalance { .. }
            | AppError::SolicitudYaResuelta
            | AppError::PeriodoYaProcesado
            | AppError::StaleCachedBalance { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::UnresolvedJurisdiction { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }

            // Una tabla de tasas ausente es un error de configuración fatal
            // para el cálculo: nunca se sustituye por tasa cero.
            AppError::MissingRateTable { .. } => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }

            // Todo lo demás (DatabaseError, InternalServerError) se vuelve 500.
            ref e => {
                tracing::error!("Error interno del servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.".to_string(),
                )
            }
        };

        // Respuesta estándar para errores simples con un solo mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
