//! The record form: draft state and pre-network validation.
//!
//! Validation blocks a submission before any call is made: the business key
//! and the full name are mandatory, and the email (when given) must at least
//! look like `local@domain.tld`.

use thiserror::Error;

use crate::console::api::CustomerRecord;

/// Client-side validation failures. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("DNI/RUC y Nombre completo son obligatorios")]
    MissingRequired,
    #[error("Correo inválido")]
    InvalidEmail,
}

/// Editable draft of a customer record, mirroring the browser form.
///
/// `edit_id` plays the role of the hidden id field: when present, a save
/// updates that record; when absent, it creates a new one.
#[derive(Debug, Clone, Default)]
pub struct RecordDraft {
    pub edit_id: Option<i64>,
    pub dni_ruc: String,
    pub nombre_completo: String,
    pub telefono: String,
    pub correo: String,
    pub direccion: String,
    pub estado: String,
}

impl RecordDraft {
    /// Populate the form from an existing row (the edit action).
    pub fn from_record(record: &CustomerRecord) -> Self {
        Self {
            edit_id: record.id_clientes,
            dni_ruc: record.dni_ruc.clone().unwrap_or_default(),
            nombre_completo: record.nombre_completo.clone().unwrap_or_default(),
            telefono: record.telefono.clone().unwrap_or_default(),
            correo: record.correo.clone().unwrap_or_default(),
            direccion: record.direccion.clone().unwrap_or_default(),
            estado: record
                .estado
                .clone()
                .unwrap_or_else(|| "Activo".to_string()),
        }
    }

    /// Pre-network validation of the trimmed field values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dni_ruc.trim().is_empty() || self.nombre_completo.trim().is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        let correo = self.correo.trim();
        if !correo.is_empty() && !email_shape_ok(correo) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }

    /// The submission payload, with trimmed fields and a defaulted status.
    pub fn payload(&self) -> CustomerRecord {
        let estado = if self.estado.trim().is_empty() {
            "Activo".to_string()
        } else {
            self.estado.trim().to_string()
        };
        CustomerRecord {
            id_clientes: None,
            dni_ruc: Some(self.dni_ruc.trim().to_string()),
            nombre_completo: Some(self.nombre_completo.trim().to_string()),
            telefono: Some(self.telefono.trim().to_string()),
            correo: Some(self.correo.trim().to_string()),
            direccion: Some(self.direccion.trim().to_string()),
            estado: Some(estado),
        }
    }

    /// Reset the form and drop any pending edit id.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Basic `local@domain.tld` shape: one '@', no whitespace, dotted domain.
fn email_shape_ok(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
