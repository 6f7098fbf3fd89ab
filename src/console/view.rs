//! Record table view and submission flows.
//!
//! This is the browser page's logic without the page: load and render the
//! table, keep one form draft, save (create or update, decided by the edit
//! id), append (always create), and delete-after-confirmation.

use std::sync::Arc;

use crate::console::api::{ConsoleApi, ConsoleError, CustomerRecord};
use crate::console::form::{RecordDraft, ValidationError};

/// What the user gets told after a save/append attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Form cleared and list reloaded.
    Saved,
    /// Blocked before any network call was made.
    Invalid(ValidationError),
    /// Uniqueness conflict: the server's message, verbatim. The list is
    /// not reloaded and the form keeps its values.
    Conflict(String),
    /// Any other failure, with the operation-specific message.
    Failed(String),
}

pub struct RecordsView {
    api: Arc<ConsoleApi>,
    pub draft: RecordDraft,
    pub rows: Vec<CustomerRecord>,
}

impl RecordsView {
    pub fn new(api: Arc<ConsoleApi>) -> Self {
        Self {
            api,
            draft: RecordDraft::default(),
            rows: Vec::new(),
        }
    }

    /// Fetch the full record list and re-render.
    pub async fn reload(&mut self) -> Result<(), ConsoleError> {
        self.rows = self.api.list_records().await?;
        Ok(())
    }

    /// Row edit action: populate the form so the next save updates.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        match self.rows.iter().find(|row| row.id_clientes == Some(id)) {
            Some(row) => {
                self.draft = RecordDraft::from_record(row);
                true
            }
            None => false,
        }
    }

    /// Cancel action: reset the form and the pending edit id.
    pub fn cancel_edit(&mut self) {
        self.draft.clear();
    }

    /// Save the form: update when an edit id is set, create otherwise.
    /// Invalid drafts are rejected before any network call.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if let Err(err) = self.draft.validate() {
            return SubmitOutcome::Invalid(err);
        }
        let generic = match self.draft.edit_id {
            Some(_) => "Error al actualizar cliente",
            None => "Error al crear cliente",
        };
        let result = match self.draft.edit_id {
            Some(id) => {
                self.api
                    .update_record(id, &self.draft.payload(), generic)
                    .await
            }
            None => self.api.create_record(&self.draft.payload(), generic).await,
        };
        self.finish_submit(result, generic).await
    }

    /// Explicit append: always create, ignoring a populated edit id.
    /// Invalid drafts are rejected before any network call.
    pub async fn submit_append(&mut self) -> SubmitOutcome {
        if let Err(err) = self.draft.validate() {
            return SubmitOutcome::Invalid(err);
        }
        let generic = "Error al agregar cliente";
        let result = self.api.create_record(&self.draft.payload(), generic).await;
        self.finish_submit(result, generic).await
    }

    async fn finish_submit(
        &mut self,
        result: Result<(), ConsoleError>,
        generic: &str,
    ) -> SubmitOutcome {
        match result {
            Ok(()) => {
                self.draft.clear();
                let _ = self.reload().await;
                SubmitOutcome::Saved
            }
            Err(ConsoleError::Conflict(message)) => SubmitOutcome::Conflict(message),
            Err(ConsoleError::Rejected(message)) => SubmitOutcome::Failed(message),
            Err(_) => SubmitOutcome::Failed(generic.to_string()),
        }
    }

    /// One confirmed deletion: exactly one delete call, then a reload.
    pub async fn delete_confirmed(&mut self, id: i64) -> Result<(), ConsoleError> {
        self.api.delete_record(id).await?;
        self.reload().await
    }

    /// Plain-text rendering of the current rows.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:>5}  {:<12}  {:<24}  {:<12}  {:<24}  {:<20}  {:<8}\n",
            "id", "dni_ruc", "nombre_completo", "telefono", "correo", "direccion", "estado"
        ));
        for row in &self.rows {
            out.push_str(&format!(
                "{:>5}  {:<12}  {:<24}  {:<12}  {:<24}  {:<20}  {:<8}\n",
                row.id_clientes.map_or_else(String::new, |id| id.to_string()),
                row.dni_ruc.as_deref().unwrap_or(""),
                row.nombre_completo.as_deref().unwrap_or(""),
                row.telefono.as_deref().unwrap_or(""),
                row.correo.as_deref().unwrap_or(""),
                row.direccion.as_deref().unwrap_or(""),
                row.estado.as_deref().unwrap_or(""),
            ));
        }
        out
    }
}
