//! Shared component instance for hosts that deliver edits concurrently.

use {serde_json::Value, tokio::sync::Mutex, tracing::debug};

use weft_providers::ClientHandle;

use crate::{
    component::build_model,
    error::Result,
    form::{FieldUpdate, FormConfiguration},
    refresh::{ConfigurationRefresh, RefreshTrigger},
};

struct SessionState {
    form: FormConfiguration,
    refresh: ConfigurationRefresh,
}

/// A form plus its refresh machine behind one lock, so that the
/// store-refresh-apply sequence of each edit runs without interleaving.
pub struct ComponentSession {
    inner: Mutex<SessionState>,
}

impl ComponentSession {
    pub fn new(form: FormConfiguration, refresh: ConfigurationRefresh) -> Self {
        Self {
            inner: Mutex::new(SessionState { form, refresh }),
        }
    }

    /// Store the edited value, run a refresh and apply its updates.
    ///
    /// When the refresh fails the edited value stays stored and no update is
    /// applied.
    pub async fn edit(&self, field: &str, value: Value) -> Result<Vec<FieldUpdate>> {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        state.form.set_value(field, value.clone())?;
        let trigger = RefreshTrigger::new(field, value);
        let updates = state.refresh.update_build_config(&mut state.form, &trigger).await?;
        debug!(field, updates = updates.len(), "applied field edit");
        Ok(updates)
    }

    pub async fn snapshot(&self) -> FormConfiguration {
        self.inner.lock().await.form.clone()
    }

    /// Build a client from the current form values.
    pub async fn build_model(&self) -> Result<ClientHandle> {
        let guard = self.inner.lock().await;
        build_model(guard.refresh.resolver().factory(), &guard.form)
    }
}
