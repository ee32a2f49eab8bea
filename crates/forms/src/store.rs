use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::errors::{FormError, FormResult};
use crate::model::{FieldId, FieldSpec, FieldUpdate, FormField, FormId, FormSchema};
use crate::reorder::move_item;
use crate::repository::{FormRepository, SlotRepository};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Builder for `FormStore`.
pub struct FormStoreBuilder {
    repository: Option<Box<dyn FormRepository>>,
    clock: Option<Clock>,
}

impl FormStoreBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            clock: None,
        }
    }

    /// Where saved forms are loaded from and written to. Defaults to an
    /// in-memory slot.
    pub fn with_repository<R>(mut self, repository: R) -> Self
    where
        R: FormRepository + 'static,
    {
        self.repository = Some(Box::new(repository));
        self
    }

    /// Time source for `createdAt` / `updatedAt`; defaults to `Utc::now`.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build the store, seeding the saved collection from the repository.
    pub fn build(self) -> FormResult<FormStore> {
        let repository = self
            .repository
            .unwrap_or_else(|| Box::new(SlotRepository::in_memory()));
        let saved = repository.load()?;
        debug!("loaded {} saved forms", saved.len());

        Ok(FormStore {
            repository,
            clock: self.clock.unwrap_or_else(|| Arc::new(Utc::now)),
            current: None,
            saved,
        })
    }
}

impl Default for FormStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of the form being edited and of the saved-forms collection.
///
/// The saved collection only changes through `save_form` / `save_form_as`,
/// and every such change is written through to the repository in full.
pub struct FormStore {
    repository: Box<dyn FormRepository>,
    clock: Clock,
    current: Option<FormSchema>,
    saved: Vec<FormSchema>,
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("current", &self.current.as_ref().map(|c| c.id))
            .field("saved", &self.saved.len())
            .finish_non_exhaustive()
    }
}

impl FormStore {
    pub fn builder() -> FormStoreBuilder {
        FormStoreBuilder::new()
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn current(&self) -> Option<&FormSchema> {
        self.current.as_ref()
    }

    pub fn saved_forms(&self) -> &[FormSchema] {
        &self.saved
    }

    pub fn saved_form(&self, id: FormId) -> Option<&FormSchema> {
        self.saved.iter().find(|f| f.id == id)
    }

    /// Saved forms whose name contains `query`, ignoring case.
    pub fn search_saved(&self, query: &str) -> Vec<&FormSchema> {
        let query = query.to_lowercase();
        self.saved
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Start a new, empty form. Replaces the current form unconditionally.
    pub fn create_form(&mut self, name: &str) -> FormResult<&FormSchema> {
        if name.trim().is_empty() {
            return Err(FormError::Validation("form name must not be empty".into()));
        }
        let schema = FormSchema::new(name, self.now());
        info!("created form {} ({})", schema.name, schema.id);
        Ok(self.current.insert(schema))
    }

    pub fn reset_current(&mut self) {
        self.current = None;
    }

    /// Append a field to the current form under a fresh id.
    pub fn add_field(&mut self, spec: FieldSpec) -> FormResult<&FormField> {
        let now = self.now();
        let form = self.current.as_mut().ok_or(FormError::NoCurrentForm)?;

        let mut id = FieldId::new();
        while form.field(id).is_some() {
            id = FieldId::new();
        }

        let index = form.fields.len();
        form.fields.push(spec.into_field(id));
        form.touch(now);
        debug!("added field {id} to form {}", form.id);
        Ok(&form.fields[index])
    }

    /// Merge `update` onto the field with `id`. Unknown ids and a missing
    /// current form are ignored; returns whether a field was updated.
    pub fn update_field(&mut self, id: FieldId, update: FieldUpdate) -> bool {
        let now = self.now();
        let Some(form) = self.current.as_mut() else {
            return false;
        };
        let Some(field) = form.field_mut(id) else {
            debug!("update for unknown field {id} ignored");
            return false;
        };
        update.apply_to(field);
        form.touch(now);
        true
    }

    /// Remove the field with `id` if present; returns whether one was removed.
    pub fn remove_field(&mut self, id: FieldId) -> bool {
        let now = self.now();
        let Some(form) = self.current.as_mut() else {
            return false;
        };
        let before = form.fields.len();
        form.fields.retain(|f| f.id != id);
        if form.fields.len() == before {
            return false;
        }
        form.touch(now);
        debug!("removed field {id} from form {}", form.id);
        true
    }

    /// Move the field at `old_index` to `new_index`.
    pub fn reorder_fields(&mut self, old_index: usize, new_index: usize) -> FormResult<()> {
        let now = self.now();
        let form = self.current.as_mut().ok_or(FormError::NoCurrentForm)?;
        move_item(&mut form.fields, old_index, new_index)?;
        form.touch(now);
        Ok(())
    }

    /// Drop `active` onto the position currently held by `over`.
    pub fn move_field(&mut self, active: FieldId, over: FieldId) -> FormResult<()> {
        let form = self.current.as_ref().ok_or(FormError::NoCurrentForm)?;
        let old_index = form
            .position(active)
            .ok_or(FormError::FieldNotFound(active))?;
        let new_index = form.position(over).ok_or(FormError::FieldNotFound(over))?;
        if old_index == new_index {
            return Ok(());
        }
        self.reorder_fields(old_index, new_index)
    }

    /// Upsert the current form into the saved collection and persist the
    /// whole collection. Nothing changes if persisting fails.
    pub fn save_form(&mut self) -> FormResult<()> {
        let mut form = self.current.clone().ok_or(FormError::NoCurrentForm)?;
        form.touch(self.now());

        let mut saved = self.saved.clone();
        match saved.iter_mut().find(|f| f.id == form.id) {
            Some(existing) => *existing = form.clone(),
            None => saved.push(form.clone()),
        }

        self.repository.save(&saved)?;
        info!("saved form {} ({}), {} forms stored", form.name, form.id, saved.len());
        self.saved = saved;
        self.current = Some(form);
        Ok(())
    }

    /// Save the current form under `name`. A different name saves a copy with
    /// a new id (field ids kept) which then becomes the current form.
    pub fn save_form_as(&mut self, name: &str) -> FormResult<FormId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FormError::Validation("form name must not be empty".into()));
        }
        let current = self.current.as_ref().ok_or(FormError::NoCurrentForm)?;

        if current.name != name {
            let mut copy = FormSchema::new(name, self.now());
            copy.fields = current.fields.clone();
            info!("copying form {} as {name}", current.id);
            self.current = Some(copy);
        }

        self.save_form()?;
        self.current
            .as_ref()
            .map(|f| f.id)
            .ok_or(FormError::NoCurrentForm)
    }

    /// Make a copy of the saved form `id` the current form.
    pub fn load_form(&mut self, id: FormId) -> FormResult<&FormSchema> {
        let form = self.saved_form(id).cloned().ok_or(FormError::NotFound(id))?;
        info!("loaded form {} ({id})", form.name);
        Ok(self.current.insert(form))
    }
}
