use crate::errors::FormResult;
use crate::model::FormSchema;
use crate::storage::{KeyValueStore, MemoryStorage, FORMS_KEY};

/// Where the saved-forms collection lives. Always read and written whole.
pub trait FormRepository: Send + Sync {
    fn load(&self) -> FormResult<Vec<FormSchema>>;

    fn save(&mut self, forms: &[FormSchema]) -> FormResult<()>;
}

/// Saved forms serialized as one JSON array in a single key-value slot.
#[derive(Clone, Debug)]
pub struct SlotRepository<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> SlotRepository<S> {
    /// Repository on the standard forms slot.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, FORMS_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl SlotRepository<MemoryStorage> {
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }
}

impl<S: KeyValueStore> FormRepository for SlotRepository<S> {
    fn load(&self) -> FormResult<Vec<FormSchema>> {
        match self.storage.read(&self.key)? {
            Some(content) if !content.trim().is_empty() => Ok(serde_json::from_str(&content)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, forms: &[FormSchema]) -> FormResult<()> {
        let json = serde_json::to_string(forms)?;
        self.storage.write(&self.key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FormError;
    use crate::model::{FieldId, FieldSpec, FieldType};
    use chrono::Utc;

    #[test]
    fn empty_or_blank_slot_loads_nothing() {
        let mut storage = MemoryStorage::new();
        let repo = SlotRepository::new(storage.clone());
        assert!(repo.load().unwrap().is_empty());

        storage.write(FORMS_KEY, "  \n").unwrap();
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_slot_is_an_error() {
        let mut storage = MemoryStorage::new();
        storage.write(FORMS_KEY, "{not json").unwrap();
        let repo = SlotRepository::new(storage);
        assert!(matches!(repo.load(), Err(FormError::Json(_))));
    }

    #[test]
    fn save_writes_a_json_array() {
        let storage = MemoryStorage::new();
        let mut repo = SlotRepository::new(storage.clone());

        let mut schema = FormSchema::new("Survey", Utc::now());
        schema
            .fields
            .push(FieldSpec::new(FieldType::Select).into_field(FieldId::new()));
        repo.save(std::slice::from_ref(&schema)).unwrap();

        let raw = storage.read(FORMS_KEY).unwrap().expect("slot written");
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["name"], "Survey");
        assert_eq!(json[0]["fields"][0]["options"][1], "Option 2");

        assert_eq!(repo.load().unwrap(), vec![schema]);
    }

    #[test]
    fn custom_key_does_not_touch_default_slot() {
        let storage = MemoryStorage::new();
        let mut repo = SlotRepository::with_key(storage.clone(), "other");
        repo.save(&[]).unwrap();
        assert_eq!(storage.read(FORMS_KEY).unwrap(), None);
        assert_eq!(storage.read("other").unwrap().as_deref(), Some("[]"));
    }
}
