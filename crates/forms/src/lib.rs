//! Form builder core: the form schema store, field validation and
//! derived-field evaluation, plus the key-value slots the saved forms and
//! the theme mode persist to.

pub mod derived;
pub mod errors;
pub mod model;
pub mod preview;
pub mod reorder;
pub mod repository;
pub mod storage;
pub mod store;
pub mod theme;
pub mod validation;
pub mod value;

pub use derived::{evaluate_all, DerivedValue, Evaluator, OperatorEvaluator, ERROR_SENTINEL};
pub use errors::{FormError, FormResult};
pub use model::{
    next_option_label, DerivedConfig, FieldId, FieldSpec, FieldType, FieldUpdate, FormField,
    FormId, FormSchema, ValidationRules,
};
pub use preview::{PreviewSession, Submission};
pub use repository::{FormRepository, SlotRepository};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, FORMS_KEY, THEME_KEY};
pub use store::{FormStore, FormStoreBuilder};
pub use theme::{ThemeMode, ThemeStore};
pub use validation::{validate, validate_submission, FieldIssue, ValidationResult};
pub use value::{FieldValue, FieldValues};
