use anyhow::Context;
use forms::{FileStorage, FormStore, SlotRepository, ThemeStore};
use paths::PathContext;

/// Saved forms and theme mode of one application, both persisted under
/// the storage directory of its path context.
#[derive(Debug)]
pub struct Workspace {
    pub forms: FormStore,
    pub theme: ThemeStore<FileStorage>,
}

impl Workspace {
    pub fn open(paths: &PathContext) -> anyhow::Result<Self> {
        let dir = paths.storage_dir();
        let storage = FileStorage::open(&dir)
            .with_context(|| format!("failed to open storage at {}", dir.display()))?;

        let forms = FormStore::builder()
            .with_repository(SlotRepository::new(storage.clone()))
            .build()
            .context("failed to load saved forms")?;
        let theme = ThemeStore::open(storage).context("failed to load theme mode")?;

        tracing::info!(
            saved = forms.saved_forms().len(),
            theme = %theme.mode(),
            "workspace opened at {}",
            dir.display()
        );

        Ok(Self { forms, theme })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forms::{FieldSpec, FieldType, ThemeMode};

    fn context(base: &std::path::Path) -> PathContext {
        PathContext::with_base_path(base.to_path_buf(), "upliance", "form_builder", "test")
    }

    #[test]
    fn test_open_empty_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        let workspace = Workspace::open(&ctx).unwrap();
        assert!(workspace.forms.saved_forms().is_empty());
        assert!(workspace.forms.current().is_none());
        assert_eq!(workspace.theme.mode(), ThemeMode::Light);
        assert!(ctx.storage_dir().is_dir());
    }

    #[test]
    fn test_workspace_reopens_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        let mut workspace = Workspace::open(&ctx).unwrap();
        workspace.forms.create_form("Contact").unwrap();
        workspace
            .forms
            .add_field(FieldSpec::new(FieldType::Textarea).with_label("Message"))
            .unwrap();
        workspace.forms.save_form().unwrap();
        workspace.theme.toggle().unwrap();
        drop(workspace);

        let reopened = Workspace::open(&ctx).unwrap();
        assert_eq!(reopened.theme.mode(), ThemeMode::Dark);
        let names: Vec<_> = reopened
            .forms
            .saved_forms()
            .iter()
            .map(|form| form.name.as_str())
            .collect();
        assert_eq!(names, vec!["Contact"]);
        assert_eq!(reopened.forms.saved_forms()[0].fields[0].label, "Message");
    }

    #[test]
    fn test_corrupt_forms_slot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        std::fs::create_dir_all(ctx.storage_dir()).unwrap();
        std::fs::write(ctx.storage_dir().join(forms::FORMS_KEY), "not json").unwrap();

        let err = Workspace::open(&ctx).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load saved forms"));
    }
}
