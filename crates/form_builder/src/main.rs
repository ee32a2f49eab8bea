mod cli;

use anyhow::{anyhow, bail, Context, Result};
use app::{AppBuilder, Application, Workspace};
use clap::Parser;
use forms::{FieldSpec, FieldType, FieldValue, FormId, FormSchema, FormStore, PreviewSession, ThemeMode};

use crate::cli::{Cli, Cmd, DerivedArg, FieldArg, ThemeAction};

/// Form builder command line application.
pub struct FormBuilderApp;

impl Application for FormBuilderApp {
    const APP_ID: &'static str = "form_builder";
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let context = AppBuilder::<FormBuilderApp>::new(env!("CARGO_PKG_VERSION"))
        .map_err(|err| anyhow!(err))?
        .build();
    let mut workspace = context.open_workspace()?;
    tracing::info!(command = args.cmd.name(), "running command");

    match args.cmd {
        Cmd::List { search } => list(&workspace.forms, search.as_deref()),
        Cmd::Show { form } => {
            let schema = find_form(&workspace.forms, &form)?;
            println!("{}", serde_json::to_string_pretty(schema)?);
        }
        Cmd::Create {
            name,
            fields,
            required,
            derived,
        } => create(&mut workspace, &name, &required, &fields, &derived)?,
        Cmd::Submit { form, values } => {
            let schema = find_form(&workspace.forms, &form)?;
            submit(schema, &values)?;
        }
        Cmd::Theme { action } => {
            let mode = match action {
                None => workspace.theme.mode(),
                Some(ThemeAction::Toggle) => workspace.theme.toggle()?,
                Some(ThemeAction::Light) => set_theme(&mut workspace, ThemeMode::Light)?,
                Some(ThemeAction::Dark) => set_theme(&mut workspace, ThemeMode::Dark)?,
            };
            println!("{mode}");
        }
    }

    Ok(())
}

fn list(store: &FormStore, search: Option<&str>) {
    let mut forms = store.search_saved(search.unwrap_or_default());
    forms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    for form in forms {
        println!(
            "{}  {:<30} {:>3} fields  {}",
            form.id,
            form.name,
            form.fields.len(),
            form.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}

/// Resolve a form by id first, then by exact name.
fn find_form<'a>(store: &'a FormStore, query: &str) -> Result<&'a FormSchema> {
    if let Ok(id) = query.parse::<FormId>() {
        if let Some(form) = store.saved_form(id) {
            return Ok(form);
        }
    }
    store
        .saved_forms()
        .iter()
        .find(|form| form.name == query)
        .ok_or_else(|| anyhow!("no saved form named `{query}`"))
}

fn create(
    workspace: &mut Workspace,
    name: &str,
    required: &[FieldArg],
    fields: &[FieldArg],
    derived: &[DerivedArg],
) -> Result<()> {
    let store = &mut workspace.forms;
    store.create_form(name)?;

    let inputs = required
        .iter()
        .map(|arg| (arg, true))
        .chain(fields.iter().map(|arg| (arg, false)));
    for (arg, is_required) in inputs {
        let mut spec = FieldSpec::new(arg.field_type).required(is_required);
        if let Some(label) = &arg.label {
            spec = spec.with_label(label.as_str());
        }
        store.add_field(spec)?;
    }

    for arg in derived {
        let form = store.current().context("form vanished while building")?;
        let parents = arg
            .parents
            .iter()
            .map(|label| {
                form.fields
                    .iter()
                    .find(|field| &field.label == label)
                    .map(|field| field.id)
                    .ok_or_else(|| anyhow!("unknown parent field `{label}`"))
            })
            .collect::<Result<Vec<_>>>()?;
        store.add_field(
            FieldSpec::new(FieldType::Number)
                .with_label(arg.label.as_str())
                .derived(parents, arg.formula.as_str()),
        )?;
    }

    store.save_form()?;
    if let Some(form) = store.current() {
        println!("{}", form.id);
    }
    Ok(())
}

fn submit(schema: &FormSchema, entries: &[(String, String)]) -> Result<()> {
    let mut session = PreviewSession::new(schema);
    for (label, raw) in entries {
        let field = schema
            .fields
            .iter()
            .find(|field| &field.label == label)
            .ok_or_else(|| anyhow!("unknown field `{label}`"))?;
        let value = match field.field_type {
            FieldType::Checkbox => FieldValue::Selection(
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            _ => FieldValue::text(raw.as_str()),
        };
        if !session.set_value(field.id, value) {
            tracing::error!(field = %field.id, "rejected value for computed field {label}");
            bail!("field `{label}` is computed and cannot be entered");
        }
    }

    match session.submit() {
        Ok(submission) => {
            println!("{}", serde_json::to_string_pretty(&submission)?);
            Ok(())
        }
        Err(issues) => {
            for issue in &issues {
                let label = schema
                    .field(issue.field_id)
                    .map(|field| field.label.as_str())
                    .unwrap_or("?");
                eprintln!("{label}: {}", issue.message);
            }
            tracing::error!(form = %schema.id, "submission rejected: {} invalid field(s)", issues.len());
            bail!("{} field(s) failed validation", issues.len())
        }
    }
}

fn set_theme(workspace: &mut Workspace, mode: ThemeMode) -> Result<ThemeMode> {
    workspace.theme.set(mode)?;
    Ok(mode)
}
