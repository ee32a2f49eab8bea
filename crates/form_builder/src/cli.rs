use clap::{Parser, Subcommand, ValueEnum};
use forms::FieldType;

#[derive(Parser)]
#[command(name = "form_builder", version, about = "Build, preview and save forms")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// List saved forms, newest first
    List {
        /// Only forms whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Print a saved form as JSON
    Show {
        /// Form id or exact name
        form: String,
    },
    /// Create a form and save it
    Create {
        name: String,
        /// Input field as TYPE[:LABEL], e.g. `number:Price`
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<FieldArg>,
        /// Required input field, same syntax as --field
        #[arg(long = "required", value_parser = parse_field)]
        required: Vec<FieldArg>,
        /// Computed field as LABEL=PARENT,PARENT:FORMULA
        #[arg(long = "derived", value_parser = parse_derived)]
        derived: Vec<DerivedArg>,
    },
    /// Fill in a saved form and submit it
    Submit {
        /// Form id or exact name
        form: String,
        /// Entered values as LABEL=VALUE; checkbox options are comma separated
        #[arg(value_parser = parse_entry)]
        values: Vec<(String, String)>,
    },
    /// Show or change the theme mode
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
}

impl Cmd {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Cmd::List { .. } => "list",
            Cmd::Show { .. } => "show",
            Cmd::Create { .. } => "create",
            Cmd::Submit { .. } => "submit",
            Cmd::Theme { .. } => "theme",
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldArg {
    pub field_type: FieldType,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DerivedArg {
    pub label: String,
    pub parents: Vec<String>,
    pub formula: String,
}

fn parse_field(raw: &str) -> Result<FieldArg, String> {
    let (kind, label) = match raw.split_once(':') {
        Some((kind, label)) => (kind, Some(label.trim().to_string())),
        None => (raw, None),
    };
    let field_type = kind
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| format!("unknown field type `{kind}`"))?;
    Ok(FieldArg {
        field_type,
        label: label.filter(|l| !l.is_empty()),
    })
}

fn parse_derived(raw: &str) -> Result<DerivedArg, String> {
    let (label, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=PARENTS:FORMULA, got `{raw}`"))?;
    let (parents, formula) = rest
        .split_once(':')
        .ok_or_else(|| format!("missing formula in `{raw}`"))?;
    let parents: Vec<String> = parents
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    if parents.is_empty() {
        return Err(format!("no parent fields in `{raw}`"));
    }
    Ok(DerivedArg {
        label: label.trim().to_string(),
        parents,
        formula: formula.trim().to_string(),
    })
}

fn parse_entry(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(label, value)| (label.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected LABEL=VALUE, got `{raw}`"))
}
