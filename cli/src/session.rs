//! Interactive builder session driven by line commands on stdin.

use std::io::{IsTerminal, Write};

use clap::{Args, Parser, Subcommand};
use form_schema_core::{
    BuilderSession, Field, FieldCollection, FieldDraft, FieldId, FieldType, SchemaLibrary,
    ValidationOptions, preview, validate_input,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render;

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
#[command(about = "Builder session commands")]
struct Line {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Add a field at the end of the form.
    Add(AddArgs),
    /// Change an existing field.
    Edit(EditArgs),
    /// Manage the options of a select field.
    #[command(name = "option")]
    Options(OptionArgs),
    /// Remove a field.
    Remove {
        /// Field position (1-based) or id.
        field: String,
    },
    /// Move a field to the position of another field.
    Move {
        /// Field to move.
        field: String,
        /// Field whose position it takes.
        target: String,
    },
    /// List the working fields.
    List,
    /// Show the form as an end user sees it.
    Preview,
    /// Validate a value against a field.
    Check {
        /// Field position (1-based) or id.
        field: String,
        /// Value to validate; omit for an empty value.
        #[arg(default_value = "")]
        value: String,
    },
    /// Save the working fields as a named schema and clear the form.
    Save {
        /// Schema name.
        name: String,
    },
    /// Load a saved schema into the form, replacing the working fields.
    Open {
        /// Schema name.
        name: String,
    },
    /// List saved schemas.
    Schemas,
    /// Delete every saved schema with this name.
    Delete {
        /// Schema name.
        name: String,
    },
    /// Discard the working fields.
    Clear,
    /// End the session.
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Field type: text, number or select.
    field_type: FieldType,
    /// Caption shown above the input.
    title: String,
    /// Helper text shown under the input.
    #[arg(long)]
    helper: Option<String>,
    /// The field must be filled in.
    #[arg(long)]
    required: bool,
    /// Keep the field out of the rendered form.
    #[arg(long)]
    hidden: bool,
    /// Inclusive lower bound (number fields).
    #[arg(long, allow_hyphen_values = true)]
    min: Option<f64>,
    /// Inclusive upper bound (number fields).
    #[arg(long, allow_hyphen_values = true)]
    max: Option<f64>,
    /// An option (select fields); repeat for more.
    #[arg(long = "option")]
    options: Vec<String>,
}

#[derive(Debug, Args)]
struct EditArgs {
    /// Field position (1-based) or id.
    field: String,
    /// New field type.
    #[arg(long = "type")]
    field_type: Option<FieldType>,
    /// New caption.
    #[arg(long)]
    title: Option<String>,
    /// New helper text.
    #[arg(long)]
    helper: Option<String>,
    /// Set or unset the required flag.
    #[arg(long)]
    required: Option<bool>,
    /// Set or unset the hidden flag.
    #[arg(long)]
    hidden: Option<bool>,
    /// New lower bound.
    #[arg(long, allow_hyphen_values = true, conflicts_with = "no_min")]
    min: Option<f64>,
    /// New upper bound.
    #[arg(long, allow_hyphen_values = true, conflicts_with = "no_max")]
    max: Option<f64>,
    /// Remove the lower bound.
    #[arg(long)]
    no_min: bool,
    /// Remove the upper bound.
    #[arg(long)]
    no_max: bool,
    /// Append an option (select fields); repeat for more.
    #[arg(long = "option")]
    options: Vec<String>,
}

#[derive(Debug, Args)]
struct OptionArgs {
    /// Field position (1-based) or id.
    field: String,
    #[command(subcommand)]
    action: OptionAction,
}

#[derive(Debug, Subcommand)]
enum OptionAction {
    /// Append an option.
    Add {
        /// Option text.
        value: String,
    },
    /// Replace the option at a 1-based index.
    Set {
        /// Option index (1-based).
        index: usize,
        /// New option text.
        value: String,
    },
    /// Remove the option at a 1-based index.
    Remove {
        /// Option index (1-based).
        index: usize,
    },
}

enum Flow {
    Continue,
    Quit,
}

/// Runs the session until `quit` or end of input.
///
/// Command errors are reported on stderr and the session continues.
pub async fn run(library: SchemaLibrary, options: ValidationOptions) -> Result<(), String> {
    let mut session = BuilderSession::new(FieldCollection::with_options(options), library);
    let interactive = std::io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if interactive {
            prompt().map_err(|e| format!("failed to write prompt: {e}"))?;
        }
        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("failed to read input: {e}"))?
        else {
            break;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let words = match split_words(line) {
            Ok(words) => words,
            Err(err) => {
                eprintln!("error: {err}");
                continue;
            }
        };
        let command = match Line::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(err) if !err.use_stderr() => {
                print!("{}", err.render());
                continue;
            }
            Err(err) => {
                eprint!("{}", err.render());
                continue;
            }
        };
        debug!(?command, "session command");

        match execute(&mut session, command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => eprintln!("error: {err}"),
        }
    }
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(b"form> ")?;
    stdout.flush()
}

async fn execute(session: &mut BuilderSession, command: SessionCommand) -> Result<Flow, String> {
    match command {
        SessionCommand::Add(args) => {
            let mut draft = FieldDraft::new(args.field_type);
            draft.title = args.title;
            draft.helper_text = args.helper.unwrap_or_default();
            draft.required = args.required;
            draft.hidden = args.hidden;
            draft.min_value = args.min;
            draft.max_value = args.max;
            for option in args.options {
                draft.add_option(option).map_err(|e| e.to_string())?;
            }
            let fields = session.fields_mut();
            let id = fields
                .add_field(draft.build())
                .map_err(|e| e.to_string())?;
            println!("added field {} ({id})", fields.len());
        }
        SessionCommand::Edit(args) => {
            let id = resolve(session, &args.field)?;
            let mut draft = draft_for(session, id)?;
            if let Some(field_type) = args.field_type {
                draft.set_type(field_type);
            }
            if let Some(title) = args.title {
                draft.title = title;
            }
            if let Some(helper) = args.helper {
                draft.helper_text = helper;
            }
            if let Some(required) = args.required {
                draft.required = required;
            }
            if let Some(hidden) = args.hidden {
                draft.hidden = hidden;
            }
            if args.min.is_some() || args.no_min {
                draft.min_value = args.min;
            }
            if args.max.is_some() || args.no_max {
                draft.max_value = args.max;
            }
            for option in args.options {
                draft.add_option(option).map_err(|e| e.to_string())?;
            }
            commit(session, id, &draft)?;
        }
        SessionCommand::Options(args) => {
            let id = resolve(session, &args.field)?;
            let mut draft = draft_for(session, id)?;
            if draft.field_type != FieldType::Select {
                return Err(format!("field '{}' is not a select field", draft.title));
            }
            match args.action {
                OptionAction::Add { value } => {
                    draft.add_option(value).map_err(|e| e.to_string())?;
                }
                OptionAction::Set { index, value } => {
                    draft
                        .set_option(option_index(index)?, value)
                        .map_err(|e| e.to_string())?;
                }
                OptionAction::Remove { index } => {
                    draft
                        .remove_option(option_index(index)?)
                        .map_err(|e| e.to_string())?;
                }
            }
            commit(session, id, &draft)?;
        }
        SessionCommand::Remove { field } => {
            let id = resolve(session, &field)?;
            if session.fields_mut().remove_field(id) {
                println!("removed");
            } else {
                println!("nothing to remove");
            }
        }
        SessionCommand::Move { field, target } => {
            let id = resolve(session, &field)?;
            let target = resolve(session, &target)?;
            session
                .fields_mut()
                .move_field(id, target)
                .map_err(|e| e.to_string())?;
            print!("{}", render::field_list(session.fields().list_fields()));
        }
        SessionCommand::List => {
            print!("{}", render::field_list(session.fields().list_fields()));
        }
        SessionCommand::Preview => {
            print!("{}", render::preview(&preview(session.fields().list_fields())));
        }
        SessionCommand::Check { field, value } => {
            let id = resolve(session, &field)?;
            let field = lookup(session, id)?;
            println!("{}", check_line(field, &value));
        }
        SessionCommand::Save { name } => {
            let schema = session.save_as(&name).await.map_err(|e| e.to_string())?;
            println!(
                "saved '{}' with {} fields",
                schema.name,
                schema.field_count()
            );
        }
        SessionCommand::Open { name } => {
            let fields = session.open(&name).map_err(|e| e.to_string())?;
            print!("{}", render::field_list(fields.list_fields()));
        }
        SessionCommand::Schemas => {
            let library = session.library();
            if library.is_empty() {
                println!("(no saved schemas)");
            }
            for schema in library.schemas() {
                println!("{} ({} fields)", schema.name, schema.field_count());
            }
        }
        SessionCommand::Delete { name } => {
            let removed = session
                .library_mut()
                .delete(&name)
                .await
                .map_err(|e| e.to_string())?;
            println!("deleted {removed} schema(s) named '{}'", name.trim());
        }
        SessionCommand::Clear => {
            session.fields_mut().clear();
            println!("cleared");
        }
        SessionCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Formats the outcome of validating `value` against `field`.
pub fn check_line(field: &Field, value: &str) -> String {
    let check = validate_input(field, value);
    match (&check.error, &check.hint) {
        (Some(error), _) => format!("invalid: {}", error.message),
        (None, Some(hint)) => format!("ok ({hint})"),
        (None, None) => "ok".to_string(),
    }
}

fn resolve(session: &BuilderSession, reference: &str) -> Result<FieldId, String> {
    render::resolve_field(session.fields().list_fields(), reference)
}

fn lookup(session: &BuilderSession, id: FieldId) -> Result<&Field, String> {
    session
        .fields()
        .get(id)
        .ok_or_else(|| format!("field not found: {id}"))
}

fn draft_for(session: &BuilderSession, id: FieldId) -> Result<FieldDraft, String> {
    lookup(session, id).map(FieldDraft::from_field)
}

fn commit(session: &mut BuilderSession, id: FieldId, draft: &FieldDraft) -> Result<(), String> {
    session
        .fields_mut()
        .update_field(id, draft.build())
        .map_err(|e| e.to_string())?;
    println!("updated");
    Ok(())
}

fn option_index(index: usize) -> Result<usize, String> {
    index
        .checked_sub(1)
        .ok_or_else(|| "option indexes start at 1".to_string())
}

/// Splits a command line into words, honouring single and double quotes.
///
/// Inside double quotes a backslash escapes the next character.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => return Err("unterminated double quote".to_string()),
                        },
                        Some(other) => current.push(other),
                        None => return Err("unterminated double quote".to_string()),
                    }
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(other) => current.push(other),
                        None => return Err("unterminated single quote".to_string()),
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            other => {
                in_word = true;
                current.push(other);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
