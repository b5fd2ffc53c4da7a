mod amount;
mod config;
mod error;
mod form;
mod model;
mod print;
mod session;
mod view;

use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use inquire::error::CustomUserError;
use inquire::validator::Validation;
use inquire::{DateSelect, InquireError, Select, Text};
use std::path::Path;
use std::process::Command;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, AppSettings, session_root, settings_path};
use crate::error::Result;
use crate::form::{FormController, check_constraint};
use crate::model::{Category, Field};
use crate::print::{print_summary, render_print_page, write_print_page};
use crate::session::{FileSessionStore, Route, SessionStore};
use crate::view::{InvoiceView, preview_table};

// ==========================================
// Constants
// ==========================================
const EDIT_OPT: &str = "✏️  Edit a Field";
const GENERATE_OPT: &str = "✅ Generate Invoice";
const PRINT_OPT: &str = "🖨  Print PDF";
const CANCEL_OPT: &str = "❌ Cancel";

const SUBMITTED_NOTICE: &str = "Invoice created successfully! (Demo state, nothing was sent anywhere.)";

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-easy")]
#[command(version, about = "Draft and print invoices from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill out a new invoice with a live preview
    New,
    /// Render the last handed-off invoice as a printable page
    Print {
        /// Write the page but do not open it
        #[arg(long)]
        no_open: bool,
    },
    /// Forget the invoice handed off in this session
    Reset,
    /// Configure output directory, templates and number format
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Read once, then passed down
    let config = AppConfig::load();
    let store = FileSessionStore::for_current_session(&session_root());

    let (mut route, open) = match cli.command {
        None => (Route::Home, true),
        Some(Commands::New) => (Route::NewInvoice, true),
        Some(Commands::Print { no_open }) => (Route::Print, !no_open),
        Some(Commands::Reset) => {
            session::clear(&store)?;
            println!("🧹 Session invoice cleared.");
            return Ok(());
        }
        Some(Commands::Config) => {
            setup_config_wizard(&config.settings)?;
            return Ok(());
        }
    };

    loop {
        route = match route {
            Route::Home => {
                show_home();
                return Ok(());
            }
            Route::NewInvoice => new_invoice_wizard(&config, &store)?,
            Route::Print => {
                return print_view(&config, &store, open);
            }
        };
    }
}

fn show_home() {
    println!("Create Invoice Easy");
    println!("Craft polished invoices in minutes and keep your business moving.\n");
    let _ = Cli::command().print_help();
}

// ==========================================
// 1. Creation Form
// ==========================================

fn new_invoice_wizard(config: &AppConfig, store: &dyn SessionStore) -> Result<Route> {
    let mut form = FormController::new();
    let locale = &config.settings.locale;

    println!("\n--- Create a New Invoice ---");
    println!("💡 Tip: Use '\\n' in the description for new lines.");

    // First pass walks the form top to bottom
    for field in Field::ALL {
        if !is_visible(field, form.draft().category) {
            continue;
        }
        match prompt_field(field, &form)? {
            Some(value) => apply(&mut form, field, value),
            None => return Ok(Route::Home),
        }
    }

    loop {
        println!("\n{}", preview_table(&InvoiceView::project(form.draft(), locale)));
        if form.is_submitted() {
            println!("🎉 {SUBMITTED_NOTICE}");
        } else {
            let missing = form.missing_required();
            if !missing.is_empty() {
                let names: Vec<&str> = missing.iter().map(|f| f.label()).collect();
                println!("Still required: {}", names.join(", "));
            }
        }

        let options = vec![EDIT_OPT, GENERATE_OPT, PRINT_OPT, CANCEL_OPT];
        let choice = match Select::new("What next?", options).prompt() {
            Ok(c) => c,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => CANCEL_OPT,
            Err(e) => return Err(e.into()),
        };

        match choice {
            EDIT_OPT => {
                let category = form.draft().category;
                let fields: Vec<Field> = Field::ALL.into_iter().filter(|f| is_visible(*f, category)).collect();
                let Ok(field) = Select::new("Field to edit:", fields).prompt() else {
                    continue;
                };
                if let Some(value) = prompt_field(field, &form)? {
                    apply(&mut form, field, value);
                }
            }
            GENERATE_OPT => {
                if let Err(violations) = form.try_submit() {
                    println!("❌ Please fix the following before generating:");
                    for (field, v) in violations {
                        println!("   • {}: {}", field, v);
                    }
                }
            }
            PRINT_OPT => return Ok(session::handoff(store, form.draft())),
            _ => return Ok(Route::Home),
        }
    }
}

// Only the payment fields of the selected category are on screen.
fn is_visible(field: Field, category: Category) -> bool {
    match field {
        Field::CryptoAddress | Field::BlockchainNetwork => category == Category::Crypto,
        Field::PaymentLink => category == Category::General,
        _ => true,
    }
}

fn apply(form: &mut FormController, field: Field, value: String) {
    if field == Field::Category {
        form.category_change(Category::from_value(&value));
    } else {
        form.edit(field, value);
    }
}

/// Asks for one field. `None` means the user backed out.
fn prompt_field(field: Field, form: &FormController) -> Result<Option<String>> {
    let draft = form.draft();
    let current = draft.get(field).to_string();
    let label = format!("{}:", field.label());

    let answer = match field {
        Field::Category => {
            let start = Category::ALL.iter().position(|c| *c == draft.category).unwrap_or(1);
            Select::new(&label, Category::ALL.to_vec())
                .with_starting_cursor(start)
                .prompt()
                .map(|c| c.as_str().to_string())
        }
        Field::Deadline => {
            let default = NaiveDate::parse_from_str(&current, "%Y-%m-%d").unwrap_or_else(|_| Local::now().date_naive());
            DateSelect::new(&label)
                .with_default(default)
                .prompt()
                .map(|d| d.format("%Y-%m-%d").to_string())
        }
        _ => {
            let category = draft.category;
            let initial = current.replace('\n', "\\n");
            let mut text = Text::new(&label)
                .with_placeholder(field.hint())
                .with_initial_value(&initial)
                .with_validator(move |input: &str| -> std::result::Result<Validation, CustomUserError> {
                    let value = if field == Field::Description { input.replace("\\n", "\n") } else { input.to_string() };
                    Ok(match check_constraint(field, &value, category) {
                        Ok(()) => Validation::Valid,
                        Err(v) => Validation::Invalid(v.to_string().into()),
                    })
                });
            if field == Field::Currency {
                text = text.with_help_message("Up to 6 characters, e.g. USD, BTC");
            }
            text.prompt().map(|s| if field == Field::Description { s.replace("\\n", "\n") } else { s })
        }
    };

    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ==========================================
// 2. Print View
// ==========================================

fn print_view(config: &AppConfig, store: &dyn SessionStore, open: bool) -> Result<()> {
    let draft = session::load(store);
    println!("\n{}", print_summary(draft.as_ref(), config));

    let html = render_print_page(draft.as_ref(), config)?;
    let path = write_print_page(&html, &config.settings.output_path())?;
    println!("\n✅ Print page written: {}", path.display());

    if open {
        if draft.is_some() {
            println!("🖨  Use your browser's Print dialog to save it as PDF.");
        }
        open_in_browser(&path);
    }
    Ok(())
}

// Hand the page to the platform's default browser
fn open_in_browser(path: &Path) {
    #[cfg(target_os = "macos")]
    let spawned = Command::new("open").arg(path).spawn();

    #[cfg(target_os = "windows")]
    let spawned = Command::new("explorer").arg(path).spawn();

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let spawned = Command::new("xdg-open").arg(path).spawn();

    if let Err(e) = spawned {
        warn!(path = %path.display(), error = %e, "could not open print page");
        println!("Open {} in a browser to print it.", path.display());
    }
}

// ==========================================
// 3. Config
// ==========================================

fn optional(input: String) -> Option<String> {
    if input.trim().is_empty() { None } else { Some(input.trim().to_string()) }
}

fn setup_config_wizard(current: &AppSettings) -> Result<AppSettings> {
    println!("\n⚙️  --- Configuration Setup ---");

    let output_dir = Text::new("Output Directory for print pages:")
        .with_default(&current.output_dir)
        .prompt()?;
    let share_descriptor = Text::new("Share descriptor JSON (Optional, press Enter to skip):")
        .with_initial_value(current.share_descriptor.as_deref().unwrap_or(""))
        .prompt()?;
    let template_dir = Text::new("Template override directory (Optional, press Enter to skip):")
        .with_initial_value(current.template_dir.as_deref().unwrap_or(""))
        .prompt()?;
    let grouping = Text::new("Thousands separator:")
        .with_default(&current.locale.grouping)
        .prompt()?;
    let decimal = Text::new("Decimal separator:")
        .with_default(&current.locale.decimal)
        .prompt()?;

    let settings = AppSettings {
        output_dir,
        share_descriptor: optional(share_descriptor),
        template_dir: optional(template_dir),
        locale: amount::NumberLocale { grouping, decimal },
    };

    let path = settings_path();
    settings.save(&path)?;
    println!("✅ Settings saved to {}", path.display());
    Ok(settings)
}
