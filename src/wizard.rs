use std::fmt;
use std::path::Path;

use chrono::{Local, NaiveDate};
use inquire::{DateSelect, InquireError, Select, Text};

use bill_maker::config::Settings;
use bill_maker::error::AppError;
use bill_maker::export::{self, Destination};
use bill_maker::form::{FormEdit, ServiceEdit, ServiceField};
use bill_maker::model::{BillRecord, ServiceId, format_issue_date};
use bill_maker::preview::render_preview;
use bill_maker::total::format_currency;

enum MenuItem {
    InvoiceDetails,
    CustomerDetails,
    AddService,
    EditService { number: usize, id: ServiceId, label: String },
    RemoveService,
    Notes,
    Preview { enabled: bool },
    Download { enabled: bool },
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::InvoiceDetails => write!(f, "📝 Invoice Details"),
            MenuItem::CustomerDetails => write!(f, "👤 Customer Details"),
            MenuItem::AddService => write!(f, "➕ Add Service"),
            MenuItem::EditService { number, label, .. } => write!(f, "✏️  Service {}: {}", number, label),
            MenuItem::RemoveService => write!(f, "🗑  Remove Service"),
            MenuItem::Notes => write!(f, "🗒  Additional Notes"),
            MenuItem::Preview { enabled: true } => write!(f, "👁  Preview Invoice"),
            MenuItem::Preview { enabled: false } => write!(f, "👁  Preview Invoice (incomplete)"),
            MenuItem::Download { enabled: true } => write!(f, "📥 Generate & Download PDF"),
            MenuItem::Download { enabled: false } => write!(f, "📥 Generate & Download PDF (incomplete)"),
            MenuItem::Quit => write!(f, "🚪 Quit"),
        }
    }
}

struct ServiceChoice {
    number: usize,
    id: ServiceId,
    label: String,
}

impl fmt::Display for ServiceChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service {}: {}", self.number, self.label)
    }
}

// ==========================================
// Form Loop
// ==========================================

pub fn run_form(settings: &Settings, destination: &Destination, open: bool) -> Result<(), AppError> {
    let mut record = BillRecord::new_session(Local::now());
    let symbol = settings.currency_symbol.clone();

    println!("\n--- {} Bill Generator ---", settings.issuer.name);
    println!("💡 Tip: Use '\\n' for new lines in address, details and notes.");

    loop {
        println!(
            "\n💰 Total Amount: {}",
            format_currency(&symbol, record.total())
        );

        let choice = match Select::new("What would you like to do?", menu(&record, &symbol))
            .with_page_size(12)
            .prompt()
        {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        match choice {
            MenuItem::InvoiceDetails => edit_section(&mut record, edit_invoice_details)?,
            MenuItem::CustomerDetails => edit_section(&mut record, edit_customer)?,
            MenuItem::AddService => edit_section(&mut record, |draft| {
                apply(draft, FormEdit::AddService);
                let number = draft.services.len();
                match draft.services.last().map(|s| s.id) {
                    Some(id) => edit_service(draft, number, id, &symbol),
                    None => Ok(()),
                }
            })?,
            MenuItem::EditService { number, id, .. } => {
                edit_section(&mut record, |draft| edit_service(draft, number, id, &symbol))?
            }
            MenuItem::RemoveService => edit_section(&mut record, remove_service)?,
            MenuItem::Notes => edit_section(&mut record, edit_notes)?,
            MenuItem::Preview { enabled } => {
                if enabled {
                    println!("\n{}", render_preview(&record, record.total(), &settings.document_style()));
                } else {
                    println!("⚠️  Fill in the customer name and every service description to preview.");
                }
            }
            MenuItem::Download { enabled } => {
                if !enabled {
                    println!("⚠️  Not ready for download:");
                    for hint in record.missing_requirements() {
                        println!("   - {}", hint);
                    }
                    continue;
                }
                println!("\n🔨 Generating PDF...");
                match export::export_pdf(&record, settings, destination)? {
                    Some(path) => {
                        println!("✅ PDF Generated: {:?}", path);
                        if open {
                            crate::open_and_reveal(&path);
                        }
                    }
                    None => println!("Cancelled"),
                }
            }
            MenuItem::Quit => return Ok(()),
        }
    }
}

fn menu(record: &BillRecord, symbol: &str) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::InvoiceDetails, MenuItem::CustomerDetails];
    for (idx, service) in record.services.iter().enumerate() {
        items.push(MenuItem::EditService {
            number: idx + 1,
            id: service.id,
            label: service_label(&service.description, service.amount(), symbol),
        });
    }
    items.push(MenuItem::AddService);
    if record.services.len() > 1 {
        items.push(MenuItem::RemoveService);
    }
    items.push(MenuItem::Notes);
    items.push(MenuItem::Preview { enabled: record.can_preview() });
    items.push(MenuItem::Download { enabled: record.can_download() });
    items.push(MenuItem::Quit);
    items
}

fn service_label(description: &str, amount: f64, symbol: &str) -> String {
    let description = if description.trim().is_empty() { "(no description)" } else { description };
    format!("{} | {}", description, format_currency(symbol, amount))
}

fn apply(record: &mut BillRecord, edit: FormEdit) {
    match record.apply(edit) {
        Ok(next) => *record = next,
        Err(e) => println!("⚠️  {}", e),
    }
}

// ==========================================
// Sections
// ==========================================

/// Runs a section editor against a copy of the record. The copy replaces the
/// record only when the section completes; Esc or Ctrl-C inside a section
/// returns to the menu with the record as it was.
fn edit_section<F>(record: &mut BillRecord, edit: F) -> Result<(), AppError>
where
    F: FnOnce(&mut BillRecord) -> Result<(), AppError>,
{
    let mut draft = record.clone();
    match edit(&mut draft) {
        Ok(()) => {
            *record = draft;
            Ok(())
        }
        Err(AppError::Prompt(InquireError::OperationCanceled | InquireError::OperationInterrupted)) => {
            println!("Cancelled");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn edit_invoice_details(record: &mut BillRecord) -> Result<(), AppError> {
    let number = Text::new("Invoice Number:")
        .with_initial_value(&record.invoice_number)
        .prompt()?;
    apply(record, FormEdit::InvoiceNumber(number));

    let current = NaiveDate::parse_from_str(&record.issue_date, "%d/%m/%Y")
        .unwrap_or_else(|_| Local::now().date_naive());
    let date = DateSelect::new("Issue Date:").with_default(current).prompt()?;
    apply(record, FormEdit::IssueDate(format_issue_date(date)));
    Ok(())
}

fn edit_customer(record: &mut BillRecord) -> Result<(), AppError> {
    println!("\n--- Customer Details ---");
    let name = Text::new("Customer Name:")
        .with_initial_value(&record.customer_name)
        .with_placeholder("Enter customer name")
        .prompt()?;
    apply(record, FormEdit::CustomerName(name));

    let phone = Text::new("Phone:")
        .with_initial_value(&record.customer_phone)
        .with_placeholder("+91XXXXXXXXXX")
        .prompt()?;
    apply(record, FormEdit::CustomerPhone(phone));

    let email = Text::new("Email:")
        .with_initial_value(&record.customer_email)
        .with_placeholder("customer@example.com")
        .prompt()?;
    apply(record, FormEdit::CustomerEmail(email));

    let address = Text::new("Address:")
        .with_initial_value(&escape_newlines(&record.customer_address))
        .with_placeholder("Enter customer address")
        .prompt()?;
    apply(record, FormEdit::CustomerAddress(unescape_newlines(&address)));
    Ok(())
}

fn edit_service(record: &mut BillRecord, number: usize, id: ServiceId, symbol: &str) -> Result<(), AppError> {
    println!("\n--- Service {} ---", number);
    for field in ServiceField::ALL {
        let Some(service) = record.service(id) else {
            return Ok(());
        };
        let current = match field {
            ServiceField::Description => service.description.clone(),
            ServiceField::Details => escape_newlines(&service.details),
            ServiceField::Quantity => service.quantity.to_string(),
            ServiceField::Price => service.price.to_string(),
            ServiceField::Discount => service.discount.to_string(),
        };
        let prompt = match field {
            ServiceField::Price | ServiceField::Discount => format!("{} ({}):", field.label(), symbol),
            _ => format!("{}:", field.label()),
        };
        let raw = Text::new(&prompt).with_initial_value(&current).prompt()?;
        let raw = match field {
            ServiceField::Details => unescape_newlines(&raw),
            _ => raw,
        };
        apply(
            record,
            FormEdit::UpdateService {
                id,
                edit: ServiceEdit::from_input(field, &raw),
            },
        );
    }

    if let Some(service) = record.service(id) {
        println!("Amount: {}", format_currency(symbol, service.amount()));
    }
    Ok(())
}

fn remove_service(record: &mut BillRecord) -> Result<(), AppError> {
    let choices: Vec<ServiceChoice> = record
        .services
        .iter()
        .enumerate()
        .map(|(idx, s)| ServiceChoice {
            number: idx + 1,
            id: s.id,
            label: if s.description.is_empty() { "(no description)".to_string() } else { s.description.clone() },
        })
        .collect();

    let choice = Select::new("Select Service to Remove:", choices).prompt()?;
    apply(record, FormEdit::RemoveService(choice.id));
    Ok(())
}

fn edit_notes(record: &mut BillRecord) -> Result<(), AppError> {
    let notes = Text::new("Additional Notes:")
        .with_initial_value(&escape_newlines(&record.notes))
        .with_placeholder("e.g., 50% discount for 1st client, Payment terms, etc.")
        .prompt()?;
    apply(record, FormEdit::Notes(unescape_newlines(&notes)));
    Ok(())
}

fn escape_newlines(text: &str) -> String {
    text.replace('\n', "\\n")
}

fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

// ==========================================
// Settings Wizard
// ==========================================

pub fn setup_config_wizard(path: &Path) -> Result<Settings, AppError> {
    println!("\n⚙️  --- Configuration Setup ---");
    let current = Settings::load_from(path)?.unwrap_or_default();

    println!("📂 Opening folder picker...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Invoice Output Directory")
        .pick_folder();

    let output_dir = if let Some(path) = picked_path {
        path.to_string_lossy().to_string()
    } else {
        println!("❌ No folder selected. Falling back to manual input.");
        Text::new("Output Directory:").with_default(&current.output_dir).prompt()?
    };

    let issuer_name = Text::new("Issuer Name:").with_default(&current.issuer.name).prompt()?;
    let currency_symbol = Text::new("Currency Symbol:").with_default(&current.currency_symbol).prompt()?;
    let currency_code = Text::new("Currency Code:").with_default(&current.currency_code).prompt()?;

    let mut settings = current;
    settings.output_dir = output_dir;
    settings.issuer.name = issuer_name;
    settings.currency_symbol = currency_symbol;
    settings.currency_code = currency_code;

    settings.save_to(path)?;
    println!("✅ Settings saved.");
    Ok(settings)
}
