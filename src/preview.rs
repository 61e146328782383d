use comfy_table::{Attribute, Cell, CellAlignment, Table};

use crate::layout::NOTES_HEADING;
use crate::model::{BillRecord, DocumentStyle};
use crate::total::format_currency;

/// On-screen preview of the document, same blocks as the PDF.
pub fn render_preview(record: &BillRecord, total: f64, style: &DocumentStyle) -> String {
    let symbol = style.currency_symbol.as_str();
    let mut out = String::new();

    out.push_str(&format!("{}    INVOICE\n", style.issuer.name));
    out.push_str(&format!("{}\n", record.invoice_number));
    out.push_str(&format!("Issued {}\n\n", record.issue_date));

    out.push_str("FROM\n");
    out.push_str(&format!("{}\n\n", style.issuer.name));
    out.push_str("BILL TO\n");
    for line in [
        record.customer_name.as_str(),
        record.customer_phone.as_str(),
        record.customer_email.as_str(),
        record.customer_address.as_str(),
    ] {
        if !line.trim().is_empty() {
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('\n');

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Description"),
        Cell::new("QTY").set_alignment(CellAlignment::Center),
        Cell::new(format!("Price, {}", style.currency_code)).set_alignment(CellAlignment::Right),
        Cell::new(format!("Amount, {}", style.currency_code)).set_alignment(CellAlignment::Right),
    ]);

    for service in &record.services {
        let mut description = service.description.clone();
        if !service.details.trim().is_empty() {
            description.push('\n');
            description.push_str(&service.details);
        }
        if service.discount > 0.0 {
            description.push_str(&format!(
                "\nIncl. {} discount",
                format_currency(symbol, service.discount)
            ));
        }
        table.add_row(vec![
            Cell::new(description),
            Cell::new(service.quantity).set_alignment(CellAlignment::Center),
            Cell::new(format_currency(symbol, service.price)).set_alignment(CellAlignment::Right),
            Cell::new(format_currency(symbol, service.amount())).set_alignment(CellAlignment::Right),
        ]);
    }

    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format_currency(symbol, total))
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
    ]);

    out.push_str(&format!("{table}\n"));

    if record.has_notes() {
        out.push_str(&format!("\n{}\n{}\n", NOTES_HEADING, record.notes.trim_end()));
    }

    out.push_str(&format!("\nInv. {} | 1 of 1\n", record.invoice_number));
    out
}
