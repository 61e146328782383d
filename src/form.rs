//! In-memory form state: edits, input coercion, and the checks that gate
//! preview and download.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FormError;
use crate::model::{BillRecord, ServiceId, ServiceItem};

static LEADING_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());
static LEADING_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").unwrap());

/// Quantity from raw input: the leading integer, or 1 when there is none or
/// it is not positive.
pub fn coerce_quantity(raw: &str) -> u32 {
    let parsed = LEADING_INT
        .captures(raw)
        .and_then(|caps| caps[1].parse::<i64>().ok());
    match parsed {
        Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Price or discount from raw input: the leading decimal, or 0 when there is
/// none, it is negative, or it does not fit in a finite f64.
pub fn coerce_amount(raw: &str) -> f64 {
    let parsed = LEADING_FLOAT
        .captures(raw)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceField {
    Description,
    Details,
    Quantity,
    Price,
    Discount,
}

impl ServiceField {
    pub const ALL: [ServiceField; 5] = [
        ServiceField::Description,
        ServiceField::Details,
        ServiceField::Quantity,
        ServiceField::Price,
        ServiceField::Discount,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ServiceField::Description => "Service Description",
            ServiceField::Details => "Service Details",
            ServiceField::Quantity => "Quantity",
            ServiceField::Price => "Price",
            ServiceField::Discount => "Discount",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEdit {
    Description(String),
    Details(String),
    Quantity(u32),
    Price(f64),
    Discount(f64),
}

impl ServiceEdit {
    /// Builds an edit from whatever the user typed. Numeric fields are
    /// coerced here so nothing downstream sees malformed numbers.
    pub fn from_input(field: ServiceField, raw: &str) -> Self {
        match field {
            ServiceField::Description => ServiceEdit::Description(raw.to_string()),
            ServiceField::Details => ServiceEdit::Details(raw.to_string()),
            ServiceField::Quantity => ServiceEdit::Quantity(coerce_quantity(raw)),
            ServiceField::Price => ServiceEdit::Price(coerce_amount(raw)),
            ServiceField::Discount => ServiceEdit::Discount(coerce_amount(raw)),
        }
    }

    fn apply_to(self, item: &mut ServiceItem) {
        match self {
            ServiceEdit::Description(v) => item.description = v,
            ServiceEdit::Details(v) => item.details = v,
            // the constructors coerce already, but typed callers can bypass them
            ServiceEdit::Quantity(v) => item.quantity = clamp_quantity(v),
            ServiceEdit::Price(v) => item.price = clamp_amount(v),
            ServiceEdit::Discount(v) => item.discount = clamp_amount(v),
        }
    }
}

fn clamp_quantity(v: u32) -> u32 {
    v.max(1)
}

fn clamp_amount(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

impl ServiceItem {
    /// Same bounds the form enforces: quantity at least 1, price and
    /// discount finite and not negative.
    pub fn normalized(mut self) -> Self {
        self.quantity = clamp_quantity(self.quantity);
        self.price = clamp_amount(self.price);
        self.discount = clamp_amount(self.discount);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEdit {
    InvoiceNumber(String),
    IssueDate(String),
    CustomerName(String),
    CustomerPhone(String),
    CustomerEmail(String),
    CustomerAddress(String),
    Notes(String),
    AddService,
    RemoveService(ServiceId),
    UpdateService { id: ServiceId, edit: ServiceEdit },
}

impl BillRecord {
    /// Returns the record with `edit` applied. On error `self` is untouched.
    pub fn apply(&self, edit: FormEdit) -> Result<BillRecord, FormError> {
        let mut next = self.clone();
        match edit {
            FormEdit::InvoiceNumber(v) => next.invoice_number = v,
            FormEdit::IssueDate(v) => next.issue_date = v,
            FormEdit::CustomerName(v) => next.customer_name = v,
            FormEdit::CustomerPhone(v) => next.customer_phone = v,
            FormEdit::CustomerEmail(v) => next.customer_email = v,
            FormEdit::CustomerAddress(v) => next.customer_address = v,
            FormEdit::Notes(v) => next.notes = v,
            FormEdit::AddService => {
                let id = next.next_service_id();
                next.services.push(ServiceItem::empty(id));
            }
            FormEdit::RemoveService(id) => {
                let idx = next
                    .services
                    .iter()
                    .position(|s| s.id == id)
                    .ok_or(FormError::UnknownService(id))?;
                if next.services.len() <= 1 {
                    return Err(FormError::LastService);
                }
                next.services.remove(idx);
            }
            FormEdit::UpdateService { id, edit } => {
                let item = next
                    .services
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or(FormError::UnknownService(id))?;
                edit.apply_to(item);
            }
        }
        Ok(next)
    }

    /// Brings a record that did not come through the form (a file, say)
    /// inside the form's bounds.
    pub fn normalized(mut self) -> Self {
        self.services = self.services.into_iter().map(ServiceItem::normalized).collect();
        self
    }

    pub fn can_preview(&self) -> bool {
        !self.customer_name.is_empty() && self.services.iter().all(|s| !s.description.is_empty())
    }

    pub fn can_download(&self) -> bool {
        !self.customer_name.trim().is_empty()
            && self
                .services
                .iter()
                .all(|s| !s.description.trim().is_empty() && s.price > 0.0)
    }

    /// Human hints for why download is disabled. Empty when it is enabled.
    pub fn missing_requirements(&self) -> Vec<String> {
        let mut hints = Vec::new();
        if self.customer_name.trim().is_empty() {
            hints.push("Customer name is empty".to_string());
        }
        for (idx, service) in self.services.iter().enumerate() {
            if service.description.trim().is_empty() {
                hints.push(format!("Service {} has no description", idx + 1));
            }
            if service.price <= 0.0 {
                hints.push(format!("Service {} has no price", idx + 1));
            }
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;

    fn fresh() -> BillRecord {
        BillRecord::new_session(Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap())
    }

    #[test]
    fn quantity_coercion() {
        assert_eq!(coerce_quantity("3"), 3);
        assert_eq!(coerce_quantity(" 12 "), 12);
        assert_eq!(coerce_quantity("3.7"), 3);
        assert_eq!(coerce_quantity("4 boxes"), 4);
        assert_eq!(coerce_quantity("abc"), 1);
        assert_eq!(coerce_quantity(""), 1);
        assert_eq!(coerce_quantity("0"), 1);
        assert_eq!(coerce_quantity("-2"), 1);
        assert_eq!(coerce_quantity("99999999999"), u32::MAX);
    }

    #[test]
    fn amount_coercion() {
        assert_eq!(coerce_amount("100"), 100.0);
        assert_eq!(coerce_amount("12.50"), 12.5);
        assert_eq!(coerce_amount(".5"), 0.5);
        assert_eq!(coerce_amount("7abc"), 7.0);
        assert_eq!(coerce_amount("1e2"), 100.0);
        assert_eq!(coerce_amount("abc"), 0.0);
        assert_eq!(coerce_amount(""), 0.0);
        assert_eq!(coerce_amount("-5"), 0.0);
        assert_eq!(coerce_amount("1e400"), 0.0);
    }

    #[test]
    fn add_service_appends_one() {
        let record = fresh();
        let first = record.services[0].id;
        let next = record.apply(FormEdit::AddService).unwrap();
        assert_eq!(next.services.len(), 2);
        assert_eq!(next.services[0].id, first);
        assert_ne!(next.services[1].id, first);
        // the original is not mutated
        assert_eq!(record.services.len(), 1);
    }

    #[test]
    fn cannot_remove_last_service() {
        let record = fresh();
        let id = record.services[0].id;
        assert_eq!(record.apply(FormEdit::RemoveService(id)), Err(FormError::LastService));
    }

    #[test]
    fn remove_any_index() {
        let record = fresh()
            .apply(FormEdit::AddService)
            .and_then(|r| r.apply(FormEdit::AddService))
            .unwrap();
        let ids: Vec<_> = record.services.iter().map(|s| s.id).collect();
        let next = record.apply(FormEdit::RemoveService(ids[1])).unwrap();
        let left: Vec<_> = next.services.iter().map(|s| s.id).collect();
        assert_eq!(left, vec![ids[0], ids[2]]);
    }

    #[test]
    fn unknown_service_is_rejected() {
        let record = fresh().apply(FormEdit::AddService).unwrap();
        let ghost = ServiceId::new(999);
        assert_eq!(
            record.apply(FormEdit::RemoveService(ghost)),
            Err(FormError::UnknownService(ghost))
        );
        let edit = FormEdit::UpdateService {
            id: ghost,
            edit: ServiceEdit::Price(1.0),
        };
        assert_eq!(record.apply(edit), Err(FormError::UnknownService(ghost)));
    }

    #[test]
    fn update_service_from_raw_input() {
        let record = fresh();
        let id = record.services[0].id;
        let edits = [
            (ServiceField::Description, "Design"),
            (ServiceField::Quantity, "two"),
            (ServiceField::Price, "-40"),
            (ServiceField::Discount, "n/a"),
        ];
        let next = edits.iter().fold(record, |r, (field, raw)| {
            r.apply(FormEdit::UpdateService {
                id,
                edit: ServiceEdit::from_input(*field, raw),
            })
            .unwrap()
        });
        let item = next.service(id).unwrap();
        assert_eq!(item.description, "Design");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.price, 0.0);
        assert_eq!(item.discount, 0.0);
    }

    #[test]
    fn typed_edits_are_clamped() {
        let record = fresh();
        let id = record.services[0].id;
        let next = record
            .apply(FormEdit::UpdateService { id, edit: ServiceEdit::Quantity(0) })
            .and_then(|r| r.apply(FormEdit::UpdateService { id, edit: ServiceEdit::Discount(-3.0) }))
            .unwrap();
        assert_eq!(next.services[0].quantity, 1);
        assert_eq!(next.services[0].discount, 0.0);
    }

    #[test]
    fn gating() {
        let record = fresh();
        assert!(!record.can_preview());
        assert!(!record.can_download());

        let id = record.services[0].id;
        let record = record
            .apply(FormEdit::CustomerName("Jane Doe".into()))
            .and_then(|r| {
                r.apply(FormEdit::UpdateService {
                    id,
                    edit: ServiceEdit::Description("Design".into()),
                })
            })
            .unwrap();
        assert!(record.can_preview());
        // price still zero
        assert!(!record.can_download());
        assert_eq!(record.missing_requirements(), vec!["Service 1 has no price".to_string()]);

        let record = record
            .apply(FormEdit::UpdateService { id, edit: ServiceEdit::Price(100.0) })
            .unwrap();
        assert!(record.can_download());
        assert!(record.missing_requirements().is_empty());
    }

    #[test]
    fn normalizing_clamps_out_of_range_values() {
        let mut record = fresh();
        record.services[0].quantity = 0;
        record.services[0].price = -50.0;
        record.services[0].discount = -20.0;
        let record = record.normalized();
        let item = &record.services[0];
        assert_eq!((item.quantity, item.price, item.discount), (1, 0.0, 0.0));
        assert_eq!(record.total(), 0.0);
    }

    #[test]
    fn normalizing_keeps_valid_values() {
        let mut record = fresh().apply(FormEdit::AddService).unwrap();
        record.services[1].quantity = 3;
        record.services[1].price = 50.0;
        record.services[1].discount = 5.0;
        let before = record.clone();
        assert_eq!(record.normalized(), before);
    }

    #[test]
    fn blank_name_allows_preview_but_not_download() {
        let record = fresh();
        let id = record.services[0].id;
        let record = record
            .apply(FormEdit::CustomerName("   ".into()))
            .and_then(|r| r.apply(FormEdit::UpdateService { id, edit: ServiceEdit::Description("x".into()) }))
            .and_then(|r| r.apply(FormEdit::UpdateService { id, edit: ServiceEdit::Price(5.0) }))
            .unwrap();
        assert!(record.can_preview());
        assert!(!record.can_download());
    }
}
