use std::fmt;

use chrono::{DateTime, Local};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::total;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ServiceId(u64);

// Ids arrive as numbers from our own files and as numeric strings
// (`"1"`, `"1716200000000"`) from records exported by the web form.
impl<'de> Deserialize<'de> for ServiceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(ServiceId(n)),
            RawId::Text(s) => s
                .trim()
                .parse()
                .map(ServiceId)
                .map_err(|_| de::Error::custom(format!("service id must be numeric, got {:?}", s))),
        }
    }
}

impl ServiceId {
    pub fn new(raw: u64) -> Self {
        ServiceId(raw)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: ServiceId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32, // always >= 1 once it passed the form
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
}

fn default_quantity() -> u32 {
    1
}

impl ServiceItem {
    pub fn empty(id: ServiceId) -> Self {
        ServiceItem {
            id,
            description: String::new(),
            details: String::new(),
            quantity: 1,
            price: 0.0,
            discount: 0.0,
        }
    }

    /// Line amount after the per-line discount. May be negative.
    pub fn amount(&self) -> f64 {
        self.price * f64::from(self.quantity) - self.discount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    pub invoice_number: String,
    pub issue_date: String, // dd/mm/yyyy
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_address: String,
    pub services: Vec<ServiceItem>,
    #[serde(default)]
    pub notes: String,
}

impl BillRecord {
    /// Fresh draft for a new session: one empty service, a short invoice
    /// number derived from the clock, and today's date.
    pub fn new_session(now: DateTime<Local>) -> Self {
        let millis = now.timestamp_millis().unsigned_abs();
        BillRecord {
            invoice_number: format!("#{:03}", millis % 1000),
            issue_date: format_issue_date(now.date_naive()),
            customer_name: String::new(),
            customer_phone: String::new(),
            customer_email: String::new(),
            customer_address: String::new(),
            services: vec![ServiceItem::empty(ServiceId(1))],
            notes: String::new(),
        }
    }

    pub fn total(&self) -> f64 {
        total::calculate_total(&self.services)
    }

    pub fn service(&self, id: ServiceId) -> Option<&ServiceItem> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn next_service_id(&self) -> ServiceId {
        let max = self.services.iter().map(|s| s.id.0).max().unwrap_or(0);
        ServiceId(max + 1)
    }

    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }
}

pub fn format_issue_date(date: chrono::NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    pub name: String,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        IssuerConfig {
            name: "ProtoHub".to_string(),
        }
    }
}

/// What the renderer needs besides the record itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStyle {
    pub issuer: IssuerConfig,
    pub currency_symbol: String,
    pub currency_code: String,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        DocumentStyle {
            issuer: IssuerConfig::default(),
            currency_symbol: "₹".to_string(),
            currency_code: "INR".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_session_starts_with_one_empty_service() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap();
        let record = BillRecord::new_session(now);
        assert_eq!(record.services.len(), 1);
        assert_eq!(record.services[0].quantity, 1);
        assert_eq!(record.services[0].price, 0.0);
        assert_eq!(record.issue_date, "09/03/2024");
        assert!(record.invoice_number.starts_with('#'));
        assert_eq!(record.invoice_number.len(), 4);
    }

    #[test]
    fn amount_can_go_negative() {
        let mut item = ServiceItem::empty(ServiceId::new(1));
        item.price = 10.0;
        item.discount = 25.0;
        assert_eq!(item.amount(), -15.0);
    }

    #[test]
    fn loads_camel_case_json() {
        let json = r##"{
            "invoiceNumber": "#007",
            "issueDate": "01/02/2024",
            "customerName": "Jane Doe",
            "services": [{"id": 4, "description": "Design", "quantity": 2, "price": 100, "discount": 10}]
        }"##;
        let record: BillRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.customer_name, "Jane Doe");
        assert_eq!(record.services[0].details, "");
        assert_eq!(record.next_service_id(), ServiceId::new(5));
        assert!(!record.has_notes());
    }

    #[test]
    fn loads_a_record_exported_by_the_web_form() {
        let json = r##"{
            "invoiceNumber": "#482",
            "issueDate": "20/05/2024",
            "customerName": "Jane Doe",
            "customerPhone": "+919876543210",
            "customerEmail": "jane@example.com",
            "customerAddress": "12 MG Road, Bengaluru",
            "services": [
                {"id": "1", "description": "Design", "details": "Logo", "quantity": 2, "price": 100, "discount": 10},
                {"id": "1716200000000", "description": "Hosting", "details": "", "quantity": 1, "price": 49.5, "discount": 0}
            ],
            "notes": ""
        }"##;
        let record: BillRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.services[0].id, ServiceId::new(1));
        assert_eq!(record.services[1].id, ServiceId::new(1_716_200_000_000));
        assert_eq!(record.total(), 239.5);
        assert_eq!(record.next_service_id(), ServiceId::new(1_716_200_000_001));
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        let json = r#"{"id": "abc", "description": "x"}"#;
        let err = serde_json::from_str::<ServiceItem>(json).unwrap_err();
        assert!(err.to_string().contains("service id must be numeric"));
    }

    #[test]
    fn ids_serialize_as_numbers() {
        let item = ServiceItem::empty(ServiceId::new(7));
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], serde_json::json!(7));
    }
}
