//! Invoice builder: form state, totals, and a coordinate-based PDF layout.

pub mod canvas;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod preview;
pub mod text;
pub mod total;

pub use canvas::{Canvas, RecordingCanvas};
pub use config::Settings;
pub use error::{AppError, FormError, RenderError};
pub use export::{Destination, export_file_name, export_pdf, render_pdf};
pub use form::{FormEdit, ServiceEdit, ServiceField};
pub use layout::{RenderSummary, render};
pub use model::{BillRecord, DocumentStyle, ServiceId, ServiceItem};
pub use total::{calculate_total, format_currency};
