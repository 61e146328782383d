//! Invoice document layout.
//!
//! Rendering happens in two passes. `plan` walks the record top to bottom and
//! produces the draw operations of every page, wrapping text through the
//! canvas so line counts match what the backend will draw. Footers are added
//! once the page count is known, then `render` replays the plan onto the
//! canvas.

use tracing::debug;

use crate::canvas::{Align, Canvas, DrawOp, Font, RgbColor};
use crate::error::RenderError;
use crate::model::{BillRecord, DocumentStyle, ServiceItem};
use crate::total::format_currency;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;

const MARGIN_LEFT: f32 = 20.0;
const TABLE_WIDTH: f32 = 170.0;
const RIGHT_COLUMN_X: f32 = 120.0;
const TITLE_X: f32 = 150.0;

// Content must stay above the footer.
const CONTENT_BOTTOM: f32 = 272.0;
const CONTINUED_TOP: f32 = 20.0;
const FOOTER_Y: f32 = 280.0;

const ADDRESS_WIDTH: f32 = 70.0;
const ADDRESS_Y: f32 = 104.0;
const TABLE_MIN_Y: f32 = 130.0;
const TABLE_GAP: f32 = 12.0;
const TABLE_HEADER_HEIGHT: f32 = 10.0;
// header top to the first row anchor
const HEADER_TO_ANCHOR: f32 = TABLE_HEADER_HEIGHT + 5.0;
const CONTINUED_ANCHOR: f32 = CONTINUED_TOP + HEADER_TO_ANCHOR;

const DESC_X: f32 = 25.0;
const DESC_WIDTH: f32 = 100.0;
const QTY_X: f32 = 137.0; // centre
const PRICE_X: f32 = 163.0; // right edge
const AMOUNT_X: f32 = 188.0; // right edge

// Row geometry, relative to the row anchor; the band starts 5mm above it.
const ROW_BAND_OFFSET: f32 = 5.0;
const ROW_MIN_HEIGHT: f32 = 25.0;
const ROW_BOTTOM_PAD: f32 = 5.0;
const ROW_FIRST_BASELINE: f32 = 2.0;
const DETAILS_GAP: f32 = 6.0;
const DISCOUNT_GAP: f32 = 7.0;
// Band height available to a row on a page that starts with the table header.
// Taller rows are split across pages.
const FRESH_ROW_CAPACITY: f32 = CONTENT_BOTTOM - (CONTINUED_ANCHOR - ROW_BAND_OFFSET);

const NOTES_WIDTH: f32 = 170.0;

const HEADER_FILL: RgbColor = RgbColor(245, 245, 245);
const ROW_FILL: RgbColor = RgbColor(250, 250, 250);
const FOOTER_GREY: RgbColor = RgbColor(128, 128, 128);

const BODY: Font = Font::normal(10.0);
const BODY_BOLD: Font = Font::bold(10.0);
const DETAIL: Font = Font::normal(9.0);
const META: Font = Font::normal(12.0);
const META_BOLD: Font = Font::bold(12.0);

pub const NOTES_HEADING: &str = "NOTES & PAYMENTS INSTRUCTIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub pages: usize,
    pub rows: usize,
    pub notes_lines: usize,
}

/// Lays out `record` and draws it on `canvas`. `total` is passed in already
/// computed so the document shows the same figure as the form.
pub fn render<C: Canvas + ?Sized>(
    record: &BillRecord,
    total: f64,
    style: &DocumentStyle,
    canvas: &mut C,
) -> Result<RenderSummary, RenderError> {
    let (pages, notes_lines) = plan(record, total, style, &*canvas);

    for (idx, ops) in pages.iter().enumerate() {
        if idx > 0 {
            canvas.add_page()?;
        }
        for op in ops {
            match op {
                DrawOp::Text { text, x, y, align, font, color } => {
                    canvas.set_font(*font);
                    canvas.set_text_color(*color);
                    canvas.text(text, *x, *y, *align);
                }
                DrawOp::Rect { x, y, width, height, color } => {
                    canvas.set_fill_color(*color);
                    canvas.fill_rect(*x, *y, *width, *height);
                }
            }
        }
    }

    Ok(RenderSummary {
        pages: pages.len(),
        rows: record.services.len(),
        notes_lines,
    })
}

/// One baseline of a row's description column, `offset` below the anchor.
struct RowLine {
    text: String,
    offset: f32,
    font: Font,
}

struct RowPlan {
    lines: Vec<RowLine>,
    height: f32,
}

/// The part of a row drawn on one page. Line offsets are shifted up by
/// `base` so the fragment starts at its own anchor.
struct Fragment {
    base: f32,
    lines: Vec<RowLine>,
}

/// Whether a row of `height` can start at `anchor`. Rows that fit on a fresh
/// page must fit whole; taller ones only need the minimum row height.
fn row_starts_at(anchor: f32, height: f32) -> bool {
    let room = CONTENT_BOTTOM - (anchor - ROW_BAND_OFFSET);
    height <= room || (height > FRESH_ROW_CAPACITY && room >= ROW_MIN_HEIGHT)
}

/// Cuts a row into per-page fragments so no baseline goes past the bottom
/// padding. The first fragment starts at `anchor`, the others right below a
/// repeated table header.
fn split_row(lines: Vec<RowLine>, anchor: f32) -> Vec<Fragment> {
    let limit = CONTENT_BOTTOM - ROW_BOTTOM_PAD;
    let mut fragments = Vec::new();
    let mut current = Fragment { base: 0.0, lines: Vec::new() };
    let mut at = anchor;
    for line in lines {
        if at + line.offset - current.base > limit && !current.lines.is_empty() {
            let base = line.offset - ROW_FIRST_BASELINE;
            fragments.push(std::mem::replace(&mut current, Fragment { base, lines: Vec::new() }));
            at = CONTINUED_ANCHOR;
        }
        current.lines.push(line);
    }
    fragments.push(current);
    fragments
}

struct Planner<'a, C: Canvas + ?Sized> {
    canvas: &'a C,
    style: &'a DocumentStyle,
    pages: Vec<Vec<DrawOp>>,
}

impl<'a, C: Canvas + ?Sized> Planner<'a, C> {
    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, font: Font, align: Align) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            text,
            x,
            y,
            align,
            font,
            color: RgbColor::BLACK,
        });
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: RgbColor) {
        self.push(DrawOp::Rect { x, y, width, height, color });
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        debug!(page = self.pages.len(), "starting new page");
    }

    fn wrap(&self, text: &str, font: Font, width: f32) -> Vec<String> {
        self.canvas.split_text_to_size(text, font, width)
    }

    /// Draws the table header band at `y` and returns the first row anchor.
    fn table_header(&mut self, y: f32) -> f32 {
        self.rect(MARGIN_LEFT, y, TABLE_WIDTH, TABLE_HEADER_HEIGHT, HEADER_FILL);
        let code = &self.style.currency_code;
        let price = format!("Price, {}", code);
        let amount = format!("Amount, {}", code);
        let baseline = y + 7.0;
        self.text("Description", DESC_X, baseline, BODY_BOLD, Align::Left);
        self.text("QTY", QTY_X, baseline, BODY_BOLD, Align::Center);
        self.text(price, PRICE_X, baseline, BODY_BOLD, Align::Right);
        self.text(amount, AMOUNT_X, baseline, BODY_BOLD, Align::Right);
        y + HEADER_TO_ANCHOR
    }

    fn measure_row(&self, item: &ServiceItem) -> RowPlan {
        let description = self.wrap(&item.description, BODY_BOLD, DESC_WIDTH);
        let details = self.wrap(&item.details, DETAIL, DESC_WIDTH);
        let mut lines = Vec::with_capacity(description.len() + details.len() + 1);

        let desc_lh = BODY_BOLD.line_height();
        let mut bottom = ROW_FIRST_BASELINE + lines_span(description.len(), BODY_BOLD);
        for (i, text) in description.into_iter().enumerate() {
            let offset = ROW_FIRST_BASELINE + i as f32 * desc_lh;
            lines.push(RowLine { text, offset, font: BODY_BOLD });
        }

        let has_details = !details.is_empty();
        if has_details {
            let details_offset = bottom + DETAILS_GAP;
            bottom = details_offset + lines_span(details.len(), DETAIL);
            let detail_lh = DETAIL.line_height();
            for (i, text) in details.into_iter().enumerate() {
                let offset = details_offset + i as f32 * detail_lh;
                lines.push(RowLine { text, offset, font: DETAIL });
            }
        }

        if item.discount > 0.0 {
            bottom += if has_details { DISCOUNT_GAP } else { DETAILS_GAP };
            let text = format!(
                "Incl. {} discount",
                format_currency(&self.style.currency_symbol, item.discount)
            );
            lines.push(RowLine { text, offset: bottom, font: DETAIL });
        }

        let height = (bottom + ROW_BAND_OFFSET + ROW_BOTTOM_PAD).max(ROW_MIN_HEIGHT);
        RowPlan { lines, height }
    }

    /// Draws one row anchored at `anchor`, continuing it on new pages when
    /// it runs past the content area. Returns the next row's anchor.
    fn row(&mut self, index: usize, item: &ServiceItem, row: RowPlan, anchor: f32) -> f32 {
        let fragments = split_row(row.lines, anchor);
        let count = fragments.len();
        if count > 1 {
            debug!(row = index + 1, pages = count, "row split across pages");
        }

        let mut next = anchor;
        for (part, fragment) in fragments.into_iter().enumerate() {
            let at = if part == 0 {
                anchor
            } else {
                self.new_page();
                self.table_header(CONTINUED_TOP)
            };
            let band_top = at - ROW_BAND_OFFSET;
            let band_height = if count == 1 {
                row.height
            } else if part + 1 < count {
                CONTENT_BOTTOM - band_top
            } else {
                let last = fragment.lines.last().map_or(0.0, |l| l.offset - fragment.base);
                last + ROW_BAND_OFFSET + ROW_BOTTOM_PAD
            };
            if index % 2 == 0 {
                self.rect(MARGIN_LEFT, band_top, TABLE_WIDTH, band_height, ROW_FILL);
            }

            for line in fragment.lines {
                let y = at + line.offset - fragment.base;
                self.text(line.text, DESC_X, y, line.font, Align::Left);
            }

            if part == 0 {
                let first = at + ROW_FIRST_BASELINE;
                let symbol = self.style.currency_symbol.clone();
                self.text(item.quantity.to_string(), QTY_X, first, BODY, Align::Center);
                self.text(format_currency(&symbol, item.price), PRICE_X, first, BODY, Align::Right);
                self.text(format_currency(&symbol, item.amount()), AMOUNT_X, first, BODY, Align::Right);
            }
            next = band_top + band_height + ROW_BAND_OFFSET;
        }
        next
    }
}

/// Vertical distance from the first to the last baseline of `lines` lines.
fn lines_span(lines: usize, font: Font) -> f32 {
    lines.saturating_sub(1) as f32 * font.line_height()
}

fn plan<C: Canvas + ?Sized>(
    record: &BillRecord,
    total: f64,
    style: &DocumentStyle,
    canvas: &C,
) -> (Vec<Vec<DrawOp>>, usize) {
    let mut p = Planner {
        canvas,
        style,
        pages: vec![Vec::new()],
    };

    // Header
    p.text(&style.issuer.name, MARGIN_LEFT, 30.0, Font::bold(24.0), Align::Left);
    p.text("INVOICE", TITLE_X, 30.0, Font::bold(28.0), Align::Left);
    p.text(&record.invoice_number, TITLE_X, 40.0, META, Align::Left);
    p.text(format!("Issued {}", record.issue_date), TITLE_X, 48.0, META, Align::Left);

    // From / Bill to
    p.text("FROM", MARGIN_LEFT, 70.0, BODY_BOLD, Align::Left);
    p.text("BILL TO", RIGHT_COLUMN_X, 70.0, BODY_BOLD, Align::Left);
    p.text(&style.issuer.name, MARGIN_LEFT, 80.0, META, Align::Left);
    p.text(&record.customer_name, RIGHT_COLUMN_X, 80.0, META_BOLD, Align::Left);
    p.text(&record.customer_phone, RIGHT_COLUMN_X, 88.0, META, Align::Left);
    p.text(&record.customer_email, RIGHT_COLUMN_X, 96.0, META, Align::Left);

    let address = p.wrap(&record.customer_address, META, ADDRESS_WIDTH);
    let mut address_end = 96.0;
    let mut line_y = ADDRESS_Y;
    for line in address {
        if line_y > CONTENT_BOTTOM {
            p.new_page();
            line_y = CONTINUED_TOP;
        }
        p.text(line, RIGHT_COLUMN_X, line_y, META, Align::Left);
        address_end = line_y;
        line_y += META.line_height();
    }

    // Line items
    let mut table_top = if p.pages.len() == 1 {
        TABLE_MIN_Y.max(address_end + TABLE_GAP)
    } else {
        address_end + TABLE_GAP
    };
    let rows: Vec<RowPlan> = record.services.iter().map(|item| p.measure_row(item)).collect();
    // keep the header with the first row
    if rows
        .first()
        .is_some_and(|row| !row_starts_at(table_top + HEADER_TO_ANCHOR, row.height))
    {
        p.new_page();
        table_top = CONTINUED_TOP;
    }
    let mut y = p.table_header(table_top);
    for (idx, (item, row)) in record.services.iter().zip(rows).enumerate() {
        if !row_starts_at(y, row.height) {
            p.new_page();
            y = p.table_header(CONTINUED_TOP);
        }
        y = p.row(idx, item, row, y);
    }

    // Total
    y += 10.0;
    if y > CONTENT_BOTTOM {
        p.new_page();
        y = 30.0;
    }
    let total_label = format!("Total: {}", format_currency(&style.currency_symbol, total));
    p.text(total_label, AMOUNT_X, y, Font::bold(14.0), Align::Right);

    // Notes
    let mut notes_lines = 0;
    if record.has_notes() {
        y += 20.0;
        let lh = BODY.line_height();
        if y + 8.0 > CONTENT_BOTTOM {
            p.new_page();
            y = 30.0;
        }
        p.text(NOTES_HEADING, MARGIN_LEFT, y, BODY_BOLD, Align::Left);
        let lines = p.wrap(&record.notes, BODY, NOTES_WIDTH);
        notes_lines = lines.len();
        let mut line_y = y + 8.0;
        for line in lines {
            if line_y > CONTENT_BOTTOM {
                p.new_page();
                line_y = 30.0;
            }
            p.text(line, MARGIN_LEFT, line_y, BODY, Align::Left);
            line_y += lh;
        }
    }

    // Footers, now that the page count is final
    let count = p.pages.len();
    for (idx, page) in p.pages.iter_mut().enumerate() {
        page.push(DrawOp::Text {
            text: format!("Inv. {} | {} of {}", record.invoice_number, idx + 1, count),
            x: PAGE_WIDTH / 2.0,
            y: FOOTER_Y,
            align: Align::Center,
            font: Font::normal(8.0),
            color: FOOTER_GREY,
        });
    }

    (p.pages, notes_lines)
}
