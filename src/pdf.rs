//! `Canvas` backed by printpdf and the built-in Helvetica faces.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect, Rgb,
};

use crate::canvas::{Align, Canvas, Font, FontWeight, RgbColor};
use crate::error::RenderError;
use crate::layout::{PAGE_HEIGHT, PAGE_WIDTH};
use crate::text;

const LAYER_NAME: &str = "Layer 1";

pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    font: Font,
    fill: RgbColor,
    text_color: RgbColor,
}

impl PdfCanvas {
    pub fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        Ok(PdfCanvas {
            doc,
            layer,
            regular,
            bold,
            font: Font::normal(12.0),
            fill: RgbColor::BLACK,
            text_color: RgbColor::BLACK,
        })
    }

    /// Serializes the document. Nothing touches the disk here.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| RenderError::Pdf(e.to_string()))
    }

    fn paint(&self, color: RgbColor) {
        self.layer.set_fill_color(to_pdf_color(color));
    }
}

fn to_pdf_color(RgbColor(r, g, b): RgbColor) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// The built-in fonts only cover Latin-1. The rupee sign gets a textual
/// stand-in, anything else outside the range becomes '?'.
pub fn builtin_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '₹' => out.push_str("Rs."),
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

impl Canvas for PdfCanvas {
    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn set_fill_color(&mut self, color: RgbColor) {
        self.fill = color;
    }

    fn set_text_color(&mut self, color: RgbColor) {
        self.text_color = color;
    }

    fn text(&mut self, text: &str, x: f32, y: f32, align: Align) {
        let safe = builtin_safe(text);
        let width = text::text_width(&safe, self.font);
        let left = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let face = match self.font.weight {
            FontWeight::Normal => &self.regular,
            FontWeight::Bold => &self.bold,
        };
        // PDF text is painted with the fill colour
        self.paint(self.text_color);
        self.layer
            .use_text(safe, self.font.size, Mm(left), Mm(PAGE_HEIGHT - y), face);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.paint(self.fill);
        let rect = Rect::new(
            Mm(x),
            Mm(PAGE_HEIGHT - (y + height)),
            Mm(x + width),
            Mm(PAGE_HEIGHT - y),
        )
        .with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
    }

    fn add_page(&mut self) -> Result<(), RenderError> {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        Ok(())
    }

    fn text_width(&self, text: &str, font: Font) -> f32 {
        text::text_width(&builtin_safe(text), font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupee_sign_is_spelled_out() {
        assert_eq!(builtin_safe("Total: ₹245.00"), "Total: Rs.245.00");
        assert_eq!(builtin_safe("Café"), "Café");
        assert_eq!(builtin_safe("日本"), "??");
    }

    #[test]
    fn measures_what_it_draws() {
        let canvas = PdfCanvas::new("test").unwrap();
        let font = Font::normal(10.0);
        assert_eq!(canvas.text_width("₹5", font), text::text_width("Rs.5", font));
    }

    #[test]
    fn produces_a_pdf() {
        let mut canvas = PdfCanvas::new("test").unwrap();
        canvas.set_fill_color(RgbColor(245, 245, 245));
        canvas.fill_rect(20.0, 130.0, 170.0, 10.0);
        canvas.set_font(Font::bold(10.0));
        canvas.text("Description", 25.0, 137.0, Align::Left);
        canvas.add_page().unwrap();
        canvas.text("Total: ₹1.00", 188.0, 40.0, Align::Right);
        let bytes = canvas.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
