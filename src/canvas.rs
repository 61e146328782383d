//! The drawing capability the renderer is written against.

use crate::error::RenderError;
use crate::text;
pub use crate::text::{Font, FontWeight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor(0, 0, 0);
    pub const WHITE: RgbColor = RgbColor(255, 255, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Page coordinates are millimetres from the top-left corner; text is placed
/// at its baseline. Every canvas starts with one empty page.
pub trait Canvas {
    fn set_font(&mut self, font: Font);
    fn set_fill_color(&mut self, color: RgbColor);
    fn set_text_color(&mut self, color: RgbColor);
    fn text(&mut self, text: &str, x: f32, y: f32, align: Align);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn add_page(&mut self) -> Result<(), RenderError>;

    fn text_width(&self, text: &str, font: Font) -> f32 {
        text::text_width(text, font)
    }

    fn split_text_to_size(&self, text: &str, font: Font, max_width: f32) -> Vec<String> {
        text::split_text_to_size(text, max_width, |s| self.text_width(s, font))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        align: Align,
        font: Font,
        color: RgbColor,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: RgbColor,
    },
}

/// Keeps every draw call, grouped by page.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    pages: Vec<Vec<DrawOp>>,
    font: Font,
    fill: RgbColor,
    text_color: RgbColor,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        RecordingCanvas {
            pages: vec![Vec::new()],
            font: Font::normal(12.0),
            fill: RgbColor::BLACK,
            text_color: RgbColor::BLACK,
        }
    }
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    /// Text ops of one page, in drawing order.
    pub fn texts(&self, page: usize) -> Vec<&str> {
        self.pages
            .get(page)
            .map(|ops| {
                ops.iter()
                    .filter_map(|op| match op {
                        DrawOp::Text { text, .. } => Some(text.as_str()),
                        DrawOp::Rect { .. } => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn all_texts(&self) -> Vec<&str> {
        (0..self.pages.len()).flat_map(|p| self.texts(p)).collect()
    }

    pub fn find_text(&self, needle: &str) -> Option<&DrawOp> {
        self.pages.iter().flatten().find(|op| match op {
            DrawOp::Text { text, .. } => text == needle,
            DrawOp::Rect { .. } => false,
        })
    }

    // `pages` starts with one page and only grows
    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }
}

impl Canvas for RecordingCanvas {
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
        let op = DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            align,
            font: self.font,
            color: self.text_color,
        };
        self.push(op);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let op = DrawOp::Rect {
            x,
            y,
            width,
            height,
            color: self.fill,
        };
        self.push(op);
    }

    fn add_page(&mut self) -> Result<(), RenderError> {
        self.pages.push(Vec::new());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_calls_land_on_the_latest_page() {
        let mut canvas = RecordingCanvas::new();
        canvas.text("first", 20.0, 20.0, Align::Left);
        canvas.add_page().unwrap();
        canvas.fill_rect(20.0, 30.0, 170.0, 10.0);
        canvas.text("second", 20.0, 40.0, Align::Left);

        assert_eq!(canvas.pages().len(), 2);
        assert_eq!(canvas.texts(0), vec!["first"]);
        assert_eq!(canvas.texts(1), vec!["second"]);
        assert_eq!(canvas.pages()[1].len(), 2);
    }

    #[test]
    fn ops_keep_the_current_font_and_colours() {
        let mut canvas = RecordingCanvas::new();
        canvas.set_font(Font::bold(16.0));
        canvas.set_text_color(RgbColor(128, 128, 128));
        canvas.text("x", 0.0, 0.0, Align::Right);
        match canvas.find_text("x") {
            Some(DrawOp::Text { font, color, align, .. }) => {
                assert_eq!(*font, Font::bold(16.0));
                assert_eq!(*color, RgbColor(128, 128, 128));
                assert_eq!(*align, Align::Right);
            }
            other => panic!("unexpected op: {other:?}"),
        }
    }
}
