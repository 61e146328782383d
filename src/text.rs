//! Font metrics for the built-in Helvetica faces and width-aware line
//! breaking. All widths are in millimetres.

pub const PT_TO_MM: f32 = 25.4 / 72.0;
const LINE_HEIGHT_FACTOR: f32 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub weight: FontWeight,
    pub size: f32, // points
}

impl Font {
    pub const fn normal(size: f32) -> Self {
        Font { weight: FontWeight::Normal, size }
    }

    pub const fn bold(size: f32) -> Self {
        Font { weight: FontWeight::Bold, size }
    }

    /// Baseline-to-baseline distance for this size.
    pub fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT_FACTOR * PT_TO_MM
    }
}

// Advance widths (1/1000 em) for ' '..='~', from the Adobe core AFM files.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const FALLBACK_WIDTH: u16 = 556;

fn char_units(c: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Normal => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };
    match c {
        ' '..='~' => table[c as usize - 32],
        _ => FALLBACK_WIDTH,
    }
}

pub fn text_width(text: &str, font: Font) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_units(c, font.weight))).sum();
    units as f32 / 1000.0 * font.size * PT_TO_MM
}

/// Greedy word wrap. Hard newlines start a new line, a word wider than
/// `max_width` is split by character, and blank input gives no lines.
pub fn split_text_to_size<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure(word) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, max_width, &measure);
                // the tail keeps collecting following words
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        lines.push(current);
    }

    // trailing blank lines only waste vertical space
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn break_word<F>(word: &str, max_width: f32, measure: &F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if measure(&current) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    pieces.push(current);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wrap(text: &str, width: f32) -> Vec<String> {
        let font = Font::normal(10.0);
        split_text_to_size(text, width, |s| text_width(s, font))
    }

    #[test]
    fn widths_follow_the_afm_tables() {
        // "i" is narrow, "W" is wide
        assert!(text_width("iiii", Font::normal(10.0)) < text_width("WWWW", Font::normal(10.0)));
        // bold is never narrower for the letters we use
        assert!(text_width("Invoice", Font::bold(10.0)) > text_width("Invoice", Font::normal(10.0)));
        let w = text_width("0", Font::normal(72.0));
        assert!((w - 0.556 * 25.4).abs() < 1e-3);
    }

    #[test]
    fn blank_text_has_no_lines() {
        assert!(wrap("", 50.0).is_empty());
        assert!(wrap("  \n ", 50.0).is_empty());
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap("Flat 4, MG Road", 70.0), vec!["Flat 4, MG Road".to_string()]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda";
        let lines = wrap(text, 40.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::normal(10.0)) <= 40.0, "{line} too wide");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn keeps_hard_newlines() {
        assert_eq!(
            wrap("line one\n\nline three", 100.0),
            vec!["line one".to_string(), String::new(), "line three".to_string()]
        );
    }

    #[test]
    fn splits_overlong_words() {
        let word = "x".repeat(80);
        let lines = wrap(&word, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, Font::normal(10.0)) <= 20.0);
        }
    }

    #[test]
    fn line_height_scales_with_size() {
        assert!((Font::normal(10.0).line_height() - 10.0 * 1.15 * PT_TO_MM).abs() < 1e-6);
        assert!(Font::normal(12.0).line_height() > Font::normal(9.0).line_height());
    }
}
