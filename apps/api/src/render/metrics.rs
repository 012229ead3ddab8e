//! Static Helvetica metrics for letter layout.
//!
//! Widths are AFM units (thousandths of an em at the rendered font size),
//! covering ASCII 0x20..=0x7E; anything outside the table falls back to
//! `AVERAGE_WIDTH`. Index = (char as usize) - 32. Exact enough for line
//! breaking and word-spacing justification with a base-14 font — no
//! embedded font program to measure against.

/// Width of the space glyph, AFM units.
pub const SPACE_WIDTH: u16 = 278;

/// Fallback width for characters outside the table.
pub const AVERAGE_WIDTH: u16 = 556;

#[rustfmt::skip]
const WIDTHS: [u16; 95] = [
    //  sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
      278,  278,  355,  556,  556,  889,  667,  191,  333,  333,  389,  584,  278,  333,  278,  278,
    //  0     1     2     3     4     5     6     7     8     9     :     ;     <     =     >     ?
      556,  556,  556,  556,  556,  556,  556,  556,  556,  556,  278,  278,  584,  584,  584,  556,
    //  @     A     B     C     D     E     F     G     H     I     J     K     L     M     N     O
     1015,  667,  667,  722,  722,  667,  611,  778,  722,  278,  500,  667,  556,  833,  722,  778,
    //  P     Q     R     S     T     U     V     W     X     Y     Z     [     \     ]     ^     _
      667,  778,  722,  667,  611,  722,  667,  944,  667,  667,  611,  278,  278,  278,  469,  556,
    //  `     a     b     c     d     e     f     g     h     i     j     k     l     m     n     o
      333,  556,  556,  500,  556,  556,  278,  556,  556,  222,  222,  500,  222,  833,  556,  556,
    //  p     q     r     s     t     u     v     w     x     y     z     {     |     }     ~
      556,  556,  333,  500,  278,  556,  500,  722,  500,  500,  500,  334,  260,  334,  584,
];

fn char_width(c: char) -> u16 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        WIDTHS[code - 32]
    } else {
        AVERAGE_WIDTH
    }
}

/// Rendered width of a string in points at the given font size.
pub fn measure_str(s: &str, font_size: f32) -> f32 {
    let units: u32 = s.chars().map(|c| u32::from(char_width(c))).sum();
    units as f32 / 1000.0 * font_size
}

/// One wrapped line of a paragraph, ready for justification.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub width_pt: f32,
    /// Inter-word spaces in the line — the slots word-spacing stretches.
    pub space_count: usize,
    /// The last line of a paragraph is never justified.
    pub is_last: bool,
}

/// Greedy word wrap against a fixed text width. A single word wider than
/// the line is placed alone and allowed to overflow rather than dropped.
pub fn wrap_paragraph(text: &str, font_size: f32, max_width_pt: f32) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    let mut current = String::new();
    let space_width = f32::from(SPACE_WIDTH) / 1000.0 * font_size;

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate_width =
            measure_str(&current, font_size) + space_width + measure_str(word, font_size);
        if candidate_width <= max_width_pt {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(finish_line(current, font_size, false));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(finish_line(current, font_size, true));
    }
    lines
}

fn finish_line(text: String, font_size: f32, is_last: bool) -> Line {
    let width_pt = measure_str(&text, font_size);
    let space_count = text.chars().filter(|&c| c == ' ').count();
    Line {
        text,
        width_pt,
        space_count,
        is_last,
    }
}
