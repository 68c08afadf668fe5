/// Font faces available in the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
    Mono,
}

impl Face {
    /// Average glyph advance as a fraction of the font size.
    fn average_advance(&self) -> f32 {
        match self {
            Self::Regular => 0.5,
            Self::Bold => 0.55,
            Self::Mono => 0.6,
        }
    }
}

const MM_PER_PT: f32 = 25.4 / 72.0;

/// How many characters of `face` at `size` pt fit into `width_mm`.
pub fn chars_per_line(face: Face, size: f32, width_mm: f32) -> usize {
    let advance_mm = face.average_advance() * size * MM_PER_PT;
    ((width_mm / advance_mm).floor() as usize).max(1)
}

/// Splits text into display lines: explicit newlines are kept, long lines
/// break at the last space before the limit, or hard-break when a single
/// word is too long. Leading indentation survives.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut rest: Vec<char> = raw_line.trim_end_matches('\r').chars().collect();
        if rest.is_empty() {
            lines.push(String::new());
            continue;
        }

        while rest.len() > max_chars {
            let window = &rest[..=max_chars];
            let break_at = window
                .iter()
                .rposition(|c| *c == ' ')
                .filter(|pos| *pos > 0 && window[..*pos].iter().any(|c| *c != ' '));

            let (line, next_start) = match break_at {
                Some(pos) => (rest[..pos].iter().collect::<String>(), pos + 1),
                None => (rest[..max_chars].iter().collect::<String>(), max_chars),
            };
            lines.push(line.trim_end().to_string());
            rest = rest[next_start..].to_vec();
        }
        lines.push(rest.into_iter().collect());
    }

    lines
}

/// Encodes text for the standard Type1 fonts (WinAnsiEncoding). Characters
/// outside the code page become '?'.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| *c != '\u{FE0F}')
        .map(|c| match c {
            '\t' => b' ',
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) >= 0x20 && (c as u32) < 0x7F => c as u8,
            c if (c as u32) >= 0xA0 && (c as u32) <= 0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_short_lines_and_blank_lines() {
        let lines = wrap_text("SELECT\n\n    col_a,\n    col_b", 40);
        assert_eq!(lines, vec!["SELECT", "", "    col_a,", "    col_b"]);
    }

    #[test]
    fn test_wrap_breaks_on_spaces() {
        let lines = wrap_text("the quick brown fox jumps over", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over"]);
        assert!(lines.iter().all(|line| line.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_hard_breaks_long_words() {
        let lines = wrap_text("abcdefghijklmnop", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "klmno", "p"]);
    }

    #[test]
    fn test_wrap_does_not_break_inside_indentation() {
        let lines = wrap_text("        aaaaaaaaaaaa", 10);
        assert!(lines.iter().all(|line| line.chars().count() <= 10));
        assert_eq!(lines.concat().replace(' ', ""), "aaaaaaaaaaaa");
    }

    #[test]
    fn test_chars_per_line_fits_fewer_mono_glyphs() {
        let mono = chars_per_line(Face::Mono, 10.0, 170.0);
        let regular = chars_per_line(Face::Regular, 10.0, 170.0);
        assert!(mono < regular);
        assert_eq!(chars_per_line(Face::Mono, 8.0, 170.0), 100);
    }

    #[test]
    fn test_win_ansi_replaces_unsupported_characters() {
        assert_eq!(to_win_ansi("Caf\u{e9} \u{2022} ok"), b"Caf\xe9 \x95 ok".to_vec());
        assert_eq!(to_win_ansi("\u{2705} Passed"), b"? Passed".to_vec());
    }
}
