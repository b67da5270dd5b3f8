/// Ordered bit sequence; index order is transmission order.
pub type BitStream = Vec<bool>;

/// Format bits as `0`/`1` in groups of four, `per_line` bits per line.
pub fn format_bits(bits: &[bool], per_line: usize) -> String {
    let per_line = per_line.max(4);
    let mut out = String::with_capacity(bits.len() * 2);
    for (i, &bit) in bits.iter().enumerate() {
        if i > 0 {
            if i % per_line == 0 {
                out.push('\n');
            } else if i % 4 == 0 {
                out.push(' ');
            }
        }
        out.push(if bit { '1' } else { '0' });
    }
    out
}

/// Parse a `0`/`1` string, ignoring every other character.
pub fn parse_bits(text: &str) -> BitStream {
    text.chars()
        .filter_map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}
