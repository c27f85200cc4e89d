use crate::foundation::core::Rgba8;

/// Parse `#RRGGBB` or `#RRGGBBAA` (the `#` is optional, digits are case-insensitive).
///
/// Six digits imply full opacity. Any other length or a non-hex digit yields opaque black.
pub fn parse_hex_color(s: &str) -> Rgba8 {
    try_parse_hex(s).unwrap_or(Rgba8::BLACK)
}

fn try_parse_hex(s: &str) -> Option<Rgba8> {
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    fn hex_byte(pair: &str) -> Option<u8> {
        u8::from_str_radix(pair, 16).ok()
    }

    match s.len() {
        6 => Some(Rgba8::opaque(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Some(Rgba8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => None,
    }
}
