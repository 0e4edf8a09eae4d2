//! Utilities for writing C literals
//!
//!
use objdict_common::objects::format_float;

/// Wrap a list of element literals in braces, e.g. `{0x01U, 0x02U}`
pub fn brace_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<S> = items.into_iter().collect();
    let joined = items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
    format!("{{{joined}}}")
}

/// Write an integer as a hex literal, with a `U` suffix when `unsigned` is set
pub fn hex_literal(value: i128, unsigned: bool) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let suffix = if unsigned { "U" } else { "" };
    format!("{sign}0x{:x}{suffix}", value.unsigned_abs())
}

/// Write a float literal, with an `f` suffix when `single` is set
pub fn float_literal(value: f64, single: bool) -> String {
    let suffix = if single { "f" } else { "" };
    format!("{}{suffix}", format_float(value))
}

/// Write a byte as a C character constant
pub fn char_literal(byte: u8) -> String {
    match byte {
        b'\'' => r"'\''".to_string(),
        b'\\' => r"'\\'".to_string(),
        b'\n' => r"'\n'".to_string(),
        b'\r' => r"'\r'".to_string(),
        b'\t' => r"'\t'".to_string(),
        0 => r"'\0'".to_string(),
        0x20..=0x7e => format!("'{}'", byte as char),
        _ => format!(r"'\x{byte:02x}'"),
    }
}
