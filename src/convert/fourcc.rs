//! Printable form of a codec tag

/// Render a little-endian four-character code.
///
/// Alphanumerics and `.`, ` `, `-`, `_` are kept; every other byte is written
/// as its decimal value in brackets. Least significant byte first.
pub fn codec_tag_string(tag: u32) -> String {
    let mut rendered = String::with_capacity(4);
    for byte in tag.to_le_bytes() {
        let printable = byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b' ' | b'-' | b'_');
        if printable {
            rendered.push(byte as char);
        } else {
            rendered.push_str(&format!("[{}]", byte));
        }
    }
    rendered
}
