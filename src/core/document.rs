//! Document Positions
//!
//! Converts byte offsets into LSP positions. Columns are counted in UTF-16
//! code units, the protocol's default position encoding.

use tower_lsp::lsp_types::{Position, Range};

/// Position of the byte `offset` in `text`.
///
/// Offsets past the end are clamped to the end, offsets inside a multi-byte
/// character are moved back to its start. `\n`, `\r\n` and a lone `\r` all
/// end a line.
pub fn position_at(text: &str, offset: usize) -> Position {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let mut line = 0u32;
    let mut character = 0u32;
    let mut chars = text[..offset].chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                line += 1;
                character = 0;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                character = 0;
            }
            _ => character += c.len_utf16() as u32,
        }
    }

    Position { line, character }
}

/// Range covering all of `text`, from offset 0 to its length
pub fn whole_document_range(text: &str) -> Range {
    Range {
        start: position_at(text, 0),
        end: position_at(text, text.len()),
    }
}
