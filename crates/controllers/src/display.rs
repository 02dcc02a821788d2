//! Error display seam and response body formatting.

use std::io::Cursor;

use quick_xml::{events::Event, Reader, Writer};
use shared::error::HttpErrorResponse;

/// Renders a failed HTTP-shaped response to the user. Fire-and-forget.
pub trait ErrorDisplay: Send + Sync {
    fn open_error_http_response_modal(&self, response: &HttpErrorResponse);
}

/// Pretty prints a response body that is potentially XML or JSON.
///
/// Input starting with `<` is treated as XML, anything else as JSON. Input
/// that is not well formed is returned as is.
pub fn pretty_print_json_or_xml(input: &str) -> String {
    let result = if input.trim_start().starts_with('<') {
        pretty_print_xml(input)
    } else {
        pretty_print_json(input)
    };
    result.unwrap_or_else(|| input.to_string())
}

fn pretty_print_json(input: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(input).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

fn pretty_print_xml(input: &str) -> Option<String> {
    let mut reader = Reader::from_str(input);
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            // Whitespace between elements is replaced by the indentation.
            Ok(Event::Text(text)) if text.iter().all(u8::is_ascii_whitespace) => {}
            Ok(event) => writer.write_event(event).ok()?,
            Err(_) => return None,
        }
    }

    String::from_utf8(writer.into_inner().into_inner()).ok()
}
