//! Minimal server-rendered HTML.

use std::borrow::Cow;

pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

pub fn escape_attribute(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Wraps a page body, showing the flash message above it when present
pub fn layout(title: &str, flash: Option<&str>, body: &str) -> String {
    let flash = flash
        .map(|message| format!("<p class=\"flash\">{}</p>\n", escape(message)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}{}\n</body>\n</html>\n",
        escape(title),
        flash,
        body
    )
}

/// Form action carrying the authenticity token in its query string
pub fn form_action(path: &str, token: &str) -> String {
    escape_attribute(&format!("{}?authenticity_token={}", path, token)).into_owned()
}
