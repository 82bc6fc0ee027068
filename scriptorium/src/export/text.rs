//! Plain-text export: strip the markup, UTF-8 bytes.

use crate::markup;

pub fn render(markup: &str) -> Vec<u8> {
    markup::strip_markup(markup).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_strips_markup() {
        let bytes = render("<h1>Title</h1><p>Body &amp; more</p>");
        assert_eq!(String::from_utf8(bytes).unwrap(), "Title\nBody & more");
    }

    #[test]
    fn test_render_empty_document() {
        assert!(render("").is_empty());
    }
}
