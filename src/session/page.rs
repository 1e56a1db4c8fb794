//! Pre-rendered page values shown by a pagination session

use serde::Serialize;

/// One pre-rendered page of a paginated message
///
/// The engine never inspects the embed payload; it is carried opaquely and
/// handed to the transport unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub content: String,
    pub embed: Option<serde_json::Value>,
}

impl Page {
    /// Create a text-only page
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embed: None,
        }
    }

    /// Attach an embed payload to this page
    pub fn with_embed(mut self, embed: serde_json::Value) -> Self {
        self.embed = Some(embed);
        self
    }

    /// Split a long text into pages of at most `chars_per_page` characters
    ///
    /// Splits on character boundaries. An empty input yields no pages.
    pub fn paginate_text(text: &str, chars_per_page: usize) -> Vec<Page> {
        let chars_per_page = chars_per_page.max(1);
        let mut pages = Vec::new();
        let mut current = String::new();
        let mut count = 0;

        for ch in text.chars() {
            current.push(ch);
            count += 1;
            if count == chars_per_page {
                pages.push(Page::new(std::mem::take(&mut current)));
                count = 0;
            }
        }

        if !current.is_empty() {
            pages.push(Page::new(current));
        }

        pages
    }

    /// Split a text into pages of at most `lines_per_page` lines
    ///
    /// An empty input yields no pages.
    pub fn paginate_lines(text: &str, lines_per_page: usize) -> Vec<Page> {
        let lines_per_page = lines_per_page.max(1);
        let lines: Vec<&str> = text.lines().collect();

        lines
            .chunks(lines_per_page)
            .map(|chunk| Page::new(chunk.join("\n")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_text_splits_on_char_boundaries() {
        let pages = Page::paginate_text("abcdefgh", 3);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].content, "abc");
        assert_eq!(pages[1].content, "def");
        assert_eq!(pages[2].content, "gh");
    }

    #[test]
    fn test_paginate_text_handles_multibyte_chars() {
        let pages = Page::paginate_text("日本語テキスト", 2);
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0].content, "日本");
        assert_eq!(pages[3].content, "ト");
    }

    #[test]
    fn test_paginate_text_empty_input() {
        assert!(Page::paginate_text("", 10).is_empty());
    }

    #[test]
    fn test_paginate_text_zero_width_clamps_to_one() {
        let pages = Page::paginate_text("ab", 0);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_paginate_lines_groups_lines() {
        let pages = Page::paginate_lines("a\nb\nc\nd\ne", 2);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].content, "a\nb");
        assert_eq!(pages[2].content, "e");
    }

    #[test]
    fn test_page_with_embed() {
        let page = Page::new("hello").with_embed(serde_json::json!({"title": "t"}));
        assert_eq!(page.content, "hello");
        assert!(page.embed.is_some());
    }
}
