use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Relative destinations and the schemes in `SAFE_SCHEMES` pass.
///
/// Browsers ignore whitespace and control characters inside a scheme, so
/// they are dropped before the scheme is read.
fn is_safe_destination(dest: &str) -> bool {
    let cleaned: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match cleaned.find([':', '/', '?', '#']) {
        Some(idx) if cleaned[idx..].starts_with(':') => {
            let scheme = cleaned[..idx].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

fn sanitize_destination(dest: CowStr<'_>) -> CowStr<'_> {
    if is_safe_destination(&dest) {
        dest
    } else {
        CowStr::Borrowed("#")
    }
}

/// Renders bug descriptions and notes.
///
/// Built once at startup and shared through `AppState`. Raw HTML in the
/// source is escaped rather than passed through, and link or image
/// destinations with an unsafe scheme are replaced by `#`.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options }
    }

    pub fn render(&self, source: &str) -> String {
        let parser = Parser::new_ext(source, self.options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: sanitize_destination(dest_url),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: sanitize_destination(dest_url),
                title,
                id,
            }),
            other => other,
        });

        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic() {
        let renderer = MarkdownRenderer::new();
        let output = renderer.render("# Crash\n\nSeen in **prod**");

        assert!(output.contains("<h1>Crash</h1>"));
        assert!(output.contains("<strong>prod</strong>"));
    }

    #[test]
    fn test_render_extensions() {
        let renderer = MarkdownRenderer::new();

        let output = renderer.render("~~gone~~");
        assert!(output.contains("<del>gone</del>"));

        let output = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(output.contains("<table>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let renderer = MarkdownRenderer::new();
        let output = renderer.render("before <script>alert(1)</script> after");

        assert!(!output.contains("<script>"));
        assert!(output.contains("&lt;script&gt;"));
    }

    /// Every `href`/`src` value in the rendered output
    fn destinations(html: &str) -> Vec<String> {
        ["href=\"", "src=\""]
            .iter()
            .flat_map(|attr| html.split(attr).skip(1))
            .map(|rest| rest.split('"').next().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_script_links_are_neutralised() {
        let renderer = MarkdownRenderer::new();

        for source in [
            "[x](javascript:alert(1))",
            "[x](JaVaScRiPt:alert(1))",
            "[x](&#106;avascript:alert(1))",
            "[x](javascript&#58;alert(1))",
            "[x](java&#x09;script:alert(1))",
            "[x](<java script:alert(1)>)",
            "<javascript:alert(1)>",
            "![x](data:text/html;base64,PHNjcmlwdD4=)",
            "[x][ref]\n\n[ref]: vbscript:msgbox(1)",
        ] {
            let output = renderer.render(source);
            let found = destinations(&output);

            assert_eq!(found, vec!["#".to_string()], "{} rendered {}", source, output);
        }

        let output = renderer.render("[x](javascript:alert(1))");
        assert!(output.contains("<a href=\"#\">x</a>"));
    }

    #[test]
    fn test_safe_links_are_kept() {
        let renderer = MarkdownRenderer::new();

        let output = renderer.render("[docs](https://example.com/a?b=c)");
        assert!(output.contains("href=\"https://example.com/a?b=c\""));

        let output = renderer.render("[bug](/projects/web/environments/production/bugs/3)");
        assert!(output.contains("href=\"/projects/web/environments/production/bugs/3\""));

        let output = renderer.render("[mail](mailto:ops@example.com)");
        assert!(output.contains("href=\"mailto:ops@example.com\""));

        let output = renderer.render("[notes](docs/a:b)");
        assert!(output.contains("href=\"docs/a:b\""));
    }

    #[test]
    fn test_is_safe_destination() {
        assert!(is_safe_destination("https://example.com"));
        assert!(is_safe_destination("HTTP://example.com"));
        assert!(is_safe_destination("#anchor"));
        assert!(is_safe_destination("?page=2"));
        assert!(is_safe_destination(""));
        assert!(!is_safe_destination("javascript:alert(1)"));
        assert!(!is_safe_destination(" java\tscript:alert(1)"));
        assert!(!is_safe_destination("data:text/html,hi"));
    }
}
