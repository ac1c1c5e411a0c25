use std::collections::{HashMap, HashSet};

use pulldown_cmark::TagEnd;

/// Renders a module description to sanitized HTML.
#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let mut options = pulldown_cmark::Options::empty();
    options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
    options.insert(pulldown_cmark::Options::ENABLE_TABLES);

    let parser = pulldown_cmark::Parser::new_ext(input, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "br", "em", "strong", "del", "code", "pre", "blockquote", "ul", "ol", "li", "a", "h3",
        "h4", "table", "thead", "tbody", "tr", "th", "td",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .url_schemes(["http", "https", "mailto"].into_iter().collect())
        .clean(html)
        .to_string()
}

/// Plain-text preview of a Markdown description for catalog cards.
#[must_use]
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut text = String::new();
    for event in parser {
        match event {
            pulldown_cmark::Event::Text(chunk) | pulldown_cmark::Event::Code(chunk) => {
                text.push_str(&chunk);
            }
            pulldown_cmark::Event::SoftBreak
            | pulldown_cmark::Event::HardBreak
            | pulldown_cmark::Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item,
            ) => {
                if !text.ends_with(' ') && !text.is_empty() {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }

    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::{excerpt, markdown_to_html};

    #[test]
    fn markdown_to_html_sanitizes_links() {
        let html = markdown_to_html("[Link](javascript:alert(1))");
        assert!(html.contains("Link"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn markdown_to_html_drops_raw_script_tags() {
        let html = markdown_to_html("Intro\n\n<script>alert(1)</script>\n\n**bold**");
        assert!(!html.contains("<script"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn excerpt_flattens_markup_and_truncates() {
        let text = excerpt("# Goals\n\nBuild **rapport** with\nlearners.", 100);
        assert_eq!(text, "Goals Build rapport with learners.");

        let short = excerpt("Questioning techniques for mixed-ability classrooms", 11);
        assert_eq!(short, "Questioning…");
    }
}
