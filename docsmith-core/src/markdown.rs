use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Render raw markdown to HTML with the default syntect highlighter.
pub fn render_markdown(content: &str) -> String {
    render_markdown_with(content, syntect_highlight)
}

/// Render raw markdown to HTML, routing fenced code blocks through the given
/// highlight callback. A `None` from the callback falls back to an escaped
/// `<pre><code>` block.
pub fn render_markdown_with<F>(content: &str, highlight: F) -> String
where
    F: Fn(&str, &str) -> Option<String>,
{
    let options = Options::all();
    let parser = Parser::new_ext(content, options);

    let events: Vec<Event> = parser.collect();
    let mut processed_events = Vec::new();
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                // Collect all text events until the end of the code block
                let lang = lang.to_string();
                let mut code_content = String::new();
                i += 1; // Skip the start event

                while i < events.len() {
                    match &events[i] {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => code_content.push_str(text),
                        _ => {} // Ignore other events inside code blocks
                    }
                    i += 1;
                }

                let highlighted_html = highlight(&code_content, &lang).unwrap_or_else(|| {
                    format!(
                        "<pre><code>{}</code></pre>",
                        html_escape::encode_text(&code_content)
                    )
                });

                processed_events.push(Event::Html(highlighted_html.into()));
            }
            event => {
                processed_events.push(event.clone());
            }
        }
        i += 1;
    }

    let mut out = String::new();
    html::push_html(&mut out, processed_events.into_iter());

    out
}

fn syntect_highlight(code: &str, lang: &str) -> Option<String> {
    let syntax = SYNTAX_SET.find_syntax_by_token(lang)?;
    let theme = &THEME_SET.themes["base16-ocean.dark"];

    highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme).ok()
}
