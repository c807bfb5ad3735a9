//! Paragraph-directive rewriting over the markdown event stream.

use std::collections::VecDeque;
use std::sync::OnceLock;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use regex::Regex;
use tracing::{debug, trace};

use crate::frame::{self, FrameStyle};
use crate::resolver::ResourceResolver;

/// Anchored pattern a paragraph's entire text content must match.
fn directive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^!iframe\[(.+)\]$").expect("directive pattern compiles"))
}

/// Extracts the trimmed resource identifier when `text` is exactly a frame
/// directive.
///
/// The paragraph text itself is not trimmed before matching; only the
/// captured argument is. `!iframe[]` never matches since the argument needs
/// at least one character, and the pattern never crosses line breaks.
pub fn parse_directive(text: &str) -> Option<&str> {
    let captures = directive_pattern().captures(text)?;
    Some(captures.get(1)?.as_str().trim())
}

/// Iterator adapter that replaces whole-paragraph frame directives with
/// embedded frame elements.
///
/// Each `Start(Paragraph) … End(Paragraph)` group is buffered and its text
/// content checked against the directive pattern. A matching group
/// collapses into a single raw-HTML frame event whose source comes from the
/// injected resolver; everything else is replayed unchanged, in order.
/// Frames produced by an earlier pass arrive as plain HTML events and pass
/// through untouched, so running the rewriter over its own output changes
/// nothing.
pub struct DirectiveRewriter<'a, I, R> {
    events: I,
    resolver: R,
    style: FrameStyle,
    replay: VecDeque<Event<'a>>,
}

impl<'a, I, R> DirectiveRewriter<'a, I, R>
where
    I: Iterator<Item = Event<'a>>,
    R: ResourceResolver,
{
    pub fn new(events: I, resolver: R, style: FrameStyle) -> Self {
        Self {
            events,
            resolver,
            style,
            replay: VecDeque::new(),
        }
    }

    /// Buffers one paragraph group (whose start event has already been
    /// taken) and queues either its replacement frame or the untouched
    /// group.
    fn rewrite_paragraph(&mut self, start: Event<'a>) {
        let mut group = vec![start];
        let mut text = String::new();
        // Alt text inside images is not part of the paragraph's text
        // content, so contributions are suppressed while inside one.
        let mut image_depth = 0usize;

        loop {
            let Some(event) = self.events.next() else {
                // Unterminated paragraph; replay what we have.
                self.replay.extend(group);
                return;
            };

            let done = matches!(event, Event::End(TagEnd::Paragraph));
            if !done {
                match &event {
                    Event::Start(Tag::Image { .. }) => image_depth += 1,
                    Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
                    Event::Text(chunk) | Event::Code(chunk) if image_depth == 0 => {
                        text.push_str(chunk);
                    }
                    // Breaks split the text content across lines, which the
                    // single-line anchored pattern never matches.
                    Event::SoftBreak | Event::HardBreak if image_depth == 0 => text.push('\n'),
                    _ => {}
                }
            }

            group.push(event);
            if done {
                break;
            }
        }

        match parse_directive(&text) {
            Some(identifier) => {
                let src = self.resolver.resolve(identifier);
                debug!(
                    identifier,
                    src = src.as_str(),
                    "rewriting paragraph directive into frame"
                );
                let markup = frame::build_frame(&src, &self.style);
                self.replay.push_back(Event::Html(CowStr::from(markup)));
            }
            None => {
                trace!("paragraph left untouched");
                self.replay.extend(group);
            }
        }
    }
}

impl<'a, I, R> Iterator for DirectiveRewriter<'a, I, R>
where
    I: Iterator<Item = Event<'a>>,
    R: ResourceResolver,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.replay.pop_front() {
                return Some(event);
            }

            match self.events.next()? {
                start @ Event::Start(Tag::Paragraph) => self.rewrite_paragraph(start),
                event => return Some(event),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::Parser;

    fn rewrite(input: &str) -> Vec<Event<'_>> {
        DirectiveRewriter::new(
            Parser::new(input),
            |identifier: &str| format!("resolved:{identifier}"),
            FrameStyle::default(),
        )
        .collect()
    }

    fn frame_sources(events: &[Event<'_>]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Html(html) if html.contains("<iframe") => {
                    let start = html.find("src=\"").map(|idx| idx + 5)?;
                    let end = html[start..].find('"').map(|idx| start + idx)?;
                    Some(html[start..end].to_string())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn whole_paragraph_directive_becomes_frame() {
        let events = rewrite("!iframe[diagram.svg]");

        assert_eq!(frame_sources(&events), vec!["resolved:diagram.svg"]);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::Start(Tag::Paragraph))),
            "the paragraph must be replaced, not annotated"
        );
    }

    #[test]
    fn argument_whitespace_is_trimmed() {
        let events = rewrite("!iframe[ report.pdf ]");

        assert_eq!(frame_sources(&events), vec!["resolved:report.pdf"]);
    }

    #[test]
    fn partial_line_directive_is_ignored() {
        let events = rewrite("Some !iframe[x.html] text");

        assert!(frame_sources(&events).is_empty());
        assert!(
            events
                .iter()
                .any(|event| matches!(event, Event::Start(Tag::Paragraph)))
        );
    }

    #[test]
    fn empty_argument_is_ignored() {
        let events = rewrite("!iframe[]");

        assert!(frame_sources(&events).is_empty());
    }

    #[test]
    fn whitespace_only_argument_resolves_empty_identifier() {
        // The argument has characters, so the pattern matches; trimming then
        // yields an empty identifier and the resolver decides what that
        // means. Mirrors the shipped behavior exactly.
        let events = rewrite("!iframe[   ]");

        assert_eq!(frame_sources(&events), vec!["resolved:"]);
    }

    #[test]
    fn sibling_order_is_preserved() {
        let events = rewrite("before\n\n!iframe[mid.html]\n\nafter");

        let rendering: Vec<String> = events
            .iter()
            .filter_map(|event| match event {
                Event::Text(text) => Some(text.to_string()),
                Event::Html(_) => Some("<frame>".to_string()),
                _ => None,
            })
            .collect();

        assert_eq!(rendering, vec!["before", "<frame>", "after"]);
    }

    #[test]
    fn only_matching_paragraphs_are_replaced() {
        let events = rewrite("!iframe[one.html]\n\njust text");

        assert_eq!(frame_sources(&events), vec!["resolved:one.html"]);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::Start(Tag::Paragraph)))
                .count(),
            1
        );
    }

    #[test]
    fn rewriting_is_stable_over_its_own_output() {
        let first: Vec<Event<'_>> = rewrite("!iframe[diagram.svg]\n\nplain");
        let second: Vec<Event<'_>> = DirectiveRewriter::new(
            first.clone().into_iter(),
            |identifier: &str| format!("resolved-again:{identifier}"),
            FrameStyle::default(),
        )
        .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn paragraphs_inside_blockquotes_are_rewritten() {
        let events = rewrite("> !iframe[quoted.html]");

        assert_eq!(frame_sources(&events), vec!["resolved:quoted.html"]);
    }

    #[test]
    fn text_content_spans_inline_markup() {
        // `<p>!iframe[<em>x.html</em>]</p>` has text content
        // `!iframe[x.html]`, so the paragraph is replaced just like the
        // rendered-tree implementation did.
        let events = rewrite("!iframe[*x.html*]");

        assert_eq!(frame_sources(&events), vec!["resolved:x.html"]);
    }

    #[test]
    fn image_alt_text_does_not_count() {
        let events = rewrite("!iframe[![x.html](pic.png)]");

        assert!(frame_sources(&events).is_empty());
    }

    #[test]
    fn multiline_paragraphs_never_match() {
        let events = rewrite("!iframe[a.html]\nmore");

        assert!(frame_sources(&events).is_empty());
    }

    #[test]
    fn greedy_capture_takes_the_last_bracket() {
        let events = rewrite("!iframe[a]b]");

        assert_eq!(frame_sources(&events), vec!["resolved:a]b"]);
    }

    #[test]
    fn parse_directive_edge_cases() {
        assert_eq!(parse_directive("!iframe[notes.pdf]"), Some("notes.pdf"));
        assert_eq!(parse_directive("!iframe[  notes.pdf  ]"), Some("notes.pdf"));
        assert_eq!(parse_directive("!iframe[]"), None);
        assert_eq!(parse_directive(" !iframe[notes.pdf]"), None);
        assert_eq!(parse_directive("!iframe[a\nb]"), None);
    }
}
