//! Rewrites whole-paragraph `!iframe[identifier]` directives in rendered
//! note fragments into embedded frame elements.
//!
//! The pipeline parses one markdown fragment, replaces matching paragraph
//! groups through [`DirectiveRewriter`], serializes the events back to HTML,
//! and runs a streaming lol_html pass over the result:
//!
//! ```text
//! &str → Parser → DirectiveRewriter → FragmentWriter → StreamingPostprocessor → sink
//! ```
//!
//! Hosts inject a [`ResourceResolver`] that maps the directive argument to a
//! locator; everything else about resource lookup stays on the host side.

mod adapter;
mod directive;
mod error;
mod frame;
mod postprocess;
mod resolver;

pub use adapter::FragmentWriter;
pub use directive::{DirectiveRewriter, parse_directive};
pub use error::RenderError;
pub use frame::{FrameStyle, build_frame};
pub use postprocess::StreamingPostprocessor;
pub use resolver::{BaseUrlResolver, ResourceResolver};

use pulldown_cmark::{Event, Options, Parser};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Version string reported to host bindings.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Top-level pipeline configuration, deserializable from the host's plain
/// options object. Missing fields fall back to the shipped defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Visual configuration for injected frames.
    pub frame: FrameStyle,
    /// When enabled, frames missing a `loading` attribute default to
    /// `lazy` during the post-pass.
    pub lazy_frames: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            frame: FrameStyle::default(),
            lazy_frames: true,
        }
    }
}

/// Splices the directive rewriter into an existing event pipeline.
///
/// For hosts that already run their own `pulldown_cmark` event stream and
/// only want the paragraph-directive replacement step.
pub fn rewrite_events<'a, I, R>(
    events: I,
    resolver: R,
    style: FrameStyle,
) -> DirectiveRewriter<'a, I, R>
where
    I: Iterator<Item = Event<'a>>,
    R: ResourceResolver,
{
    DirectiveRewriter::new(events, resolver, style)
}

/// Renders one markdown fragment to an HTML string with directives
/// rewritten.
pub fn render_fragment<R>(
    input: &str,
    resolver: &R,
    options: &RewriteOptions,
) -> Result<String, RenderError>
where
    R: ResourceResolver,
{
    let output = stream_fragment(input, resolver, options, Vec::new())?;
    String::from_utf8(output)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
}

/// Streams one rendered fragment into `writer`, returning the writer after
/// the post-pass has finalized and flushed.
pub fn stream_fragment<R, W>(
    input: &str,
    resolver: &R,
    options: &RewriteOptions,
    writer: W,
) -> Result<W, RenderError>
where
    R: ResourceResolver,
    W: Write,
{
    let parser = Parser::new_ext(input, parser_options());
    let rewritten = DirectiveRewriter::new(
        parser,
        |identifier: &str| resolver.resolve(identifier),
        options.frame.clone(),
    );

    let postprocessor = StreamingPostprocessor::new(writer, options);
    let postprocessor = FragmentWriter::new(postprocessor).drive(rewritten)?;
    postprocessor.into_inner()
}

/// Markdown extensions the note host exposes.
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}
