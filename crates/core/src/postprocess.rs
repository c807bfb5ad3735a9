//! Streaming lol_html pass that tidies frame elements after serialization.

use lol_html::{HtmlRewriter, OutputSink, Selector, Settings, element};
use std::borrow::Cow;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::RewriteOptions;
use crate::error::RenderError;

/// `io::Write` façade over a lol_html rewriter that forwards rewritten
/// output into a destination writer.
///
/// The handler set is frame hygiene: frame elements missing a `loading`
/// attribute default to `lazy`, whether the directive rewriter injected
/// them or a note author wrote one as raw HTML. Gated by
/// [`RewriteOptions::lazy_frames`].
///
/// The destination is shared with lol_html's output sink through a single
/// `Rc<RefCell<Option<W>>>`, the only heap allocation needed to satisfy the
/// `OutputSink` trait without buffering rewritten chunks.
pub struct StreamingPostprocessor<W: Write> {
    rewriter: Option<HtmlRewriter<'static, SinkProxy<W>>>,
    destination: Rc<RefCell<Option<W>>>,
    sink_error: Rc<RefCell<Option<io::Error>>>,
}

impl<W: Write> StreamingPostprocessor<W> {
    /// Creates a post-processor that forwards into `writer` while applying
    /// the handlers `options` selects.
    pub fn new(writer: W, options: &RewriteOptions) -> Self {
        let destination = Rc::new(RefCell::new(Some(writer)));
        let sink_error = Rc::new(RefCell::new(None));
        let sink = SinkProxy {
            destination: Rc::clone(&destination),
            sink_error: Rc::clone(&sink_error),
        };

        Self {
            rewriter: Some(HtmlRewriter::new(settings_for(options), sink)),
            destination,
            sink_error,
        }
    }

    /// Ends the rewrite, flushes the destination writer, and hands it back.
    pub fn into_inner(mut self) -> Result<W, RenderError> {
        if let Some(rewriter) = self.rewriter.take() {
            rewriter
                .end()
                .map_err(|err| RenderError::Rewrite(err.to_string()))?;
        }
        take_sink_error(&self.sink_error)?;

        let cell = Rc::try_unwrap(self.destination)
            .map_err(|_| RenderError::Io(io::Error::other("destination still borrowed")))?;
        let mut writer = cell.into_inner().ok_or_else(|| {
            RenderError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "writer missing"))
        })?;

        writer.flush()?;
        Ok(writer)
    }
}

impl<W: Write> Write for StreamingPostprocessor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let rewriter = self.rewriter.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "post-pass already finalized")
        })?;

        rewriter.write(buf).map_err(io::Error::other)?;
        take_sink_error(&self.sink_error)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // lol_html holds no flushable buffer mid-stream; finalization
        // happens in `into_inner`.
        Ok(())
    }
}

fn take_sink_error(cell: &Rc<RefCell<Option<io::Error>>>) -> io::Result<()> {
    match cell.borrow_mut().take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn settings_for(options: &RewriteOptions) -> Settings<'static, 'static> {
    let mut settings = Settings::default();
    if options.lazy_frames {
        settings.element_content_handlers = vec![lazy_frame_handler()];
    }
    settings
}

fn lazy_frame_handler() -> (
    Cow<'static, Selector>,
    lol_html::ElementContentHandlers<'static>,
) {
    element!("iframe", |el| {
        if el.get_attribute("loading").is_none() {
            el.set_attribute("loading", "lazy")?;
        }

        Ok(())
    })
}

struct SinkProxy<W: Write> {
    destination: Rc<RefCell<Option<W>>>,
    sink_error: Rc<RefCell<Option<io::Error>>>,
}

impl<W: Write> OutputSink for SinkProxy<W> {
    fn handle_chunk(&mut self, chunk: &[u8]) {
        if chunk.is_empty() || self.sink_error.borrow().is_some() {
            return;
        }

        if let Some(writer) = self.destination.borrow_mut().as_mut() {
            if let Err(err) = writer.write_all(chunk) {
                *self.sink_error.borrow_mut() = Some(err);
            }
        }
    }
}
