use pulldown_cmark::{Event, html};
use std::io::{self, Write};

/// Bridge that streams a (rewritten) event iterator into an `io::Write`
/// without buffering the document.
///
/// Serialization goes through `pulldown_cmark`'s HTML writer, so frame
/// elements injected as raw-HTML events land in the output verbatim. The
/// writer is handed back unflushed; the caller decides when to finalize,
/// which matters when the destination is a streaming post-processor.
pub struct FragmentWriter<W> {
    writer: W,
}

impl<W: Write> FragmentWriter<W> {
    /// Creates a new bridge wrapping an IO writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the event iterator, drives the data into the writer, and
    /// returns the writer.
    pub fn drive<'a, I>(self, events: I) -> io::Result<W>
    where
        I: Iterator<Item = Event<'a>>,
    {
        let mut writer = self.writer;
        html::write_html_io(&mut writer, events)?;
        Ok(writer)
    }
}
