//! Display surface driven by the job controller.
//!
//! A [`JobView`] stands in for the hosting page: a status element whose text
//! is overwritten, and a document body that images are appended to. The
//! controller is the only writer.

use std::io::{self, Write};

/// Identifier of the status element on the hosting page.
pub const STATUS_ELEMENT_ID: &str = "job-status";

pub trait JobView {
    /// Replace the status element's text.
    fn set_status(&mut self, text: &str);

    /// Append an image element with the given source to the end of the body.
    fn append_image(&mut self, src: &str);
}

impl<V: JobView + ?Sized> JobView for &mut V {
    fn set_status(&mut self, text: &str) {
        (**self).set_status(text);
    }

    fn append_image(&mut self, src: &str) {
        (**self).append_image(src);
    }
}

/// Line-oriented view that writes each update to a terminal or other sink.
pub struct TerminalView<W: Write> {
    out: W,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: std::fmt::Arguments<'_>) {
        let result = self
            .out
            .write_fmt(line)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to write to terminal view");
        }
    }
}

impl<W: Write> JobView for TerminalView<W> {
    fn set_status(&mut self, text: &str) {
        self.write_line(format_args!("{STATUS_ELEMENT_ID}: {text}"));
    }

    fn append_image(&mut self, src: &str) {
        self.write_line(format_args!("image: {src}"));
    }
}

/// In-memory view that keeps every update, for tests and embedding hosts.
#[derive(Debug, Default, Clone)]
pub struct RecordingView {
    /// Every status text written, oldest first.
    pub statuses: Vec<String>,
    /// Sources of appended images, in append order.
    pub images: Vec<String>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status text, or `None` if it was never written.
    pub fn status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }
}

impl JobView for RecordingView {
    fn set_status(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }

    fn append_image(&mut self, src: &str) {
        self.images.push(src.to_string());
    }
}
