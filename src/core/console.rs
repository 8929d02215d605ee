//! Console output for reports.
//!
//! Color enablement is decided once by the CLI and threaded in through
//! [`Console::new`]; there is no process-wide color state. The console is
//! cheaply cloneable, and every clone shares one output stream so that the
//! engine's section frames and a check's own output interleave in order.

use console::Style;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared console for report output.
#[derive(Debug, Clone)]
pub struct Console {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Debug)]
struct Inner {
    colors: bool,
    sink: Sink,
    capture: Option<String>,
}

#[derive(Debug)]
enum Sink {
    Stdout,
    Buffer(String),
}

impl Console {
    /// Creates a console writing to standard output.
    #[must_use]
    pub fn new(colors: bool) -> Self {
        Self::with_sink(colors, Sink::Stdout)
    }

    /// Creates a console that accumulates output in memory.
    ///
    /// Used by tests to assert on full report text; see [`Console::contents`].
    #[must_use]
    pub fn buffered(colors: bool) -> Self {
        Self::with_sink(colors, Sink::Buffer(String::new()))
    }

    fn with_sink(colors: bool, sink: Sink) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                colors,
                sink,
                capture: None,
            })),
        }
    }

    /// Prints one line, followed by a newline.
    pub fn print(&self, line: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(capture) = inner.capture.as_mut() {
            capture.push_str(line);
            capture.push('\n');
            return;
        }
        match &mut inner.sink {
            Sink::Stdout => println!("{line}"),
            Sink::Buffer(buffer) => {
                buffer.push_str(line);
                buffer.push('\n');
            },
        }
    }

    /// Starts diverting printed lines into an internal capture buffer.
    ///
    /// Fix mode uses this to defer a check's output until the engine knows
    /// whether the section will be reported at all.
    pub fn begin_capture(&self) {
        self.inner.borrow_mut().capture = Some(String::new());
    }

    /// Stops capturing and returns the diverted lines.
    pub fn end_capture(&self) -> String {
        self.inner.borrow_mut().capture.take().unwrap_or_default()
    }

    /// Returns everything printed so far (buffered consoles only).
    #[must_use]
    pub fn contents(&self) -> String {
        match &self.inner.borrow().sink {
            Sink::Stdout => String::new(),
            Sink::Buffer(buffer) => buffer.clone(),
        }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.inner.borrow().colors {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Styles section frame text.
    #[must_use]
    pub fn blue(&self, text: &str) -> String {
        self.paint(Style::new().blue(), text)
    }

    /// Styles failure text.
    #[must_use]
    pub fn red(&self, text: &str) -> String {
        self.paint(Style::new().red(), text)
    }

    /// Styles success text.
    #[must_use]
    pub fn green(&self, text: &str) -> String {
        self.paint(Style::new().green(), text)
    }

    /// Styles dry-run text.
    #[must_use]
    pub fn yellow(&self, text: &str) -> String {
        self.paint(Style::new().yellow(), text)
    }
}
