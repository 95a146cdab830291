/// Severity of a reported event.
///
/// `Status` is passive UI text; `Error` is a blocking modal in the viewer.
/// Every failure branch of an upload emits exactly one `Error` event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Status,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub sequence: u64,
    pub severity: Severity,
    pub message: String,
}

/// Ordered, in-memory event stream replacing ad-hoc console logging.
///
/// Tests assert on emitted events rather than console text; the viewer
/// drains the bus to drive its status line and error dialog.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
    next_sequence: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.emit(Severity::Status, message);
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.emit(Severity::Error, message);
    }

    fn emit(&mut self, severity: Severity, message: impl Into<String>) {
        self.events.push(Event {
            sequence: self.next_sequence,
            severity,
            message: message.into(),
        });
        self.next_sequence += 1;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Most recent passive status text, if any was ever set.
    pub fn last_status(&self) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .find(|e| e.severity == Severity::Status)
            .map(|e| e.message.as_str())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .find(|e| e.severity == Severity::Error)
            .map(|e| e.message.as_str())
    }

    /// Drains recorded events; sequence numbers keep increasing across drains.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
