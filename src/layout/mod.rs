//! Responsive placement of the list and editor panels.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    List,
    Editor,
}

/// Panels to draw, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panels {
    Single(Panel),
    SideBySide,
}

impl Panels {
    pub fn shows(self, panel: Panel) -> bool {
        match self {
            Self::Single(only) => only == panel,
            Self::SideBySide => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    breakpoint: u16,
    width: u16,
    panel: Panel,
}

impl Layout {
    pub const fn new(breakpoint: u16, width: u16) -> Self {
        Self {
            breakpoint,
            width,
            panel: Panel::List,
        }
    }

    pub const fn is_narrow(&self) -> bool {
        self.width < self.breakpoint
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn resize(&mut self, width: u16) {
        self.width = width;
    }

    pub const fn open_editor(&mut self) {
        self.panel = Panel::Editor;
    }

    pub const fn back(&mut self) {
        self.panel = Panel::List;
    }

    pub const fn panels(&self) -> Panels {
        if self.is_narrow() {
            Panels::Single(self.panel)
        } else {
            Panels::SideBySide
        }
    }
}

/// Source of the current display width.
#[derive(Debug)]
pub struct Viewport {
    tx: watch::Sender<u16>,
}

impl Viewport {
    pub fn new(width: u16) -> Self {
        let (tx, _) = watch::channel(width);
        Self { tx }
    }

    pub fn width(&self) -> u16 {
        *self.tx.borrow()
    }

    pub fn set_width(&self, width: u16) {
        self.tx.send_replace(width);
    }

    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Registers a listener. Dropping the returned subscription removes it.
    pub fn subscribe(&self) -> ViewportSubscription {
        let mut rx = self.tx.subscribe();
        rx.mark_changed();
        ViewportSubscription { rx }
    }
}

#[derive(Debug)]
pub struct ViewportSubscription {
    rx: watch::Receiver<u16>,
}

impl ViewportSubscription {
    /// New width since the last call, if any.
    pub fn changed_width(&mut self) -> Option<u16> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            _ => None,
        }
    }
}
