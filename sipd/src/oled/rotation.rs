//! Order of the status panels
//!
//! Tracks which enabled panel the reporter shows next. An empty panel list
//! falls back to the name panel so the display is never left stale.

use sip_core::Panel;

/// Position in the normal panel rotation
#[derive(Debug, Clone)]
pub(crate) struct Rotation {
    panels: Vec<Panel>,
    index: usize,
}

impl Rotation {
    pub fn new(panels: Vec<Panel>) -> Self {
        Self { panels, index: 0 }
    }

    /// Panel to show next, and whether the rotation just wrapped to the start.
    ///
    /// The index only moves on [`Rotation::advance`], so a failed render is
    /// retried with the same panel.
    pub fn current(&mut self) -> (Panel, bool) {
        let wrapped = self.index >= self.panels.len();
        if wrapped {
            self.index = 0;
        }
        let panel = self.panels.get(self.index).copied().unwrap_or(Panel::Name);
        (panel, wrapped && !self.panels.is_empty())
    }

    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Start over at the first panel without counting it as a wrap
    pub fn restart(&mut self) {
        self.index = 0;
    }

    /// Replace the panel list; the position is kept and wraps if now past the end
    pub fn set_panels(&mut self, panels: Vec<Panel>) {
        self.panels = panels;
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }
}
