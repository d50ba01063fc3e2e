/// Keyboard-driven parameter panel drawn over the viewport
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use log::warn;
use std::io::Write;
use spin3d_core::{ParamDescriptor, ParamValue, ParameterStore};

pub struct Panel {
    visible: bool,
    selected: usize,
}

impl Panel {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            selected: 0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Move the selection, wrapping around the schema
    pub fn select(&mut self, store: &ParameterStore, forward: bool) {
        let len = store.schema().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
    }

    pub fn selected_key(&self, store: &ParameterStore) -> Option<String> {
        store.schema().get(self.selected).map(|d| d.key.clone())
    }

    /// Step the selected parameter. The change shows up after the next publish.
    pub fn nudge(&self, store: &ParameterStore, forward: bool) {
        let Some(key) = self.selected_key(store) else {
            return;
        };
        if let Err(err) = store.nudge(&key, forward) {
            warn!("could not step `{key}`: {err}");
        }
    }

    pub fn lines(&self, store: &ParameterStore) -> Vec<String> {
        let schema = store.schema();
        let label_width = schema.iter().map(|d| d.label.len()).max().unwrap_or(0);
        schema
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let marker = if i == self.selected { '>' } else { ' ' };
                format!("{marker} {:<label_width$}  {}", d.label, format_value(d))
            })
            .collect()
    }

    /// Right-aligned box in the top corner of a `width` column screen
    pub fn draw<W: Write>(
        &self,
        writer: &mut W,
        store: &ParameterStore,
        width: u16,
    ) -> std::io::Result<()> {
        if !self.visible {
            return Ok(());
        }
        let lines = self.lines(store);
        let box_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 1;
        let left = width.saturating_sub(box_width as u16);

        for (row, line) in lines.iter().enumerate() {
            writer.queue(cursor::MoveTo(left, row as u16 + 1))?;
            writer.queue(SetBackgroundColor(Color::Black))?;
            writer.queue(SetForegroundColor(if line.starts_with('>') {
                Color::Yellow
            } else {
                Color::White
            }))?;
            writer.queue(Print(format!("{line:<box_width$}")))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn format_value(descriptor: &ParamDescriptor) -> String {
    match descriptor.value {
        ParamValue::Number(n) => {
            let step = descriptor.step_size().unwrap_or(0.01);
            let decimals = if step >= 1.0 {
                0
            } else {
                (-step.log10()).ceil() as usize
            };
            format!("{n:.decimals$}")
        }
        ParamValue::Color(c) => c.to_hex(),
    }
}
