// Spectrogram widget
// Scrolls snapshots right to left, low frequencies at the bottom

use crate::{downsample_max, hue_color};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols,
    widgets::{Block, Widget},
};
use std::collections::VecDeque;

/// The most recent snapshots, oldest first.
#[derive(Debug, Clone)]
pub struct SpectrogramHistory {
    columns: VecDeque<Vec<u8>>,
    capacity: usize,
}

impl SpectrogramHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            columns: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a snapshot, dropping the oldest once full.
    pub fn push(&mut self, bins: &[u8]) {
        if self.columns.len() == self.capacity {
            self.columns.pop_front();
        }
        self.columns.push_back(bins.to_vec());
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

pub struct Spectrogram<'a> {
    block: Option<Block<'a>>,
    history: &'a SpectrogramHistory,
}

impl<'a> Spectrogram<'a> {
    pub fn new(history: &'a SpectrogramHistory) -> Self {
        Self {
            block: None,
            history,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> Widget for Spectrogram<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        if inner_area.width < 1 || inner_area.height < 1 || self.history.is_empty() {
            return;
        }

        let visible = (inner_area.width as usize).min(self.history.len());
        let skip = self.history.len() - visible;
        // Newest column lands on the right edge
        let left = inner_area.right() - visible as u16;

        for (i, column) in self.history.columns.iter().skip(skip).enumerate() {
            let x = left + i as u16;
            let rows = downsample_max(column, inner_area.height as usize);

            for (r, &value) in rows.iter().enumerate() {
                let y = inner_area.bottom() - 1 - r as u16;
                buf.get_mut(x, y)
                    .set_symbol(symbols::block::FULL)
                    .set_fg(hue_color(value as f32 / 255.0 * 360.0));
            }
        }
    }
}
