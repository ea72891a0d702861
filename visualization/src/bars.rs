// Frequency bars widget
// One bar per column, coloured by position across the spectrum

use crate::{downsample_max, hue_color};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols,
    widgets::{Block, Widget},
};

pub struct FrequencyBars<'a> {
    block: Option<Block<'a>>,
    bins: &'a [u8],
}

impl<'a> FrequencyBars<'a> {
    pub fn new(bins: &'a [u8]) -> Self {
        Self { block: None, bins }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> Widget for FrequencyBars<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        if inner_area.width < 1 || inner_area.height < 1 || self.bins.is_empty() {
            return;
        }

        let columns = downsample_max(self.bins, inner_area.width as usize);
        let count = columns.len();

        for (i, &value) in columns.iter().enumerate() {
            let bar_height = (value as f32 / 255.0 * inner_area.height as f32).round() as u16;
            let bar_height = bar_height.min(inner_area.height);
            let color = hue_color(i as f32 / count as f32 * 360.0);
            let x = inner_area.left() + i as u16;

            for y in 0..bar_height {
                let y = inner_area.bottom() - 1 - y;
                buf.get_mut(x, y)
                    .set_symbol(symbols::block::FULL)
                    .set_fg(color);
            }
        }
    }
}
