use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Block, Widget},
};

/// Time-domain trace of the latest samples, centred vertically.
pub struct Waveform<'a> {
    block: Option<Block<'a>>,
    samples: &'a [f32],
    /// Vertical scale applied before plotting.
    gain: f32,
    style: Style,
}

impl<'a> Waveform<'a> {
    pub fn new(samples: &'a [f32]) -> Self {
        Self {
            block: None,
            samples,
            gain: 0.5,
            style: Style::default().fg(Color::Green),
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Row for `sample` in an area `height` rows tall, 0 at the top.
    fn row(&self, sample: f32, height: u16) -> u16 {
        let half = (height as f32 - 1.0) / 2.0;
        let v = (sample * self.gain).clamp(-1.0, 1.0);
        // Positive samples plot upwards
        (half - v * half).round().clamp(0.0, height as f32 - 1.0) as u16
    }
}

impl<'a> Widget for Waveform<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        if inner_area.width == 0 || inner_area.height == 0 || self.samples.is_empty() {
            return;
        }

        let points = (inner_area.width as usize).min(self.samples.len());
        let step = self.samples.len() as f32 / points as f32;

        for i in 0..points {
            let sample = self.samples[(i as f32 * step) as usize];
            let x = inner_area.x + i as u16;
            let y = inner_area.y + self.row(sample, inner_area.height);

            buf.get_mut(x, y)
                .set_symbol(symbols::DOT)
                .set_style(self.style);
        }
    }
}
