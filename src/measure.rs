use unicode_width::UnicodeWidthStr;

/// Monospace text metrics shared by layout, SVG and image-map output.
///
/// All three consumers must agree on geometry, so row positions are computed
/// here and nowhere else.
pub struct TextMetrics {
    pub char_width: f64,
    pub row_height: f64,
    pub padding_x: f64,
    pub header_padding: f64,
    pub min_box_width: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            row_height: 22.0,
            padding_x: 12.0,
            header_padding: 5.0,
            min_box_width: 110.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.char_width
    }

    pub fn header_height(&self) -> f64 {
        self.row_height + self.header_padding * 2.0
    }

    /// Box size before zoom. Width follows the widest label so long column
    /// names never overflow; height is header plus one row per column.
    pub fn box_size(&self, title: &str, row_labels: &[String]) -> (f64, f64) {
        let widest = row_labels
            .iter()
            .map(|l| self.text_width(l))
            .fold(self.text_width(title), f64::max);

        let width = (widest + self.padding_x * 2.0).max(self.min_box_width);
        let height = self.header_height() + row_labels.len() as f64 * self.row_height;

        (width, height)
    }

    /// Vertical center of a column row, relative to the box top.
    pub fn row_center_offset(&self, row_index: usize) -> f64 {
        self.header_height() + (row_index as f64 + 0.5) * self.row_height
    }
}
