use egui::Color32;

/// Fixed page parameters. There is no external configuration; everything the
/// page needs is compiled in through [`PageConfig::default`].
#[derive(Clone, Debug)]
pub struct PageConfig {
    /// `localStorage` key of the persisted snapshot. Changing the suffix is
    /// the only migration mechanism: old data is simply left behind.
    pub storage_key: String,
    /// Id of the canvas element eframe mounts on.
    pub canvas_id: String,

    // Audio analysis
    pub fft_size: u32,
    pub visible_bars: usize,
    pub bar_floor: u8,
    pub bar_area_height: f32,

    // Floating hearts
    pub heart_count: usize,
    pub heart_min_duration: f64,
    pub heart_max_duration: f64,
    pub heart_stagger: f64,

    // Sunflower sway, one keyframe cycle
    pub sway_period: f64,

    // Palette
    pub background_color: Color32,
    pub card_color: Color32,
    pub accent_color: Color32,
    pub heart_color: Color32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            storage_key: "aniv_page_data_v4".to_string(),
            canvas_id: "anniversary_canvas".to_string(),

            fft_size: 64,
            visible_bars: 20,
            bar_floor: 5,
            bar_area_height: 80.0,

            heart_count: 12,
            heart_min_duration: 10.0,
            heart_max_duration: 15.0,
            heart_stagger: 1.0,

            sway_period: 6.0,

            background_color: Color32::from_rgb(254, 249, 195),
            card_color: Color32::WHITE,
            accent_color: Color32::from_rgb(250, 204, 21),
            heart_color: Color32::from_rgb(244, 114, 182),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fft_covers_visible_bars() {
        let c = PageConfig::default();
        assert_eq!(c.fft_size, 64);
        // an analyser yields fft_size / 2 bins
        assert!(c.visible_bars <= (c.fft_size / 2) as usize);
    }
}
