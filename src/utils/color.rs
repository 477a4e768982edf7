use crate::app::StatusClass;
use eframe::egui::Color32;

pub trait ColorExt {
    fn from_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

const UPLOADING: &str = "#1a73e8";
const SUCCESS: &str = "#2e7d32";
const ERROR: &str = "#d32f2f";
const NEUTRAL: &str = "#757575";
pub const PROGRESS_FILL: &str = "#a159e1";

/// Text colour for the upload status line.
pub fn status_color(class: StatusClass) -> Color32 {
    let hex = match class {
        StatusClass::Uploading => UPLOADING,
        StatusClass::Success => SUCCESS,
        StatusClass::Error => ERROR,
        StatusClass::Neutral => NEUTRAL,
    };
    Color32::from_hex(hex).unwrap_or(Color32::GRAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_hex() {
        assert_eq!(Color32::from_hex("#d32f2f"), Some(Color32::from_rgb(211, 47, 47)));
        assert_eq!(Color32::from_hex("a159e1"), Some(Color32::from_rgb(161, 89, 225)));
        assert_eq!(Color32::from_hex("#fff"), None);
        assert_eq!(Color32::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn every_class_has_a_distinct_color() {
        let colors = [
            status_color(StatusClass::Uploading),
            status_color(StatusClass::Success),
            status_color(StatusClass::Error),
            status_color(StatusClass::Neutral),
        ];
        for (i, a) in colors.iter().enumerate() {
            assert_ne!(*a, Color32::GRAY);
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
