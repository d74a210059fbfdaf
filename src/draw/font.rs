//! Font descriptor for text primitives and stamp labels.

use serde::{Deserialize, Serialize};

/// Font configuration for text rendering.
///
/// Text primitives use the regular weight; stamp labels force bold via
/// [`FontDescriptor::bold`]. Sizes are passed in absolute canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Sans", "Monospace", "Inter")
    pub family: String,

    /// Font weight (e.g., "normal", "bold", "light" or numeric 100-900)
    pub weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    pub style: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            weight: "normal".to_string(),
            style: "normal".to_string(),
        }
    }
}

impl FontDescriptor {
    pub fn new(family: String, weight: String, style: String) -> Self {
        Self {
            family,
            weight,
            style,
        }
    }

    /// Same family and style, bold weight.
    pub fn bold(&self) -> Self {
        Self {
            weight: "bold".to_string(),
            ..self.clone()
        }
    }

    /// Builds a Pango description whose size is in device-independent pixels.
    ///
    /// Format of the family/style part: "Family Style Weight"; the size is set
    /// separately with `set_absolute_size` so it matches canvas pixels rather
    /// than points.
    pub fn to_pango(&self, pixel_size: f64) -> pango::FontDescription {
        let mut desc = pango::FontDescription::from_string(&self.to_pango_string());
        desc.set_absolute_size(pixel_size * pango::SCALE as f64);
        desc
    }

    /// "Family Style Weight", omitting `normal` parts.
    pub fn to_pango_string(&self) -> String {
        let mut parts = vec![self.family.clone()];

        if !self.style.eq_ignore_ascii_case("normal") {
            parts.push(capitalize_first(&self.style));
        }
        if !self.weight.eq_ignore_ascii_case("normal") {
            parts.push(capitalize_first(&self.weight));
        }

        parts.join(" ")
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_regular_sans() {
        assert_eq!(FontDescriptor::default().to_pango_string(), "Sans");
    }

    #[test]
    fn bold_keeps_family_and_style() {
        let font = FontDescriptor::new(
            "Monospace".to_string(),
            "normal".to_string(),
            "italic".to_string(),
        );
        assert_eq!(font.bold().to_pango_string(), "Monospace Italic Bold");
    }

    #[test]
    fn absolute_size_is_in_pango_units() {
        let desc = FontDescriptor::default().to_pango(24.0);
        assert!(desc.is_size_absolute());
        assert_eq!(desc.size(), 24 * pango::SCALE);
    }
}
