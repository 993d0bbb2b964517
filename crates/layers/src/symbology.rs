/// Marker pin icon.
#[derive(Debug, Clone, PartialEq)]
pub struct IconStyle {
    pub src: String,
    /// Fractional anchor inside the image; `[0.5, 1.0]` puts the tip of the
    /// pin on the coordinate.
    pub anchor: [f32; 2],
}

impl IconStyle {
    pub const DEFAULT_SRC: &'static str = "assets/images/mark.png";

    pub fn pin(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            anchor: [0.5, 1.0],
        }
    }
}

impl Default for IconStyle {
    fn default() -> Self {
        Self::pin(Self::DEFAULT_SRC)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// CSS font shorthand.
    pub font: String,
    /// Canvas `textAlign` keyword.
    pub align: &'static str,
    pub fill: [f32; 4],
    pub halo_color: [f32; 4],
    pub halo_width_px: f32,
    /// Pixel offset from the anchor; negative y is up.
    pub offset_px: [f32; 2],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "bold 13px sans-serif".to_string(),
            align: "left",
            fill: [1.0, 0.0, 0.0, 1.0],
            halo_color: [1.0, 1.0, 1.0, 1.0],
            halo_width_px: 2.0,
            offset_px: [16.0, -20.0],
        }
    }
}

/// Pin plus label, drawn for the selected place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkerStyle {
    pub icon: IconStyle,
    pub text: TextStyle,
}

impl MarkerStyle {
    pub fn with_icon(src: impl Into<String>) -> Self {
        Self {
            icon: IconStyle::pin(src),
            text: TextStyle::default(),
        }
    }
}

/// Formats a linear RGBA color as a CSS `rgba()` string.
pub fn css_color(color: [f32; 4]) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

/// Same color as 8-bit RGBA, for raster output.
pub fn rgba8(color: [f32; 4]) -> [u8; 4] {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        channel(color[3]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_label_is_red_on_white_above_right() {
        let style = MarkerStyle::default();
        assert_eq!(style.text.fill, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(style.text.halo_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(style.text.halo_width_px, 2.0);
        assert_eq!(style.text.align, "left");
        assert!(style.text.offset_px[0] > 0.0);
        assert!(style.text.offset_px[1] < 0.0);
        assert_eq!(style.icon.anchor, [0.5, 1.0]);
    }

    #[test]
    fn css_color_formats_channels() {
        assert_eq!(css_color([1.0, 0.0, 0.0, 1.0]), "rgba(255, 0, 0, 1)");
        assert_eq!(css_color([1.0, 1.0, 1.0, 0.5]), "rgba(255, 255, 255, 0.5)");
        assert_eq!(rgba8([1.0, 0.0, 0.0, 1.0]), [255, 0, 0, 255]);
    }
}
