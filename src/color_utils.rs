//! Color utility functions shared across the application.
//!
//! Label colors are generated here so every label keeps a stable,
//! well-separated tint for handles and selection outlines.

/// Golden angle in degrees, used to spread successive hues.
const GOLDEN_ANGLE: f32 = 137.5;

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Color for the `index`-th label, as 8-bit RGB.
pub fn label_color(index: usize) -> [u8; 3] {
    let hue = (index as f32 * GOLDEN_ANGLE) % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
    [to_byte(r), to_byte(g), to_byte(b)]
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
