//! Color string parsing
//!
//! Only the notations brush presets actually use are understood. Anything
//! else falls back to opaque black.

/// Opaque black, used for unparseable colors
pub const FALLBACK_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Parse a color string into straight RGBA
pub fn parse_color(color: &str) -> [f32; 4] {
    try_parse_color(color).unwrap_or(FALLBACK_COLOR)
}

/// Parse a color string, returning None when the notation is not understood
pub fn try_parse_color(color: &str) -> Option<[f32; 4]> {
    let color = color.trim().to_ascii_lowercase();

    if let Some(hex) = color.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }

    match color.as_str() {
        "black" => Some([0.0, 0.0, 0.0, 1.0]),
        "white" => Some([1.0, 1.0, 1.0, 1.0]),
        "red" => Some([1.0, 0.0, 0.0, 1.0]),
        "green" => Some([0.0, 128.0 / 255.0, 0.0, 1.0]),
        "blue" => Some([0.0, 0.0, 1.0, 1.0]),
        "transparent" => Some([0.0; 4]),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<[f32; 4]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let channels: [u8; 4] = match hex.len() {
        3 => [nibble(0)?, nibble(1)?, nibble(2)?, 255],
        4 => [nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?],
        6 => [byte(0)?, byte(2)?, byte(4)?, 255],
        8 => [byte(0)?, byte(2)?, byte(4)?, byte(6)?],
        _ => return None,
    };
    Some(channels.map(|c| c as f32 / 255.0))
}

fn parse_rgb_args(args: &str) -> Option<[f32; 4]> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let mut rgba = [0.0, 0.0, 0.0, 1.0];
    for (i, part) in parts.iter().take(3).enumerate() {
        let value: f32 = part.parse().ok()?;
        rgba[i] = (value / 255.0).clamp(0.0, 1.0);
    }
    if let Some(alpha) = parts.get(3) {
        rgba[3] = alpha.parse::<f32>().ok()?.clamp(0.0, 1.0);
    }
    Some(rgba)
}
