//! CSS-style filter strings applied to source pixels before compositing

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Unsupported filter function: {0}")]
    Unsupported(String),
    #[error("Invalid filter argument: {0}")]
    InvalidArgument(String),
}

/// One filter function with its amount (1.0 == 100%)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterFn {
    Brightness(f32),
    Contrast(f32),
    Grayscale(f32),
    Invert(f32),
    Opacity(f32),
    Saturate(f32),
}

impl FilterFn {
    fn name(&self) -> &'static str {
        match self {
            FilterFn::Brightness(_) => "brightness",
            FilterFn::Contrast(_) => "contrast",
            FilterFn::Grayscale(_) => "grayscale",
            FilterFn::Invert(_) => "invert",
            FilterFn::Opacity(_) => "opacity",
            FilterFn::Saturate(_) => "saturate",
        }
    }

    fn amount(&self) -> f32 {
        match *self {
            FilterFn::Brightness(a)
            | FilterFn::Contrast(a)
            | FilterFn::Grayscale(a)
            | FilterFn::Invert(a)
            | FilterFn::Opacity(a)
            | FilterFn::Saturate(a) => a,
        }
    }

    fn apply(&self, px: [f32; 4]) -> [f32; 4] {
        let [r, g, b, a] = px;
        match *self {
            FilterFn::Brightness(k) => [r * k, g * k, b * k, a],
            FilterFn::Contrast(k) => [
                (r - 0.5) * k + 0.5,
                (g - 0.5) * k + 0.5,
                (b - 0.5) * k + 0.5,
                a,
            ],
            FilterFn::Grayscale(k) => {
                let s = 1.0 - k.clamp(0.0, 1.0);
                color_matrix(
                    px,
                    [
                        [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
                        [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
                        [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
                    ],
                )
            }
            FilterFn::Saturate(s) => color_matrix(
                px,
                [
                    [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
                ],
            ),
            FilterFn::Invert(k) => {
                let k = k.clamp(0.0, 1.0);
                [
                    r * (1.0 - k) + (1.0 - r) * k,
                    g * (1.0 - k) + (1.0 - g) * k,
                    b * (1.0 - k) + (1.0 - b) * k,
                    a,
                ]
            }
            FilterFn::Opacity(k) => [r, g, b, a * k.clamp(0.0, 1.0)],
        }
    }
}

#[inline]
fn color_matrix(px: [f32; 4], m: [[f32; 3]; 3]) -> [f32; 4] {
    let [r, g, b, a] = px;
    [
        m[0][0] * r + m[0][1] * g + m[0][2] * b,
        m[1][0] * r + m[1][1] * g + m[1][2] * b,
        m[2][0] * r + m[2][1] * g + m[2][2] * b,
        a,
    ]
}

/// A parsed filter string; empty means `none`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    functions: Vec<FilterFn>,
}

impl Filter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(functions: Vec<FilterFn>) -> Self {
        Self { functions }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn functions(&self) -> &[FilterFn] {
        &self.functions
    }

    /// Run every function in order on a straight-alpha pixel
    pub fn apply(&self, px: [f32; 4]) -> [f32; 4] {
        let out = self.functions.iter().fold(px, |acc, f| f.apply(acc));
        out.map(|c| c.clamp(0.0, 1.0))
    }
}

fn parse_amount(raw: &str) -> Result<f32, FilterError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(1.0);
    }
    let (number, scale) = match raw.strip_suffix('%') {
        Some(n) => (n, 0.01),
        None => (raw, 1.0),
    };
    let value: f32 = number
        .trim()
        .parse()
        .map_err(|_| FilterError::InvalidArgument(raw.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(FilterError::InvalidArgument(raw.to_string()));
    }
    Ok(value * scale)
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        if rest.is_empty() || rest.eq_ignore_ascii_case("none") {
            return Ok(Filter::none());
        }

        let mut functions = Vec::new();
        while !rest.is_empty() {
            let open = rest
                .find('(')
                .ok_or_else(|| FilterError::Unsupported(rest.to_string()))?;
            let close = rest
                .find(')')
                .filter(|&close| close > open)
                .ok_or_else(|| FilterError::InvalidArgument(rest.to_string()))?;

            let name = rest[..open].trim().to_ascii_lowercase();
            let amount = parse_amount(&rest[open + 1..close])?;
            let function = match name.as_str() {
                "brightness" => FilterFn::Brightness(amount),
                "contrast" => FilterFn::Contrast(amount),
                "grayscale" => FilterFn::Grayscale(amount),
                "invert" => FilterFn::Invert(amount),
                "opacity" => FilterFn::Opacity(amount),
                "saturate" => FilterFn::Saturate(amount),
                _ => return Err(FilterError::Unsupported(name)),
            };
            functions.push(function);
            rest = rest[close + 1..].trim_start();
        }

        Ok(Filter { functions })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("none");
        }
        for (i, function) in self.functions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}({})", function.name(), function.amount())?;
        }
        Ok(())
    }
}
