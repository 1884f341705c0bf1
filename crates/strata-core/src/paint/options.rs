//! Paint tool options and the per-stroke context.
//!
//! Everything here is plain configuration: serde-derived, `Default`-able and
//! tolerant of partial input (`#[serde(default)]`), so a front end can send
//! only the fields the user changed.
//!
//! Two stroke-position helpers live here as well because they only depend on
//! options: [`FadeOptions::fade_point`] and [`gradient_color`].

use serde::{Deserialize, Serialize};

use super::blend::BlendMode;
use super::gradient::Gradient;
use crate::color::Color;
use crate::document::Image;

/// Largest fade point a non-repeating fade reaches.
const FADE_PIN: f64 = 0.999_999_9;

/// How dabs of one stroke combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationMode {
    /// Every dab composites onto the drawable as it is now.
    Incremental,
    /// Dabs accumulate into a per-stroke canvas capped at the dab opacity.
    #[default]
    Constant,
}

/// How the brush mask turns into coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    /// Mask thresholded at 50%.
    Hard,
    /// Mask used as is.
    #[default]
    Soft,
    /// Mask scaled by the sample's pressure.
    Pressure,
}

/// Unit of fade and gradient lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Pixels,
    /// Percent of the larger image side.
    Percent,
}

impl LengthUnit {
    /// `length` converted to pixels for an image of the given size.
    pub fn to_pixels(self, length: f64, width: u32, height: u32) -> f64 {
        match self {
            LengthUnit::Pixels => length,
            LengthUnit::Percent => f64::from(width.max(height)) * length / 100.0,
        }
    }
}

/// What happens past the end of a fade or gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stay at the end.
    #[default]
    None,
    /// Start over.
    Sawtooth,
    /// Run back and forth.
    Triangular,
}

impl RepeatMode {
    /// Map a stroke position (in lengths) to 0.0..=1.0.
    pub fn apply(self, pos: f64) -> f64 {
        let pos = pos.max(0.0);
        match self {
            RepeatMode::None => pos.min(1.0),
            RepeatMode::Sawtooth => pos.fract(),
            RepeatMode::Triangular => {
                let whole = pos.floor();
                let frac = pos - whole;
                if whole % 2.0 == 1.0 {
                    1.0 - frac
                } else {
                    frac
                }
            }
        }
    }
}

/// Fade-out along the stroke, fed to the `Fade` dynamics input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeOptions {
    pub length: f64,
    pub unit: LengthUnit,
    pub repeat: RepeatMode,
    pub reverse: bool,
}

impl Default for FadeOptions {
    fn default() -> Self {
        Self {
            length: 100.0,
            unit: LengthUnit::Pixels,
            repeat: RepeatMode::None,
            reverse: false,
        }
    }
}

impl FadeOptions {
    /// Position along the fade for a stroke that has covered `pixel_dist`.
    pub fn fade_point(&self, image: &Image, pixel_dist: f64) -> f64 {
        self.fade_point_for_size(image.width(), image.height(), pixel_dist)
    }

    /// [`Self::fade_point`] for a canvas of the given size.
    pub fn fade_point_for_size(&self, width: u32, height: u32, pixel_dist: f64) -> f64 {
        let fade_out = self.unit.to_pixels(self.length, width, height);
        let mut pos = if fade_out > 0.0 {
            pixel_dist / fade_out
        } else {
            1.0
        };
        if self.repeat == RepeatMode::None {
            pos = pos.min(FADE_PIN);
        }

        // Odd lengths run backwards unless the fade starts over each time.
        let mode = match self.repeat {
            RepeatMode::Sawtooth => RepeatMode::Sawtooth,
            _ => RepeatMode::Triangular,
        };
        let point = mode.apply(pos);

        if self.reverse {
            1.0 - point
        } else {
            point
        }
    }
}

/// Color-along-the-stroke settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientOptions {
    /// Take the paint color from the gradient by stroke length.
    pub use_gradient: bool,
    pub reverse: bool,
    pub length: f64,
    pub unit: LengthUnit,
    pub repeat: RepeatMode,
}

impl Default for GradientOptions {
    fn default() -> Self {
        Self {
            use_gradient: false,
            reverse: false,
            length: 100.0,
            unit: LengthUnit::Pixels,
            repeat: RepeatMode::Triangular,
        }
    }
}

/// Paint tool options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintOptions {
    pub application_mode: ApplicationMode,
    /// Hard brush edges, overrides `brush_mode`.
    pub hard: bool,
    pub brush_mode: BrushMode,
    /// Brush diameter in pixels before the `Size` dynamics.
    pub brush_size: f64,
    /// Brush hardness (0.0 to 1.0) before the `Hardness` dynamics.
    pub brush_hardness: f64,
    /// 0.5 is neutral.
    pub brush_force: f64,
    /// When off, every dynamics output evaluates to 1.0 and counts as disabled.
    pub dynamics_enabled: bool,
    pub fade: FadeOptions,
    pub gradient: GradientOptions,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            application_mode: ApplicationMode::Constant,
            hard: false,
            brush_mode: BrushMode::Soft,
            brush_size: 20.0,
            brush_hardness: 1.0,
            brush_force: 0.5,
            dynamics_enabled: true,
            fade: FadeOptions::default(),
            gradient: GradientOptions::default(),
        }
    }
}

impl PaintOptions {
    /// The brush mode in effect.
    pub fn brush_mode(&self) -> BrushMode {
        if self.hard {
            BrushMode::Hard
        } else {
            self.brush_mode
        }
    }
}

/// The parts of the user context a stroke reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintContext {
    pub foreground: Color,
    /// Global opacity applied on paste (0.0 to 1.0).
    pub opacity: f64,
    pub paint_mode: BlendMode,
    pub gradient: Option<Gradient>,
}

impl Default for PaintContext {
    fn default() -> Self {
        Self {
            foreground: Color::BLACK,
            opacity: 1.0,
            paint_mode: BlendMode::Normal,
            gradient: None,
        }
    }
}

/// The gradient color for this point of the stroke, if the paint comes from a
/// gradient.
///
/// With the `Color` dynamics output enabled the gradient is sampled at
/// `grad_point`. Otherwise, when the gradient option is on, it is sampled by
/// stroke length. Without a gradient in the context there is no color.
pub fn gradient_color(
    options: &PaintOptions,
    context: &PaintContext,
    image: &Image,
    color_dynamics: bool,
    grad_point: f64,
    pixel_dist: f64,
) -> Option<Color> {
    let gradient = context.gradient.as_ref()?;
    let settings = &options.gradient;

    if color_dynamics {
        return Some(gradient.sample(grad_point, settings.reverse));
    }

    if settings.use_gradient {
        let length = settings
            .unit
            .to_pixels(settings.length, image.width(), image.height());
        if length > 0.0 {
            let t = settings.repeat.apply(pixel_dist / length);
            return Some(gradient.sample(t, settings.reverse));
        }
    }

    None
}
