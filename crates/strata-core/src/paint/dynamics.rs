//! Paint dynamics: how stroke input modulates paint parameters.
//!
//! A [`Dynamics`] holds one [`DynamicsOutput`] per paint parameter. Each
//! output maps any number of stroke inputs (pressure, velocity, tilt, ...)
//! through its own response [`Curve`]; the output's value is the mean of the
//! enabled inputs. An output without enabled inputs is neutral and evaluates
//! to 1.0.

use serde::{Deserialize, Serialize};

use super::coords::Coords;
use super::options::PaintOptions;
use crate::curve::Curve;

/// Paint parameters dynamics can modulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicsOutputKind {
    Opacity,
    Size,
    Force,
    Hardness,
    Color,
}

/// Stroke inputs an output can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicsInput {
    Pressure,
    Velocity,
    Direction,
    Tilt,
    Wheel,
    Fade,
}

impl DynamicsInput {
    pub const ALL: [DynamicsInput; 6] = [
        DynamicsInput::Pressure,
        DynamicsInput::Velocity,
        DynamicsInput::Direction,
        DynamicsInput::Tilt,
        DynamicsInput::Wheel,
        DynamicsInput::Fade,
    ];

    /// Raw value of this input for a sample, in 0.0 to 1.0.
    fn value(self, coords: &Coords, fade_point: f64) -> f64 {
        let v = match self {
            DynamicsInput::Pressure => coords.pressure,
            DynamicsInput::Velocity => coords.velocity,
            DynamicsInput::Direction => coords.direction,
            // Upright pen reads 1.0, fully tilted reads 0.0.
            DynamicsInput::Tilt => 1.0 - coords.xtilt.hypot(coords.ytilt),
            DynamicsInput::Wheel => coords.wheel,
            DynamicsInput::Fade => fade_point,
        };
        if v.is_nan() {
            return 0.0;
        }
        v.clamp(0.0, 1.0)
    }
}

/// One modulated paint parameter: a curve per enabled input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsOutput {
    pub pressure: Option<Curve>,
    pub velocity: Option<Curve>,
    pub direction: Option<Curve>,
    pub tilt: Option<Curve>,
    pub wheel: Option<Curve>,
    pub fade: Option<Curve>,
}

impl DynamicsOutput {
    pub fn curve(&self, input: DynamicsInput) -> Option<&Curve> {
        match input {
            DynamicsInput::Pressure => self.pressure.as_ref(),
            DynamicsInput::Velocity => self.velocity.as_ref(),
            DynamicsInput::Direction => self.direction.as_ref(),
            DynamicsInput::Tilt => self.tilt.as_ref(),
            DynamicsInput::Wheel => self.wheel.as_ref(),
            DynamicsInput::Fade => self.fade.as_ref(),
        }
    }

    /// Enable `input` through `curve`, or disable it with `None`.
    pub fn set_curve(&mut self, input: DynamicsInput, curve: Option<Curve>) {
        let slot = match input {
            DynamicsInput::Pressure => &mut self.pressure,
            DynamicsInput::Velocity => &mut self.velocity,
            DynamicsInput::Direction => &mut self.direction,
            DynamicsInput::Tilt => &mut self.tilt,
            DynamicsInput::Wheel => &mut self.wheel,
            DynamicsInput::Fade => &mut self.fade,
        };
        *slot = curve;
    }

    /// Builder form of [`Self::set_curve`] with a curve.
    #[must_use]
    pub fn with(mut self, input: DynamicsInput, curve: Curve) -> Self {
        self.set_curve(input, Some(curve));
        self
    }

    pub fn is_enabled(&self) -> bool {
        DynamicsInput::ALL.iter().any(|&i| self.curve(i).is_some())
    }

    /// Mean of the enabled inputs' curve values, 1.0 when none is enabled.
    pub fn linear_value(&self, coords: &Coords, fade_point: f64) -> f64 {
        let mut total = 0.0;
        let mut count = 0u32;
        for input in DynamicsInput::ALL {
            if let Some(curve) = self.curve(input) {
                let x = input.value(coords, fade_point);
                total += f64::from(curve.evaluate(x as f32));
                count += 1;
            }
        }
        if count == 0 {
            1.0
        } else {
            total / f64::from(count)
        }
    }
}

/// A full set of outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dynamics {
    pub opacity: DynamicsOutput,
    pub size: DynamicsOutput,
    pub force: DynamicsOutput,
    pub hardness: DynamicsOutput,
    pub color: DynamicsOutput,
}

impl Dynamics {
    /// Common "pressure opacity" preset: opacity follows pressure linearly.
    pub fn pressure_opacity() -> Self {
        Self {
            opacity: DynamicsOutput::default().with(DynamicsInput::Pressure, Curve::new()),
            ..Self::default()
        }
    }

    pub fn output(&self, kind: DynamicsOutputKind) -> &DynamicsOutput {
        match kind {
            DynamicsOutputKind::Opacity => &self.opacity,
            DynamicsOutputKind::Size => &self.size,
            DynamicsOutputKind::Force => &self.force,
            DynamicsOutputKind::Hardness => &self.hardness,
            DynamicsOutputKind::Color => &self.color,
        }
    }

    pub fn output_mut(&mut self, kind: DynamicsOutputKind) -> &mut DynamicsOutput {
        match kind {
            DynamicsOutputKind::Opacity => &mut self.opacity,
            DynamicsOutputKind::Size => &mut self.size,
            DynamicsOutputKind::Force => &mut self.force,
            DynamicsOutputKind::Hardness => &mut self.hardness,
            DynamicsOutputKind::Color => &mut self.color,
        }
    }

    pub fn is_enabled(&self, kind: DynamicsOutputKind) -> bool {
        self.output(kind).is_enabled()
    }

    /// Whether `kind` is enabled and dynamics are switched on in `options`.
    pub fn is_active(&self, kind: DynamicsOutputKind, options: &PaintOptions) -> bool {
        options.dynamics_enabled && self.is_enabled(kind)
    }

    /// Value of output `kind` for one sample.
    pub fn linear_value(
        &self,
        kind: DynamicsOutputKind,
        coords: &Coords,
        options: &PaintOptions,
        fade_point: f64,
    ) -> f64 {
        if !options.dynamics_enabled {
            return 1.0;
        }
        self.output(kind).linear_value(coords, fade_point)
    }
}
