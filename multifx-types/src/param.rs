use serde::{Deserialize, Serialize};

/// How a parameter behaves when adjusted.
///
/// Closed variant set so the increment/display logic is checked
/// exhaustively instead of dispatching on an interaction-mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    /// Free-ranging value adjusted in 1% steps of its range (a dial).
    Continuous,
    /// On/off value (a button).
    Toggle,
    /// One of a small set of integer choices (a selector).
    Discrete,
}

impl ParamKind {
    /// Step applied by a single increment/decrement.
    pub fn step(self, min: f32, max: f32) -> f32 {
        match self {
            ParamKind::Continuous => (max - min) / 100.0,
            ParamKind::Toggle | ParamKind::Discrete => 1.0,
        }
    }
}

/// Which host verb carries a value change for this parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamTarget {
    /// Built-in control port, pushed with `param_set`.
    Lv2,
    /// Extended "patch" property, pushed with `patch_set`.
    Patch,
}

/// An adjustable parameter on an effect.
///
/// `value` is always clamped to `[min, max]` and rounded to two decimal
/// places so repeated adjustments never drift the displayed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub kind: ParamKind,
    pub target: ParamTarget,
    pub name: String,
    /// Machine symbol used in host commands.
    pub symbol: String,
    pub min: f32,
    pub max: f32,
    pub value: f32,
}

/// Round to two decimal places.
fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

impl Parameter {
    /// Step size derived from the kind and range.
    pub fn step(&self) -> f32 {
        self.kind.step(self.min, self.max)
    }

    /// Set the value, clamped to bounds and rounded. Returns the stored value.
    pub fn set_value(&mut self, value: f32) -> f32 {
        self.value = round2(value.clamp(self.min, self.max));
        self.value
    }

    /// Move the value up by one step. Returns the stored value.
    pub fn increment(&mut self) -> f32 {
        self.set_value(self.value + self.step())
    }

    /// Move the value down by one step. Returns the stored value.
    pub fn decrement(&mut self) -> f32 {
        self.set_value(self.value - self.step())
    }

    /// Display string, always two decimals.
    pub fn value_string(&self) -> String {
        format!("{:.2}", self.value)
    }
}
