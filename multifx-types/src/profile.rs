//! On-disk profile shape.
//!
//! A profile is a JSON object with a `plugins` list. Everything except
//! `uri` (and, per parameter, `symbol`/`min`/`max`) is optional with
//! documented defaults, so hand-edited profiles stay loadable. The
//! records here are the raw shape only; conversion to the live model
//! lives in multifx-core so it can log what it skips.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub plugins: Vec<PluginRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    #[serde(default = "default_name")]
    pub name: String,
    /// Required: a record without a uri rejects the whole profile.
    pub uri: String,
    #[serde(default)]
    pub bypass: u8,
    #[serde(default = "default_channels")]
    pub channels: String,
    #[serde(default = "default_inputs")]
    pub inputs: Vec<String>,
    #[serde(default = "default_outputs")]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParamRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamRecord {
    #[serde(rename = "type", default = "default_param_type")]
    pub target: String,
    #[serde(default = "default_param_name")]
    pub name: String,
    /// Required per parameter; a record without one is skipped on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
    /// Fallback for `value` when only a default is saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f32>,
}

fn default_name() -> String {
    "plugin".into()
}

fn default_channels() -> String {
    "mono".into()
}

fn default_inputs() -> Vec<String> {
    vec!["in".into()]
}

fn default_outputs() -> Vec<String> {
    vec!["out".into()]
}

fn default_param_type() -> String {
    "lv2".into()
}

fn default_param_name() -> String {
    "parameter".into()
}

fn default_mode() -> String {
    "dial".into()
}

impl ParamRecord {
    /// Saved value, falling back to the saved default, then 1.0.
    pub fn effective_value(&self) -> f32 {
        self.value.or(self.default).unwrap_or(1.0)
    }
}
