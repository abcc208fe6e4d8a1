//! Profile and catalog handling: record ↔ model conversion plus the
//! on-disk profile store (the `profiles/` directory in the config dir).
//!
//! Conversion is lenient the way the original pedalboard was: a
//! parameter record missing its symbol or bounds is skipped with a
//! warning, but a plugin with an invalid channel arity rejects the
//! profile since it could never be wired.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

use multifx_types::profile::{ParamRecord, PluginRecord, ProfileRecord};
use multifx_types::{
    Chain, Channels, EffectDescriptor, EffectInstance, ParamKind, ParamTarget, Parameter,
};

#[derive(Debug)]
pub enum ProfileError {
    Io(io::Error),
    Json(serde_json::Error),
    BadChannels { plugin: String, value: String },
    EmptyName,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::Io(e) => write!(f, "profile I/O error: {}", e),
            ProfileError::Json(e) => write!(f, "invalid profile JSON: {}", e),
            ProfileError::BadChannels { plugin, value } => {
                write!(f, "plugin {:?} has invalid channel type {:?}", plugin, value)
            }
            ProfileError::EmptyName => write!(f, "profile name is required"),
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProfileError::Io(e) => Some(e),
            ProfileError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProfileError {
    fn from(e: io::Error) -> Self {
        ProfileError::Io(e)
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(e: serde_json::Error) -> Self {
        ProfileError::Json(e)
    }
}

// ─── record → model ─────────────────────────────────────────────────

fn kind_from_mode(mode: &str, name: &str) -> ParamKind {
    match mode {
        "dial" => ParamKind::Continuous,
        "button" => ParamKind::Toggle,
        "selector" => ParamKind::Discrete,
        other => {
            warn!("parameter {:?}: unknown mode {:?}, treating as dial", name, other);
            ParamKind::Continuous
        }
    }
}

fn target_from_type(target: &str, name: &str) -> ParamTarget {
    match target {
        "lv2" => ParamTarget::Lv2,
        "plug" => ParamTarget::Patch,
        other => {
            warn!("parameter {:?}: unknown type {:?}, treating as lv2", name, other);
            ParamTarget::Lv2
        }
    }
}

/// Build a model parameter, or skip the record if it is unusable.
pub fn parameter_from_record(record: &ParamRecord) -> Option<Parameter> {
    let Some(symbol) = record.symbol.clone() else {
        warn!("skipping parameter {:?}: missing symbol", record.name);
        return None;
    };
    let (Some(min), Some(max)) = (record.min, record.max) else {
        warn!("skipping parameter {:?}: missing bounds", record.name);
        return None;
    };
    let mut param = Parameter {
        kind: kind_from_mode(&record.mode, &record.name),
        target: target_from_type(&record.target, &record.name),
        name: record.name.clone(),
        symbol,
        min,
        max,
        value: min,
    };
    param.set_value(record.effective_value());
    Some(param)
}

pub fn descriptor_from_record(record: &PluginRecord) -> Result<EffectDescriptor, ProfileError> {
    let channels = match record.channels.as_str() {
        "mono" => Channels::Mono,
        "stereo" => Channels::Stereo,
        other => {
            return Err(ProfileError::BadChannels {
                plugin: record.name.clone(),
                value: other.to_string(),
            })
        }
    };
    Ok(EffectDescriptor {
        name: record.name.clone(),
        uri: record.uri.clone(),
        channels,
        inputs: record.inputs.clone(),
        outputs: record.outputs.clone(),
        parameters: record.parameters.iter().filter_map(parameter_from_record).collect(),
    })
}

/// Build the in-memory chain a profile describes. Host instance numbers
/// are assigned in order starting from zero.
pub fn chain_from_profile(record: &ProfileRecord) -> Result<Chain, ProfileError> {
    let mut chain = Chain::new();
    for plugin in &record.plugins {
        let desc = descriptor_from_record(plugin)?;
        chain.append(&desc, plugin.bypass != 0);
    }
    Ok(chain)
}

// ─── model → record ─────────────────────────────────────────────────

fn record_from_parameter(param: &Parameter) -> ParamRecord {
    ParamRecord {
        target: match param.target {
            ParamTarget::Lv2 => "lv2".into(),
            ParamTarget::Patch => "plug".into(),
        },
        name: param.name.clone(),
        symbol: Some(param.symbol.clone()),
        mode: match param.kind {
            ParamKind::Continuous => "dial".into(),
            ParamKind::Toggle => "button".into(),
            ParamKind::Discrete => "selector".into(),
        },
        min: Some(param.min),
        max: Some(param.max),
        value: Some(param.value),
        default: Some(param.value),
    }
}

pub fn record_from_instance(instance: &EffectInstance) -> PluginRecord {
    PluginRecord {
        name: instance.name().to_string(),
        uri: instance.uri().to_string(),
        bypass: u8::from(instance.bypass),
        channels: match instance.channels() {
            Channels::Mono => "mono".into(),
            Channels::Stereo => "stereo".into(),
        },
        inputs: instance.inputs().to_vec(),
        outputs: instance.outputs().to_vec(),
        parameters: instance.parameters().iter().map(record_from_parameter).collect(),
    }
}

pub fn profile_from_chain(chain: &Chain) -> ProfileRecord {
    ProfileRecord {
        plugins: chain.iter().map(record_from_instance).collect(),
    }
}

// ─── profile store ──────────────────────────────────────────────────

pub fn load_profile(path: &Path) -> Result<ProfileRecord, ProfileError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn save_profile(path: &Path, record: &ProfileRecord) -> Result<(), ProfileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(record)?)?;
    Ok(())
}

/// Path of a named profile under `dir`.
pub fn profile_path(dir: &Path, name: &str) -> Result<PathBuf, ProfileError> {
    if name.is_empty() {
        return Err(ProfileError::EmptyName);
    }
    Ok(dir.join(format!("{}.json", name)))
}

/// Names of the saved profiles in `dir`, sorted. The plugin catalog
/// file is not a selectable profile.
pub fn list_profiles(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter_map(|entry| {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        return None;
                    }
                    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
                })
                .filter(|name| name != CATALOG_STEM)
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

pub fn delete_profile(dir: &Path, name: &str) -> Result<(), ProfileError> {
    let path = profile_path(dir, name)?;
    fs::remove_file(path)?;
    Ok(())
}

const CATALOG_STEM: &str = "all_plugins";

/// Load the catalog of installed plugins (`all_plugins.json`): a
/// profile-shaped record whose entries become the descriptors offered
/// when appending a new effect to a live chain.
pub fn load_catalog(path: &Path) -> Result<Vec<EffectDescriptor>, ProfileError> {
    let record = load_profile(path)?;
    record.plugins.iter().map(descriptor_from_record).collect()
}
