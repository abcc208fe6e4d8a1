use std::path::PathBuf;

/// User configuration directory (`~/.config/multifx/`).
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("multifx"))
}

/// Runtime config file (`~/.config/multifx/multifx.toml`).
pub fn user_config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("multifx.toml"))
}

/// Directory holding the saved pedalboard profiles.
pub fn profiles_dir() -> Option<PathBuf> {
    config_dir().map(|d| d.join("profiles"))
}

/// Catalog of every installed plugin, profile-shaped.
pub fn catalog_file() -> Option<PathBuf> {
    profiles_dir().map(|d| d.join("all_plugins.json"))
}
