//! Configuration loading and parsing.
//!
//! Parses `dotedit.toml` (or an override path provided by the binary) into a
//! [`Config`] value that is handed by reference to every component needing
//! editor options: cursor motion (tab stop, keep-column), the undo block
//! policy, and the viewport geometry. Nothing reads options from ambient
//! state.
//!
//! Unknown fields are ignored (TOML deserialization tolerance) so the file
//! format can grow without breaking older builds. A malformed file falls back
//! to defaults and logs a warning; a missing file is not worth reporting.
//!
//! Values that would break invariants downstream (a zero tab stop, a zero
//! sized view) are clamped by [`Config::normalize`], which logs each clamp
//! under the `config` target.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "dotedit.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_tab_stop")]
    pub tab_stop: usize,
    #[serde(default = "EditorConfig::enabled")]
    pub keep_visual_column: bool,
    #[serde(default = "EditorConfig::enabled")]
    pub smart_line_start: bool,
    #[serde(default = "EditorConfig::enabled")]
    pub keep_indent: bool,
    #[serde(default = "EditorConfig::enabled")]
    pub undo_break_on_whitespace: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_stop: Self::default_tab_stop(),
            keep_visual_column: true,
            smart_line_start: true,
            keep_indent: true,
            undo_break_on_whitespace: true,
        }
    }
}

impl EditorConfig {
    const fn default_tab_stop() -> usize {
        8
    }
    const fn enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    #[serde(default = "ViewConfig::default_width")]
    pub width: usize,
    #[serde(default = "ViewConfig::default_height")]
    pub height: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

impl ViewConfig {
    const fn default_width() -> usize {
        80
    }
    const fn default_height() -> usize {
        24
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path: working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("dotedit").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                raw: Some(content),
                file,
            };
            cfg.normalize();
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Clamp values that downstream components require to be non-zero.
    /// Returns true if anything was changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        let editor = &mut self.file.editor;
        if editor.tab_stop == 0 {
            info!(target: "config", raw = 0, clamped = 1, "tab_stop_clamped");
            editor.tab_stop = 1;
            changed = true;
        }
        let view = &mut self.file.view;
        if view.width == 0 || view.height == 0 {
            let (raw_width, raw_height) = (view.width, view.height);
            view.width = view.width.max(1);
            view.height = view.height.max(1);
            info!(
                target: "config",
                raw_width,
                raw_height,
                width = view.width,
                height = view.height,
                "view_size_clamped"
            );
            changed = true;
        }
        changed
    }

    pub fn tab_stop(&self) -> usize {
        self.file.editor.tab_stop.max(1)
    }
    pub fn keep_visual_column(&self) -> bool {
        self.file.editor.keep_visual_column
    }
    pub fn smart_line_start(&self) -> bool {
        self.file.editor.smart_line_start
    }
    pub fn keep_indent(&self) -> bool {
        self.file.editor.keep_indent
    }
    pub fn undo_break_on_whitespace(&self) -> bool {
        self.file.editor.undo_break_on_whitespace
    }
    pub fn view_width(&self) -> usize {
        self.file.view.width.max(1)
    }
    pub fn view_height(&self) -> usize {
        self.file.view.height.max(1)
    }

    /// Builder-style override used by tests and by callers embedding the engine.
    pub fn with_tab_stop(mut self, tab_stop: usize) -> Self {
        self.file.editor.tab_stop = tab_stop;
        self.normalize();
        self
    }

    pub fn with_view_size(mut self, width: usize, height: usize) -> Self {
        self.file.view.width = width;
        self.file.view.height = height;
        self.normalize();
        self
    }
}
