use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::amount::NumberLocale;
use crate::error::{AppError, Result};

pub const APP_DOMAIN_ENV: &str = "INVOICE_EASY_APP_DOMAIN";
pub const DEFAULT_OUTPUT_DIR: &str = "~/Documents/Invoices";
pub const DEFAULT_SHARE_DESCRIPTOR: &str = "public/.well-known/farcaster.json";

pub const FALLBACK_APP_NAME: &str = "Create Invoice Easy";
pub const FALLBACK_BUTTON_TITLE: &str = "Launch Create Invoice Easy";
pub const FALLBACK_HOME_URL: &str = "https://example.com";
pub const FALLBACK_SPLASH_BACKGROUND: &str = "#0ea5e9";

// ==========================================
// Settings (settings.toml)
// ==========================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Where the printable page is written.
    pub output_dir: String,
    pub share_descriptor: Option<String>,
    /// Optional directory of `*.html` templates overriding the built-in pages.
    pub template_dir: Option<String>,
    pub locale: NumberLocale,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            share_descriptor: None,
            template_dir: None,
            locale: NumberLocale::default(),
        }
    }
}

impl AppSettings {
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.output_dir))
    }

    pub fn template_path(&self) -> Option<PathBuf> {
        self.template_dir.as_deref().map(|d| PathBuf::from(expand_home_dir(d)))
    }

    pub fn share_descriptor_path(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(
            self.share_descriptor.as_deref().unwrap_or(DEFAULT_SHARE_DESCRIPTOR),
        ))
    }

    /// Missing or unreadable settings fall back to defaults.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return AppSettings::default();
            }
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
                AppSettings::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str).map_err(|e| AppError::io(path, e))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "create-invoice-easy", "app")
}

pub fn settings_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().join("settings.toml"))
        .unwrap_or_else(|| PathBuf::from("settings.toml"))
}

/// Root under which per-session handoff slots live.
pub fn session_root() -> PathBuf {
    project_dirs()
        .map(|d| d.cache_dir().join("sessions"))
        .unwrap_or_else(|| std::env::temp_dir().join("create-invoice-easy").join("sessions"))
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

// ==========================================
// Share descriptor (farcaster.json)
// ==========================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MiniApp {
    pub name: String,
    pub button_title: String,
    pub home_url: String,
    pub image_url: String,
    pub splash_image_url: String,
    pub splash_background_color: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShareDescriptor {
    pub miniapp: MiniApp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    MiniApp,
    Frame,
}

impl EmbedKind {
    pub fn meta_name(self) -> &'static str {
        match self {
            EmbedKind::MiniApp => "fc:miniapp",
            EmbedKind::Frame => "fc:frame",
        }
    }

    fn action_type(self) -> &'static str {
        match self {
            EmbedKind::MiniApp => "launch_miniapp",
            EmbedKind::Frame => "launch_frame",
        }
    }
}

impl ShareDescriptor {
    /// Descriptor used whenever the file cannot be read. Never fails.
    pub fn fallback(app_domain: Option<&str>) -> Self {
        let domain = app_domain.map(str::trim).filter(|d| !d.is_empty());
        let asset = |name: &str| match domain {
            Some(d) => format!("https://{d}/{name}"),
            None => format!("{FALLBACK_HOME_URL}/{name}"),
        };
        ShareDescriptor {
            miniapp: MiniApp {
                name: FALLBACK_APP_NAME.to_string(),
                button_title: FALLBACK_BUTTON_TITLE.to_string(),
                home_url: domain.map(str::to_string).unwrap_or_else(|| FALLBACK_HOME_URL.to_string()),
                image_url: asset("og-image.png"),
                splash_image_url: asset("splash.png"),
                splash_background_color: FALLBACK_SPLASH_BACKGROUND.to_string(),
            },
        }
    }

    pub fn load_or_fallback(path: &Path, app_domain: Option<&str>) -> Self {
        let parsed = fs::read_to_string(path)
            .map_err(|e| AppError::io(path, e))
            .and_then(|content| serde_json::from_str(&content).map_err(AppError::from));
        match parsed {
            Ok(descriptor) => descriptor,
            Err(e) => {
                debug!(error = %e, "share descriptor unavailable, using fallback");
                ShareDescriptor::fallback(app_domain)
            }
        }
    }

    /// JSON payload for the `fc:miniapp` / `fc:frame` meta tags.
    pub fn embed_json(&self, kind: EmbedKind) -> String {
        let app = &self.miniapp;
        json!({
            "version": "1",
            "imageUrl": app.image_url,
            "button": {
                "title": app.button_title,
                "action": {
                    "type": kind.action_type(),
                    "name": app.name,
                    "url": app.home_url,
                    "splashImageUrl": app.splash_image_url,
                    "splashBackgroundColor": app.splash_background_color,
                }
            }
        })
        .to_string()
    }
}

/// Everything read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: AppSettings,
    pub share: ShareDescriptor,
}

impl AppConfig {
    pub fn load() -> Self {
        let settings = AppSettings::load(&settings_path());
        let domain = std::env::var(APP_DOMAIN_ENV).ok();
        let share = ShareDescriptor::load_or_fallback(&settings.share_descriptor_path(), domain.as_deref());
        AppConfig { settings, share }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig { settings: AppSettings::default(), share: ShareDescriptor::fallback(None) }
    }
}
