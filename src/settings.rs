use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// Error-correction level forwarded to the rendering collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        }
    }
}

/// Presets handed to the external rendering collaborator alongside the
/// encoded payload. The codec itself never reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorSettings {
    pub size: u32,
    pub error_correction: ErrorCorrection,
    pub foreground: String,
    pub background: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            size: 300,
            error_correction: ErrorCorrection::M,
            foreground: "#000000".into(),
            background: "#ffffff".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    generator: GeneratorSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn generator(&self) -> GeneratorSettings {
        self.data.read().unwrap().generator.clone()
    }

    pub fn update_generator(&self, settings: GeneratorSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.generator = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_settings_path() -> PathBuf {
        std::env::temp_dir().join(format!("qrtrail-settings-test-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_settings_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        let generator = store.generator();
        assert_eq!(generator.size, 300);
        assert_eq!(generator.error_correction, ErrorCorrection::M);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn updates_round_trip_through_the_file() {
        let path = temp_settings_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_generator(GeneratorSettings {
                size: 500,
                error_correction: ErrorCorrection::H,
                foreground: "#112233".into(),
                background: "#ffffff".into(),
            })
            .unwrap();

        let reloaded = SettingsStore::new(path.clone()).unwrap();
        let generator = reloaded.generator();
        assert_eq!(generator.size, 500);
        assert_eq!(generator.error_correction, ErrorCorrection::H);
        assert_eq!(generator.foreground, "#112233");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let path = temp_settings_path();
        fs::write(&path, "not json").unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.generator().size, 300);
        let _ = fs::remove_file(&path);
    }
}
