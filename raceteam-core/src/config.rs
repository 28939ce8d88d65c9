//! raceteam configuration at ~/.config/raceteam/config.toml

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{TeamError, TeamResult};
use crate::time_slot::{TimeSlot, default_time_slots};

static DEFAULT_DATA_DIR: &str = "~/raceteam";
const CATALOG_FILE: &str = "events.json";
const SESSION_FILE: &str = "session.json";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

fn is_default_slots(slots: &Vec<TimeSlot>) -> bool {
    *slots == default_time_slots()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TeamConfig {
    /// Shared folder holding roster.json, rsvp.json and practice.json
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    /// Local fallback snapshots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Event catalog JSON file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// IANA zone used to display practice slot times
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Fill a brand new RSVP matrix with random answers
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub seed_empty_rsvp: bool,

    #[serde(default = "default_time_slots", skip_serializing_if = "is_default_slots")]
    pub time_slots: Vec<TimeSlot>,
}

impl Default for TeamConfig {
    fn default() -> Self {
        TeamConfig {
            data_dir: default_data_dir(),
            cache_dir: None,
            catalog: None,
            timezone: None,
            seed_empty_rsvp: true,
            time_slots: default_time_slots(),
        }
    }
}

impl TeamConfig {
    pub fn config_path() -> TeamResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TeamError::Config("Could not determine config directory".into()))?
            .join("raceteam");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, creating a commented default on first run.
    pub fn load() -> TeamResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TeamResult<Self> {
        let config: TeamConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| TeamError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TeamError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> TeamResult<()> {
        if self.time_slots.is_empty() {
            return Err(TeamError::Config("At least one time slot is required".into()));
        }
        for (i, slot) in self.time_slots.iter().enumerate() {
            if slot.id.is_empty() || slot.id.contains('_') {
                return Err(TeamError::Config(format!(
                    "Time slot id '{}' must be non-empty and may not contain '_'",
                    slot.id
                )));
            }
            if self.time_slots[..i].iter().any(|s| s.id == slot.id) {
                return Err(TeamError::Config(format!("Duplicate time slot id '{}'", slot.id)));
            }
        }
        Ok(())
    }

    pub fn to_toml(&self) -> TeamResult<String> {
        toml::to_string_pretty(self).map_err(|e| TeamError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TeamResult<()> {
        let contents = format!(
            "\
# raceteam configuration

# Shared folder with the team's roster, RSVP and practice documents:
# data_dir = \"{}\"

# Where the local fallback copy is kept:
# cache_dir = \"~/.cache/raceteam\"

# Event catalog (defaults to events.json inside data_dir):
# catalog = \"~/raceteam/events.json\"

# Timezone for practice slot times (defaults to the system timezone):
# timezone = \"Australia/Sydney\"

# Fill an empty RSVP matrix with random answers on first run:
# seed_empty_rsvp = true

# Practice slots, reference times in UTC:
# [[time_slots]]
# id = \"aussie\"
# display_name = \"Aussie Friendly\"
# reference_time = \"11:00:00\"
# description = \"Morning AEDT / Late Evening Americas\"
",
            DEFAULT_DATA_DIR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TeamError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TeamError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        expand(&self.data_dir)
    }

    pub fn cache_path(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => expand(dir),
            None => dirs::cache_dir()
                .map(|d| d.join("raceteam"))
                .unwrap_or_else(|| expand(Path::new("~/.cache/raceteam"))),
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        match &self.catalog {
            Some(path) => expand(path),
            None => self.data_path().join(CATALOG_FILE),
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.cache_path().join(SESSION_FILE)
    }

    /// Configured display timezone, else the system zone, else UTC.
    pub fn timezone(&self) -> Tz {
        let name = match &self.timezone {
            Some(name) => name.clone(),
            None => match iana_time_zone::get_timezone() {
                Ok(name) => name,
                Err(_) => return Tz::UTC,
            },
        };

        name.parse().unwrap_or_else(|_| {
            warn!("Unknown timezone '{name}', using UTC");
            Tz::UTC
        })
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
