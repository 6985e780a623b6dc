use serde::{Deserialize, Serialize};

use crate::constants::DAY_IN_SECONDS;
use crate::error::{CoreResult, YeveswapError};

/// Host-tunable engine limits, loaded from TOML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Tick array pages a single swap may be given
    pub max_swap_tick_arrays: usize,

    /// Seconds of emissions the reward vault must cover when emissions are set
    pub reward_emission_window_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_swap_tick_arrays: 3,
            reward_emission_window_secs: DAY_IN_SECONDS,
        }
    }
}

impl EngineSettings {
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let settings: EngineSettings = toml::from_str(content)
            .map_err(|e| YeveswapError::InvalidSettings(format!("failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| YeveswapError::InvalidSettings(format!("failed to serialize settings: {e}")))
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.max_swap_tick_arrays == 0 {
            return Err(YeveswapError::InvalidSettings(
                "max_swap_tick_arrays must be greater than 0".to_string(),
            ));
        }
        if self.reward_emission_window_secs == 0 {
            return Err(YeveswapError::InvalidSettings(
                "reward_emission_window_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let settings = EngineSettings::from_toml_str("max_swap_tick_arrays = 5").unwrap();
        assert_eq!(settings.max_swap_tick_arrays, 5);
        assert_eq!(settings.reward_emission_window_secs, DAY_IN_SECONDS);

        assert_eq!(
            EngineSettings::from_toml_str("").unwrap(),
            EngineSettings::default()
        );
    }

    #[test]
    fn test_settings_validation() {
        assert!(matches!(
            EngineSettings::from_toml_str("max_swap_tick_arrays = 0"),
            Err(YeveswapError::InvalidSettings(_))
        ));
        assert!(matches!(
            EngineSettings::from_toml_str("reward_emission_window_secs = 0"),
            Err(YeveswapError::InvalidSettings(_))
        ));
        assert!(matches!(
            EngineSettings::from_toml_str("max_swap_tick_arrays = \"three\""),
            Err(YeveswapError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = EngineSettings {
            max_swap_tick_arrays: 4,
            reward_emission_window_secs: 3_600,
        };
        let content = settings.to_toml_string().unwrap();
        assert_eq!(EngineSettings::from_toml_str(&content).unwrap(), settings);
    }
}
