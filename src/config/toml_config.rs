use crate::utils::error::{LabError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fixed reagent parameters of the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReagentConfig {
    /// Volume of HCl sample pipetted into the vessel.
    pub sample_volume_ml: f64,
    pub acid_concentration_m: f64,
    pub titrant_concentration_m: f64,
    /// Phenolphthalein turns pink at or above this pH.
    pub indicator_transition_ph: f64,
}

impl Default for ReagentConfig {
    fn default() -> Self {
        Self {
            sample_volume_ml: 10.0,
            acid_concentration_m: 0.1,
            titrant_concentration_m: 0.1,
            indicator_transition_ph: 8.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DripConfig {
    pub increment_ml: f64,
    pub interval_ms: u64,
    pub burette_capacity_ml: f64,
}

impl Default for DripConfig {
    fn default() -> Self {
        Self {
            increment_ml: 0.1,
            interval_ms: 200,
            burette_capacity_ml: 50.0,
        }
    }
}

impl DripConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselConfig {
    pub level_percent_per_ml: f64,
    pub max_level_percent: f64,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            level_percent_per_ml: 2.0,
            max_level_percent: 90.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub reagents: ReagentConfig,
    pub drip: DripConfig,
    pub vessel: VesselConfig,
}

impl LabConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LabError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LabError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DRIP_INTERVAL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LabError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let r = &self.reagents;
        validation::validate_positive("reagents.sample_volume_ml", r.sample_volume_ml)?;
        validation::validate_positive("reagents.acid_concentration_m", r.acid_concentration_m)?;
        validation::validate_positive(
            "reagents.titrant_concentration_m",
            r.titrant_concentration_m,
        )?;
        validation::validate_range(
            "reagents.indicator_transition_ph",
            r.indicator_transition_ph,
            0.0,
            14.0,
        )?;

        let d = &self.drip;
        validation::validate_positive("drip.increment_ml", d.increment_ml)?;
        validation::validate_min_u64("drip.interval_ms", d.interval_ms, 1)?;
        validation::validate_positive("drip.burette_capacity_ml", d.burette_capacity_ml)?;

        let v = &self.vessel;
        validation::validate_positive("vessel.level_percent_per_ml", v.level_percent_per_ml)?;
        validation::validate_percent("vessel.max_level_percent", v.max_level_percent)?;

        Ok(())
    }
}

impl Validate for LabConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
