use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub steps: Option<u64>,
    pub seed: Option<u64>,
    pub processes: Option<usize>,
}

/// Apply CLI overrides to a configuration
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(steps) = overrides.steps {
        info!("Overriding step count: {}", steps);
        config.general.steps = steps;
    }

    if let Some(seed) = overrides.seed {
        info!("Overriding RNG seed: {}", seed);
        config.general.seed = Some(seed);
    }

    if let Some(processes) = overrides.processes {
        info!("Overriding process count: {}", processes);
        config.system.processes = processes;
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
