use anyhow::{Context, Result};
use rockets_core::SimConfig;
use std::env;
use std::fs;
use std::path::Path;
use tracing_subscriber::filter::EnvFilter;

pub const ENV_POPULATION_SIZE: &str = "ROCKETS_POPULATION_SIZE";
pub const ENV_LIFESPAN: &str = "ROCKETS_LIFESPAN";
pub const ENV_MUTATION_RATE: &str = "ROCKETS_MUTATION_RATE";
pub const ENV_SEED: &str = "ROCKETS_SEED";
pub const ENV_LOG: &str = "RUST_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

/// Log filter from a `RUST_LOG`-style directive string. Missing, blank or
/// unparseable input falls back to `info`; anything else is used as given,
/// so `RUST_LOG=trace` reaches the per-tick events.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Reads a JSON config file, or the built-in defaults when no path is given,
/// then applies `ROCKETS_*` environment overrides. The result is validated
/// before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let config = match path {
        Some(path) => read_config_file(path)?,
        None => SimConfig::default(),
    };
    let config = apply_overrides(config, |name| env::var(name).ok());
    config
        .validate()
        .context("configuration rejected by the simulation core")?;
    Ok(config)
}

pub fn read_config_file(path: &Path) -> Result<SimConfig> {
    let raw = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed parsing {}", path.display()))
}

/// Applies overrides from `lookup`. Unparseable or non-positive values are
/// ignored with a warning, leaving the file value in place.
pub fn apply_overrides(
    mut config: SimConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SimConfig {
    if let Some(size) = read_positive_usize(&lookup, ENV_POPULATION_SIZE) {
        config.population_size = size;
    }
    if let Some(lifespan) = read_positive_u32(&lookup, ENV_LIFESPAN) {
        config.lifespan = lifespan;
    }
    if let Some(rate) = read_f64(&lookup, ENV_MUTATION_RATE) {
        config.mutation_rate = rate;
    }
    if let Some(raw) = lookup(ENV_SEED) {
        match crate::util::parse_seed(&raw) {
            Ok(seed) => config.seed = Some(seed),
            Err(err) => tracing::warn!("ignoring {}={:?}: {err}", ENV_SEED, raw),
        }
    }
    config
}

fn read_positive_usize(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<usize> {
    let raw = lookup(name)?;
    let value = raw.trim().parse::<usize>().ok().filter(|value| *value > 0);
    if value.is_none() {
        tracing::warn!("ignoring {}={:?}: expected a positive integer", name, raw);
    }
    value
}

fn read_positive_u32(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u32> {
    let raw = lookup(name)?;
    let value = raw.trim().parse::<u32>().ok().filter(|value| *value > 0);
    if value.is_none() {
        tracing::warn!("ignoring {}={:?}: expected a positive integer", name, raw);
    }
    value
}

fn read_f64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<f64> {
    let raw = lookup(name)?;
    let value = raw.trim().parse::<f64>().ok();
    if value.is_none() {
        tracing::warn!("ignoring {}={:?}: expected a number", name, raw);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::layer::Layer;
    use tracing_subscriber::Registry;

    fn max_level(filter: &EnvFilter) -> Option<LevelFilter> {
        <EnvFilter as Layer<Registry>>::max_level_hint(filter)
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = apply_overrides(
            SimConfig::default(),
            lookup_from(&[
                (ENV_POPULATION_SIZE, "12"),
                (ENV_LIFESPAN, "80"),
                (ENV_MUTATION_RATE, "0.25"),
                (ENV_SEED, "0x2a"),
            ]),
        );
        assert_eq!(config.population_size, 12);
        assert_eq!(config.lifespan, 80);
        assert_eq!(config.mutation_rate, 0.25);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn bad_overrides_are_ignored() {
        let defaults = SimConfig::default();
        let config = apply_overrides(
            defaults.clone(),
            lookup_from(&[
                (ENV_POPULATION_SIZE, "0"),
                (ENV_LIFESPAN, "many"),
                (ENV_SEED, "not-a-seed"),
            ]),
        );
        assert_eq!(config, defaults);
    }

    #[test]
    fn out_of_range_rate_survives_override_but_fails_validation() {
        let config = apply_overrides(
            SimConfig::default(),
            lookup_from(&[(ENV_MUTATION_RATE, "1.5")]),
        );
        assert_eq!(config.mutation_rate, 1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn log_filter_honours_a_global_level() {
        assert_eq!(max_level(&log_filter(Some("trace"))), Some(LevelFilter::TRACE));
        assert_eq!(max_level(&log_filter(Some("debug"))), Some(LevelFilter::DEBUG));
        assert_eq!(max_level(&log_filter(Some("warn"))), Some(LevelFilter::WARN));
    }

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(max_level(&log_filter(None)), Some(LevelFilter::INFO));
        assert_eq!(max_level(&log_filter(Some("   "))), Some(LevelFilter::INFO));
    }
}
