use std::sync::LazyLock;

use regex::Regex;

use super::StateDict;
use crate::Error;

static FIRST_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("integer pattern is valid"));

/// Layer counts of an NVIDIA-style generator, recovered from its key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of fully connected layers in the mapping network.
    pub n_mapping: usize,
    /// Number of synthesis blocks, `b4` up to the output resolution.
    pub n_layers: usize,
}

impl GeneratorConfig {
    /// Scans `mapping.fc{i}` keys for the mapping depth and `synthesis.b{res}`
    /// keys for the output resolution.
    pub fn infer<T>(state: &StateDict<T>) -> Result<Self, Error> {
        let n_mapping = max_first_integer(state, "mapping.fc")
            .ok_or_else(|| Error::Config("no `mapping.fc` keys".to_string()))?
            + 1;

        let resolution = max_first_integer(state, "synthesis.b")
            .ok_or_else(|| Error::Config("no `synthesis.b` keys".to_string()))?;
        if resolution < 4 {
            return Err(Error::Config(format!(
                "resolution {resolution} is below the 4x4 base block"
            )));
        }

        Ok(Self {
            n_mapping,
            n_layers: (resolution / 2).ilog2() as usize,
        })
    }

    /// Side length of the square image produced by the last synthesis block.
    pub fn resolution(&self) -> usize {
        2 << self.n_layers
    }
}

fn max_first_integer<T>(state: &StateDict<T>, family: &str) -> Option<usize> {
    state
        .keys()
        .filter(|name| name.contains(family))
        .filter_map(|name| FIRST_INTEGER.find(name)?.as_str().parse().ok())
        .max()
}

#[cfg(test)]
mod tests {
    use ndarray::ArrayD;

    use super::*;

    fn keys(names: &[&str]) -> StateDict<f32> {
        names
            .iter()
            .map(|name| (name.to_string(), ArrayD::zeros(vec![1])))
            .collect()
    }

    #[test]
    fn infer_from_names() {
        let state = keys(&[
            "mapping.fc0.weight",
            "mapping.fc7.bias",
            "mapping.w_avg",
            "synthesis.b4.const",
            "synthesis.b8.conv0.weight",
            "synthesis.b1024.torgb.bias",
        ]);

        let config = GeneratorConfig::infer(&state).unwrap();
        assert_eq!(
            config,
            GeneratorConfig {
                n_mapping: 8,
                n_layers: 9
            }
        );
        assert_eq!(config.resolution(), 1024);
    }

    #[test]
    fn base_block_only() {
        let state = keys(&["mapping.fc1.weight", "synthesis.b4.conv1.weight"]);

        let config = GeneratorConfig::infer(&state).unwrap();
        assert_eq!(config.n_mapping, 2);
        assert_eq!(config.n_layers, 1);
        assert_eq!(config.resolution(), 4);
    }

    #[test]
    fn missing_families() {
        assert!(matches!(
            GeneratorConfig::infer(&keys(&["synthesis.b4.const"])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            GeneratorConfig::infer(&keys(&["mapping.fc0.weight"])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            GeneratorConfig::infer(&keys(&["mapping.fc0.weight", "synthesis.b2.const"])),
            Err(Error::Config(_))
        ));
    }
}
