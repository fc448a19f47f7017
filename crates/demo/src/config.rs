//! Demo configuration loaded from TOML.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use curtain_presentation::ProxyConfig;
use serde::Deserialize;

/// Top-level demo configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
	/// Number of concurrent presenters.
	pub callers: usize,
	/// Per-call timeout applied by each caller; the proxy itself never times out.
	pub timeout_ms: Option<u64>,
	pub container: ContainerConfig,
	pub proxy: ProxyConfig,
}

impl Default for DemoConfig {
	fn default() -> Self {
		Self {
			callers: 3,
			timeout_ms: None,
			container: ContainerConfig::default(),
			proxy: ProxyConfig::default().with_label("demo"),
		}
	}
}

impl DemoConfig {
	/// Reads and parses a config file.
	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
		Self::from_toml(&text).with_context(|| format!("failed to parse {}", path.display()))
	}

	pub fn from_toml(text: &str) -> anyhow::Result<Self> {
		Ok(toml::from_str(text)?)
	}

	pub fn timeout(&self) -> Option<Duration> {
		self.timeout_ms.map(Duration::from_millis)
	}
}

/// Timing of the simulated container's show/hide animations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
	pub present_delay_ms: u64,
	pub dismiss_delay_ms: u64,
}

impl Default for ContainerConfig {
	fn default() -> Self {
		Self {
			present_delay_ms: 150,
			dismiss_delay_ms: 100,
		}
	}
}

impl ContainerConfig {
	pub fn present_delay(&self) -> Duration {
		Duration::from_millis(self.present_delay_ms)
	}

	pub fn dismiss_delay(&self) -> Duration {
		Duration::from_millis(self.dismiss_delay_ms)
	}
}
