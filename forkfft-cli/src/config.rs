//! Configuration loading from forkfft.toml
//!
//! The root process may pick up a `forkfft.toml` found by walking up from the
//! current directory. Child nodes never read it: their behaviour is fixed by
//! the protocol, and the few settings they need arrive through the
//! environment of the spawning parent.

use forkfft_core::Precision;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the file searched for by [`ForkfftConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "forkfft.toml";

/// Environment variable carrying a node's depth in the process tree
pub const DEPTH_ENV: &str = "FORKFFT_NODE_DEPTH";

/// Environment variable carrying the log filter, forwarded to children
pub const LOG_ENV: &str = "FORKFFT_LOG";

/// Environment variable carrying the wait timeout, forwarded to children
pub const WAIT_TIMEOUT_ENV: &str = "FORKFFT_WAIT_TIMEOUT";

/// forkfft.toml contents
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ForkfftConfig {
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

/// How the recursive halves of a transform are computed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Every recursive call is a freshly spawned copy of this program (default)
    #[default]
    Process,
    /// Recursive calls run inside this process, with identical line-level rounding
    InProcess,
}

impl ExecutionMode {
    /// Whether this mode spawns child processes
    pub fn spawns_children(self) -> bool {
        matches!(self, ExecutionMode::Process)
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Decimals printed by the root process: 3 or 6
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

fn default_precision() -> usize {
    6
}

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    /// Execution mode: "process" or "in-process"
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Upper bound on waiting for a child (e.g. "30s"); unbounded when absent
    #[serde(default)]
    pub wait_timeout: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing-subscriber filter directive
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "forkfft=warn".to_string()
}

impl ForkfftConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Output precision named by the file, if it is one we can print
    pub fn precision(&self) -> anyhow::Result<Precision> {
        Precision::from_digits(self.output.precision).ok_or_else(|| {
            anyhow::anyhow!(
                "output.precision must be 3 or 6, got {}",
                self.output.precision
            )
        })
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# forkfft configuration

[output]
# Decimals printed by the root process (3 or 6). Children always use 6.
precision = 6

[runner]
# "process" spawns a copy of forkfft per recursive call, "in-process" does not
mode = "process"
# Give up on a child that has not exited after this long (uncomment to enable)
# wait_timeout = "30s"

[log]
# tracing filter; FORKFFT_LOG overrides it
filter = "forkfft=warn"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let seconds_per_unit = match unit_part.to_lowercase().as_str() {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" | "" => 1.0,
            "m" | "min" => 60.0,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Duration::try_from_secs_f64(value * seconds_per_unit)
            .map_err(|e| anyhow::anyhow!("Duration out of range: {}: {e}", s))
    }
}

/// Settings one node runs with, fixed before it reads any input
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Name used as the prefix of diagnostics
    pub program: String,
    /// Decimals of this node's own output
    pub precision: Precision,
    /// How halves are computed
    pub mode: ExecutionMode,
    /// Bound on waiting for each child; `None` blocks indefinitely
    pub wait_timeout: Option<Duration>,
    /// Distance from the root; the root is 0
    pub depth: u32,
    /// Log filter handed down to children
    pub log_filter: String,
    /// Executable to spawn for children; defaults to the running binary
    pub executable: Option<PathBuf>,
}

impl NodeConfig {
    /// Root configuration with defaults
    pub fn root(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            precision: Precision::Full,
            mode: ExecutionMode::Process,
            wait_timeout: None,
            depth: 0,
            log_filter: default_filter(),
            executable: None,
        }
    }

    /// Whether this node is the root of the tree
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// Configuration of a child of this node.
    ///
    /// Children always print full precision so rounding does not compound.
    pub fn child(&self) -> Self {
        Self {
            precision: Precision::Full,
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Environment a spawned child needs to reconstruct its configuration
    pub fn child_env(&self) -> Vec<(&'static str, String)> {
        let mut env = vec![
            (DEPTH_ENV, (self.depth + 1).to_string()),
            (LOG_ENV, self.log_filter.clone()),
        ];
        if let Some(timeout) = self.wait_timeout {
            env.push((WAIT_TIMEOUT_ENV, format!("{}ms", timeout.as_millis())));
        }
        env
    }

    /// Depth announced by the parent through [`DEPTH_ENV`], 0 if absent
    pub fn depth_from_env() -> u32 {
        std::env::var(DEPTH_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ForkfftConfig::default();
        assert_eq!(config.output.precision, 6);
        assert_eq!(config.runner.mode, ExecutionMode::Process);
        assert!(config.runner.wait_timeout.is_none());
        assert_eq!(config.log.filter, "forkfft=warn");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(
            ForkfftConfig::parse_duration("3s").unwrap(),
            Duration::from_secs(3)
        );
        assert_eq!(
            ForkfftConfig::parse_duration("500ms").unwrap(),
            Duration::from_millis(500)
        );
        assert_eq!(
            ForkfftConfig::parse_duration("2m").unwrap(),
            Duration::from_secs(120)
        );
        assert_eq!(
            ForkfftConfig::parse_duration("1.5s").unwrap(),
            Duration::from_millis(1500)
        );
        assert_eq!(
            ForkfftConfig::parse_duration("10").unwrap(),
            Duration::from_secs(10)
        );
        assert!(ForkfftConfig::parse_duration("").is_err());
        assert!(ForkfftConfig::parse_duration("5 parsecs").is_err());
        assert!(ForkfftConfig::parse_duration("-1s").is_err());
        assert!(ForkfftConfig::parse_duration("99999999999999999999999m").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [output]
            precision = 3

            [runner]
            mode = "in-process"
            wait_timeout = "2s"
        "#;

        let config: ForkfftConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.precision().unwrap(), Precision::Short);
        assert_eq!(config.runner.mode, ExecutionMode::InProcess);
        assert_eq!(config.runner.wait_timeout.as_deref(), Some("2s"));
        // Defaults should still apply
        assert_eq!(config.log.filter, "forkfft=warn");
    }

    #[test]
    fn test_unsupported_precision() {
        let config: ForkfftConfig = toml::from_str("[output]\nprecision = 4\n").unwrap();
        assert!(config.precision().is_err());
    }

    #[test]
    fn test_default_toml_parses() {
        let config: ForkfftConfig = toml::from_str(&ForkfftConfig::default_toml()).unwrap();
        assert_eq!(config.output.precision, 6);
        assert_eq!(config.runner.mode, ExecutionMode::Process);
    }

    #[test]
    fn test_child_config() {
        let mut root = NodeConfig::root("forkfft");
        root.precision = Precision::Short;
        root.wait_timeout = Some(Duration::from_secs(1));

        let child = root.child();
        assert_eq!(child.depth, 1);
        assert!(!child.is_root());
        assert_eq!(child.precision, Precision::Full);
        assert_eq!(child.wait_timeout, root.wait_timeout);

        let env = child.child_env();
        assert!(env.contains(&(DEPTH_ENV, "2".to_string())));
        assert!(env.contains(&(LOG_ENV, "forkfft=warn".to_string())));
        assert!(env.contains(&(WAIT_TIMEOUT_ENV, "1000ms".to_string())));
        assert_eq!(
            ForkfftConfig::parse_duration("1000ms").unwrap(),
            Duration::from_secs(1)
        );
    }
}
