use crate::engine::fen::STARTING_FEN;

/// Deepest perft the report tool will run.
pub const MAX_DEPTH: u32 = 8;

/// How the report tool prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Report tool configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Position to analyse.
    pub fen: String,
    /// Perft depth, clamped to `1..=MAX_DEPTH`.
    pub depth: u32,
    /// Print per-root-move counts.
    pub divide: bool,
    pub output: OutputFormat,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            fen: lookup("CHESS_FEN")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.fen),
            depth: lookup("CHESS_PERFT_DEPTH")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .map_or(defaults.depth, |d| d.clamp(1, MAX_DEPTH)),
            divide: lookup("CHESS_DIVIDE")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(defaults.divide),
            output: lookup("CHESS_OUTPUT")
                .and_then(|v| OutputFormat::parse(&v))
                .unwrap_or(defaults.output),
        }
    }

    /// Apply command-line flags on top of the environment.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            match arg.as_ref() {
                "--json" => self.output = OutputFormat::Json,
                "--divide" => self.divide = true,
                _ => {}
            }
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            fen: STARTING_FEN.to_string(),
            depth: 4,
            divide: false,
            output: OutputFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.fen, STARTING_FEN);
        assert_eq!(config.depth, 4);
        assert!(!config.divide);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.fen, STARTING_FEN);
        assert_eq!(config.depth, 4);
    }

    #[test]
    fn reads_all_keys() {
        let config = config_from(&[
            ("CHESS_FEN", "8/8/8/8/8/8/8/8 w - - 0 1"),
            ("CHESS_PERFT_DEPTH", "2"),
            ("CHESS_DIVIDE", "true"),
            ("CHESS_OUTPUT", "JSON"),
        ]);
        assert_eq!(config.fen, "8/8/8/8/8/8/8/8 w - - 0 1");
        assert_eq!(config.depth, 2);
        assert!(config.divide);
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn depth_is_clamped_and_garbage_ignored() {
        assert_eq!(config_from(&[("CHESS_PERFT_DEPTH", "0")]).depth, 1);
        assert_eq!(config_from(&[("CHESS_PERFT_DEPTH", "40")]).depth, MAX_DEPTH);
        assert_eq!(config_from(&[("CHESS_PERFT_DEPTH", "deep")]).depth, 4);
        assert_eq!(
            config_from(&[("CHESS_OUTPUT", "xml")]).output,
            OutputFormat::Text
        );
    }

    #[test]
    fn flags_override_environment() {
        let config = config_from(&[("CHESS_OUTPUT", "text")]).with_args(["--json", "--divide"]);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.divide);
    }
}
