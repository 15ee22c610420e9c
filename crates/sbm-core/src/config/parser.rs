//! TOML parser with helpful error messages

use std::path::Path;

use super::schema::SbmConfig;
use crate::error::{SbmError, SbmResult};

/// Parse a config file with detailed error messages
pub fn parse_config(path: &Path) -> SbmResult<SbmConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| SbmError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&content).map_err(|message| SbmError::ConfigParse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse config content from a string
pub fn parse_config_str(content: &str) -> Result<SbmConfig, String> {
    let config: SbmConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(&e, content))?;
    config.validate()?;
    Ok(config)
}

/// Serialize a configuration to TOML
pub fn to_toml(config: &SbmConfig) -> anyhow::Result<String> {
    toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))
}

fn enhance_toml_error(error: &toml::de::Error, content: &str) -> String {
    let message = error.message().to_string();
    match error.span() {
        Some(span) => {
            let line_num = content[..span.start.min(content.len())]
                .matches('\n')
                .count()
                + 1;
            format!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                get_line_context(content, line_num),
                message
            )
        }
        None => format!("TOML parsing error: {message}"),
    }
}

/// Context lines around an error, with the failing line marked
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());
    if start >= end {
        return String::new();
    }

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
