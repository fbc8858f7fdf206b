use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::theme::Theme;

/// Public catalog the client talks to when no override is given.
pub const DEFAULT_API_BASE: &str = "https://rickandmortyapi.com/api";

/// Citadex - Terminal character catalog browser
///
/// Browse, search, filter and favorite characters from the Rick and Morty
/// catalog API without leaving the terminal.
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug)]
#[command(name = "citadex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal character catalog browser", long_about = None)]
pub struct CliArgs {
    /// Catalog API base URL
    #[arg(long, env = "CITADEX_API_BASE")]
    pub api_base: Option<String>,

    /// Directory for favorites, theme and logs
    #[arg(long, env = "CITADEX_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// HTTP request timeout in milliseconds (1000-60000)
    #[arg(long, env = "CITADEX_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Retry attempts for transient HTTP failures (0-10)
    #[arg(long, env = "CITADEX_RETRIES")]
    pub retries: Option<u32>,

    /// Debounce for free-text search input in milliseconds (0-5000)
    #[arg(long, env = "CITADEX_DEBOUNCE_MS")]
    pub debounce_ms: Option<u64>,

    /// Target UI rendering FPS (1-120)
    #[arg(long, env = "CITADEX_RENDER_FPS")]
    pub render_fps: Option<u32>,

    /// Available FPS options for Ctrl+O cycling (comma-separated, e.g., "20,30,60")
    #[arg(long, env = "CITADEX_RENDER_FPS_CHOICES")]
    pub render_fps_choices: Option<String>,

    /// Color theme: dark or light (overrides the saved choice)
    #[arg(long, env = "CITADEX_THEME", value_parser = clap::value_parser!(Theme))]
    pub theme: Option<Theme>,

    /// Optional config file path (TOML format)
    #[arg(long, env = "CITADEX_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// citadex:// link to open on startup
    #[arg(value_name = "LINK")]
    pub link: Option<String>,
}

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSection {
    pub base: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiSection {
    pub render_fps: Option<u32>,
    pub render_fps_choices: Option<String>,
    pub debounce_ms: Option<u64>,
    pub theme: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub state_dir: PathBuf,
    pub timeout_ms: u64,
    pub retries: u32,
    pub debounce_ms: u64,
    pub render_fps: u32,
    pub render_fps_choices: Vec<u32>,
    /// Theme forced via CLI/env/file; otherwise the saved choice wins.
    pub theme_override: Option<Theme>,
    /// Deep link passed on the command line, routed after startup.
    pub startup_link: Option<String>,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Parse comma-separated FPS list and validate each value
fn parse_fps_list(s: &str) -> Vec<u32> {
    s.split(',')
        .filter_map(|v| v.trim().parse::<u32>().ok())
        .filter(|n| (1..=120).contains(n))
        .collect()
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

fn default_state_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local/share/citadex")
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

/// Load configuration from CLI args, environment variables and the optional
/// config file. Priority: CLI args > Environment variables > File > Defaults
pub fn load() -> Result<Config> {
    let args = CliArgs::parse();
    resolve(args)
}

/// Resolution split out of [`load`] so tests can feed synthetic CLI args.
pub fn resolve(args: CliArgs) -> Result<Config> {
    let state_dir = args.state_dir.unwrap_or_else(default_state_dir);

    // Explicit config file must parse; the default location is best-effort.
    let file = if let Some(ref path) = args.config_file {
        load_config_file(path)?
    } else {
        let default_path = state_dir.join("config.toml");
        if default_path.exists() {
            load_config_file(&default_path).unwrap_or_else(|e| {
                log::warn!("ignoring config file {}: {e:#}", default_path.display());
                ConfigFile::default()
            })
        } else {
            ConfigFile::default()
        }
    };

    let api_base = args
        .api_base
        .or(file.api.base)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    validate_url(&api_base, "CITADEX_API_BASE")?;

    let timeout_ms = args.timeout_ms.or(file.api.timeout_ms).unwrap_or(8000);
    let timeout_ms = validate_in_range(timeout_ms, 1000, 60000, "CITADEX_TIMEOUT_MS")?;

    let retries = args.retries.or(file.api.retries).unwrap_or(2);
    let retries = validate_in_range(retries, 0, 10, "CITADEX_RETRIES")?;

    let debounce_ms = args.debounce_ms.or(file.ui.debounce_ms).unwrap_or(400);
    let debounce_ms = validate_in_range(debounce_ms, 0, 5000, "CITADEX_DEBOUNCE_MS")?;

    let render_fps_choices = args
        .render_fps_choices
        .or(file.ui.render_fps_choices)
        .map(|s| parse_fps_list(&s))
        .unwrap_or_else(|| vec![20, 30, 60]);
    if render_fps_choices.is_empty() {
        return Err(anyhow!(
            "CITADEX_RENDER_FPS_CHOICES must contain at least one valid value (1-120)"
        ));
    }

    let default_fps = *render_fps_choices.first().unwrap();
    let render_fps = args.render_fps.or(file.ui.render_fps).unwrap_or(default_fps);
    let render_fps = validate_in_range(render_fps, 1, 120, "CITADEX_RENDER_FPS")?;

    // A bad theme name in the file is not worth failing startup over.
    let theme_override = args.theme.or_else(|| {
        file.ui.theme.as_deref().and_then(|s| {
            s.parse::<Theme>()
                .map_err(|e| log::warn!("ignoring theme from config file: {e}"))
                .ok()
        })
    });

    Ok(Config {
        api_base,
        state_dir,
        timeout_ms,
        retries,
        debounce_ms,
        render_fps,
        render_fps_choices,
        theme_override,
        startup_link: args.link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests pin --state-dir to a fresh tempdir so a developer's real
    // config.toml can never leak into the resolution under test. Owned argv:
    // the tempdir path must not outlive this frame.
    fn resolve_in_tempdir(extra: Vec<&str>) -> Result<Config> {
        let dir = tempfile::tempdir().unwrap();
        let mut argv: Vec<String> = vec![
            "citadex".to_string(),
            "--state-dir".to_string(),
            dir.path().to_string_lossy().into_owned(),
        ];
        argv.extend(extra.into_iter().map(String::from));
        resolve(CliArgs::parse_from(argv))
    }

    #[test]
    fn test_defaults() {
        let config = resolve_in_tempdir(vec![]).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.timeout_ms, 8000);
        assert_eq!(config.retries, 2);
        assert_eq!(config.debounce_ms, 400);
        assert_eq!(config.render_fps, 20);
        assert_eq!(config.render_fps_choices, vec![20, 30, 60]);
        assert!(config.theme_override.is_none());
        assert!(config.startup_link.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let config = resolve_in_tempdir(vec![
            "--api-base",
            "http://localhost:8080/api",
            "--timeout-ms",
            "3000",
            "--retries",
            "0",
            "--debounce-ms",
            "250",
            "--theme",
            "light",
            "citadex://v1/character/7",
        ])
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:8080/api");
        assert_eq!(config.timeout_ms, 3000);
        assert_eq!(config.retries, 0);
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.theme_override, Some(Theme::Light));
        assert_eq!(
            config.startup_link.as_deref(),
            Some("citadex://v1/character/7")
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(resolve_in_tempdir(vec!["--timeout-ms", "50"]).is_err());
        assert!(resolve_in_tempdir(vec!["--retries", "99"]).is_err());
    }

    #[test]
    fn test_rejects_bad_api_base() {
        assert!(resolve_in_tempdir(vec!["--api-base", "ftp://example.com"]).is_err());
    }

    #[test]
    fn test_parse_fps_list() {
        assert_eq!(parse_fps_list("20,30,60"), vec![20, 30, 60]);
        assert_eq!(parse_fps_list(" 15 , 144 , nope , 45 "), vec![15, 45]);
        assert!(parse_fps_list("0,999").is_empty());
    }

    #[test]
    fn test_config_file_sections() {
        let file: ConfigFile = toml::from_str(
            r#"
            [api]
            base = "https://catalog.internal/api"
            retries = 5

            [ui]
            debounce_ms = 100
            theme = "light"
            "#,
        )
        .unwrap();
        assert_eq!(file.api.base.as_deref(), Some("https://catalog.internal/api"));
        assert_eq!(file.api.retries, Some(5));
        assert_eq!(file.ui.debounce_ms, Some(100));
        assert_eq!(file.ui.theme.as_deref(), Some("light"));
        // Absent sections fall back to empty defaults.
        let empty: ConfigFile = toml::from_str("").unwrap();
        assert!(empty.api.base.is_none());
        assert!(empty.ui.theme.is_none());
    }
}
