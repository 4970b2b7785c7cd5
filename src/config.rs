use std::ffi::OsString;
use std::path::PathBuf;

use clap::{App, ArgMatches};
use render::ErrorPolicy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Also covers `--help` and `--version`, which clap reports as errors.
    #[error("{0}")]
    Cli(#[from] clap::Error),

    #[error("invalid value `{value}` for --{arg}: {reason}")]
    InvalidValue {
        arg: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the program needs to know from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub texture: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub tint: [f32; 4],
    pub fov_degrees: f32,
    pub error_policy: ErrorPolicy,
    pub log_filter: Option<String>,
    pub headless: bool,
}

impl Config {
    /// Parses `args` (including the program name) against `cli.yaml`.
    pub fn parse<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let yaml = load_yaml!("cli.yaml");
        let matches = App::from_yaml(yaml).get_matches_from_safe(args)?;
        Self::from_matches(&matches)
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self, ConfigError> {
        Ok(Self {
            vertex_shader: PathBuf::from(value(matches, "vertex")),
            fragment_shader: PathBuf::from(value(matches, "fragment")),
            texture: PathBuf::from(value(matches, "texture")),
            width: parse_dimension(matches, "width")?,
            height: parse_dimension(matches, "height")?,
            title: value(matches, "title").to_string(),
            tint: parse_tint(value(matches, "tint"))?,
            fov_degrees: parse_fov(value(matches, "fov"))?,
            error_policy: parse_policy(value(matches, "on-error"))?,
            log_filter: matches.value_of("log").map(String::from),
            headless: matches.is_present("headless"),
        })
    }
}

fn value<'a>(matches: &'a ArgMatches, arg: &str) -> &'a str {
    // Every argument read through here has a default in cli.yaml
    matches.value_of(arg).unwrap_or_default()
}

fn invalid(arg: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        arg,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_dimension(matches: &ArgMatches, arg: &'static str) -> Result<u32, ConfigError> {
    let raw = value(matches, arg);
    match raw.parse::<u32>() {
        Ok(0) => Err(invalid(arg, raw, "must be at least 1")),
        Ok(n) => Ok(n),
        Err(e) => Err(invalid(arg, raw, e)),
    }
}

fn parse_tint(raw: &str) -> Result<[f32; 4], ConfigError> {
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| invalid("tint", raw, e))?;

    match parts.as_slice() {
        &[r, g, b, a] => Ok([r, g, b, a]),
        _ => Err(invalid("tint", raw, "expected four comma-separated numbers")),
    }
}

fn parse_fov(raw: &str) -> Result<f32, ConfigError> {
    let fov = raw.parse::<f32>().map_err(|e| invalid("fov", raw, e))?;
    if fov > 0.0 && fov < 180.0 {
        Ok(fov)
    } else {
        Err(invalid("fov", raw, "must be between 0 and 180 degrees"))
    }
}

fn parse_policy(raw: &str) -> Result<ErrorPolicy, ConfigError> {
    raw.parse().map_err(|e: String| invalid("on-error", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse(vec!["glquad"]).unwrap();

        assert_eq!(config.vertex_shader, PathBuf::from("res/shaders/quad.vert"));
        assert_eq!(config.fragment_shader, PathBuf::from("res/shaders/quad.frag"));
        assert_eq!(config.texture, PathBuf::from("res/textures/checker.png"));
        assert_eq!((config.width, config.height), (500, 500));
        assert_eq!(config.tint, [1.0; 4]);
        assert_eq!(config.fov_degrees, 45.0);
        assert_eq!(config.error_policy, ErrorPolicy::Fatal);
        assert_eq!(config.log_filter, None);
        assert!(!config.headless);
    }

    #[test]
    fn overrides() {
        let config = Config::parse(vec![
            "glquad",
            "--width",
            "800",
            "--height",
            "600",
            "--tint",
            "1, 0.5, 0.25, 1",
            "--on-error",
            "propagate",
            "--log",
            "render=trace",
            "--headless",
        ])
        .unwrap();

        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.tint, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(config.error_policy, ErrorPolicy::Propagate);
        assert_eq!(config.log_filter.as_deref(), Some("render=trace"));
        assert!(config.headless);
    }

    #[test]
    fn rejects_bad_numbers() {
        match Config::parse(vec!["glquad", "--width", "0"]) {
            Err(ConfigError::InvalidValue { arg: "width", .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        match Config::parse(vec!["glquad", "--tint", "1,1,1"]) {
            Err(ConfigError::InvalidValue { arg: "tint", .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        match Config::parse(vec!["glquad", "--fov", "wide"]) {
            Err(ConfigError::InvalidValue { arg: "fov", .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_policy_is_a_cli_error() {
        assert!(matches!(
            Config::parse(vec!["glquad", "--on-error", "retry"]),
            Err(ConfigError::Cli(_))
        ));
    }
}
