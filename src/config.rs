use chrono::Weekday;
use serde::Deserialize;
use serde_with::DeserializeFromStr;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use unsegen::base::Color;

use crate::calendar::{self, OutDateStyle};
use crate::error::{Error, ErrorKind, Result};

const CONFIG_PATH_ENV_VAR: &str = "PAGECAL_CONFIG_FILE";
const CONFIG_DIR_NAME: &str = "pagecal";
const CONFIG_FILE_NAME: &str = "config.toml";
const HOME_CONFIG_FILE_NAME: &str = ".pagecal.toml";

pub fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(HOME_CONFIG_FILE_NAME));
    }

    locations
}

/// Loads `path` if given, otherwise the first existing file of
/// `find_configfile_locations`, otherwise the defaults.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        log::info!("Loading configuration from '{}'", path.display());
        return Config::from_file(path);
    }

    match find_configfile_locations().into_iter().find(|p| p.is_file()) {
        Some(path) => {
            log::info!("Loading configuration from '{}'", path.display());
            Config::from_file(&path)
        }
        None => {
            log::info!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Paging axis of the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, DeserializeFromStr)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(Orientation::Horizontal),
            "vertical" | "v" => Ok(Orientation::Vertical),
            _ => Err(Error::new(
                ErrorKind::OrientationParse,
                &format!("'{}' is neither horizontal nor vertical", s),
            )),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr)]
pub struct WeekdaySpec(pub Weekday);

impl FromStr for WeekdaySpec {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse::<Weekday>().map(WeekdaySpec).map_err(|_| {
            Error::new(
                ErrorKind::WeekdayParse,
                &format!("'{}' is not a day of the week", s),
            )
        })
    }
}

/// Terminal color as written in the configuration: a `#rrggbb` value or one
/// of the named ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, DeserializeFromStr)]
pub struct ColorSpec(pub Color);

impl FromStr for ColorSpec {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 {
                return Err(Error::new(
                    ErrorKind::ColorParse,
                    &format!("'{}' must have six hex digits", s),
                ));
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&hex[range], 16).map_err(|_| {
                    Error::new(ErrorKind::ColorParse, &format!("'{}' is not hexadecimal", s))
                })
            };
            return Ok(ColorSpec(Color::Rgb {
                r: channel(0..2)?,
                g: channel(2..4)?,
                b: channel(4..6)?,
            }));
        }

        let color = match s.to_ascii_lowercase().as_str() {
            "default" => Color::Default,
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "lightblack" | "gray" | "grey" => Color::LightBlack,
            "lightred" => Color::LightRed,
            "lightgreen" => Color::LightGreen,
            "lightyellow" => Color::LightYellow,
            "lightblue" => Color::LightBlue,
            "lightmagenta" => Color::LightMagenta,
            "lightcyan" => Color::LightCyan,
            "lightwhite" => Color::LightWhite,
            _ => {
                return Err(Error::new(
                    ErrorKind::ColorParse,
                    &format!("unknown color '{}'", s),
                ))
            }
        };

        Ok(ColorSpec(color))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub background: ColorSpec,
    pub background_secondary: ColorSpec,
    pub selection: ColorSpec,
    pub highlight: ColorSpec,
    pub on_selection: ColorSpec,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            background: ColorSpec(Color::Rgb {
                r: 0x0e,
                g: 0x0e,
                b: 0x0e,
            }),
            background_secondary: ColorSpec(Color::Rgb {
                r: 0x28,
                g: 0x28,
                b: 0x28,
            }),
            selection: ColorSpec(Color::Rgb {
                r: 0xfc,
                g: 0xca,
                b: 0x3e,
            }),
            highlight: ColorSpec(Color::Rgb {
                r: 0x6e,
                g: 0x6e,
                b: 0x6e,
            }),
            on_selection: ColorSpec(Color::Rgb {
                r: 0x0e,
                g: 0x0e,
                b: 0x0e,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutDates {
    EndOfRow,
    EndOfGrid,
}

impl From<OutDates> for OutDateStyle {
    fn from(v: OutDates) -> Self {
        match v {
            OutDates::EndOfRow => OutDateStyle::EndOfRow,
            OutDates::EndOfGrid => OutDateStyle::EndOfGrid,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawConfig {
    orientation: Orientation,
    month_window: u32,
    first_day_of_week: Option<WeekdaySpec>,
    out_dates: OutDates,
    tick_rate_ms: u64,
    scroll_duration_ms: u64,
    frame_interval_ms: u64,
    colors: ColorConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        RawConfig {
            orientation: Orientation::default(),
            month_window: Config::DEFAULT_MONTH_WINDOW,
            first_day_of_week: None,
            out_dates: OutDates::EndOfGrid,
            tick_rate_ms: 500,
            scroll_duration_ms: 250,
            frame_interval_ms: 16,
            colors: ColorConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub orientation: Orientation,
    /// Months reachable before and after the current month.
    pub month_window: u32,
    /// `None` follows the locale.
    pub first_day_of_week: Option<Weekday>,
    pub out_date_style: OutDateStyle,
    pub tick_rate: Duration,
    pub scroll_duration: Duration,
    pub frame_interval: Duration,
    pub colors: ColorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config::from(RawConfig::default())
    }
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Config {
            orientation: raw.orientation,
            month_window: raw.month_window,
            first_day_of_week: raw.first_day_of_week.map(|spec| spec.0),
            out_date_style: raw.out_dates.into(),
            tick_rate: Duration::from_millis(raw.tick_rate_ms),
            scroll_duration: Duration::from_millis(raw.scroll_duration_ms),
            frame_interval: Duration::from_millis(raw.frame_interval_ms.max(1)),
            colors: raw.colors,
        }
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let raw: RawConfig = toml::from_str(s)?;

        if raw.month_window > Config::MAX_MONTH_WINDOW {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                &format!(
                    "month_window {} exceeds the maximum of {} months",
                    raw.month_window,
                    Config::MAX_MONTH_WINDOW
                ),
            ));
        }

        Ok(Config::from(raw))
    }
}

impl Config {
    pub const DEFAULT_MONTH_WINDOW: u32 = 500;
    /// Ten thousand years in either direction.
    pub const MAX_MONTH_WINDOW: u32 = 12 * 10_000;

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        content.parse().map_err(|e: Error| {
            let msg = format!(
                "{} (in '{}')",
                e.message.as_deref().unwrap_or_default(),
                path.display()
            );
            e.with_msg(&msg)
        })
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
            .unwrap_or_else(calendar::locale_first_day_of_week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config.orientation, Orientation::Horizontal);
        assert_eq!(config.month_window, Config::DEFAULT_MONTH_WINDOW);
        assert_eq!(config.out_date_style, OutDateStyle::EndOfGrid);
        assert_eq!(config.first_day_of_week, None);
        assert_eq!(config.scroll_duration, Duration::from_millis(250));
    }

    #[test]
    fn values_override_defaults() {
        let config: Config = r##"
            orientation = "vertical"
            month_window = 24
            first_day_of_week = "sunday"
            out_dates = "end_of_row"

            [colors]
            selection = "#ff0080"
            highlight = "lightblue"
        "##
        .parse()
        .unwrap();

        assert_eq!(config.orientation, Orientation::Vertical);
        assert_eq!(config.month_window, 24);
        assert_eq!(config.first_day_of_week(), Weekday::Sun);
        assert_eq!(config.out_date_style, OutDateStyle::EndOfRow);
        assert_eq!(
            config.colors.selection,
            ColorSpec(Color::Rgb {
                r: 0xff,
                g: 0x00,
                b: 0x80
            })
        );
        assert_eq!(config.colors.highlight, ColorSpec(Color::LightBlue));
        assert_eq!(config.colors.on_selection, ColorConfig::default().on_selection);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!("first_day_of_week = \"someday\"".parse::<Config>().is_err());
        assert!("orientation = \"diagonal\"".parse::<Config>().is_err());
        assert!("[colors]\nselection = \"#12\"".parse::<Config>().is_err());
        assert!("[colors]\nselection = \"#gggggg\"".parse::<Config>().is_err());
    }

    #[test]
    fn oversized_month_window_is_rejected() {
        let err = "month_window = 4000000".parse::<Config>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ConfigParse));

        let config: Config = format!("month_window = {}", Config::MAX_MONTH_WINDOW)
            .parse()
            .unwrap();
        assert_eq!(config.month_window, Config::MAX_MONTH_WINDOW);
    }

    #[test]
    fn orientation_from_str() {
        assert_eq!("H".parse::<Orientation>().unwrap(), Orientation::Horizontal);
        assert_eq!(" vertical ".parse::<Orientation>().unwrap(), Orientation::Vertical);
        assert_eq!(Orientation::Vertical.to_string(), "vertical");
    }
}
