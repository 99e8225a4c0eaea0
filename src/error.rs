use std::convert::From;
use std::error;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ErrorKind {
    ConfigParse,
    ColorParse,
    WeekdayParse,
    MonthParse,
    OrientationParse,
    CommandParse,
    IOError(io::Error),
}

impl Error {
    pub fn new(kind: ErrorKind, msg: &str) -> Self {
        Error {
            kind,
            message: Some(msg.to_owned()),
        }
    }

    pub fn with_msg(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Error {
        Error::from(ErrorKind::IOError(io_error))
    }
}

impl From<toml::de::Error> for Error {
    fn from(toml_error: toml::de::Error) -> Error {
        Error::new(ErrorKind::ConfigParse, &toml_error.to_string())
    }
}

impl From<chrono::ParseError> for Error {
    fn from(parse_error: chrono::ParseError) -> Error {
        Error::new(
            ErrorKind::MonthParse,
            &format!("expected YYYY-MM, {}", parse_error),
        )
    }
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for Error {
    fn from(error: nom::Err<E>) -> Self {
        Error::new(
            ErrorKind::CommandParse,
            &format!("Error while parsing: {}", error),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.kind.as_str(), msg),
            None => write!(f, "{}", self.kind.as_str()),
        }
    }
}

impl error::Error for Error {}

impl ErrorKind {
    pub fn as_str(&self) -> String {
        match self {
            ErrorKind::ConfigParse => "invalid configuration".to_owned(),
            ErrorKind::ColorParse => "invalid color".to_owned(),
            ErrorKind::WeekdayParse => "invalid weekday".to_owned(),
            ErrorKind::MonthParse => "invalid month".to_owned(),
            ErrorKind::OrientationParse => "invalid orientation".to_owned(),
            ErrorKind::CommandParse => "invalid command".to_owned(),
            ErrorKind::IOError(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_message() {
        let bare = Error::from(ErrorKind::CommandParse);
        assert_eq!(bare.to_string(), "invalid command");

        let detailed = Error::new(ErrorKind::ColorParse, "'#12' is too short");
        assert_eq!(detailed.to_string(), "invalid color: '#12' is too short");
    }

    #[test]
    fn month_parse_errors_convert() {
        let err = "2024-xx".parse::<crate::calendar::YearMonth>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MonthParse));
        assert!(err.to_string().starts_with("invalid month: expected YYYY-MM"));
    }
}
