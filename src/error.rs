use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Geometry that can never produce a printable sheet (non-positive sizes,
    /// negative margins, ...).
    InvalidConfig(String),
    /// The card plus spacing does not fit the printable area in at least one
    /// direction, so a page holds zero cards.
    NothingFits {
        printable_width: f32,
        printable_height: f32,
        card_width: f32,
        card_height: f32,
    },
    Image(String),
    Network(String),
    ExportInProgress,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::InvalidConfig(msg) => write!(f, "invalid print configuration: {msg}"),
            Error::NothingFits {
                printable_width,
                printable_height,
                card_width,
                card_height,
            } => write!(
                f,
                "nothing fits: a {card_width:.1}x{card_height:.1}mm card (plus spacing) does not fit \
                 the {printable_width:.1}x{printable_height:.1}mm printable area"
            ),
            Error::Image(msg) => write!(f, "image error: {msg}"),
            Error::Network(msg) => write!(f, "network error: {msg}"),
            Error::ExportInProgress => write!(f, "an export is already in progress"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}
