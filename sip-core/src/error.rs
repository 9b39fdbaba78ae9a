//! Error types for the SIP plugins

use thiserror::Error;

/// Core error type for plugin operations
#[derive(Error, Debug)]
pub enum SipError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hardware that could not be opened or is not present
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// GPIO pin errors
    #[error("GPIO error on pin {pin}: {reason}")]
    Gpio { pin: u8, reason: String },

    /// Display (I2C) errors
    #[error("Display error: {0}")]
    Display(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Physical header pin has no GPIO line behind it
    #[error("Header pin {0} is not a GPIO pin")]
    InvalidHeaderPin(u8),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for plugin operations
pub type Result<T> = std::result::Result<T, SipError>;

impl From<serde_json::Error> for SipError {
    fn from(err: serde_json::Error) -> Self {
        SipError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let sip_err: SipError = json_err.into();

        match sip_err {
            SipError::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sip_err: SipError = io_err.into();

        match sip_err {
            SipError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = SipError::Config("test config error".to_string());
        assert_eq!(format!("{}", err), "Configuration error: test config error");

        let err = SipError::Gpio {
            pin: 20,
            reason: "busy".to_string(),
        };
        assert_eq!(format!("{}", err), "GPIO error on pin 20: busy");

        let err = SipError::InvalidHeaderPin(1);
        assert_eq!(format!("{}", err), "Header pin 1 is not a GPIO pin");
    }
}
