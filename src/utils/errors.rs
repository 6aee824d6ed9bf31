#![forbid(unsafe_code)]

use poem_openapi::Object;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("numclass_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    // ------------------------ Validation Errors ------------------------
    /// The number query parameter was absent or empty.
    #[error("Missing required query parameter: number")]
    NumberMissing,

    /// The number query parameter could not be parsed as a 64-bit integer.
    #[error("Not a valid integer: {:?}", .0)]
    NumberInvalid(String),

    // ------------------------ External Errors --------------------------
    /// Any failure while retrieving a fun fact. Never surfaced to callers.
    #[error("Fun fact lookup failed: {}", .0)]
    FactLookup(String),
}

// ***************************************************************************
//                             HttpResult
// ***************************************************************************
/// Generic result body for responses that carry no domain payload.
#[derive(Object, Debug)]
pub struct HttpResult {
    pub result_code: String,
    pub result_msg: String,
}

impl HttpResult {
    pub fn new(result_code: String, result_msg: String) -> Self {
        Self {result_code, result_msg}
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::Errors;

    #[test]
    fn invalid_number_quotes_input() {
        let e = Errors::NumberInvalid("abc".to_string());
        assert_eq!(e.to_string(), "Not a valid integer: \"abc\"");
    }

    #[test]
    fn missing_number_message() {
        assert!(Errors::NumberMissing.to_string().contains("number"));
    }
}
