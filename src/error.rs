use std::error;
use std::fmt;

/// Errors reported while setting up a diagram computation.
///
/// Numeric trouble during the sweep itself is not an error: degenerate
/// metric output makes the driver drop the offending circle event and
/// carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested metric name is not registered.
    UnknownMetric(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownMetric(name) => {
                write!(f, "no metric registered under the name {:?}", name)
            }
        }
    }
}

impl error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_metric_names_the_offender() {
        let error = Error::UnknownMetric("hyperbolic".to_owned());
        assert_eq!(
            error.to_string(),
            "no metric registered under the name \"hyperbolic\""
        );
    }
}
