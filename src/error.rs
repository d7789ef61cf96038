use thiserror::Error;

/// Everything that can go wrong while binding, hooking or propagating a value.
#[derive(Debug, Error)]
pub enum Error {
    /// The emitter has no such property or signal.
    #[error("{type_name} does not support {what}")]
    Capability {
        type_name: String,
        what: String
    },
    /// A declaration that can't be satisfied, e.g. hooking onto an already-destroyed lifetime.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),
    /// A property value had a different type than the binding expected.
    #[error("type mismatch: expected {expected}, found {found}")]
    Type {
        expected: &'static str,
        found: &'static str
    },
    /// A user-supplied transform failed.
    #[error("transform failed: {0}")]
    Transform(#[source] Box<dyn std::error::Error>),
    /// More than one handler of the same emission failed.
    #[error("{} handlers failed", .0.len())]
    Handlers(Vec<Error>)
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn no_property(type_name: &str, property: &str) -> Self {
        Error::Capability {
            type_name: type_name.to_string(),
            what: format!("property \"{}\"", property)
        }
    }

    pub(crate) fn no_signal(type_name: &str, signal: &str) -> Self {
        Error::Capability {
            type_name: type_name.to_string(),
            what: format!("signal \"{}\"", signal)
        }
    }

    /// Collapse the failures of a single emission into one error, if there were any.
    pub(crate) fn collect(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Handlers(errors))
        }
    }
}
