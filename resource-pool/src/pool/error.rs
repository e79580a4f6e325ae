use std::fmt::{self, Debug, Display, Formatter};

/// An error during resource acquisition.
pub enum AcquireError<E> {
    /// The resource pool has been closed
    PoolClosed,
    /// Wraps an error result from the pool's `create` callback
    CreateFailed(E),
}

impl<E> AcquireError<E> {
    /// Extract the error returned by the `create` callback, if any.
    pub fn into_create_error(self) -> Option<E> {
        match self {
            Self::CreateFailed(err) => Some(err),
            Self::PoolClosed => None,
        }
    }
}

impl<E: Debug> Debug for AcquireError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self {
            Self::PoolClosed => write!(f, "AcquireError::PoolClosed"),
            Self::CreateFailed(err) => f
                .debug_tuple("AcquireError::CreateFailed")
                .field(err)
                .finish(),
        }
    }
}

impl<E: Display> Display for AcquireError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self {
            Self::PoolClosed => write!(f, "The resource pool is closed"),
            Self::CreateFailed(err) => write!(f, "Resource creation failed: {}", err),
        }
    }
}

impl<E: Debug + Display> std::error::Error for AcquireError<E> {}

/// A configuration error.
#[derive(Debug)]
pub struct ConfigError(pub String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Config error: {}", &self.0)
    }
}

impl std::error::Error for ConfigError {}
