use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_dimension(lower_bound: i64, upper_bound: i64) -> Error {
        ErrorKind::InvalidDimension {
            lower_bound,
            upper_bound,
        }
        .into()
    }

    pub fn rank_mismatch(expected: usize, actual: usize) -> Error {
        ErrorKind::RankMismatch { expected, actual }.into()
    }

    pub fn index_out_of_range(
        axis: usize,
        index: i64,
        lower_bound: i64,
        upper_bound: i64,
    ) -> Error {
        ErrorKind::IndexOutOfRange {
            axis,
            index,
            lower_bound,
            upper_bound,
        }
        .into()
    }

    pub fn extent_overflow(message: impl Into<String>) -> Error {
        ErrorKind::ExtentOverflow {
            message: message.into(),
        }
        .into()
    }

    pub fn stale_storage(block: impl Into<String>) -> Error {
        ErrorKind::StaleStorage {
            block: block.into(),
        }
        .into()
    }

    pub fn address_out_of_storage(address: i64, base: i64, len: usize) -> Error {
        ErrorKind::AddressOutOfStorage { address, base, len }.into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    /// Returns the offending axis for `IndexOutOfRange` errors.
    pub fn axis(&self) -> Option<usize> {
        match self.kind() {
            ErrorKind::IndexOutOfRange { axis, .. } => Some(*axis),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error(
        "invalid dimension [{lower_bound}:{upper_bound}]: upper bound is below lower bound - 1"
    )]
    InvalidDimension { lower_bound: i64, upper_bound: i64 },

    #[error("rank mismatch: expected {expected} dimensions, got {actual}")]
    RankMismatch { expected: usize, actual: usize },

    #[error(
        "index {index} out of range on axis {axis}, valid range [{lower_bound}, {upper_bound}]"
    )]
    IndexOutOfRange {
        axis: usize,
        index: i64,
        lower_bound: i64,
        upper_bound: i64,
    },

    #[error("extent overflow: {message}")]
    ExtentOverflow { message: String },

    #[error("storage block {block} has been released")]
    StaleStorage { block: String },

    #[error("address {address} is outside storage block [{base}, {base} + {len})")]
    AddressOutOfStorage { address: i64, base: i64, len: usize },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
