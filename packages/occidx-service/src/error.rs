pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Validation failed: {message}")]
	Validation { message: String },
	#[error("Unsupported owner: {message}")]
	UnsupportedOwner { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<occidx_domain::Error> for Error {
	fn from(err: occidx_domain::Error) -> Self {
		match err {
			occidx_domain::Error::Validation { message } => Self::Validation { message },
		}
	}
}

impl From<occidx_storage::Error> for Error {
	fn from(err: occidx_storage::Error) -> Self {
		match err {
			occidx_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			occidx_storage::Error::InvalidArgument(message) => Self::Validation { message },
		}
	}
}
