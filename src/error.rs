//! Error types shared across the provisioner.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Unparseable artifact URL: {0}")]
	Parse(String),

	#[error("Transfer failed: {0}")]
	Transfer(String),

	#[error("Could not stage artifact: {0}")]
	Stage(String),
}

impl From<toml::de::Error> for Error {
	fn from(err: toml::de::Error) -> Self {
	    Error::Config(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, Error>;
