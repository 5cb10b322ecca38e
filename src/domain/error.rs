use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum DomainError {
	#[display("no healthy payment processor is currently available")]
	NoProcessorAvailable,
	#[display("store operation failed: {_0}")]
	Store(StoreError),
	#[display("payment dispatch failed: worker mailbox is gone")]
	DispatchFailed,
}

#[derive(Debug, Display, Error)]
pub enum StoreError {
	#[display("connection error: {_0}")]
	Connection(String),
	#[display("serialization error: {_0}")]
	Serialization(String),
}

impl From<StoreError> for DomainError {
	fn from(err: StoreError) -> Self {
		DomainError::Store(err)
	}
}
