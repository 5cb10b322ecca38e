pub mod config;
pub mod health_oracle;
pub mod integrity;
pub mod persistence;
pub mod pool;
pub mod processor_worker;
pub mod retry;
