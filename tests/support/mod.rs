pub mod redis_container;
