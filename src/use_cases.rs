pub mod create_payment;
pub mod dto;
pub mod get_payment_summary;
pub mod purge_payments;
