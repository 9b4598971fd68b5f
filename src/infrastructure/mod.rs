pub mod axum_http;
pub mod mpesa;
pub mod postgres;
