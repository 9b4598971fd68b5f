pub mod daraja_client;
