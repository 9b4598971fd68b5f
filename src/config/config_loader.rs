use anyhow::Result;

use super::config_model::{Auth, Database, DotEnvyConfig, Mpesa, Server};

const DEFAULT_MPESA_BASE_URL: &str = "https://sandbox.safaricom.co.ke";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let auth = Auth {
        jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"),
    };

    let mpesa = Mpesa {
        consumer_key: std::env::var("MPESA_CONSUMER_KEY").expect("MPESA_CONSUMER_KEY is invalid"),
        consumer_secret: std::env::var("MPESA_CONSUMER_SECRET")
            .expect("MPESA_CONSUMER_SECRET is invalid"),
        shortcode: std::env::var("MPESA_SHORTCODE").expect("MPESA_SHORTCODE is invalid"),
        passkey: std::env::var("MPESA_PASSKEY").expect("MPESA_PASSKEY is invalid"),
        base_url: std::env::var("MPESA_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_MPESA_BASE_URL.to_string()),
        callback_url: std::env::var("MPESA_CALLBACK_URL").expect("MPESA_CALLBACK_URL is invalid"),
        http_timeout: std::env::var("MPESA_HTTP_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        auth,
        mpesa,
    })
}
