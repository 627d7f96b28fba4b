use anyhow::{Context, Result};

use super::config_model::{Cors, Database, DotEnvyConfig, RazorpayConfig, Server, UserSecret};

pub const DEFAULT_RAZORPAY_API_BASE_URL: &str = "https://api.razorpay.com/v1";
pub const DEFAULT_RAZORPAY_TOTAL_COUNT: u32 = 12;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: required("SERVER_PORT")?
            .parse()
            .context("SERVER_PORT is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let razorpay = RazorpayConfig {
        key_id: required("RAZORPAY_KEY_ID")?,
        key_secret: required("RAZORPAY_KEY_SECRET")?,
        webhook_secret: required("RAZORPAY_WEBHOOK_SECRET")?,
        pro_plan_id: required("RAZORPAY_PRO_PLAN_ID")?,
        total_count: match optional("RAZORPAY_TOTAL_COUNT") {
            Some(raw) => raw.parse().context("RAZORPAY_TOTAL_COUNT is invalid")?,
            None => DEFAULT_RAZORPAY_TOTAL_COUNT,
        },
        api_base_url: optional("RAZORPAY_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_RAZORPAY_API_BASE_URL.to_string()),
    };

    let cors = Cors {
        allowed_origins: optional("CORS_ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default(),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        razorpay,
        cors,
    })
}

pub fn get_user_secret() -> Result<UserSecret> {
    dotenvy::dotenv().ok();

    Ok(UserSecret {
        secret: required("JWT_USER_SECRET")?,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
