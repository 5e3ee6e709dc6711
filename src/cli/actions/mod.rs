pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        jwt_secret: SecretString,
        jwt_expiry: String,
        otp_ttl_seconds: i64,
        mail_timeout_seconds: u64,
    },
}
