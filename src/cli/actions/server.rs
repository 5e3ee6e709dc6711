use crate::{api, auth::state::AuthConfig, cli::actions::Action};
use anyhow::{Context, Result};

/// Handle the server action
/// # Errors
/// Return error if the expiry string is invalid or the server fails to start
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            jwt_secret,
            jwt_expiry,
            otp_ttl_seconds,
            mail_timeout_seconds,
        } => {
            let token_ttl = humantime::parse_duration(&jwt_expiry)
                .with_context(|| format!("invalid --jwt-expiry value: {jwt_expiry}"))?;

            let token_ttl_seconds = i64::try_from(token_ttl.as_secs())
                .with_context(|| format!("--jwt-expiry out of range: {jwt_expiry}"))?;

            let config = AuthConfig::new(jwt_secret)
                .with_token_ttl_seconds(token_ttl_seconds)
                .with_otp_ttl_seconds(otp_ttl_seconds)
                .with_mail_timeout(std::time::Duration::from_secs(mail_timeout_seconds));

            api::new(port, dsn, config).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn expiry_strings_parse_as_durations() {
        let week = humantime::parse_duration("7d").unwrap();
        assert_eq!(week.as_secs(), 7 * 24 * 60 * 60);

        let half_day = humantime::parse_duration("12h").unwrap();
        assert_eq!(half_day.as_secs(), 12 * 60 * 60);

        assert!(humantime::parse_duration("seven days").is_err());
    }
}
