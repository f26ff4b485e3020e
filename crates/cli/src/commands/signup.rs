//! One-shot user registration.
//!
//! # Usage
//!
//! ```bash
//! portal signup -u alice -p secret
//! ```

use std::io::Write;

use secrecy::SecretString;
use shopping_portal_client::{App, SignupError};
use shopping_portal_core::{Username, UsernameError};
use thiserror::Error;

/// Errors that can occur during registration.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The username cannot be sent to the backend.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// The backend refused or could not be reached.
    #[error("Signup failed: {0}")]
    Signup(#[from] SignupError),

    /// Writing the confirmation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Register a user and print a confirmation. Does not log in.
///
/// # Errors
///
/// Returns an error if the username is invalid or the backend refuses.
pub async fn register(app: &App, username: &str, password: String) -> Result<(), RegisterError> {
    let username = Username::parse(username)?;
    let password = SecretString::from(password);

    app.signup(&username, &password).await?;

    writeln!(
        std::io::stdout().lock(),
        "Signup successful! Log in as {username} from the shell."
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use shopping_portal_client::ClientConfig;

    use super::*;

    #[tokio::test]
    async fn test_invalid_username_never_reaches_backend() {
        let app = App::from_config(&ClientConfig::default());
        let err = register(&app, "", "pw".to_string())
            .await
            .expect_err("empty username is rejected");
        assert!(matches!(
            err,
            RegisterError::InvalidUsername(UsernameError::Empty)
        ));
    }
}
