use super::{normalize_token, CredentialError};

/// Page where a user creates personal access tokens for `organization`.
pub fn token_settings_url(organization: &str) -> String {
    format!("https://dev.azure.com/{}/_usersSettings/tokens", organization)
}

/// Prompts user to enter an Azure DevOps personal access token
pub fn prompt_for_token(organization: &str) -> Result<String, CredentialError> {
    eprintln!("Azure DevOps personal access token required.");
    eprintln!("Create one at: {}", token_settings_url(organization));
    eprintln!("Required scopes: Code (Read), Project and Team (Read), User Profile (Read)");
    eprintln!("Tip: export {} to skip this prompt.", super::ENV_TOKEN_VAR);
    eprintln!();

    let token = rpassword::prompt_password("Enter token: ")?;

    normalize_token(&token).ok_or(CredentialError::EmptyToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_settings_url() {
        assert_eq!(
            token_settings_url("acme"),
            "https://dev.azure.com/acme/_usersSettings/tokens"
        );
    }
}
