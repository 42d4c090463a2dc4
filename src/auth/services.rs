use tracing::{info, warn};

use super::{
    dto::Registration,
    jwt::JwtKeys,
    password::{hash_password, verify_against_dummy, verify_password},
    repo::UserStore,
    repo_types::{NewUser, User},
};
use crate::error::ApiError;

/// Creates the user and issues its first token.
pub async fn register_user(
    users: &dyn UserStore,
    keys: &JwtKeys,
    reg: Registration,
) -> Result<(User, String), ApiError> {
    // Ensure email is not taken
    if users.find_by_email(&reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&reg.password)?;
    let user = users
        .create(NewUser {
            email: reg.email,
            password_hash,
            role: reg.role,
            first_name: reg.first_name,
            last_name: reg.last_name,
            birthdate: reg.birthdate,
            age: reg.age,
            nationality: reg.nationality,
            company_code: reg.company_code,
            profile_image: reg.profile_image,
        })
        .await?;

    let token = keys.issue(user.id, user.role)?;
    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok((user, token))
}

/// Checks credentials. Unknown email and wrong password fail identically.
pub async fn login_user(
    users: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<(User, String), ApiError> {
    let Some(user) = users.find_by_email(email).await? else {
        verify_against_dummy(password);
        warn!("login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = keys.issue(user.id, user.role)?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{claims::Role, dto::RegisterRequest, jwt::tests::make_keys},
        memory::InMemoryStore,
    };

    fn registration(email: &str, role: &str) -> Registration {
        RegisterRequest {
            email: Some(email.into()),
            password: Some("correct-password".into()),
            first_name: Some("First".into()),
            last_name: Some("Last".into()),
            role: Some(role.into()),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn login_returns_token_with_user_claims() {
        let store = InMemoryStore::new();
        let keys = make_keys();
        let (user, _) = register_user(&store, &keys, registration("lead@corp.io", "TEAM_LEADER"))
            .await
            .unwrap();

        let (logged_in, token) = login_user(&store, &keys, "lead@corp.io", "correct-password")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        let claims = keys.validate(&token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.role, Role::TeamLeader);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let store = InMemoryStore::new();
        let keys = make_keys();
        register_user(&store, &keys, registration("emp@corp.io", "EMPLOYEE"))
            .await
            .unwrap();

        let wrong = login_user(&store, &keys, "emp@corp.io", "nope-nope-nope")
            .await
            .unwrap_err();
        let unknown = login_user(&store, &keys, "ghost@corp.io", "correct-password")
            .await
            .unwrap_err();
        assert!(matches!(wrong, ApiError::InvalidCredentials));
        assert!(matches!(unknown, ApiError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = InMemoryStore::new();
        let keys = make_keys();
        register_user(&store, &keys, registration("dup@corp.io", "EMPLOYEE"))
            .await
            .unwrap();
        let err = register_user(&store, &keys, registration("dup@corp.io", "EMPLOYEE"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn stored_hash_is_not_the_plaintext() {
        let store = InMemoryStore::new();
        let keys = make_keys();
        let (user, _) = register_user(&store, &keys, registration("h@corp.io", "EMPLOYEE"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "correct-password");
    }
}
