// src/auth/services.rs

use crate::error::AppError;
use securevault_api::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse, VerifyTokenResponse,
};

use crate::auth::extractors::AuthClaims;
use crate::auth::guard::AccountGuard;
use crate::auth::jwt::JwtManager;
use crate::auth::password::PasswordManager;
use crate::auth::sessions::SessionManager;
use crate::auth::tokens;
use crate::db::models::user::{NewUser, User};
use crate::db::repositories::login_attempt_repository::LoginAttemptRepository;
use crate::db::repositories::user_repository::UserRepository;
use crate::validation;

use axum::http::HeaderMap;
use chrono::{Duration, Utc};

const VERIFICATION_TOKEN_HOURS: i64 = 24;

/// Métadonnées client attachées aux sessions et au journal des tentatives.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// `X-Forwarded-For` en premier (premier saut), sinon le client est
    /// inconnu: la résolution de l'adresse du pair est déléguée au proxy.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let user_agent = headers
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        Self { ip, user_agent }
    }
}

pub struct AuthService {
    jwt_manager: JwtManager,
    sessions: SessionManager,
    guard: AccountGuard,
}

impl AuthService {
    pub fn new(jwt_manager: JwtManager) -> Self {
        Self {
            jwt_manager,
            sessions: SessionManager::default(),
            guard: AccountGuard::default(),
        }
    }

    /// Inscription d'un nouvel utilisateur
    pub fn register(
        &self,
        register_request: &RegisterRequest,
        client: &ClientInfo,
    ) -> Result<RegisterResponse, AppError> {
        // Validation des trois champs avant toute mutation
        let username = validation::validate_username(&register_request.username)?;
        let email = validation::validate_email(&register_request.email)?;
        validation::validate_password(&register_request.password)?;

        // Pré-contrôles d'unicité (raccourci; l'arbitre final reste la
        // contrainte d'unicité de la base en cas d'inscriptions concurrentes)
        if UserRepository::find_by_username(&username)?.is_some() {
            return Err(AppError::conflict("Username already exists"));
        }
        if UserRepository::find_by_email(&email)?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        // Hash le password
        let password_hash = PasswordManager::hash(&register_request.password)?;

        let new_user = NewUser {
            username,
            email,
            password_hash,
            verification_token: Some(tokens::generate_token()),
            verification_expires: Some(Utc::now() + Duration::hours(VERIFICATION_TOKEN_HOURS)),
        };

        // Crée l'utilisateur (non vérifié tant que l'email ne l'est pas)
        let user = UserRepository::create(&new_user)?;

        let _ = LoginAttemptRepository::create(
            Some(user.id),
            &client.ip,
            client.user_agent.clone(),
            &user.username,
            true,
        );

        tracing::info!(username = %user.username, "New user registered");

        Ok(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
            verification_required: true,
        })
    }

    /// Connexion d'un utilisateur (par username ou email)
    pub fn login(
        &self,
        login_request: &LoginRequest,
        client: &ClientInfo,
    ) -> Result<LoginResponse, AppError> {
        let identifier = login_request.username.trim();
        if identifier.is_empty() || login_request.password.is_empty() {
            return Err(AppError::validation("Username and password are required"));
        }

        // Recherche l'utilisateur (une seule lecture, username OU email)
        let user = match UserRepository::find_by_username_or_email(identifier)? {
            Some(u) => u,
            None => {
                // Même erreur qu'un mauvais mot de passe: pas d'énumération
                self.log_attempt(None, client, identifier, false);
                return Err(AppError::InvalidCredentials);
            }
        };

        // Compte verrouillé?
        if self.guard.is_locked(&user) {
            self.log_attempt(Some(&user), client, identifier, false);
            return Err(AppError::AccountLocked {
                locked_until: user.locked_until.unwrap_or_else(Utc::now),
            });
        }

        // Compte désactivé?
        if !user.is_active {
            self.log_attempt(Some(&user), client, identifier, false);
            return Err(AppError::AccountDisabled);
        }

        // Vérifie le password
        if !PasswordManager::verify(&login_request.password, &user.password_hash) {
            self.guard.record_failure(user.id)?;
            self.log_attempt(Some(&user), client, identifier, false);
            return Err(AppError::InvalidCredentials);
        }

        // Succès: remet le compteur d'échecs à zéro et lève le verrou
        self.guard.record_success(user.id)?;
        let user = UserRepository::update_last_login(user.id)?;

        // Crée la session; son jeton, embarqué dans le JWT, est la seule
        // poignée de révocation du bearer token
        let session = self
            .sessions
            .create(user.id, &client.ip, client.user_agent.clone())?;

        let access_token =
            self.jwt_manager
                .generate_token(user.id, &user.username, &session.session_token)?;

        self.log_attempt(Some(&user), client, identifier, true);

        tracing::info!(username = %user.username, "Login successful");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            access_token,
            user: user.into(),
            session_expires: session.expires_at,
        })
    }

    /// Déconnexion: révoque la session embarquée dans le bearer token.
    /// Idempotent — toujours un succès pour un appelant authentifié.
    pub fn logout(&self, claims: &AuthClaims) -> Result<MessageResponse, AppError> {
        self.sessions.revoke(claims.sub, &claims.session_token)?;

        tracing::debug!(username = %claims.username, "User logged out");

        Ok(MessageResponse {
            message: "Logout successful".to_string(),
        })
    }

    /// Vérifie que le bearer token correspond toujours à un compte actif et
    /// à une session vivante — c'est ce contrôle qui rend la déconnexion
    /// effective alors que le JWT lui-même reste cryptographiquement valide.
    pub fn verify_token(&self, claims: &AuthClaims) -> Result<VerifyTokenResponse, AppError> {
        let user = UserRepository::find_by_id(claims.sub)?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::not_found("User not found or inactive"))?;

        self.sessions.validate(user.id, &claims.session_token)?;

        Ok(VerifyTokenResponse {
            message: "Token is valid".to_string(),
            user: user.into(),
        })
    }

    /// Change le mot de passe puis révoque toutes les autres sessions du
    /// compte (atomiquement — voir UserRepository).
    pub fn change_password(
        &self,
        claims: &AuthClaims,
        request: &ChangePasswordRequest,
    ) -> Result<MessageResponse, AppError> {
        if request.current_password.is_empty() || request.new_password.is_empty() {
            return Err(AppError::validation(
                "Current password and new password are required",
            ));
        }

        let user = UserRepository::find_by_id(claims.sub)?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        // Vérifie le mot de passe actuel
        if !PasswordManager::verify(&request.current_password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        // Le nouveau doit être fort, et différent de l'actuel (comparé via
        // verify, jamais en clair)
        validation::validate_password(&request.new_password)?;
        if PasswordManager::verify(&request.new_password, &user.password_hash) {
            return Err(AppError::validation(
                "New password must be different from current password",
            ));
        }

        let new_password_hash = PasswordManager::hash(&request.new_password)?;

        UserRepository::update_password_revoking_sessions(
            user.id,
            &new_password_hash,
            &claims.session_token,
        )?;

        tracing::info!(username = %user.username, "Password changed, other sessions revoked");

        Ok(MessageResponse {
            message: "Password changed successfully".to_string(),
        })
    }

    /// Journalisation best-effort: une tentative qui ne peut pas être écrite
    /// ne doit pas masquer le résultat réel du login.
    fn log_attempt(
        &self,
        user: Option<&User>,
        client: &ClientInfo,
        username_attempted: &str,
        success: bool,
    ) {
        if let Err(e) = LoginAttemptRepository::create(
            user.map(|u| u.id),
            &client.ip,
            client.user_agent.clone(),
            username_attempted,
            success,
        ) {
            tracing::error!("Failed to record login attempt: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_service() -> AuthService {
        AuthService::new(JwtManager::new("secret_key_for_service_tests", 24))
    }

    fn test_client() -> ClientInfo {
        ClientInfo {
            ip: "203.0.113.10".to_string(),
            user_agent: Some("test-agent".to_string()),
        }
    }

    // Les échecs de validation interviennent avant toute lecture/écriture:
    // testables sans base de données.

    #[test]
    fn register_rejects_invalid_username_before_any_state_change() {
        let service = make_service();
        let request = RegisterRequest {
            username: "ab".to_string(),
            email: "valid@example.com".to_string(),
            password: "Tr0ub4dor&Horse!".to_string(),
        };

        let result = service.register(&request, &test_client());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn register_rejects_invalid_email() {
        let service = make_service();
        let request = RegisterRequest {
            username: "valid_user".to_string(),
            email: "not-an-email".to_string(),
            password: "Tr0ub4dor&Horse!".to_string(),
        };

        let result = service.register(&request, &test_client());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn register_rejects_weak_password_naming_the_rule() {
        let service = make_service();
        let request = RegisterRequest {
            username: "valid_user".to_string(),
            email: "valid@example.com".to_string(),
            password: "weak".to_string(),
        };

        let err = service.register(&request, &test_client()).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("at least 12 characters")),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn login_rejects_missing_fields() {
        let service = make_service();
        let request = LoginRequest {
            username: "   ".to_string(),
            password: "irrelevant".to_string(),
        };

        let result = service.login(&request, &test_client());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn client_info_prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "198.51.100.7, 10.0.0.1".parse().unwrap(),
        );
        headers.insert("user-agent", "agent/1.0".parse().unwrap());

        let client = ClientInfo::from_headers(&headers);
        assert_eq!(client.ip, "198.51.100.7");
        assert_eq!(client.user_agent.as_deref(), Some("agent/1.0"));
    }

    #[test]
    fn client_info_falls_back_to_unknown() {
        let client = ClientInfo::from_headers(&HeaderMap::new());
        assert_eq!(client.ip, "unknown");
        assert!(client.user_agent.is_none());
    }
}

#[cfg(all(test, feature = "postgres_tests"))]
mod db_tests {
    use super::*;
    use crate::auth::guard::MAX_FAILED_ATTEMPTS;
    use crate::db::connection::get_connection;
    use crate::db::schema::users;
    use diesel::prelude::*;
    use uuid::Uuid;

    const STRONG_PASSWORD: &str = "Tr0ub4dor&Horse!";

    fn make_service() -> AuthService {
        AuthService::new(JwtManager::new("secret_key_for_service_tests", 24))
    }

    fn test_client() -> ClientInfo {
        ClientInfo {
            ip: "203.0.113.10".to_string(),
            user_agent: Some("test-agent".to_string()),
        }
    }

    fn unique_register_request() -> RegisterRequest {
        let unique = Uuid::new_v4().simple().to_string();
        RegisterRequest {
            username: format!("svc_{}", &unique[..12]),
            email: format!("svc_{unique}@example.com"),
            password: STRONG_PASSWORD.to_string(),
        }
    }

    fn delete_user(id: Uuid) {
        let mut conn = get_connection().expect("connection");
        let _ = diesel::delete(users::table.filter(users::id.eq(id))).execute(&mut conn);
    }

    fn claims_for(access_token: &str) -> AuthClaims {
        let jwt = JwtManager::new("secret_key_for_service_tests", 24);
        AuthClaims::from(jwt.verify_token(access_token).expect("decode"))
    }

    #[test]
    fn register_then_login_succeeds_with_24h_session() {
        let service = make_service();
        let request = unique_register_request();

        let registered = service
            .register(&request, &test_client())
            .expect("register");
        assert!(registered.verification_required);
        assert!(!registered.user.is_verified);

        let before = Utc::now();
        let login = service
            .login(
                &LoginRequest {
                    username: request.username.clone(),
                    password: request.password.clone(),
                },
                &test_client(),
            )
            .expect("login");

        assert!(login.session_expires >= before + Duration::hours(24) - Duration::seconds(5));
        assert!(login.session_expires <= Utc::now() + Duration::hours(24));
        assert!(login.user.last_login.is_some());

        delete_user(registered.user.id);
    }

    #[test]
    fn login_works_with_email_as_identifier() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let login = service.login(
            &LoginRequest {
                username: request.email.clone(),
                password: request.password.clone(),
            },
            &test_client(),
        );
        assert!(login.is_ok(), "Email should resolve the account");

        delete_user(registered.user.id);
    }

    #[test]
    fn register_duplicate_username_conflicts() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let mut second = request.clone();
        second.email = format!("other_{}@example.com", Uuid::new_v4());
        let result = service.register(&second, &test_client());

        assert!(matches!(result, Err(AppError::Conflict(_))));

        delete_user(registered.user.id);
    }

    #[test]
    fn unknown_user_and_wrong_password_are_indistinguishable() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let unknown = service.login(
            &LoginRequest {
                username: format!("ghost_{}", Uuid::new_v4().simple()),
                password: "Wr0ng!Password#1".to_string(),
            },
            &test_client(),
        );
        let wrong = service.login(
            &LoginRequest {
                username: request.username.clone(),
                password: "Wr0ng!Password#1".to_string(),
            },
            &test_client(),
        );

        // Même variante d'erreur → même statut HTTP, même forme de réponse.
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        delete_user(registered.user.id);
    }

    #[test]
    fn lockout_engages_after_threshold_and_blocks_correct_password() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let wrong = LoginRequest {
            username: request.username.clone(),
            password: "Wr0ng!Password#1".to_string(),
        };
        for _ in 0..MAX_FAILED_ATTEMPTS {
            let _ = service.login(&wrong, &test_client());
        }

        // 6e tentative, mot de passe correct: toujours verrouillé.
        let result = service.login(
            &LoginRequest {
                username: request.username.clone(),
                password: request.password.clone(),
            },
            &test_client(),
        );
        match result {
            Err(AppError::AccountLocked { locked_until }) => {
                assert!(locked_until > Utc::now());
            }
            other => panic!("Expected AccountLocked, got {other:?}"),
        }

        delete_user(registered.user.id);
    }

    #[test]
    fn correct_login_after_expired_lock_clears_the_lock() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let wrong = LoginRequest {
            username: request.username.clone(),
            password: "Wr0ng!Password#1".to_string(),
        };
        for _ in 0..MAX_FAILED_ATTEMPTS {
            let _ = service.login(&wrong, &test_client());
        }

        // Fait expirer le verrou manuellement.
        let mut conn = get_connection().expect("connection");
        diesel::update(users::table.filter(users::id.eq(registered.user.id)))
            .set(users::locked_until.eq(Utc::now() - Duration::minutes(1)))
            .execute(&mut conn)
            .expect("backdate lock");

        let result = service.login(
            &LoginRequest {
                username: request.username.clone(),
                password: request.password.clone(),
            },
            &test_client(),
        );
        assert!(result.is_ok(), "Expired lock must not block a correct login");

        let user = UserRepository::find_by_id(registered.user.id)
            .expect("query")
            .expect("user");
        assert_eq!(user.failed_attempts, 0);
        assert!(user.locked_until.is_none());

        delete_user(registered.user.id);
    }

    #[test]
    fn logout_is_idempotent_and_kills_the_session() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let login = service
            .login(
                &LoginRequest {
                    username: request.username.clone(),
                    password: request.password.clone(),
                },
                &test_client(),
            )
            .expect("login");
        let claims = claims_for(&login.access_token);

        assert!(service.verify_token(&claims).is_ok());
        service.logout(&claims).expect("first logout");
        service.logout(&claims).expect("second logout succeeds too");

        let result = service.verify_token(&claims);
        assert!(matches!(result, Err(AppError::SessionNotFound)));

        delete_user(registered.user.id);
    }

    #[test]
    fn changing_password_revokes_other_sessions_but_keeps_current() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let login_request = LoginRequest {
            username: request.username.clone(),
            password: request.password.clone(),
        };
        let session_a = service
            .login(&login_request, &test_client())
            .expect("login A");
        let session_b = service
            .login(&login_request, &test_client())
            .expect("login B");

        let claims_a = claims_for(&session_a.access_token);
        let claims_b = claims_for(&session_b.access_token);

        service
            .change_password(
                &claims_a,
                &ChangePasswordRequest {
                    current_password: request.password.clone(),
                    new_password: "N3w&Different!Pass".to_string(),
                },
            )
            .expect("change password");

        assert!(service.verify_token(&claims_a).is_ok(), "A stays valid");
        assert!(
            matches!(service.verify_token(&claims_b), Err(AppError::SessionNotFound)),
            "B must be revoked"
        );

        // L'ancien mot de passe ne fonctionne plus, le nouveau oui.
        assert!(service.login(&login_request, &test_client()).is_err());
        assert!(
            service
                .login(
                    &LoginRequest {
                        username: request.username.clone(),
                        password: "N3w&Different!Pass".to_string(),
                    },
                    &test_client(),
                )
                .is_ok()
        );

        delete_user(registered.user.id);
    }

    #[test]
    fn change_password_rejects_same_password() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let login = service
            .login(
                &LoginRequest {
                    username: request.username.clone(),
                    password: request.password.clone(),
                },
                &test_client(),
            )
            .expect("login");
        let claims = claims_for(&login.access_token);

        let result = service.change_password(
            &claims,
            &ChangePasswordRequest {
                current_password: request.password.clone(),
                new_password: request.password.clone(),
            },
        );
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("different")),
            other => panic!("Expected validation error, got {other:?}"),
        }

        delete_user(registered.user.id);
    }

    #[test]
    fn change_password_rejects_wrong_current_password() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let login = service
            .login(
                &LoginRequest {
                    username: request.username.clone(),
                    password: request.password.clone(),
                },
                &test_client(),
            )
            .expect("login");
        let claims = claims_for(&login.access_token);

        let result = service.change_password(
            &claims,
            &ChangePasswordRequest {
                current_password: "Wr0ng!Current#1x".to_string(),
                new_password: "N3w&Different!Pass".to_string(),
            },
        );
        assert!(matches!(result, Err(AppError::InvalidCredentials)));

        delete_user(registered.user.id);
    }

    #[test]
    fn disabled_account_cannot_login() {
        let service = make_service();
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let mut conn = get_connection().expect("connection");
        diesel::update(users::table.filter(users::id.eq(registered.user.id)))
            .set(users::is_active.eq(false))
            .execute(&mut conn)
            .expect("deactivate");

        let result = service.login(
            &LoginRequest {
                username: request.username.clone(),
                password: request.password.clone(),
            },
            &test_client(),
        );
        assert!(matches!(result, Err(AppError::AccountDisabled)));

        delete_user(registered.user.id);
    }

    #[test]
    fn concurrent_failed_logins_lose_no_increment() {
        let service = std::sync::Arc::new(make_service());
        let request = unique_register_request();
        let registered = service
            .register(&request, &test_client())
            .expect("register");

        let n = 4; // sous le seuil pour observer le compteur exact
        let handles: Vec<_> = (0..n)
            .map(|_| {
                let service = service.clone();
                let username = request.username.clone();
                std::thread::spawn(move || {
                    let _ = service.login(
                        &LoginRequest {
                            username,
                            password: "Wr0ng!Password#1".to_string(),
                        },
                        &ClientInfo {
                            ip: "203.0.113.10".to_string(),
                            user_agent: None,
                        },
                    );
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }

        let user = UserRepository::find_by_id(registered.user.id)
            .expect("query")
            .expect("user");
        assert_eq!(user.failed_attempts, n, "No increment may be lost");

        delete_user(registered.user.id);
    }
}
