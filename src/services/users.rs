use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Conditions, ServiceError, ServiceResult};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{generate_jwt, Claims, JwtError, Role};
use crate::config::CONFIG;
use crate::database::models::User;
use crate::database::Repository;
use crate::filter::FilterData;
use crate::validation::{default_true, is_valid_email, FieldErrors, Validate, MAX_NAME_LENGTH};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn check_password(errors: &mut FieldErrors, field: &str, password: &str) {
    let min = CONFIG.security.min_password_length;
    if password.chars().count() < min {
        errors.add(field, format!("Password must be at least {} characters", min));
    } else if password.len() > 128 {
        errors.add(field, "Password must be at most 128 characters");
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.add("email", "This field is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Invalid email address");
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.add("password", "This field is required");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

impl Validate for PasswordChange {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.current_password.is_empty() {
            errors.add("current_password", "This field is required");
        }
        check_password(&mut errors, "new_password", &self.new_password);
        if !self.new_password.is_empty() && self.new_password == self.current_password {
            errors.add("new_password", "The new password must differ from the current one");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordReset {
    #[serde(default)]
    pub password: String,
}

impl Validate for PasswordReset {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_password(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    pub role: Role,
    pub member_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        errors.require_text("name", &self.name, MAX_NAME_LENGTH);
        check_password(&mut errors, "password", &self.password);
        errors.positive_id("member_id", self.member_id);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: String,
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub member_id: Option<i64>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name, MAX_NAME_LENGTH);
        errors.positive_id("member_id", self.member_id);
        errors.into_result()
    }
}

/// An admin editing their own account may not lock themselves out.
fn check_self_update(actor: Uuid, target: Uuid, update: &UserUpdate) -> ServiceResult<()> {
    if actor == target && (!update.is_active || update.role != Role::Admin) {
        return Err(ServiceError::Forbidden(
            "You cannot deactivate or demote your own account".to_string(),
        ));
    }
    Ok(())
}

/// Token plus profile returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

impl Session {
    pub fn issue(user: User) -> Result<Self, JwtError> {
        let claims = Claims::new(user.id, user.email.clone(), user.name.clone(), user.role.clone());
        let token = generate_jwt(&claims)?;
        Ok(Self { token, expires_in: claims.expires_in(), user })
    }
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<User> {
        Repository::new("users", self.pool.clone())
    }

    pub async fn list(&self, query: UserListQuery) -> ServiceResult<Vec<User>> {
        let conditions = Conditions::new()
            .eq("role", query.role.map(|r| r.as_str()))
            .eq("is_active", query.active);
        let filter = FilterData::conditions(conditions.into_map()).paged(
            query.order.as_deref(),
            "name asc",
            query.limit,
            query.offset,
        );
        Ok(self.repository().select_any(filter).await?)
    }

    pub async fn select_404(&self, id: Uuid) -> ServiceResult<User> {
        let filter = FilterData {
            where_clause: Some(json!({ "id": id.to_string() })),
            ..Default::default()
        };
        Ok(self
            .repository()
            .select_404(filter, format!("User {} not found", id))
            .await?)
    }

    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Verifies credentials and stamps `last_login_at`.
    pub async fn login(&self, input: &LoginInput) -> ServiceResult<User> {
        let user = match self.find_by_email(&input.email).await? {
            Some(user) if verify_password(&input.password, &user.password_hash) => user,
            _ => return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string())),
        };
        if !user.is_active {
            return Err(ServiceError::Forbidden("User account is deactivated".to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET last_login_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn create_one(&self, input: &UserCreate) -> ServiceResult<User> {
        let hash = hash_password(&input.password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, role, member_id, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(normalize_email(&input.email))
        .bind(input.name.trim())
        .bind(hash)
        .bind(input.role.as_str())
        .bind(input.member_id)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn update_404(&self, actor: Uuid, id: Uuid, input: &UserUpdate) -> ServiceResult<User> {
        check_self_update(actor, id, input)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET name = $2, role = $3, is_active = $4, member_id = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.role.as_str())
        .bind(input.is_active)
        .bind(input.member_id)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    pub async fn set_password(&self, id: Uuid, password: &str) -> ServiceResult<()> {
        let hash = hash_password(password)?;
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    pub async fn change_password(&self, id: Uuid, input: &PasswordChange) -> ServiceResult<()> {
        let user = self.select_404(id).await?;
        if !verify_password(&input.current_password, &user.password_hash) {
            return Err(ServiceError::field("current_password", "Current password is incorrect"));
        }
        self.set_password(id, &input.new_password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(role: Role, is_active: bool) -> UserUpdate {
        UserUpdate { name: "Admin".to_string(), role, is_active, member_id: None }
    }

    #[test]
    fn admin_cannot_demote_or_deactivate_self() {
        let me = Uuid::new_v4();
        assert!(matches!(
            check_self_update(me, me, &update(Role::Pastor, true)),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(check_self_update(me, me, &update(Role::Admin, false)).is_err());
        assert!(check_self_update(me, me, &update(Role::Admin, true)).is_ok());
        assert!(check_self_update(me, Uuid::new_v4(), &update(Role::Member, false)).is_ok());
    }

    #[test]
    fn short_passwords_are_rejected() {
        let reset = PasswordReset { password: "short".to_string() };
        assert!(reset.validate().unwrap_err().get("password").is_some());

        let change = PasswordChange {
            current_password: "same-password".to_string(),
            new_password: "same-password".to_string(),
        };
        assert!(change.validate().unwrap_err().get("new_password").is_some());
    }

    #[test]
    fn login_requires_email_shape() {
        let input = LoginInput { email: "pastor".to_string(), password: "x".to_string() };
        assert_eq!(input.validate().unwrap_err().get("email"), Some("Invalid email address"));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Pastor@Iglesia.ORG "), "pastor@iglesia.org");
    }
}
