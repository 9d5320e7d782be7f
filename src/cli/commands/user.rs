use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Role;
use crate::cli::utils::{output_empty_collection, output_success, pool, print_json};
use crate::cli::OutputFormat;
use crate::database::models::User;
use crate::services::users::{UserCreate, UserListQuery, UserService, UserUpdate};
use crate::validation::Validate;

/// The CLI acts outside any session, so the self-demotion guard never matches it.
const CLI_ACTOR: Uuid = Uuid::nil();

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a login account")]
    Add {
        #[arg(help = "Email address used to sign in")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, default_value = "admin", help = "admin, pastor, treasurer, secretary, leader or member")]
        role: Role,
        #[arg(long, env = "CONGREGA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, help = "Link the account to a member record")]
        member_id: Option<i64>,
    },

    #[command(about = "List login accounts")]
    List,

    #[command(about = "Change an account's role")]
    SetRole {
        email: String,
        role: Role,
    },

    #[command(about = "Set a new password")]
    SetPassword {
        email: String,
        #[arg(long, env = "CONGREGA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    #[command(about = "Deactivate an account")]
    Deactivate { email: String },
}

async fn find(service: &UserService, email: &str) -> anyhow::Result<User> {
    service
        .find_by_email(email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No user with email '{}'", email))
}

fn update_from(user: &User) -> anyhow::Result<UserUpdate> {
    Ok(UserUpdate {
        name: user.name.clone(),
        role: user.role.parse::<Role>().map_err(anyhow::Error::msg)?,
        is_active: user.is_active,
        member_id: user.member_id,
    })
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let service = UserService::new(pool()?);

    match cmd {
        UserCommands::Add { email, name, role, password, member_id } => {
            let input = UserCreate { email, name, password, role, member_id, is_active: true };
            input.validate()?;
            let user = service.create_one(&input).await?;
            output_success(
                &output_format,
                &format!("Created {} account for {}", user.role, user.email),
                Some(json!({ "id": user.id, "email": user.email, "role": user.role })),
            )
        }
        UserCommands::List => {
            let users = service.list(UserListQuery::default()).await?;
            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }
            match output_format {
                OutputFormat::Json => print_json(&json!({ "users": users })),
                OutputFormat::Text => {
                    println!("{:<32} {:<25} {:<10} {:<7} {}", "EMAIL", "NAME", "ROLE", "ACTIVE", "LAST LOGIN");
                    println!("{}", "-".repeat(95));
                    for user in &users {
                        let last_login = user
                            .last_login_at
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "never".to_string());
                        println!(
                            "{:<32} {:<25} {:<10} {:<7} {}",
                            user.email, user.name, user.role, user.is_active, last_login
                        );
                    }
                    Ok(())
                }
            }
        }
        UserCommands::SetRole { email, role } => {
            let user = find(&service, &email).await?;
            let update = UserUpdate { role, ..update_from(&user)? };
            let user = service.update_404(CLI_ACTOR, user.id, &update).await?;
            output_success(
                &output_format,
                &format!("{} is now {}", user.email, user.role),
                Some(json!({ "email": user.email, "role": user.role })),
            )
        }
        UserCommands::SetPassword { email, password } => {
            let user = find(&service, &email).await?;
            let min = crate::config::CONFIG.security.min_password_length;
            if password.chars().count() < min {
                anyhow::bail!("Password must be at least {} characters", min);
            }
            service.set_password(user.id, &password).await?;
            output_success(&output_format, &format!("Password updated for {}", user.email), None)
        }
        UserCommands::Deactivate { email } => {
            let user = find(&service, &email).await?;
            let update = UserUpdate { is_active: false, ..update_from(&user)? };
            let user = service.update_404(CLI_ACTOR, user.id, &update).await?;
            output_success(
                &output_format,
                &format!("{} deactivated", user.email),
                Some(json!({ "email": user.email, "is_active": user.is_active })),
            )
        }
    }
}
