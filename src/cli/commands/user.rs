use crate::config::Config;
use crate::db::{Store, unique_violation};
use crate::models::user::{NewUser, normalize_email};

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await
}

pub async fn cmd_create_user(
    config: &Config,
    username: &str,
    email: &str,
    password: Option<String>,
    is_staff: bool,
    is_superuser: bool,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => {
            println!("Password:");
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            input.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let min = config.security.min_password_length;
    if password.chars().count() < min {
        println!("Password must be at least {min} characters.");
        return Ok(());
    }

    let store = open_store(config).await?;

    let new_user = NewUser {
        username: username.to_string(),
        email: normalize_email(email),
        password,
        is_staff: is_staff || is_superuser,
        is_superuser,
    };

    match store.create_user(new_user, &config.security).await {
        Ok(user) => {
            println!("✓ Created user '{}' (ID: {})", user.username, user.id);
            Ok(())
        }
        Err(e) if unique_violation(&e).is_some() => {
            println!("A user with that username or email already exists.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

pub async fn cmd_delete_user(config: &Config, username: &str, yes: bool) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let Some(user) = store.get_user_by_username(username).await? else {
        println!("User '{username}' not found.");
        return Ok(());
    };

    if !yes {
        println!(
            "Delete '{}' (ID: {}) and all of their links and collections?",
            user.username, user.id
        );
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if store.delete_user(user.id).await? {
        println!("✓ Deleted: {}", user.username);
    } else {
        println!("Failed to delete user.");
    }

    Ok(())
}
