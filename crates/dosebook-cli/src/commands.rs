//! One function per subcommand.

use anyhow::Result;
use tracing::warn;

use dosebook_core::{App, Config, Credentials, Registration, User};

use crate::shell::{prompt, prompt_password};

fn print_user(user: &User, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!("{} (id {})", user.display_name(), user.id);
    }
    Ok(())
}

fn remember_username(config: &mut Config, username: &str) {
    config.last_username = Some(username.to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}

pub async fn login(
    app: &App,
    config: &mut Config,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username", config.last_username.as_deref())?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password")?,
    };

    let user = app
        .auth()
        .login(&Credentials::new(username.clone(), password))
        .await?;
    remember_username(config, &username);

    println!("Signed in as {}", user.display_name());
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    let notification = app.auth().logout();
    println!("Signed out");

    // Keep the process alive long enough for the server to hear about it
    if let Some(handle) = notification {
        if let Err(e) = handle.await {
            warn!(error = %e, "Logout notification task failed");
        }
    }
    Ok(())
}

pub async fn register(
    app: &App,
    config: &mut Config,
    username: Option<String>,
    nickname: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username", None)?,
    };
    let nickname = match nickname {
        Some(n) => n,
        None => prompt("Nickname", Some(&username))?,
    };
    let registration = Registration {
        username: username.clone(),
        nickname,
        password: prompt_password("Password")?,
        password_confirm: prompt_password("Confirm password")?,
    };

    let user = app.auth().register(&registration).await?;
    remember_username(config, &username);

    println!("Welcome, {}!", user.display_name());
    Ok(())
}

pub async fn whoami(app: &App, json: bool) -> Result<()> {
    if app.session().token().is_none() {
        println!("Not signed in");
        return Ok(());
    }
    let user = app.auth().refresh_user().await?;
    print_user(&user, json)
}

pub fn status(app: &App, config: &Config, json: bool) -> Result<()> {
    let session = app.session().snapshot();

    if json {
        let value = serde_json::json!({
            "authenticated": session.is_authenticated(),
            "user": session.user,
            "api_base_url": app.api().base_url(),
            "storage": config.storage,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Server:  {}", app.api().base_url());
    println!("Storage: {:?}", config.storage);
    match session.user {
        Some(ref user) if session.is_authenticated() => {
            println!("Signed in as {} (id {})", user.display_name(), user.id)
        }
        _ => println!("Not signed in"),
    }
    Ok(())
}
