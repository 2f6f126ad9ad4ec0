//! Terminal stand-ins for the views the core navigates to.

use std::io::{self, Write};

use anyhow::Result;
use tracing::debug;

use dosebook_core::{Navigator, Route};

/// Shows the login view as a hint on stderr.
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate_to(&self, route: Route) {
        debug!(route = %route, "Navigation requested");
        if route == Route::Login {
            eprintln!("Your session has ended. Run `dosebook login` to sign in again.");
        }
    }
}

/// Prompt for a line of input, offering `default` when given
pub fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match default {
        Some(d) if input.is_empty() => d.to_string(),
        _ => input.to_string(),
    })
}

pub fn prompt_password(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(format!("{}: ", label))?)
}
