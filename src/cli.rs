//! # Subcommands
//!
//! `salam` with no subcommand opens the chat screen. The others cover what
//! the browser client did on its own pages: signing in, signing out, and
//! the profile view.
//!
//! Every command that talks to the backend reacts to a 401 the same way:
//! the stored credentials are cleared and the user is sent back to
//! `salam login`.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Subcommand;
use log::{info, warn};

use crate::api::auth::{CredentialStore, Credentials, login_url, parse_callback};
use crate::api::types::{Profile, ProfileUpdate, UserStats, parse_timestamp};
use crate::api::{ApiClient, ApiError, ChatBackend};
use crate::core::config::ResolvedConfig;
use crate::tui::{self, Exit};

pub type CliResult = Result<(), Box<dyn Error>>;

/// Width used for wrapped console output.
const WRAP_WIDTH: usize = 72;
const EXPIRED: &str = "Your session has expired. Run `salam login` to sign in again.";

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the chat screen (the default)
    Chat,
    /// Sign in with Google
    Login {
        /// The address the browser landed on after sign-in (prompted for when omitted)
        callback: Option<String>,
    },
    /// Forget the stored credentials
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommand>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProfileCommand {
    Show,
    Stats,
    /// Change your display name
    Rename { name: String },
}

pub async fn execute(command: Command, config: &ResolvedConfig, store: &CredentialStore) -> CliResult {
    match command {
        Command::Chat => chat(config, store),
        Command::Login { callback } => login(config, store, callback).await,
        Command::Logout => {
            store.clear()?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => whoami(config, store).await,
        Command::Profile { command } => {
            profile(config, store, command.unwrap_or(ProfileCommand::Show)).await
        }
    }
}

fn chat(config: &ResolvedConfig, store: &CredentialStore) -> CliResult {
    let Some((client, creds)) = signed_in(config, store)? else {
        return Ok(());
    };
    info!("Opening chat against {}", client.base_url());
    match tui::run(config, Arc::new(client), store.clone(), creds.user)? {
        Exit::Quit => {}
        Exit::SignedOut => println!("{EXPIRED}"),
    }
    Ok(())
}

async fn login(config: &ResolvedConfig, store: &CredentialStore, callback: Option<String>) -> CliResult {
    let callback = match callback {
        Some(callback) => callback,
        None => {
            println!("{}\n", wrap("Open this address in your browser and sign in with your Google account:"));
            println!("    {}\n", login_url(&config.base_url));
            println!(
                "{}",
                wrap("When sign-in finishes the browser lands on an address containing `token=`. Copy it and paste it below.")
            );
            print!("> ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line
        }
    };

    let token = parse_callback(&callback)?;
    let client = ApiClient::new(&config.base_url, Some(token.clone()), config.client_options())?;
    let user = client.current_user().await?;
    store.save(&Credentials {
        token,
        user: Some(user.clone()),
    })?;
    info!("Signed in as {}", user.email);
    println!("As-salamu alaykum, {}! You are signed in.", user.first_name());
    Ok(())
}

async fn whoami(config: &ResolvedConfig, store: &CredentialStore) -> CliResult {
    let Some((client, _)) = signed_in(config, store)? else {
        return Ok(());
    };
    let user = client.current_user().await.map_err(|e| signed_out_on_401(store, e))?;
    store.mirror_user(&user)?;
    println!("{} <{}>", user.name, user.email);
    Ok(())
}

async fn profile(config: &ResolvedConfig, store: &CredentialStore, command: ProfileCommand) -> CliResult {
    let Some((client, creds)) = signed_in(config, store)? else {
        return Ok(());
    };
    match command {
        ProfileCommand::Show => {
            let profile = client.get_profile().await.map_err(|e| signed_out_on_401(store, e))?;
            println!("{}", profile_summary(&profile));
        }
        ProfileCommand::Stats => {
            let stats = match client.get_stats().await {
                Ok(stats) => stats,
                Err(e) if e.is_unauthorized() => return Err(signed_out_on_401(store, e)),
                Err(e) => {
                    warn!("Stats unavailable, showing placeholder: {}", e);
                    UserStats::fallback()
                }
            };
            println!("{}", stats_summary(&stats));
        }
        ProfileCommand::Rename { name } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err("Name cannot be empty".into());
            }
            let update = ProfileUpdate {
                name: Some(name),
                ..ProfileUpdate::default()
            };
            let profile = client
                .update_profile(&update)
                .await
                .map_err(|e| signed_out_on_401(store, e))?;
            if let Some(mut user) = creds.user {
                user.name = profile.name.clone();
                store.mirror_user(&user)?;
            }
            println!("Your name is now {}.", profile.name);
        }
    }
    Ok(())
}

/// Client for the stored token, or `None` after telling the user to log in.
fn signed_in(
    config: &ResolvedConfig,
    store: &CredentialStore,
) -> Result<Option<(ApiClient, Credentials)>, Box<dyn Error>> {
    let creds = match store.load() {
        Ok(creds) => creds,
        Err(e) => {
            warn!("Unreadable credentials at {}: {}", store.path().display(), e);
            None
        }
    };
    let Some(creds) = creds else {
        println!("You are not signed in. Run `salam login` to sign in with Google.");
        return Ok(None);
    };
    let client = ApiClient::new(&config.base_url, Some(creds.token.clone()), config.client_options())?;
    Ok(Some((client, creds)))
}

/// A 401 ends the stored session; anything else passes through.
fn signed_out_on_401(store: &CredentialStore, err: ApiError) -> Box<dyn Error> {
    if !err.is_unauthorized() {
        return err.into();
    }
    if let Err(e) = store.clear() {
        warn!("Failed to clear credentials: {}", e);
    }
    EXPIRED.into()
}

fn profile_summary(profile: &Profile) -> String {
    let mut out = format!("{}\n{}", profile.name, profile.email);
    if let Some(created) = &profile.created_at {
        out.push_str(&format!("\nMember since {}", short_date(created)));
    }
    if let Some(last) = &profile.last_login {
        out.push_str(&format!("\nLast login   {}", short_date(last)));
    }
    out
}

fn stats_summary(stats: &UserStats) -> String {
    let topics = if stats.favorite_topics.is_empty() {
        String::from("none yet")
    } else {
        stats.favorite_topics.join(", ")
    };
    format!(
        "Chats        {}\nMessages     {}\nJoined       {}\nLast active  {}\n{}",
        stats.total_chats,
        stats.total_messages,
        short_date(&stats.joined_date),
        short_date(&stats.last_active),
        wrap(&format!("Topics       {topics}")),
    )
}

/// `YYYY-MM-DD` for parseable timestamps, the raw string otherwise.
fn short_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn wrap(text: &str) -> String {
    textwrap::fill(text, WRAP_WIDTH)
}
