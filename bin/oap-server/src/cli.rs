//! Command-line interface.
//!
//! With no subcommand the server runs. `user add` and `user token` manage
//! accounts and mint bearer tokens, printing the token on stdout.

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::auth::JwtKeys;
use crate::entities::{User, UserStore};

#[derive(Debug, Parser)]
#[command(name = "oap-server", version, about = "OAP chatbot backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Manage users and their tokens.
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Create a user (or reuse the one with this email) and print a token.
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print a fresh token for an existing user.
    Token {
        #[arg(long)]
        email: String,
    },
}

/// Run a `user` subcommand and return the token to print.
pub async fn run_user<S: UserStore>(
    action: UserAction,
    store: &S,
    keys: &JwtKeys,
) -> anyhow::Result<String> {
    let user = match action {
        UserAction::Add { email, name } => match store.get_user_by_email(&email).await? {
            Some(existing) => existing,
            None => {
                let now = Utc::now();
                let user = User {
                    id: Uuid::new_v4().to_string(),
                    email,
                    name,
                    created_at: now,
                    updated_at: now,
                };
                store.create_user(user.clone()).await?;
                tracing::info!(user_id = %user.id, email = %user.email, "user created");
                user
            }
        },
        UserAction::Token { email } => match store.get_user_by_email(&email).await? {
            Some(user) => user,
            None => bail!("no user with email {email}"),
        },
    };
    keys.issue(&user.id).context("failed to sign token")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::memory_store;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["oap-server"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["oap-server", "user", "add", "--email", "a@b.c"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::User { action: UserAction::Add { ref email, name: None } }) if email == "a@b.c"
        ));
    }

    #[tokio::test]
    async fn add_is_idempotent_per_email() {
        let store = memory_store().await;
        let keys = JwtKeys::new("k", 60);
        let add = || UserAction::Add { email: "same@example.com".into(), name: Some("Sam".into()) };

        let first = run_user(add(), &store, &keys).await.unwrap();
        let second = run_user(add(), &store, &keys).await.unwrap();
        assert_eq!(keys.verify(&first).unwrap().sub, keys.verify(&second).unwrap().sub);

        let user = store.get_user_by_email("same@example.com").await.unwrap().unwrap();
        assert_eq!(user.name.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn token_for_unknown_email_fails() {
        let store = memory_store().await;
        let keys = JwtKeys::new("k", 60);
        let action = UserAction::Token { email: "ghost@example.com".into() };
        assert!(run_user(action, &store, &keys).await.is_err());
    }
}
