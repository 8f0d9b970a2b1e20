// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PSA command-line client
//!
//! Log in, chat with the assistant, and manage linked online-judge
//! handles from the terminal.

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use psa_client::{
    config::Config,
    error::ClientError,
    gateway::Outcome,
    models::{MessageContent, Platform, Role},
    services::SessionState,
    time_utils::format_utc_rfc3339,
    validation::{ChangePasswordForm, RegistrationForm, ResetPasswordForm},
    PsaClient,
};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "psa", version, about = "Problem Solving Assistant client")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with username or email
    Login {
        username: String,
        #[arg(long, env = "PSA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Print the Google sign-in URL
    GoogleUrl,
    /// Finish Google sign-in with the callback's `code`
    GoogleLogin { code: String },
    Logout,
    /// Show whether the stored session is still valid
    Status,
    /// Create an account (asks for the emailed OTP)
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "PSA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Reset a forgotten password (asks for the emailed OTP)
    ResetPassword {
        email: String,
        #[arg(long, env = "PSA_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    ChangePassword {
        #[arg(long, env = "PSA_PASSWORD", hide_env_values = true)]
        old_password: String,
        #[arg(long, env = "PSA_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// List chats grouped by last use
    Chats,
    /// Create a chat
    New { title: Option<String> },
    /// Print a chat's messages
    Open { chat_id: i64 },
    /// Send a message to a chat and print the reply
    Send { chat_id: i64, message: String },
    Rename { chat_id: i64, title: String },
    /// Delete one or more chats
    Delete {
        #[arg(required = true)]
        chat_ids: Vec<i64>,
    },
    DeleteAll,
    /// List linked problem-solving accounts
    Accounts,
    AddHandle { platform: Platform, handle: String },
    /// Start (or with --confirm, finish) handle verification
    VerifyHandle {
        account_id: i64,
        #[arg(long)]
        confirm: bool,
    },
    RemoveHandle { account_id: i64 },
    /// Codeforces statistics
    Insights {
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.json);

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(backend = %config.backend_url, "Starting PSA client");

    let client = PsaClient::from_config(config).context("Failed to initialize client")?;

    let Err(err) = run(cli.command, &client).await else {
        return Ok(ExitCode::SUCCESS);
    };

    let client_err = err.downcast::<ClientError>()?;
    match Outcome::<()>::from(Err(client_err)) {
        Outcome::AuthExpired => {
            eprintln!("Session expired. Please log in again with `psa login`.");
        }
        Outcome::Failed(e) => {
            tracing::debug!(error = %e, "Command failed");
            eprintln!("{}", e.user_message(&e.to_string()));
        }
        Outcome::Ok(()) => return Ok(ExitCode::SUCCESS),
    }
    Ok(ExitCode::FAILURE)
}

async fn run(command: Command, client: &PsaClient) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let profile = client.auth.login(&username, &password).await?;
            println!(
                "Logged in as {}",
                profile.username.as_deref().unwrap_or(&username)
            );
        }
        Command::GoogleUrl => println!("{}", client.auth.google_authorize_url()?),
        Command::GoogleLogin { code } => {
            let profile = client.auth.login_google(&code).await?;
            println!(
                "Logged in as {}",
                profile.username.as_deref().unwrap_or("Google user")
            );
        }
        Command::Logout => {
            client.auth.logout()?;
            println!("Logged out");
        }
        Command::Status => match client.auth.check_session().await? {
            SessionState::Anonymous => println!("Not logged in"),
            SessionState::Expired => println!("Session expired"),
            SessionState::Authenticated => {
                let profile = client.session.profile();
                println!(
                    "Logged in as {}",
                    profile.username.as_deref().unwrap_or("(unknown)")
                );
                if let Some(handle) = profile.codeforces_handle {
                    println!("  Codeforces: {}", handle);
                }
                if let Some(handle) = profile.atcoder_handle {
                    println!("  AtCoder: {}", handle);
                }
            }
        },
        Command::Register {
            first_name,
            last_name,
            username,
            email,
            password,
        } => {
            let form = RegistrationForm {
                first_name,
                last_name,
                username,
                email,
                confirm_password: password.clone(),
                password,
            };
            let pending = client.auth.start_registration(form).await?;
            let otp = read_line(&format!("OTP sent to {}. Enter it: ", pending.email()))?;
            client.auth.complete_registration(&pending, &otp).await?;
            println!("Registration successful. You can now log in.");
        }
        Command::ResetPassword {
            email,
            new_password,
        } => {
            client.auth.request_password_reset(&email).await?;
            let otp = read_line(&format!("OTP sent to {}. Enter it: ", email))?;
            let grant = client.auth.verify_reset_otp(&email, &otp).await?;
            let form = ResetPasswordForm {
                confirm_password: new_password.clone(),
                new_password,
            };
            client.auth.reset_password(&grant, form).await?;
            println!("Password reset. You can now log in.");
        }
        Command::ChangePassword {
            old_password,
            new_password,
        } => {
            let form = ChangePasswordForm {
                old_password,
                confirm_password: new_password.clone(),
                new_password,
            };
            client.auth.change_password(form).await?;
            println!("Password changed");
        }
        Command::Chats => {
            let buckets = client.chats.categorized(&Local::now()).await?;
            if buckets.is_empty() {
                println!("No recent chats");
            }
            for (bucket, chats) in buckets.sections() {
                println!("{}", bucket.label());
                for chat in chats {
                    match chat.last_open {
                        Some(at) => println!("  [{}] {} ({})", chat.id, chat.title, format_utc_rfc3339(at)),
                        None => println!("  [{}] {}", chat.id, chat.title),
                    }
                }
            }
        }
        Command::New { title } => match client.chats.create(title.as_deref()).await? {
            Some(id) => println!("Created chat {}", id),
            None => println!("Chat created"),
        },
        Command::Open { chat_id } => {
            let conversation = client.chats.open(chat_id).await?;
            for message in conversation.messages() {
                print_message(message.role, &message.content);
            }
        }
        Command::Send { chat_id, message } => {
            let mut conversation = client.chats.open(chat_id).await?;
            conversation.send(&client.chats, &message).await?;
            if let Some(reply) = conversation.messages().last() {
                print_message(reply.role, &reply.content);
            }
        }
        Command::Rename { chat_id, title } => {
            client.chats.rename(chat_id, &title).await?;
            println!("Chat renamed");
        }
        Command::Delete { chat_ids } => {
            if let [chat_id] = chat_ids.as_slice() {
                println!("{}", client.chats.delete(*chat_id).await?);
            } else {
                client.chats.delete_many(&chat_ids).await?;
                println!("Deleted {} chats", chat_ids.len());
            }
        }
        Command::DeleteAll => println!("{}", client.chats.delete_all().await?),
        Command::Accounts => {
            for account in client.accounts.list().await? {
                println!(
                    "[{}] {} {} ({})",
                    account.id,
                    account.platform,
                    account.handle,
                    if account.is_verified() {
                        "verified"
                    } else {
                        "unverified"
                    }
                );
            }
        }
        Command::AddHandle { platform, handle } => {
            let account = client.accounts.add_handle(platform, &handle).await?;
            println!(
                "Added {} handle {} (id {}); run `psa verify-handle {}` to verify it",
                account.platform, account.handle, account.id, account.id
            );
        }
        Command::VerifyHandle {
            account_id,
            confirm: false,
        } => {
            let challenge = client.accounts.start_verification(account_id).await?;
            if let Some(message) = &challenge.message {
                println!("{}", message);
            }
            println!("Submit a compilation error to: {}", challenge.problem_url);
            println!("Then run `psa verify-handle {} --confirm`", account_id);
        }
        Command::VerifyHandle {
            account_id,
            confirm: true,
        } => {
            let account = client.accounts.confirm_verification(account_id).await?;
            if account.is_verified() {
                println!("{} handle {} verified", account.platform, account.handle);
            } else {
                println!("Not verified yet; check your submission and try again");
            }
        }
        Command::RemoveHandle { account_id } => {
            let account = client
                .accounts
                .list()
                .await?
                .into_iter()
                .find(|a| a.id == account_id)
                .ok_or_else(|| {
                    ClientError::Validation(format!("No account with id {}", account_id))
                })?;
            client.accounts.remove(&account).await?;
            println!("Removed {} handle {}", account.platform, account.handle);
        }
        Command::Insights { top } => {
            let insights = client.insights.codeforces().await?;
            if let Some(handle) = &insights.handle {
                println!("Codeforces: {}", handle);
            }
            println!("Solved: {}", insights.total_solved());
            for (level, count) in &insights.solved_by_level {
                println!("  {}: {}", level, count);
            }
            if !insights.solved_by_tag.is_empty() {
                println!("Top tags:");
                for (tag, count) in insights.top_tags(top) {
                    println!("  {}: {}", tag, count);
                }
            }
        }
    }
    Ok(())
}

fn print_message(role: Role, content: &MessageContent) {
    let who = match role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    match content {
        MessageContent::Text(text) => println!("{}> {}\n", who, text),
        MessageContent::Pending(_) => println!("{}> ...\n", who),
    }
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Initialize logging to stderr; `json` selects the structured formatter.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("psa_client=info,warn")
    });

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        let format = tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
            .with_writer(std::io::stderr);
        registry.with(format).init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
