//! Command-line front end. Builds the clients and services once and routes
//! each subcommand to them.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::api::{ApiClient, ChatClient, TaskClient};
use crate::config::{parse_api_url, Config};
use crate::models::timestamp::parse_due_date;
use crate::models::{NewTask, Task, TaskCategory, TaskPriority, TaskUpdate};
use crate::services::export::export_to_markdown;
use crate::services::keep_alive::{PingStatus, Pinger};
use crate::services::tasks::sort_tasks;
use crate::services::{
    ChatSession, Database, HttpPinger, KeepAliveService, KeyValueStore, SendOutcome,
    SessionService, SettingsService, TaskBoard, TaskOrder, Theme,
};

#[derive(Debug, Parser)]
#[command(name = "neon-todo", version, about = "Tasks and AI chat from the terminal")]
pub struct Cli {
    /// Backend base URL (overrides NEON_TODO_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        /// Repeat the password to guard against typos
        #[arg(long)]
        confirm: Option<String>,
    },
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Signout,
    /// Show the signed-in user
    Whoami,
    Tasks {
        #[command(subcommand)]
        command: TaskCommand,
    },
    Chat {
        #[command(subcommand)]
        command: ChatCommand,
    },
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
    /// Ping the backend health endpoint once
    Ping,
    /// Keep the backend awake until interrupted
    KeepAlive,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    List {
        /// created, priority or due
        #[arg(long, default_value = "created")]
        order: TaskOrder,
    },
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        category: Option<TaskCategory>,
        #[arg(long, value_parser = parse_due_arg)]
        due: Option<NaiveDate>,
    },
    Done {
        id: i64,
    },
    Undo {
        id: i64,
    },
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        category: Option<TaskCategory>,
        #[arg(long, value_parser = parse_due_arg, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        #[arg(long)]
        clear_due: bool,
    },
    Rm {
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum ChatCommand {
    Send {
        /// Continue an existing conversation
        #[arg(long)]
        conversation: Option<i64>,
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    List,
    Show {
        id: i64,
    },
    Rm {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Print a conversation as Markdown
    Export {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    Show,
    /// Set the theme, or advance to the next one when omitted
    Theme { name: Option<Theme> },
    Sound { state: Switch },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

fn parse_due_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_due_date(raw).ok_or_else(|| format!("not a date: {raw} (use YYYY-MM-DD)"))
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(raw) = &cli.api_url {
        config.api_url = parse_api_url(raw)?;
    }

    let api = ApiClient::with_timeout(config.api_url.clone(), config.request_timeout);
    let store: Arc<dyn KeyValueStore> = Arc::new(Database::open(&config.db_path())?);
    let session = SessionService::new(api.clone(), store.clone());
    session.restore().await;

    let result = dispatch(cli.command, &config, &api, &session, store.as_ref()).await;

    // Persist whatever the run left behind, including a session the backend rejected.
    session.save().await;
    result
}

async fn dispatch(
    command: Command,
    config: &Config,
    api: &ApiClient,
    session: &SessionService,
    store: &dyn KeyValueStore,
) -> Result<()> {
    match command {
        Command::Signup {
            email,
            name,
            password,
            confirm,
        } => {
            if let Some(confirm) = &confirm {
                crate::api::validate::registration(&email, &password, Some(confirm.as_str()), &name)?;
            }
            let s = session.sign_up(&email, &password, &name).await?;
            println!("Welcome, {}. Signed in as {}.", s.user.name, s.user.email);
        }
        Command::Signin { email, password } => {
            let s = session.sign_in(&email, &password).await?;
            println!("Signed in as {} <{}>.", s.user.name, s.user.email);
        }
        Command::Signout => {
            session.sign_out().await?;
            println!("Signed out.");
        }
        Command::Whoami => match session.refresh().await? {
            Some(s) => println!("{} <{}> (id {})", s.user.name, s.user.email, s.user.id),
            None => println!("Not signed in."),
        },
        Command::Tasks { command } => {
            let user = signed_in(session)?.user;
            let mut board = TaskBoard::new(TaskClient::new(api.clone()), user.id);
            run_tasks(command, &mut board).await?;
        }
        Command::Chat { command } => {
            signed_in(session)?;
            run_chat(command, api).await?;
        }
        Command::Prefs { command } => run_prefs(command, store).await?,
        Command::Ping => match HttpPinger::new(api.clone()).ping().await? {
            PingStatus::Ok => println!("Backend at {} is up.", api.base_url()),
            PingStatus::Failed(status) => bail!("Backend answered HTTP {status}"),
        },
        Command::KeepAlive => {
            let keep_alive = KeepAliveService::new(
                Arc::new(HttpPinger::new(api.clone())),
                config.keep_alive_interval,
            );
            keep_alive.start();
            println!("Keeping {} awake. Press Ctrl-C to stop.", api.base_url());
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            keep_alive.stop();
        }
    }
    Ok(())
}

fn signed_in(session: &SessionService) -> Result<crate::models::Session> {
    session
        .require_session()
        .context("Run `neon-todo signin` first")
}

async fn run_tasks(command: TaskCommand, board: &mut TaskBoard) -> Result<()> {
    match command {
        TaskCommand::List { order } => {
            board.refresh().await?;
            let mut active: Vec<Task> = board.active().cloned().collect();
            let mut done: Vec<Task> = board.completed().cloned().collect();
            sort_tasks(&mut active, order);
            sort_tasks(&mut done, order);

            if active.is_empty() && done.is_empty() {
                println!("No tasks yet. Add one with `neon-todo tasks add <title>`.");
                return Ok(());
            }
            if !active.is_empty() {
                println!("Active ({})", active.len());
                active.iter().for_each(|t| println!("  {}", format_task(t)));
            }
            if !done.is_empty() {
                println!("Completed ({})", done.len());
                done.iter().for_each(|t| println!("  {}", format_task(t)));
            }
        }
        TaskCommand::Add {
            title,
            description,
            priority,
            category,
            due,
        } => {
            let task = board
                .create(&NewTask {
                    title,
                    description,
                    priority,
                    category,
                    due_date: due,
                })
                .await?;
            println!("Created {}", format_task(&task));
        }
        TaskCommand::Done { id } => {
            let task = board.update(id, &TaskUpdate::completed(true)).await?;
            println!("Completed {}", format_task(&task));
        }
        TaskCommand::Undo { id } => {
            let task = board.update(id, &TaskUpdate::completed(false)).await?;
            println!("Reopened {}", format_task(&task));
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            clear_description,
            priority,
            category,
            due,
            clear_due,
        } => {
            let update = TaskUpdate {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                completed: None,
                priority,
                category,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
            };
            if update.is_empty() {
                bail!("Nothing to change");
            }
            let task = board.update(id, &update).await?;
            println!("Updated {}", format_task(&task));
        }
        TaskCommand::Rm { id, yes } => {
            if !yes {
                bail!("Deleting task {id} cannot be undone; pass --yes to confirm");
            }
            board.delete(id).await?;
            println!("Deleted task {id}.");
        }
        TaskCommand::Stats => {
            board.refresh().await?;
            let stats = board.stats();
            println!(
                "Total {} | Completed {} | Pending {} | Progress {:.0}%",
                stats.total, stats.completed, stats.pending, stats.progress
            );
        }
    }
    Ok(())
}

fn format_task(task: &Task) -> String {
    let mut line = format!(
        "[{}] #{} {} ({}/{})",
        if task.completed { "x" } else { " " },
        task.id,
        task.title,
        task.priority,
        task.category
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {}", due.format("%Y-%m-%d")));
    }
    line
}

async fn run_chat(command: ChatCommand, api: &ApiClient) -> Result<()> {
    let client = ChatClient::new(api.clone());
    let chat = ChatSession::new(client.clone());

    match command {
        ChatCommand::Send { conversation, text } => {
            if let Some(id) = conversation {
                chat.open(id).await?;
            }
            match chat.send(&text.join(" ")).await {
                SendOutcome::Replied(reply) => {
                    println!("{}", reply.message);
                    println!("\n(conversation {})", reply.conversation_id);
                }
                SendOutcome::Failed(e) => {
                    println!("{}", crate::services::chat::SEND_FAILURE_NOTICE);
                    return Err(e.into());
                }
                SendOutcome::Skipped => bail!("Nothing to send"),
            }
        }
        ChatCommand::List => {
            let conversations = chat.refresh_conversations().await?;
            if conversations.is_empty() {
                println!("No conversations yet.");
            }
            for c in conversations {
                println!(
                    "#{}  {} messages  updated {}",
                    c.id,
                    c.message_count,
                    c.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ChatCommand::Show { id } => {
            chat.open(id).await?;
            for msg in chat.messages() {
                println!("{}> {}\n", msg.role.as_str(), msg.content);
            }
        }
        ChatCommand::Rm { id, yes } => {
            if !yes {
                bail!("Deleting conversation {id} cannot be undone; pass --yes to confirm");
            }
            chat.delete(id).await?;
            println!("Deleted conversation {id}.");
        }
        ChatCommand::Export { id } => {
            let conversation = client.get_conversation(id).await?;
            print!("{}", export_to_markdown(&conversation));
        }
    }
    Ok(())
}

async fn run_prefs(command: PrefsCommand, store: &dyn KeyValueStore) -> Result<()> {
    let prefs = match command {
        PrefsCommand::Show => SettingsService::load(store).await,
        PrefsCommand::Theme { name: Some(theme) } => SettingsService::set_theme(store, theme).await?,
        PrefsCommand::Theme { name: None } => SettingsService::cycle_theme(store).await?,
        PrefsCommand::Sound { state } => {
            SettingsService::set_sound_enabled(store, matches!(state, Switch::On)).await?
        }
    };
    println!(
        "theme: {}\nsound: {}",
        prefs.theme,
        if prefs.sound_enabled { "on" } else { "off" }
    );
    Ok(())
}
