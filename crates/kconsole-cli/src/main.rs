mod draft;
mod notify;
mod remote;
mod settings;
mod task;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use kconsole_client::ConsoleApi;
use kconsole_form::Notifier;

use crate::draft::Draft;
use crate::notify::ConsoleNotifier;
use crate::task::ScheduleArgs;

#[derive(Parser)]
#[command(name = "kconsole", about = "KouriChat configuration console")]
struct Cli {
    /// Draft file (overrides config)
    #[arg(long, global = true)]
    draft: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with the current settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Load the server configuration into the draft
    Pull,
    /// Submit the draft to the server
    Push,
    /// Show the configured background image
    Background,
    /// Scheduled tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Listen list
    #[command(subcommand)]
    User(UserCommand),
    /// Group chat trigger configuration
    #[command(subcommand)]
    Group(GroupCommand),
    /// Model pickers
    #[command(subcommand)]
    Model(ModelCommand),
    /// Set a configuration field in the draft
    Set { key: String, value: String },
    /// Write the draft to an export file
    Export {
        /// Target directory (overrides config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Load an export file into the draft
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum TaskCommand {
    /// List tasks
    List,
    /// Add a task
    Add {
        #[arg(long)]
        id: String,
        /// Recipient, one of the listen list users
        #[arg(long)]
        chat: String,
        #[arg(long)]
        content: String,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Edit a task; unset options keep their value
    Edit {
        id: String,
        #[arg(long)]
        chat: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Pause or resume a task
    Toggle { id: String },
    /// Delete a task
    Remove {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show how a schedule would be stored, without saving
    Preview {
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
}

impl TaskCommand {
    /// Whether the command changes the draft.
    fn mutates(&self) -> bool {
        !matches!(self, TaskCommand::List | TaskCommand::Preview { .. })
    }
}

#[derive(Subcommand)]
enum UserCommand {
    List,
    Add { user: String },
    Remove { user: String },
}

impl UserCommand {
    fn mutates(&self) -> bool {
        !matches!(self, UserCommand::List)
    }
}

#[derive(Subcommand)]
enum GroupCommand {
    /// Show group configs and persona choices
    Show,
    /// Add a group config
    Add,
    /// Change group fields
    Set {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        /// Reply when @-mentioned
        #[arg(long)]
        at_trigger: Option<bool>,
    },
    /// Add a trigger word
    TriggerAdd { id: String, word: String },
    /// Remove a trigger word by position
    TriggerRemove { id: String, index: usize },
    /// Remove a group config
    Remove { id: String },
}

impl GroupCommand {
    fn mutates(&self) -> bool {
        !matches!(self, GroupCommand::Show)
    }
}

#[derive(Subcommand)]
enum ModelCommand {
    /// List models offered for a provider
    Options {
        #[arg(long)]
        provider: String,
        /// Image-recognition models instead of chat models
        #[arg(long)]
        vision: bool,
        /// Model to resolve (defaults to the draft's value)
        #[arg(long)]
        current: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = kconsole_config::load_config().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {e}");
        Default::default()
    });
    if let Commands::Init { force } = cli.command {
        let path = kconsole_config::ensure_config_dir()?.join("config.json5");
        if settings::init_config(&config, &path, force)? {
            println!("{}", path.display());
        } else {
            eprintln!("配置文件已存在: {}", path.display());
        }
        return Ok(());
    }
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let mut draft = match cli.draft {
        Some(path) => Draft::open_at(path, notifier.clone()),
        None => Draft::open(&config, notifier.clone())?,
    };
    let session = &mut draft.session;

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Pull => {
            let api = ConsoleApi::new(&config.server)?;
            let rt = tokio::runtime::Runtime::new()?;
            if rt.block_on(remote::pull(&api, session, notifier.as_ref())) {
                draft.save()?;
            }
        }
        Commands::Push => {
            let api = ConsoleApi::new(&config.server)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(remote::push(&api, session, notifier.as_ref()))?;
        }
        Commands::Background => {
            let api = ConsoleApi::new(&config.server)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(remote::background(&api))?;
        }
        Commands::Task(cmd) => {
            let mutates = cmd.mutates();
            match cmd {
                TaskCommand::List => task::list(session),
                TaskCommand::Add {
                    id,
                    chat,
                    content,
                    schedule,
                } => task::add(session, id, chat, content, &schedule)?,
                TaskCommand::Edit {
                    id,
                    chat,
                    content,
                    schedule,
                } => task::edit(session, &id, chat, content, &schedule)?,
                TaskCommand::Toggle { id } => task::toggle(session, &id)?,
                TaskCommand::Remove { id, yes } => {
                    task::remove(session, &id, yes)?;
                }
                TaskCommand::Preview { schedule } => task::preview(&schedule)?,
            }
            if mutates {
                draft.save()?;
            }
        }
        Commands::User(cmd) => {
            let mutates = cmd.mutates();
            match cmd {
                UserCommand::List => settings::list_users(session),
                UserCommand::Add { user } => {
                    if !session.add_user(&user) {
                        eprintln!("用户已存在或为空: {user}");
                    }
                }
                UserCommand::Remove { user } => {
                    if !session.remove_user(&user) {
                        eprintln!("未找到用户: {user}");
                    }
                }
            }
            if mutates {
                draft.save()?;
            }
        }
        Commands::Group(cmd) => {
            let mutates = cmd.mutates();
            match cmd {
                GroupCommand::Show => settings::show_groups(session, &config.avatar_dirs),
                GroupCommand::Add => println!("{}", session.add_group()?),
                GroupCommand::Set {
                    id,
                    name,
                    avatar,
                    at_trigger,
                } => settings::set_group(session, &id, name, avatar, at_trigger)?,
                GroupCommand::TriggerAdd { id, word } => session.add_trigger(&id, &word)?,
                GroupCommand::TriggerRemove { id, index } => {
                    session.remove_trigger_at(&id, index)?;
                }
                GroupCommand::Remove { id } => session.remove_group(&id)?,
            }
            if mutates {
                draft.save()?;
            }
        }
        Commands::Model(ModelCommand::Options {
            provider,
            vision,
            current,
        }) => {
            let api = ConsoleApi::new(&config.server)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(remote::model_options(&api, session, &provider, vision, current))?;
        }
        Commands::Set { key, value } => {
            session.set_field(&key, &value);
            draft.save()?;
        }
        Commands::Export { dir } => {
            let dir = match dir.or_else(|| config.export_dir.clone()) {
                Some(dir) => dir,
                None => std::env::current_dir().context("Failed to resolve working directory")?,
            };
            let path = settings::export(session, &dir)?;
            println!("{}", path.display());
        }
        Commands::Import { file } => {
            settings::import(session, &file)?;
            draft.save()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> Commands {
        let mut argv = vec!["kconsole"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_read_only_commands_leave_draft_alone() {
        let Commands::Task(list) = command(&["task", "list"]) else {
            panic!("expected task command");
        };
        assert!(!list.mutates());
        let Commands::Task(preview) = command(&["task", "preview", "--every", "5"]) else {
            panic!("expected task command");
        };
        assert!(!preview.mutates());
        let Commands::User(users) = command(&["user", "list"]) else {
            panic!("expected user command");
        };
        assert!(!users.mutates());
        let Commands::Group(show) = command(&["group", "show"]) else {
            panic!("expected group command");
        };
        assert!(!show.mutates());
    }

    #[test]
    fn test_edits_save_draft() {
        let Commands::Task(toggle) = command(&["task", "toggle", "t1"]) else {
            panic!("expected task command");
        };
        assert!(toggle.mutates());
        let Commands::Task(remove) = command(&["task", "remove", "t1", "--yes"]) else {
            panic!("expected task command");
        };
        assert!(remove.mutates());
        let Commands::User(add) = command(&["user", "add", "alice"]) else {
            panic!("expected user command");
        };
        assert!(add.mutates());
        let Commands::Group(add) = command(&["group", "add"]) else {
            panic!("expected group command");
        };
        assert!(add.mutates());
    }
}
