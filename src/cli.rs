use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};

use crate::config::{Backend, ConfigOverrides};
use crate::listing::DueBucket;

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

#[derive(Debug, Parser)]
#[command(name = "ldb")]
#[command(bin_name = "ldb")]
#[command(version)]
#[command(about = "Lead dashboard: projects, follow-up tasks and notifications")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'D',
        long,
        env = "LEADBOARD_DIR",
        default_value = ".leadboard",
        global = true,
        help = "Directory holding config.toml, the session and the local store."
    )]
    pub data_dir: PathBuf,

    #[arg(long, value_enum, global = true, help = "Record store backend.")]
    pub backend: Option<Backend>,

    #[arg(
        long,
        env = "LEADBOARD_REST_URL",
        global = true,
        help = "Base URL of the hosted record store."
    )]
    pub rest_url: Option<String>,

    #[arg(
        long,
        env = "LEADBOARD_REST_KEY",
        global = true,
        hide_env_values = true,
        help = "API key for the hosted record store."
    )]
    pub rest_key: Option<String>,

    #[arg(
        long,
        env = "LEADBOARD_LOG",
        default_value = "warn",
        global = true,
        help = "Log filter (error, warn, info, debug or a tracing directive)."
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend: self.backend,
            rest_url: self.rest_url.clone(),
            rest_key: self.rest_key.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Remember a user id as the signed-in identity.")]
    Login(LoginArgs),
    #[command(about = "Forget the signed-in identity.")]
    Logout,
    #[command(about = "Print the signed-in identity.")]
    Whoami,
    #[command(about = "Browse and edit projects (leads).")]
    Projects(ProjectsArgs),
    #[command(about = "Browse and edit follow-up tasks.")]
    Tasks(TasksArgs),
    #[command(about = "Browse notifications.")]
    Notifications(NotificationsArgs),
    #[command(about = "List identities that can be assigned projects.")]
    Members,
    #[command(about = "Show or edit the signed-in user's profile.")]
    Profile(ProfileArgs),
    #[command(about = "List the suggested status labels and their deadlines.")]
    Statuses,
    #[command(about = "Load JSON records into a collection.")]
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(help = "User id stored on assignments and notes.")]
    pub user_id: String,
}

#[derive(Debug, Args)]
pub struct ListPageArgs {
    #[arg(long, default_value_t = 1, help = "1-based page number.")]
    pub page: usize,

    #[arg(long, help = "Print the page as JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum ProjectsSubcommands {
    #[command(about = "Dashboard: projects, newest first.")]
    Ls(ProjectListArgs),
    #[command(about = "Show one project with its tasks and notes.")]
    Show(ShowArgs),
    #[command(about = "Add a project with status \"Nou\".")]
    New(NewProjectArgs),
    #[command(about = "Change status and create the follow-up task, notification and note.")]
    Status(StatusArgs),
    #[command(about = "Append a note to a project.")]
    Note(NoteArgs),
    #[command(about = "Assign one user to several projects.")]
    Assign(AssignArgs),
}

#[derive(Debug, Args)]
pub struct ProjectListArgs {
    #[command(flatten)]
    pub list: ListPageArgs,

    #[arg(long, help = "Only projects with exactly this status.")]
    pub status: Option<String>,

    #[arg(long, help = "Only projects nobody is assigned to.")]
    pub unassigned: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(help = "Record id.")]
    pub id: String,

    #[arg(long, help = "Print as JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct NewProjectArgs {
    #[arg(long, help = "Lead name.")]
    pub name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long = "code", help = "Unique code.")]
    pub uniquecode: Option<String>,
    #[arg(long)]
    pub budget: Option<String>,
    #[arg(long = "type", help = "Project type.")]
    pub project_type: Option<String>,
    #[arg(long, help = "Where the lead heard about us.")]
    pub info_from: Option<String>,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[arg(help = "Project id.")]
    pub id: String,

    #[arg(help = "New status label; any text is accepted.")]
    pub label: String,
}

#[derive(Debug, Args)]
pub struct NoteArgs {
    #[arg(help = "Parent record id.")]
    pub id: String,

    #[arg(help = "Note text.")]
    pub text: String,
}

#[derive(Debug, Args)]
pub struct AssignArgs {
    #[arg(help = "User id to assign.")]
    pub user_id: String,

    #[arg(required = true, num_args = 1.., help = "Project ids.")]
    pub ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum TasksSubcommands {
    #[command(about = "List tasks, five per page.")]
    Ls(DueListArgs),
    #[command(about = "Show one task with its notes.")]
    Show(TaskShowArgs),
    #[command(about = "Add a task to a project.")]
    New(NewTaskArgs),
    #[command(about = "Append a note to a task.")]
    Note(NoteArgs),
}

#[derive(Debug, Args)]
pub struct DueListArgs {
    #[command(flatten)]
    pub list: ListPageArgs,

    #[arg(
        long,
        default_value = "all",
        help = "Deadline filter: all, today or overdue."
    )]
    pub due: DueBucket,
}

#[derive(Debug, Args)]
pub struct TaskShowArgs {
    #[command(flatten)]
    pub show: ShowArgs,

    #[arg(long, help = "Print the shareable plain-text summary.")]
    pub share: bool,
}

#[derive(Debug, Args)]
pub struct NewTaskArgs {
    #[arg(help = "Project id.")]
    pub project_id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, help = "Due date as YYYY-MM-DD.")]
    pub due: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsSubcommands {
    #[command(about = "List notifications, ten per page.")]
    Ls(DueListArgs),
    #[command(about = "Print the number of notifications.")]
    Count,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum ProfileSubcommands {
    #[command(about = "Show the signed-in user's profile.")]
    Show,
    #[command(about = "Update name, email or phone.")]
    Edit(ProfileEditArgs),
}

#[derive(Debug, Args)]
pub struct ProfileEditArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(help = "Target collection, e.g. projects or users_ext.")]
    pub collection: String,

    #[arg(help = "JSON file with one object or an array of objects; '-' reads stdin.")]
    pub file: PathBuf,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
