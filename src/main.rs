mod app;
mod cli;
mod config;
mod domain;
mod fanout;
mod identity;
mod listing;
#[cfg(test)]
mod main_tests;
mod session;
mod status;
mod store;
mod ui;
mod views;

use std::io::Read;
use std::path::Path;

use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use app::{App, AppError};
use cli::{Commands, NotificationsSubcommands, ProfileSubcommands, ProjectsSubcommands, TasksSubcommands};
use domain::timestamp;
use domain::RecordId;
use listing::ProjectFilter;
use session::Session;
use ui::Palette;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn print_json(value: &impl serde::Serialize) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run() -> Result<(), AppError> {
    use clap::Parser;

    let cli = cli::Cli::parse();
    init_tracing(&cli.log_level);

    if let Some(outcome) = maybe_run_local_command(&cli.command, &cli.data_dir)? {
        print!("{outcome}");
        return Ok(());
    }

    let store_config = config::load(&cli.data_dir, &cli.config_overrides())?;
    let app = App::open(&cli.data_dir, &store_config)?;
    let palette = Palette::auto();

    match cli.command {
        Commands::Projects(args) => run_projects(&app, args.command, &palette),
        Commands::Tasks(args) => run_tasks(&app, args.command, &palette),
        Commands::Notifications(args) => run_notifications(&app, args.command, &palette),
        Commands::Members => {
            let members = app.members();
            let refs: Vec<_> = members.iter().collect();
            print!("{}", ui::render_members(&refs, &palette));
            Ok(())
        }
        Commands::Profile(args) => {
            let view = match args.command {
                ProfileSubcommands::Show => app.profile(),
                ProfileSubcommands::Edit(edit) => app.edit_profile(&views::ProfileEdit {
                    name: edit.name,
                    email: edit.email,
                    phone: edit.phone,
                }),
            };
            print!("{}", ui::render_profile(&view, &palette));
            Ok(())
        }
        Commands::Import(args) => {
            let raw = read_input(&args.file)?;
            let count = app.import(&args.collection, &raw)?;
            println!("imported {count} record(s) into {}", args.collection);
            Ok(())
        }
        // Handled by maybe_run_local_command.
        Commands::Login(_) | Commands::Logout | Commands::Whoami | Commands::Statuses => Ok(()),
    }
}

fn run_projects(app: &App, command: ProjectsSubcommands, palette: &Palette) -> Result<(), AppError> {
    let now = timestamp::now_utc();
    match command {
        ProjectsSubcommands::Ls(args) => {
            let filter = ProjectFilter::new(args.status.as_deref(), args.unassigned);
            let dashboard = app.dashboard(filter, args.list.page, now);
            if args.list.json {
                print_json(&json!({
                    "active_forms": dashboard.active_forms(),
                    "page": dashboard.projects.page(),
                    "pages": dashboard.projects.page_count(),
                    "items": dashboard.projects.visible(),
                }))?;
            } else {
                print!("{}", ui::render_dashboard(&dashboard, palette));
            }
        }
        ProjectsSubcommands::Show(args) => {
            let detail = app.project(RecordId::parse(&args.id));
            if args.json {
                print_json(&json!({
                    "project": detail.project,
                    "assigned_to_email": detail.assignee_email(),
                    "tasks": detail.tasks,
                    "notes": detail.notes,
                }))?;
            } else {
                print!("{}", ui::render_project_detail(&detail, palette));
            }
        }
        ProjectsSubcommands::New(args) => {
            let input = views::ProjectInput {
                name: args.name,
                email: args.email,
                phone: args.phone,
                uniquecode: args.uniquecode,
                budget: args.budget,
                project_type: args.project_type,
                info_from: args.info_from,
            };
            match app.create_project(&input, now) {
                Some(project) => println!(
                    "created project #{}",
                    project.id.map(|id| id.to_string()).unwrap_or_default()
                ),
                None => println!("project not saved"),
            }
        }
        ProjectsSubcommands::Status(args) => {
            let report = app.change_status(RecordId::parse(&args.id), &args.label, now);
            print!("{}", ui::render_fanout(&args.label, &report, palette));
        }
        ProjectsSubcommands::Note(args) => {
            let detail = app.add_project_note(RecordId::parse(&args.id), &args.text, now);
            print!("{}", ui::render_notes(&detail.notes, palette));
        }
        ProjectsSubcommands::Assign(args) => {
            let ids: Vec<RecordId> = args.ids.iter().map(|id| RecordId::parse(id)).collect();
            let (summary, dashboard) = app.assign(&args.user_id, &ids, now);
            print!(
                "{}",
                ui::render_assign_summary(&args.user_id, &summary, palette)
            );
            print!("{}", ui::render_dashboard(&dashboard, palette));
        }
    }
    Ok(())
}

fn run_tasks(app: &App, command: TasksSubcommands, palette: &Palette) -> Result<(), AppError> {
    let now = timestamp::now_utc();
    match command {
        TasksSubcommands::Ls(args) => {
            let list = app.tasks(args.due, args.list.page, now);
            if args.list.json {
                print_json(&json!({
                    "page": list.tasks.page(),
                    "pages": list.tasks.page_count(),
                    "items": list.tasks.visible(),
                }))?;
            } else {
                print!("{}", ui::render_task_list(&list, palette));
            }
        }
        TasksSubcommands::Show(args) => {
            let detail = app.task(RecordId::parse(&args.show.id));
            if args.share {
                println!("{}", detail.share_text());
            } else if args.show.json {
                print_json(&json!({
                    "task": detail.task,
                    "notes": detail.notes,
                }))?;
            } else {
                print!("{}", ui::render_task_detail(&detail, palette));
            }
        }
        TasksSubcommands::New(args) => {
            let due = match args.due.as_deref() {
                Some(raw) => Some(timestamp::parse_date(raw).ok_or_else(|| {
                    AppError::InvalidArgument(format!(
                        "invalid due date '{raw}'; expected YYYY-MM-DD"
                    ))
                })?),
                None => None,
            };
            let input = views::TaskInput {
                project_id: RecordId::parse(&args.project_id),
                name: args.name,
                description: args.description,
                due,
                status: args.status,
                assigned_to: args.assigned_to,
            };
            match app.create_task(&input, now).and_then(|task| task.id) {
                Some(id) => println!("created task {id}"),
                None => println!("task not saved"),
            }
        }
        TasksSubcommands::Note(args) => {
            match app.add_task_note(RecordId::parse(&args.id), &args.text, now) {
                Some(_) => println!("note added"),
                None => println!("note not added"),
            }
        }
    }
    Ok(())
}

fn run_notifications(
    app: &App,
    command: NotificationsSubcommands,
    palette: &Palette,
) -> Result<(), AppError> {
    match command {
        NotificationsSubcommands::Ls(args) => {
            let list = app.notifications(args.due, args.list.page, timestamp::now_utc());
            if args.list.json {
                print_json(&json!({
                    "page": list.notifications.page(),
                    "pages": list.notifications.page_count(),
                    "items": list.notifications.visible(),
                }))?;
            } else {
                print!("{}", ui::render_notification_list(&list, palette));
            }
        }
        NotificationsSubcommands::Count => println!("{}", app.notification_count()),
    }
    Ok(())
}

/// Commands that only touch the session file or static tables.
fn maybe_run_local_command(
    command: &Commands,
    data_dir: &Path,
) -> Result<Option<String>, AppError> {
    match command {
        Commands::Login(args) => {
            let session = Session::signed_in(args.user_id.as_str());
            let Some(user_id) = session.user_id() else {
                return Err(AppError::InvalidArgument(
                    "user id must not be empty".to_string(),
                ));
            };
            session.save(data_dir)?;
            tracing::info!(user = user_id, "signed in");
            Ok(Some(format!("signed in as {user_id}\n")))
        }
        Commands::Logout => {
            Session::clear(data_dir)?;
            Ok(Some("signed out\n".to_string()))
        }
        Commands::Whoami => {
            let session = Session::load(data_dir)?;
            Ok(Some(match session.user_id() {
                Some(user_id) => format!("{user_id}\n"),
                None => "not signed in\n".to_string(),
            }))
        }
        Commands::Statuses => Ok(Some(ui::render_statuses(&Palette::auto()))),
        _ => Ok(None),
    }
}

fn read_input(path: &Path) -> Result<String, AppError> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }
    Ok(std::fs::read_to_string(path)?)
}
