use std::fmt::Write as _;
use std::io::{self, IsTerminal};

use time::OffsetDateTime;

use crate::domain::text::normalize_text;
use crate::domain::timestamp::{format_day, format_full, format_short};
use crate::domain::{Identity, Note, Notification, Project, Task, NO_INFORMATION};
use crate::fanout::{FanOutReport, FanOutStep};
use crate::listing::{DueBucket, ProjectFilter};
use crate::status;
use crate::views::{
    AssignSummary, Dashboard, NotificationList, ProfileView, ProjectDetail, TaskDetail, TaskList,
};

const NOT_AVAILABLE: &str = "N/A";

pub fn render_dashboard(dashboard: &Dashboard, palette: &Palette) -> String {
    let mut out = String::new();
    line(&mut out, palette.heading("Welcome to your Dashboard!"));
    line(
        &mut out,
        format!("Active Forms: {}", palette.count(dashboard.active_forms())),
    );
    if let Some(summary) = project_filter_summary(dashboard.projects.filter()) {
        line(&mut out, palette.dim(&format!("filters: {summary}")));
    }
    line(&mut out, palette.heading("Forms"));

    let visible = dashboard.projects.visible();
    if visible.is_empty() {
        line(&mut out, palette.dim("no forms on this page"));
    }
    for project in visible {
        line(&mut out, format_project_row(project, dashboard, palette));
    }
    line(
        &mut out,
        page_bar(
            dashboard.projects.page(),
            dashboard.projects.page_count(),
            palette,
        ),
    );
    out
}

fn format_project_row(project: &Project, dashboard: &Dashboard, palette: &Palette) -> String {
    let id = project
        .id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "?".to_string());
    format!(
        "{} {} {} created {} assigned to: {}",
        palette.id(&format!("#{id}")),
        normalize_text(project.name.as_deref(), NO_INFORMATION),
        palette.status(project.status.as_deref().unwrap_or("")),
        day_or_na(project.created_at),
        dashboard.assignee_email(project)
    )
}

pub fn render_task_list(list: &TaskList, palette: &Palette) -> String {
    let mut out = String::new();
    line(&mut out, palette.heading("Tasks"));
    bucket_line(&mut out, *list.tasks.filter(), palette);
    let visible = list.tasks.visible();
    if visible.is_empty() {
        line(&mut out, palette.dim("no tasks on this page"));
    }
    for task in visible {
        line(&mut out, format_task_row(task, &list.assignee_email(task), palette));
    }
    line(
        &mut out,
        page_bar(list.tasks.page(), list.tasks.page_count(), palette),
    );
    out
}

fn format_task_row(task: &Task, assignee: &str, palette: &Palette) -> String {
    let id = task
        .id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    let mut row = format!(
        "{} {} {} due {}",
        palette.id(&id),
        normalize_text(task.name.as_deref(), NO_INFORMATION),
        palette.status(task.status.as_deref().unwrap_or("")),
        day_or_na(task.due_date)
    );
    if !assignee.is_empty() {
        let _ = write!(row, " assigned to: {assignee}");
    }
    row
}

pub fn render_notification_list(list: &NotificationList, palette: &Palette) -> String {
    let mut out = String::new();
    line(&mut out, palette.heading("Notifications"));
    bucket_line(&mut out, *list.notifications.filter(), palette);
    let visible = list.notifications.visible();
    if visible.is_empty() {
        line(&mut out, palette.dim("no notifications on this page"));
    }
    for notification in visible {
        line(&mut out, format_notification_row(notification, palette));
    }
    line(
        &mut out,
        page_bar(
            list.notifications.page(),
            list.notifications.page_count(),
            palette,
        ),
    );
    out
}

fn format_notification_row(notification: &Notification, palette: &Palette) -> String {
    let project = notification
        .project_id
        .as_ref()
        .map(|id| format!("#{id}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    format!(
        "{} {} {} ends {}\n    {}",
        palette.id(&project),
        palette.status(notification.title.as_deref().unwrap_or("")),
        palette.dim(&format!("created {}", day_or_na(notification.created_at))),
        day_or_na(notification.end_date),
        normalize_text(notification.description.as_deref(), NO_INFORMATION)
    )
}

pub fn render_project_detail(detail: &ProjectDetail, palette: &Palette) -> String {
    let mut out = String::new();
    line(&mut out, palette.heading("Form Details"));
    let project = detail.project.clone().unwrap_or_default();
    let assignee = detail.assignee_email();
    let fields: [(&str, Option<&str>); 9] = [
        ("Name", project.name.as_deref()),
        ("Email", project.email.as_deref()),
        ("Phone", project.phone.as_deref()),
        ("Unique code", project.uniquecode.as_deref()),
        ("Status", project.status.as_deref()),
        ("Budget", project.budget.as_deref()),
        ("Project type", project.project_type.as_deref()),
        ("Info from", project.info_from.as_deref()),
        ("Assigned to", Some(assignee.as_str())),
    ];
    for (label, value) in fields {
        field(&mut out, label, value, palette);
    }
    field(
        &mut out,
        "Created at",
        project.created_at.map(format_full).as_deref(),
        palette,
    );
    field(
        &mut out,
        "End date",
        project.end_date.map(format_full).as_deref(),
        palette,
    );

    line(&mut out, palette.heading("Tasks"));
    if detail.tasks.is_empty() {
        line(&mut out, palette.dim("no tasks"));
    }
    for task in &detail.tasks {
        line(&mut out, format!("  {}", format_task_row(task, "", palette)));
    }

    line(&mut out, palette.heading("Notes"));
    out.push_str(&render_notes(&detail.notes, palette));
    out
}

pub fn render_task_detail(detail: &TaskDetail, palette: &Palette) -> String {
    let mut out = String::new();
    line(&mut out, palette.heading("Task Details"));
    let task = detail.task.clone().unwrap_or_default();
    field(&mut out, "Name", task.name.as_deref(), palette);
    field(&mut out, "Status", task.status.as_deref(), palette);
    field(&mut out, "Description", task.description.as_deref(), palette);
    field(
        &mut out,
        "Created at",
        task.created_at.map(format_full).as_deref(),
        palette,
    );
    field(
        &mut out,
        "Due date",
        task.due_date.map(format_full).as_deref(),
        palette,
    );
    field(&mut out, "Assigned to", Some(detail.assignee().as_str()), palette);
    line(&mut out, palette.heading("Notes"));
    out.push_str(&render_notes(&detail.notes, palette));
    out
}

pub fn render_notes(notes: &[Note], palette: &Palette) -> String {
    if notes.is_empty() {
        return format!("{}\n", palette.dim("No notes available"));
    }
    let mut out = String::new();
    for note in notes {
        let when = note
            .created_at
            .map(format_short)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        line(
            &mut out,
            format!(
                "{}  {}",
                palette.id(note.created_by.as_deref().unwrap_or("")),
                palette.dim(&when)
            ),
        );
        if let Some(title) = note.title.as_deref() {
            line(&mut out, format!("  {}", palette.status(title)));
        }
        line(
            &mut out,
            format!("  {}", note.description.as_deref().unwrap_or("")),
        );
    }
    out
}

pub fn render_profile(view: &ProfileView, palette: &Palette) -> String {
    let mut out = String::new();
    line(&mut out, palette.heading("Profile"));
    if let Some(error) = view.error.as_deref() {
        line(&mut out, palette.error(error));
        return out;
    }
    let Some(identity) = view.identity.as_ref() else {
        line(&mut out, palette.dim("no profile data for this user"));
        return out;
    };
    field(&mut out, "User", view.user_id.as_deref(), palette);
    field(&mut out, "Name", identity.name.as_deref(), palette);
    field(&mut out, "Email", identity.email.as_deref(), palette);
    field(&mut out, "Phone", identity.phone.as_deref(), palette);
    field(&mut out, "Role", identity.role.as_deref(), palette);
    out
}

pub fn render_fanout(label: &str, report: &FanOutReport, palette: &Palette) -> String {
    let mut out = String::new();
    let mut heading = format!("status change to {}", palette.status(label));
    if !status::is_canonical(label) {
        heading.push_str(&palette.dim(" (custom label, due now)"));
    }
    line(&mut out, heading);
    for (step, err) in report.outcomes() {
        match err {
            None => line(&mut out, format!("  {} {}", palette.ok("ok"), step.as_str())),
            Some(err) => line(
                &mut out,
                format!("  {} {}: {err}", palette.error("failed"), step.as_str()),
            ),
        }
    }
    let failures = report.failures();
    if failures > 0 {
        line(
            &mut out,
            palette.error(&format!(
                "{failures} of {} steps failed",
                FanOutStep::ORDER.len()
            )),
        );
    }
    out
}

pub fn render_assign_summary(user_id: &str, summary: &AssignSummary, palette: &Palette) -> String {
    let mut out = String::new();
    line(
        &mut out,
        format!(
            "assigned {} project(s) to {}",
            palette.count(summary.assigned.len()),
            palette.id(user_id)
        ),
    );
    for (project_id, err) in &summary.failed {
        line(
            &mut out,
            format!("  {} #{project_id}: {err}", palette.error("failed")),
        );
    }
    out
}

pub fn render_members(members: &[&Identity], palette: &Palette) -> String {
    let mut out = String::new();
    line(&mut out, palette.heading("Members"));
    if members.is_empty() {
        line(&mut out, palette.dim("no members"));
    }
    for member in members {
        line(
            &mut out,
            format!(
                "{} {} {}",
                palette.id(member.user_id.as_deref().unwrap_or("")),
                normalize_text(member.name.as_deref(), NOT_AVAILABLE),
                member.email.as_deref().unwrap_or("")
            ),
        );
    }
    out
}

pub fn render_statuses(palette: &Palette) -> String {
    let mut out = String::new();
    for label in status::CANONICAL_STATUSES {
        line(
            &mut out,
            format!(
                "{} {}",
                palette.status(label),
                palette.dim(&format!("+{}d", status::offset_days(label)))
            ),
        );
    }
    out
}

/// Numbered page buttons with the current page bracketed.
pub fn page_bar(current: usize, count: usize, palette: &Palette) -> String {
    if count == 0 {
        return palette.dim("page 0 of 0");
    }
    let buttons: Vec<String> = (1..=count)
        .map(|page| {
            if page == current {
                palette.heading(&format!("[{page}]"))
            } else {
                page.to_string()
            }
        })
        .collect();
    format!("pages: {}", buttons.join(" "))
}

fn project_filter_summary(filter: &ProjectFilter) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(status) = filter.status.as_deref() {
        parts.push(format!("status={status}"));
    }
    if filter.unassigned {
        parts.push("unassigned=true".to_string());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn bucket_line(out: &mut String, bucket: DueBucket, palette: &Palette) {
    if bucket != DueBucket::All {
        line(out, palette.dim(&format!("filter: {bucket}")));
    }
}

fn field(out: &mut String, label: &str, value: Option<&str>, palette: &Palette) {
    line(
        out,
        format!(
            "{} {}",
            palette.label(&format!("{label}:")),
            normalize_text(value, NO_INFORMATION)
        ),
    );
}

fn day_or_na(value: Option<OffsetDateTime>) -> String {
    value
        .map(format_day)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn line(out: &mut String, text: String) {
    out.push_str(&text);
    out.push('\n');
}

pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    fn label(&self, text: &str) -> String {
        self.paint("1", text)
    }

    fn count(&self, value: usize) -> String {
        self.paint("1;97", &value.to_string())
    }

    fn ok(&self, text: &str) -> String {
        self.paint("32", text)
    }

    fn error(&self, text: &str) -> String {
        self.paint("1;31", text)
    }

    fn status(&self, label: &str) -> String {
        if label.trim().is_empty() {
            return self.dim(&format!("[{NOT_AVAILABLE}]"));
        }
        self.paint(status_color_code(label), &format!("[{label}]"))
    }
}

fn status_color_code(label: &str) -> &'static str {
    match label.trim() {
        status::ACCESSING_FUNDS | status::WAITING_FUNDS => "33",
        status::FINALIZED => "32",
        status::SPAM | status::IS_NOT_INTERESTED => "31",
        status::DOES_NOT_RESPOND => "35",
        status::NEW_PROJECT_STATUS | status::NEW_TASK_STATUS => "34",
        _ => "37",
    }
}

#[cfg(test)]
#[path = "ui_tests_ext.rs"]
mod tests_ext;
