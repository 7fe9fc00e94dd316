use super::{
    page_count, page_slice, DueBucket, ListFilter, ListView, PageReset, ProjectFilter,
    DASHBOARD_PAGE_SIZE, TASKS_PAGE_SIZE,
};
use crate::domain::{Project, RecordId, Task};
use time::macros::datetime;
use time::OffsetDateTime;

const NOW: OffsetDateTime = datetime!(2026-04-10 12:00:00 UTC);

fn project(id: i64, status: &str, assigned_to: Option<&str>) -> Project {
    Project {
        id: Some(RecordId::from(id)),
        status: Some(status.to_string()),
        assigned_to: assigned_to.map(str::to_string),
        ..Project::default()
    }
}

fn task(id: &str, due: Option<OffsetDateTime>) -> Task {
    Task {
        id: Some(RecordId::from(id)),
        due_date: due,
        ..Task::default()
    }
}

#[test]
fn page_count_rounds_up() {
    assert_eq!(page_count(23, 10), 3);
    assert_eq!(page_count(20, 10), 2);
    assert_eq!(page_count(0, 5), 0);
    assert_eq!(page_count(4, 0), 0);
}

#[test]
fn third_page_of_twenty_three_has_three_items() {
    let items: Vec<usize> = (0..23).collect();
    assert_eq!(page_slice(&items, 3, 10), &[20, 21, 22]);
    assert_eq!(page_slice(&items, 1, 10).len(), 10);
    assert!(page_slice(&items, 4, 10).is_empty());
    assert!(page_slice(&items, 0, 10).is_empty());
}

#[test]
fn today_and_overdue_buckets() {
    let earlier_today = datetime!(2026-04-10 08:00:00 UTC);
    let later_today = datetime!(2026-04-10 23:00:00 UTC);
    let yesterday = datetime!(2026-04-09 12:00:00 UTC);
    let tomorrow = datetime!(2026-04-11 00:00:00 UTC);

    assert!(DueBucket::Today.contains(Some(earlier_today), NOW));
    assert!(DueBucket::Today.contains(Some(later_today), NOW));
    assert!(!DueBucket::Today.contains(Some(yesterday), NOW));
    assert!(!DueBucket::Today.contains(Some(tomorrow), NOW));

    assert!(DueBucket::Overdue.contains(Some(yesterday), NOW));
    assert!(DueBucket::Overdue.contains(Some(earlier_today), NOW));
    assert!(!DueBucket::Overdue.contains(Some(later_today), NOW));
    assert!(!DueBucket::Overdue.contains(Some(NOW), NOW));

    assert!(!DueBucket::Today.contains(None, NOW));
    assert!(!DueBucket::Overdue.contains(None, NOW));
    assert!(DueBucket::All.contains(None, NOW));
}

#[test]
fn due_bucket_parses_aliases() {
    assert_eq!("Today".parse::<DueBucket>(), Ok(DueBucket::Today));
    assert_eq!("due".parse::<DueBucket>(), Ok(DueBucket::Overdue));
    assert_eq!("".parse::<DueBucket>(), Ok(DueBucket::All));
    assert!("later".parse::<DueBucket>().is_err());
}

#[test]
fn project_filter_combines_status_and_unassigned() {
    let filter = ProjectFilter::new(Some(" Spam "), true);
    assert!(filter.matches(&project(1, "Spam", None), NOW));
    assert!(!filter.matches(&project(2, "Spam", Some("U1")), NOW));
    assert!(!filter.matches(&project(3, "Nou", None), NOW));
    assert!(filter.matches(&project(4, "Spam", Some("  ")), NOW));

    let open = ProjectFilter::new(Some(""), false);
    assert_eq!(open, ProjectFilter::default());
    assert!(open.matches(&project(5, "anything", Some("U2")), NOW));
}

#[test]
fn dashboard_resets_to_first_page_when_filter_changes() {
    let mut view: ListView<Project, ProjectFilter> =
        ListView::new(DASHBOARD_PAGE_SIZE, PageReset::OnFilterChange, NOW);
    view.load(
        (0..25)
            .map(|id| project(id, if id % 2 == 0 { "Spam" } else { "Nou" }, None))
            .collect(),
    );
    view.goto_page(3);
    assert_eq!(view.visible().len(), 5);

    view.set_filter(ProjectFilter::default());
    assert_eq!(view.page(), 3, "same filter keeps the page");

    view.set_filter(ProjectFilter::new(Some("Spam"), false));
    assert_eq!(view.page(), 1);
    assert_eq!(view.filtered().len(), 13);
    assert_eq!(view.page_count(), 2);
    assert_eq!(view.total(), 25);
}

#[test]
fn task_list_keeps_its_page_when_filter_changes() {
    let mut view: ListView<Task, DueBucket> =
        ListView::new(TASKS_PAGE_SIZE, PageReset::Never, NOW);
    let mut tasks: Vec<Task> = (0..11)
        .map(|n| task(&format!("t{n}"), Some(datetime!(2026-05-01 00:00:00 UTC))))
        .collect();
    tasks.push(task("due-today", Some(datetime!(2026-04-10 18:00:00 UTC))));
    view.load(tasks);

    view.goto_page(3);
    assert_eq!(view.visible().len(), 2);

    view.set_filter(DueBucket::Today);
    assert_eq!(view.page(), 3);
    assert!(view.visible().is_empty(), "stale page renders empty");
    assert_eq!(view.page_count(), 1);

    view.goto_page(1);
    assert_eq!(
        view.visible()[0].id,
        Some(RecordId::from("due-today"))
    );
}
