use time::{Duration, OffsetDateTime};

pub const DOES_NOT_RESPOND: &str = "Does not respond";
pub const ACCESSING_FUNDS: &str = "Accessing funds";
pub const SPAM: &str = "Spam";
pub const IS_NOT_INTERESTED: &str = "Is not interested";
pub const WAITING_FUNDS: &str = "Waiting funds";
pub const FINALIZED: &str = "Finalized";

/// Labels offered by the status picker. Any other string is still a legal
/// status; these are suggestions, not a state machine.
pub const CANONICAL_STATUSES: [&str; 6] = [
    DOES_NOT_RESPOND,
    ACCESSING_FUNDS,
    SPAM,
    IS_NOT_INTERESTED,
    WAITING_FUNDS,
    FINALIZED,
];

/// Status written on tasks created by a status change.
pub const NEW_TASK_STATUS: &str = "new";
/// Status given to projects entered through the add-project form.
pub const NEW_PROJECT_STATUS: &str = "Nou";

pub const AUDIT_NOTE_TITLE: &str = "Status change";

/// Placeholder left in task templates; it is not substituted.
pub const LEAD_NAME_PLACEHOLDER: &str = "[Lead's Name]";

pub fn is_canonical(label: &str) -> bool {
    CANONICAL_STATUSES.contains(&label)
}

/// Days until the follow-up task is due. Unmapped labels (and "Finalized")
/// are due immediately.
pub fn offset_days(label: &str) -> i64 {
    match label {
        DOES_NOT_RESPOND => 3,
        ACCESSING_FUNDS => 5,
        SPAM => 2,
        IS_NOT_INTERESTED => 1,
        WAITING_FUNDS => 7,
        _ => 0,
    }
}

/// `None` only when the offset overflows the calendar.
pub fn due_date(label: &str, now: OffsetDateTime) -> Option<OffsetDateTime> {
    now.checked_add(Duration::days(offset_days(label)))
}

pub fn task_description(label: &str) -> String {
    match label {
        DOES_NOT_RESPOND => format!(
            "Call {LEAD_NAME_PLACEHOLDER} again and send a reminder email; no answer so far."
        ),
        ACCESSING_FUNDS => format!(
            "Check in with {LEAD_NAME_PLACEHOLDER} on the funding application and list the documents still missing."
        ),
        SPAM => format!(
            "Confirm the request from {LEAD_NAME_PLACEHOLDER} is not genuine, then archive the lead."
        ),
        IS_NOT_INTERESTED => format!(
            "Send {LEAD_NAME_PLACEHOLDER} a closing message and ask what would change their mind."
        ),
        WAITING_FUNDS => format!(
            "Ask {LEAD_NAME_PLACEHOLDER} whether the funds have been released."
        ),
        FINALIZED => format!("Close the project file for {LEAD_NAME_PLACEHOLDER}."),
        other => format!("Follow up on the new status: {other}."),
    }
}
