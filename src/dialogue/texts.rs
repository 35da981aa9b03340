//! User-facing message texts.

use crate::dialogue::command::MenuCommand;

/// The command that (re)starts the dialogue from any stage.
pub const START_COMMAND: &str = "/start";

pub const WELCOME_NEW: &str = "Hi! I'm the shelter assistant bot. I can tell you about the \
shelter, explain how to adopt an animal, take your daily pet report, or call a volunteer.\n\
Please send your phone number in the format: +7-9XX-XXX-XXXX";

pub const WELCOME_BACK: &str = "Welcome back! Pick a section from the menu.";

pub const PHONE_ACCEPTED: &str = "Your phone number has been saved.";

pub const PHONE_INVALID: &str =
    "That doesn't look like a valid phone number. Try again using the format: +7-9XX-XXX-XXXX";

pub const MENU_FALLBACK: &str = "Please pick an option from the menu.";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Pick an option from the menu.";

pub const UNKNOWN_USER: &str = "I don't know you yet. Start with /start.";

pub const RESERVED_COMMAND: &str = "This command is reserved for shelter volunteers.";

pub const REPORT_PHOTO_PROMPT: &str = "Please send a photo of your pet.";

pub const REPORT_TEXT_PROMPT: &str = "Photo received. Now send the text part of the report.";

pub const REPORT_THANKS: &str = "Report received. Thank you!";

pub const REPORT_MISSING: &str =
    "Error: no report in progress was found. Select \"Send a pet report\" from the menu first.";

pub const USER_MISSING: &str = "Error: user not found. Start with /start.";

pub const PHOTO_UNREADABLE: &str = "Could not read that photo. Please send it again.";

pub const SHELTER_INFO_MISSING: &str =
    "Shelter information is not available yet. Please call a volunteer.";

pub const MAP_CAPTION: &str = "Directions to the shelter";

pub const CONTACT_FOLLOWUP: &str =
    "If you have any questions, you can leave a contact number for us to reach you.";

pub const MENU_HEADER: &str = "Choose an option from the menu:";

/// Prefix prepended to every invalid-report notification.
pub const INVALID_REPORT_PREFIX: &str = "Dear adopter, ";

pub const REMINDER_STALE: &str = "You have not sent a report for more than 2 days. \
Please fill in the daily report about your pet.";

pub const REMINDER_NEVER: &str = "You have not sent a single report yet. \
Please fill in the daily report about your pet.";

pub const REVIEW_HINT: &str =
    "Pending reports are reviewed through the reports API (GET /api/reports/pending).";

/// The main menu, rendered as a plain text listing of selectable commands.
pub fn main_menu_text() -> String {
    let mut lines = vec![MENU_HEADER.to_string()];
    for command in MenuCommand::ALL {
        if !command.requires_reviewer() {
            lines.push(format!("{} — {}", command.token(), command.label()));
        }
    }
    lines.join("\n")
}

pub fn volunteer_ack(volunteer_chat_id: &str) -> String {
    format!("Please hold on, we are contacting a volunteer ({volunteer_chat_id}).")
}

pub fn volunteer_help_escalation(chat_id: &str) -> String {
    format!("User with chat id {chat_id} needs help.")
}

pub fn volunteer_stale_escalation(chat_id: &str) -> String {
    format!("User with chat id {chat_id} has not sent reports for more than 2 days.")
}

pub fn volunteer_never_escalation(chat_id: &str) -> String {
    format!("User with chat id {chat_id} has never sent a report.")
}

pub fn dashboard_summary(pending: usize) -> String {
    format!("There are {pending} unprocessed report(s) waiting for review.")
}
