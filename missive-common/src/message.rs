//! The notification sent to the site owner for each accepted submission.

use crate::Submission;

/// Subject line of every notification.
pub const SUBJECT: &str = "Richiesta info";

/// Render the plain-text body, including the client identifier the request
/// was attributed to.
#[must_use]
pub fn compose_text(submission: &Submission, client: &str) -> String {
    let lines: [&str; 9] = [
        "Nuova richiesta informazioni:",
        "",
        &format!("Nome: {}", submission.name),
        &format!("Email: {}", submission.email),
        "",
        "Messaggio:",
        &submission.message,
        "",
        &format!("IP: {client}"),
    ];

    lines.join("\n")
}
