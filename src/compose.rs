use crate::form::FormData;
use crate::reason::reason_content;

/// Composed notification, built once per submission and handed straight
/// to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
    pub html_body: String,
}

/// Build the counselor notification from the named record. Pure string
/// construction, no I/O; the same input always yields the same message.
pub fn compose(data: &FormData, subject: &str) -> EmailMessage {
    let mut body = format!("{} requested to meet with you.\n\n", data.first_name);

    body.push_str("STUDENT DETAILS:\n");
    body.push_str(&format!(
        "Name: {}, {} {}\n",
        data.last_name, data.first_name, data.student_id
    ));
    body.push_str(&format!("Email: {}\n", data.student_email));
    if !data.person_completing.trim().is_empty() {
        body.push_str(&format!("Completed by: {}\n", data.person_completing));
    }
    body.push('\n');

    body.push_str("REQUEST TYPE:\n");
    body.push_str(&reason_content(data));
    body.push_str("\n\n");

    body.push_str(
        "If you need additional details, please contact the student at the email above or review the form responses spreadsheet.\n",
    );

    EmailMessage {
        subject: subject.to_string(),
        body: body.clone(),
        html_body: html_body(&body),
    }
}

/// Derive the HTML variant mechanically from the plain-text body: blank
/// lines become paragraph breaks, single newlines become line breaks,
/// and the section headers get emphasis markup.
fn html_body(plain: &str) -> String {
    let paragraphs = plain
        .trim_end_matches('\n')
        .replace("\n\n", "</p><p>")
        .replace('\n', "<br>");

    let html = format!(
        "<div style=\"font-family: Arial, sans-serif; font-size: 14px; line-height: 1.6; color: #333;\"><p>{}</p></div>",
        paragraphs
    );

    html.replace(
        "STUDENT DETAILS:",
        "<strong>STUDENT DETAILS:</strong>",
    )
    .replace("REQUEST TYPE:", "<strong>REQUEST TYPE:</strong>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reason::ACADEMIC_OPTION;

    const SUBJECT: &str = "REQUEST TO SEE COUNSELOR";

    fn form_data() -> FormData {
        FormData {
            student_email: "john.doe@student.com".to_string(),
            counselor_name: "Gomez (Cas-Fl)".to_string(),
            student_id: "12345".to_string(),
            last_name: "Doe".to_string(),
            first_name: "John".to_string(),
            reason: ACADEMIC_OPTION.to_string(),
            urgency: "Green (I can wait a few days, not urgent.)".to_string(),
            person_completing: "Parent - Jane Doe".to_string(),
            description: "Test description".to_string(),
        }
    }

    #[test]
    fn test_compose_body_content() {
        let message = compose(&form_data(), SUBJECT);

        assert_eq!(message.subject, SUBJECT);
        assert!(message.body.contains("John requested to meet with you"));
        assert!(message.body.contains("STUDENT DETAILS:"));
        assert!(message.body.contains("Doe, John 12345"));
        assert!(message.body.contains("john.doe@student.com"));
        assert!(message.body.contains("Parent - Jane Doe"));
        assert!(message.body.contains("Type of concern: Academic"));
    }

    #[test]
    fn test_compose_omits_completed_by_when_absent() {
        let mut data = form_data();
        data.person_completing = String::new();
        let message = compose(&data, SUBJECT);
        assert!(!message.body.contains("Completed by:"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let data = form_data();
        assert_eq!(compose(&data, SUBJECT), compose(&data, SUBJECT));
    }

    #[test]
    fn test_html_body_structure() {
        let message = compose(&form_data(), SUBJECT);

        assert!(message.html_body.starts_with("<div"));
        assert!(message.html_body.contains("</p><p>"));
        assert!(message.html_body.contains("<br>"));
        assert!(message
            .html_body
            .contains("<strong>STUDENT DETAILS:</strong>"));
        assert!(message.html_body.contains("<strong>REQUEST TYPE:</strong>"));
    }

    #[test]
    fn test_html_body_keeps_student_content() {
        let message = compose(&form_data(), SUBJECT);
        assert!(message.html_body.contains("Doe, John 12345"));
        assert!(message.html_body.contains("john.doe@student.com"));
    }
}
