use strum::Display;

use crate::form::FormData;

/// Form option text for each concern category, kept verbatim so the
/// lookup matches what the form actually submits.
pub const ACADEMIC_OPTION: &str =
    "Academic (4 Year Planning, Transcripts, Credits, Grade Level, Letters of Recommendation)";
pub const SCHEDULING_OPTION: &str = "Scheduling (Schedule Changes, Course Selection)";
pub const PERSONAL_OPTION: &str = "Personal Issues";
pub const COLLEGE_CAREER_OPTION: &str = "College, Career, & Military Readiness";
pub const OTHER_OPTION: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReasonCategory {
    Academic,
    Scheduling,
    Personal,
    #[strum(serialize = "College, Career, & Military")]
    CollegeCareer,
    Other,
    Unknown,
}

impl ReasonCategory {
    /// Exact match against the form's option strings; anything else is
    /// carried through as `Unknown` and echoed verbatim in the email.
    pub fn parse(raw: &str) -> Self {
        match raw {
            ACADEMIC_OPTION => Self::Academic,
            SCHEDULING_OPTION => Self::Scheduling,
            PERSONAL_OPTION => Self::Personal,
            COLLEGE_CAREER_OPTION => Self::CollegeCareer,
            OTHER_OPTION => Self::Other,
            _ => Self::Unknown,
        }
    }

    /// "Other" is excluded on purpose: a freeform concern with no named
    /// category never pages the whole counseling staff.
    pub fn broadcast_eligible(self) -> bool {
        matches!(
            self,
            Self::Academic | Self::Scheduling | Self::Personal | Self::CollegeCareer
        )
    }
}

/// True iff the request must go to every configured counselor at once:
/// a broadcast-eligible category combined with the exact emergency
/// urgency string. Near-miss urgency strings stay single-recipient.
pub fn is_emergency(data: &FormData, emergency_urgency: &str) -> bool {
    ReasonCategory::parse(&data.reason).broadcast_eligible() && data.urgency == emergency_urgency
}

/// Category-specific content block for the email body. Deterministic
/// string construction only.
pub fn reason_content(data: &FormData) -> String {
    let category = ReasonCategory::parse(&data.reason);
    match category {
        ReasonCategory::Academic
        | ReasonCategory::Scheduling
        | ReasonCategory::Personal
        | ReasonCategory::CollegeCareer => {
            let mut block = format!("Type of concern: {}\n", category);
            block.push_str(category_detail(category));
            block.push('\n');
            block.push_str(&format!("Urgency: {}", data.urgency));
            block
        }
        ReasonCategory::Other => {
            let mut block = format!(
                "The student submitted an \"Other\" request.\nDescription: {}",
                data.description
            );
            block.push('\n');
            block.push_str(&format!("Urgency: {}", data.urgency));
            block
        }
        ReasonCategory::Unknown => format!(
            "Type of concern: {}\nUrgency: {}",
            data.reason, data.urgency
        ),
    }
}

fn category_detail(category: ReasonCategory) -> &'static str {
    match category {
        ReasonCategory::Academic => {
            "The student needs help with 4 year planning, transcripts, credits, grade level, or letters of recommendation."
        }
        ReasonCategory::Scheduling => {
            "The student needs help with a schedule change or course selection."
        }
        ReasonCategory::Personal => "The student would like to discuss a personal matter.",
        ReasonCategory::CollegeCareer => {
            "The student has a college, career, or military readiness question."
        }
        ReasonCategory::Other | ReasonCategory::Unknown => "",
    }
}
