//! Menu commands — the closed set of selectable actions.

/// A menu command, identified on the wire by a stable callback token.
///
/// Dispatch is a direct, total mapping from token to variant; unknown
/// tokens are rejected by `from_token` rather than falling through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    InfoShelterDog,
    InfoShelterCat,
    HowToAdoptDog,
    HowToAdoptCat,
    SendReport,
    CallVolunteer,
    // Reserved for the volunteer role.
    AdoptionDashboard,
    VolunteerDashboard,
    ReviewReport,
}

impl MenuCommand {
    /// Every command, in menu order.
    pub const ALL: [MenuCommand; 9] = [
        MenuCommand::InfoShelterDog,
        MenuCommand::InfoShelterCat,
        MenuCommand::HowToAdoptDog,
        MenuCommand::HowToAdoptCat,
        MenuCommand::SendReport,
        MenuCommand::CallVolunteer,
        MenuCommand::AdoptionDashboard,
        MenuCommand::VolunteerDashboard,
        MenuCommand::ReviewReport,
    ];

    /// The callback token carried by menu-selection events.
    pub fn token(&self) -> &'static str {
        match self {
            MenuCommand::InfoShelterDog => "INFO_SHELTER_DOG",
            MenuCommand::InfoShelterCat => "INFO_SHELTER_CAT",
            MenuCommand::HowToAdoptDog => "HOW_TO_ADOPT_DOG",
            MenuCommand::HowToAdoptCat => "HOW_TO_ADOPT_CAT",
            MenuCommand::SendReport => "SEND_REPORT",
            MenuCommand::CallVolunteer => "CALL_VOLUNTEER",
            MenuCommand::AdoptionDashboard => "ADOPTION_DASHBOARD",
            MenuCommand::VolunteerDashboard => "VOLUNTEER_DASHBOARD",
            MenuCommand::ReviewReport => "REVIEW_REPORT",
        }
    }

    /// Human-readable button label.
    pub fn label(&self) -> &'static str {
        match self {
            MenuCommand::InfoShelterDog => "About the dog shelter",
            MenuCommand::InfoShelterCat => "About the cat shelter",
            MenuCommand::HowToAdoptDog => "How to adopt a dog",
            MenuCommand::HowToAdoptCat => "How to adopt a cat",
            MenuCommand::SendReport => "Send a pet report",
            MenuCommand::CallVolunteer => "Call a volunteer",
            MenuCommand::AdoptionDashboard => "Adoption dashboard",
            MenuCommand::VolunteerDashboard => "Volunteer dashboard",
            MenuCommand::ReviewReport => "Review a report",
        }
    }

    /// Resolve a callback token. `None` for anything outside the closed set.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token() == token)
    }

    /// Commands gated behind the volunteer/admin roles.
    pub fn requires_reviewer(&self) -> bool {
        matches!(
            self,
            MenuCommand::AdoptionDashboard
                | MenuCommand::VolunteerDashboard
                | MenuCommand::ReviewReport
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_mapping_is_total() {
        for command in MenuCommand::ALL {
            assert_eq!(MenuCommand::from_token(command.token()), Some(command));
        }
    }

    #[test]
    fn unknown_tokens_rejected() {
        assert_eq!(MenuCommand::from_token("FEED_THE_CAT"), None);
        assert_eq!(MenuCommand::from_token(""), None);
        assert_eq!(MenuCommand::from_token("send_report"), None);
    }

    #[test]
    fn reviewer_gating() {
        assert!(!MenuCommand::SendReport.requires_reviewer());
        assert!(!MenuCommand::CallVolunteer.requires_reviewer());
        assert!(MenuCommand::VolunteerDashboard.requires_reviewer());
        assert!(MenuCommand::ReviewReport.requires_reviewer());
    }
}
