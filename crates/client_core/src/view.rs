//! Read-only projection of the form for whatever front end renders it.

use shared::domain::UserType;

use crate::controller::{Connectivity, StatusMessage, SubmissionState};

pub const SUBMIT_LABEL: &str = "Join Waitlist";
pub const SUBMITTING_LABEL: &str = "Submitting...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub name: String,
    pub email: String,
    pub user_type: UserType,
    pub user_type_options: [UserType; 2],
    pub inputs_enabled: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub connection_label: Option<&'static str>,
    pub message: Option<StatusMessage>,
}

impl FormView {
    pub fn from_state(state: &SubmissionState) -> Self {
        let submitting = state.is_submitting();
        Self {
            name: state.fields.name.clone(),
            email: state.fields.email.clone(),
            user_type: state.fields.user_type,
            user_type_options: UserType::ALL,
            inputs_enabled: !submitting,
            submit_enabled: state.can_submit(),
            submit_label: if submitting {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
            connection_label: connection_label(state.connectivity),
            message: state.message.clone(),
        }
    }
}

pub fn connection_label(connectivity: Connectivity) -> Option<&'static str> {
    match connectivity {
        Connectivity::Unknown => None,
        Connectivity::Connected => Some("Connected"),
        Connectivity::Disconnected => Some("Not Connected - Check Console"),
    }
}
