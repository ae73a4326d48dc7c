pub mod email;
pub mod form;

pub use email::{validate_email, EmailError};
pub use form::{
    Acknowledgement, EmailForm, FormAction, FormFailure, FormState, Notice, PendingSubmission,
    SubmissionOutcome, Tone,
};
