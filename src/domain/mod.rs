//! Request validation and response shaping that needs no I/O.

pub mod premises;
pub mod submission;

pub use premises::{parse_usrn, PremiseRow, PremisesPage, UsrnReport, UsrnRequest};
pub use submission::{MissingType, NewSubmission, OrgType, SubmissionRequest};
