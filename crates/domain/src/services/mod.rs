//! Domain services for ValidVouch.
//!
//! Services contain business rules that operate on domain models without
//! touching storage.

pub mod moderation;

pub use moderation::{
    authorize_flag, CaseState, Decision, FlaggedCase, ModerationError, OwnerBucket, Transition,
    Verdict,
};
