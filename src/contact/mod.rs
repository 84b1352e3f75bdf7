// Contact form module.
// Validation and spam filtering for contact submissions; nothing is persisted.

pub mod form;
pub mod spam;

pub use form::{ContactForm, ContactSubmission, FieldErrors};
pub use spam::{SpamGuard, SpamReason};
