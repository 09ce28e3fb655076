//! Contact form for the portfolio site.
//!
//! Four required inputs (name, email, subject, message) are collected and
//! posted to a third-party form relay. At most one submission is in flight;
//! the outcome is surfaced as a transient result message that clears itself.
//!
//! - [`ContactFields`] / [`Field`]: inputs and browser-equivalent validation
//! - [`FormRelay`]: the outbound seam; [`Web3FormsRelay`] is the real one
//! - [`ContactForm`]: the submission state machine
//!
//! ```no_run
//! use std::sync::Arc;
//! use folio_contact::{ContactForm, Field, FormSettings, SubmitOutcome, Web3FormsRelay};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let relay = Web3FormsRelay::new("https://api.web3forms.com/submit", "my-access-key")?;
//! let form = ContactForm::new(Arc::new(relay), FormSettings::default());
//! form.update_field(Field::Name, "Ada");
//! form.update_field(Field::Email, "ada@example.com");
//! form.update_field(Field::Subject, "Hello");
//! form.update_field(Field::Message, "Let's talk.");
//!
//! if form.submit().await? == SubmitOutcome::Succeeded {
//!     println!("{}", form.snapshot().result_message);
//! }
//! # Ok(()) }
//! ```

mod fields;
mod form;
mod relay;

pub use fields::{ContactFields, Field, ValidationError};
pub use form::{
    ContactForm, FailureReason, FormMessages, FormSettings, FormSnapshot, Submission,
    SubmitOutcome,
};
pub use relay::{FormRelay, RelayError, RelayResponse, Web3FormsRelay};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The fields would not pass the browser's own constraint checks.
    #[error("invalid form: {0}")]
    Invalid(#[from] ValidationError),

    #[error("contact form has been stopped")]
    Stopped,
}
