//! formfetch: form input fields bound to external field state, and a fetch
//! lifecycle controller with loading/error state and cancellation.

pub mod config;
pub mod errors;
pub mod fetch;
pub mod form;
pub mod models;
pub mod token;
pub mod transport;
pub mod ui;

pub use errors::FormFetchError;
pub use fetch::FetchController;
pub use form::{FieldBinding, FieldState, FormState, InputField, InputProps};
pub use models::{LifecycleState, Method, RequestDescriptor, RequestOutcome, ServerError};
