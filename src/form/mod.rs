//! Form input fields bound to externally owned field state
//!
//! [`FormState`] owns values, errors and touched flags. [`InputField`] reads
//! that state, forwards input events back to it and renders validation
//! feedback either as HTML markup or into a terminal frame.

pub mod input_field;
pub mod state;

pub use input_field::{InputField, InputProps, FEEDBACK_CLASS, INVALID_CLASS};
pub use state::{validators, FieldBinding, FieldState, FormState, Validator};
