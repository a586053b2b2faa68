//! Account records and their validation.
//!
//! Provides the account model, mark parsing, field validation and the
//! per-account error map.

mod errors;
pub mod marks;
mod model;
mod validation;

pub use errors::{AccountErrors, FieldErrors};
pub use marks::parse_marks;
pub use model::{Account, AccountId, AccountPatch, Mark, RecordType};
pub use validation::{
    AccountField, LOGIN_MAX_LEN, MARK_STRING_MAX_LEN, PASSWORD_MAX_LEN, ValidationError,
    validate_account,
};
