//! Domain models with validation at construction
//!
//! Form input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod dates;
pub mod email;
pub mod post;
pub mod validation;

pub use dates::{comment_date, ordinal_suffix, post_date};
pub use email::EmailAddress;
pub use post::{CommentText, PostFields};
pub use validation::ValidationError;
