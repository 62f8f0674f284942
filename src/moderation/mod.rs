//! Scan-and-moderate core: word matching, post extraction, delete decisions.

pub mod delete_form;
pub mod executor;
pub mod post_extractor;
pub mod scanner;
pub mod word_matcher;

pub use delete_form::{build_fields, DeleteFormFields};
pub use executor::{
    Confirmer, DeleteExecutor, DeleteOutcome, FixedConfirmer, LineConfirmer, StdinConfirmer,
};
pub use post_extractor::{extract_posts, DeleteDescriptor, ParseError, PostRecord};
pub use scanner::{scan, ModerationDecision};
pub use word_matcher::{WordListError, WordMatcher};
