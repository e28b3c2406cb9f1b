//! Exact-match scoring of attribute extraction output against gold annotations.
//!
//! Records flow loader -> index (with attribute normalization) -> canonical
//! spans -> scorer / validator, and `get_score` ties the passes together.

mod canonical;
mod error;
mod export;
mod index;
mod loader;
mod normalize;
mod report;
mod scorer;
mod validator;

pub use error::ScoreError;
pub use export::{render_markdown, write_error_csv, write_score_csv};
pub use report::{ScoreOutcome, ScoreRequest, Target, get_score};
pub use validator::DirectorySource;

#[cfg(test)]
use canonical::canonicalize;
#[cfg(test)]
use index::AnnotationIndex;
#[cfg(test)]
use loader::{RecordSource, load_json_lines, load_records, load_target};
#[cfg(test)]
use normalize::{fold_full_width, normalize_attribute};
#[cfg(test)]
use scorer::{macro_average, micro_average, score};
#[cfg(test)]
use validator::{SourceLookup, extract_span, validate};
