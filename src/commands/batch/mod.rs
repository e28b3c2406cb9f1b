use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::BatchArgs;
use crate::model::{BatchReport, CategoryResult, OffsetKind};
use crate::scoring::{
    DirectorySource, ScoreError, ScoreRequest, Target, get_score, write_score_csv,
};
use crate::util::{now_utc_string, resolve_relative, sha256_file, write_json_pretty};

mod manifest;
mod run;

use manifest::*;

pub(crate) use run::run;
#[cfg(test)]
use run::score_batch;

#[cfg(test)]
mod tests;
