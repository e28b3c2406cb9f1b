use super::*;

pub(super) const SETTINGS_MANIFEST_VERSION: u32 = 1;

/// Maps submission file names to the gold data and target pages that score them.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct BatchSettings {
    pub manifest_version: u32,
    pub categories: Vec<CategorySettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct CategorySettings {
    pub submission_file: String,
    pub gold_path: PathBuf,
    /// A JSON array of page ids, a JSON array literal string, or a CSV path.
    #[serde(default)]
    pub target: Option<Value>,
    #[serde(default)]
    pub html_dir: Option<PathBuf>,
    #[serde(default)]
    pub text_dir: Option<PathBuf>,
}

impl CategorySettings {
    /// Category label: the submission file name without its extension.
    pub fn name(&self) -> &str {
        Path::new(&self.submission_file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.submission_file)
    }

    pub fn resolve_target(&self, base_dir: &Path) -> Result<Option<Target>> {
        match &self.target {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(page_id) => Ok(page_id.clone()),
                    Value::Number(page_id) => Ok(page_id.to_string()),
                    other => bail!(
                        "unsupported target page id for {}: {other}",
                        self.submission_file
                    ),
                })
                .collect::<Result<Vec<_>>>()
                .map(|pages| Some(Target::Pages(pages))),
            Some(Value::String(literal)) if literal.trim_start().starts_with('[') => {
                Ok(Some(Target::Argument(literal.clone())))
            }
            Some(Value::String(path)) => Ok(Some(Target::Argument(
                resolve_relative(base_dir, Path::new(path))
                    .display()
                    .to_string(),
            ))),
            Some(other) => bail!(
                "unsupported target setting for {}: {other}",
                self.submission_file
            ),
        }
    }

    pub fn sources(&self, base_dir: &Path) -> Vec<(OffsetKind, DirectorySource)> {
        [
            (OffsetKind::Html, self.html_dir.as_ref()),
            (OffsetKind::Text, self.text_dir.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, dir)| {
            dir.map(|dir| (kind, DirectorySource::for_kind(resolve_relative(base_dir, dir), kind)))
        })
        .collect()
    }
}

pub(super) fn load_settings(path: &Path) -> Result<BatchSettings> {
    let raw = fs::read(path)
        .map_err(|err| ScoreError::from_io(path, err))
        .with_context(|| format!("failed to read settings manifest {}", path.display()))?;
    let settings: BatchSettings = serde_json::from_slice(&raw)
        .map_err(|err| ScoreError::format(path.display().to_string(), err))
        .with_context(|| format!("failed to parse settings manifest {}", path.display()))?;

    if settings.manifest_version != SETTINGS_MANIFEST_VERSION {
        bail!(
            "unsupported settings manifest_version {} in {} (expected {})",
            settings.manifest_version,
            path.display(),
            SETTINGS_MANIFEST_VERSION
        );
    }
    if settings.categories.is_empty() {
        bail!("settings manifest {} lists no categories", path.display());
    }

    let mut seen = HashSet::new();
    for category in &settings.categories {
        if !seen.insert(category.submission_file.as_str()) {
            bail!(
                "settings manifest {} lists {} more than once",
                path.display(),
                category.submission_file
            );
        }
    }

    Ok(settings)
}
