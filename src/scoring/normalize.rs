use std::collections::HashMap;
use std::sync::LazyLock;

const HALF_WIDTH_FIRST: u32 = 0x21;
const HALF_WIDTH_LAST: u32 = 0x7E;
const FULL_WIDTH_SHIFT: u32 = 0xFF01 - HALF_WIDTH_FIRST;

/// Attribute spellings that changed between dataset revisions, keyed by ENE.
/// Replacements are stored already folded so renaming is idempotent.
static SCHEMA_RENAMES: LazyLock<HashMap<(&'static str, &'static str), &'static str>> =
    LazyLock::new(|| {
        HashMap::from([
            // Facility:Castle
            (("1.6.4.2", "軍備"), "ＤＥＬ"),
            // Facility:Zoo
            (("1.6.4.15", "閉館年"), "閉園年"),
            // Person
            (("1.1", "職業"), "地位職業"),
            // Facility:Line_Other
            (("1.6.6.0", "停車場名"), "停車場"),
        ])
    });

/// Maps an attribute name onto the canonical vocabulary for `ene`.
pub fn normalize_attribute(ene: &str, attribute: &str) -> String {
    let folded = fold_full_width(attribute);
    match SCHEMA_RENAMES.get(&(ene, folded.as_str())) {
        Some(renamed) => (*renamed).to_string(),
        None => folded,
    }
}

/// Folds printable half-width ASCII (`!` through `~`) to its full-width form.
pub fn fold_full_width(value: &str) -> String {
    value
        .chars()
        .map(|ch| {
            let code = u32::from(ch);
            if (HALF_WIDTH_FIRST..=HALF_WIDTH_LAST).contains(&code) {
                char::from_u32(code + FULL_WIDTH_SHIFT).unwrap_or(ch)
            } else {
                ch
            }
        })
        .collect()
}
