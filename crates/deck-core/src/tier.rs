use crate::config::PriorityRule;
use crate::source::parent_dir;

pub const DEFAULT_TIER: u8 = 2;

/// First rule whose extension set and directory set both match wins. An
/// empty set matches anything on that dimension.
pub fn resolve_tier(path: &str, rules: &[PriorityRule]) -> u8 {
    let ext = extension(path);
    let dir = parent_dir(path);
    rules
        .iter()
        .find(|rule| {
            let ext_match = rule.extensions.is_empty()
                || ext.is_some_and(|ext| rule.extensions.iter().any(|want| *want == ext));
            let dir_match = rule.directories.is_empty()
                || dir
                    .split('/')
                    .any(|part| rule.directories.iter().any(|want| want == part));
            ext_match && dir_match
        })
        .map(|rule| rule.tier)
        .unwrap_or(DEFAULT_TIER)
}

/// Extension including the dot, as configured in priority rules.
fn extension(path: &str) -> Option<&str> {
    let name = crate::source::base_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx..]),
    }
}
