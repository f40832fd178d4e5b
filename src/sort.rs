//! Sort directive resolution for collection endpoints.
//!
//! A request's sort parameter (or the resource default) is parsed into a
//! [`SortSpec`], checked against the resource allow-list, and then used to
//! order JSON records with [`apply`].

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde_json::{Number, Value};

use crate::config::SortOptions;
use crate::parser::{SortDirection, SortError, SortSpec};

pub const DEFAULT_SORT_PARAM: &str = "sort";

/// Per-resource sort settings, compiled once at registration.
#[derive(Debug, Clone)]
pub struct SortConfig {
    param_name: String,
    default: SortSpec,
    allowed_paths: Option<HashSet<String>>,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            param_name: DEFAULT_SORT_PARAM.to_string(),
            default: SortSpec::default(),
            allowed_paths: None,
        }
    }
}

impl SortConfig {
    /// Compile registration options. A malformed default expression is
    /// reported here rather than on the first request.
    pub fn from_options(options: &SortOptions) -> Result<SortConfig, SortError> {
        let default = match options.default.as_deref() {
            Some(expression) => SortSpec::parse(expression)?,
            None => SortSpec::default(),
        };

        let param_name = if options.param.trim().is_empty() {
            DEFAULT_SORT_PARAM.to_string()
        } else {
            options.param.clone()
        };

        Ok(SortConfig {
            param_name,
            default,
            allowed_paths: options
                .attributes
                .as_ref()
                .map(|paths| paths.iter().cloned().collect()),
        })
    }

    pub fn param_name(&self) -> &str {
        &self.param_name
    }

    pub fn default_spec(&self) -> &SortSpec {
        &self.default
    }

    pub fn is_allowed(&self, path: &str) -> bool {
        self.allowed_paths
            .as_ref()
            .map_or(true, |allowed| allowed.contains(path))
    }
}

/// Resolve the raw sort parameter value for one request.
///
/// An absent or blank value selects the configured default. A present value
/// replaces the default entirely. Every token is checked against the
/// allow-list before failing so the error lists all rejected paths.
pub fn parse(raw: Option<&str>, config: &SortConfig) -> Result<SortSpec, SortError> {
    let raw = match raw {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Ok(config.default.clone()),
    };

    let spec = SortSpec::parse(raw)?;

    let mut rejected: Vec<String> = Vec::new();
    for key in spec.keys() {
        let path = key.path();
        if !config.is_allowed(&path) && !rejected.contains(&path) {
            rejected.push(path);
        }
    }

    if !rejected.is_empty() {
        return Err(SortError::NotAllowed { paths: rejected });
    }

    Ok(spec)
}

/// Pick the configured parameter out of a query string map and parse it.
pub fn resolve_sort(
    query: &HashMap<String, String>,
    config: &SortConfig,
) -> Result<SortSpec, SortError> {
    parse(query.get(config.param_name()).map(String::as_str), config)
}

/// Outcome of walking a dotted path through a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    Absent,
    Present(&'a Value),
}

impl<'a> Resolved<'a> {
    /// The value when it is present and not JSON `null`.
    fn defined(self) -> Option<&'a Value> {
        match self {
            Resolved::Present(Value::Null) | Resolved::Absent => None,
            Resolved::Present(value) => Some(value),
        }
    }
}

/// Walk `segments` through nested objects. Missing keys and non-object
/// intermediates resolve to [`Resolved::Absent`].
pub fn lookup_path<'a>(record: &'a Value, segments: &[String]) -> Resolved<'a> {
    let mut current = record;
    for segment in segments {
        match current.as_object().and_then(|map| map.get(segment)) {
            Some(next) => current = next,
            None => return Resolved::Absent,
        }
    }
    Resolved::Present(current)
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Ascending order of two resolved values. Null and absent sort first;
/// values of different or unordered types (arrays, objects) compare equal.
fn compare_resolved(a: Resolved<'_>, b: Resolved<'_>) -> Ordering {
    match (a.defined(), b.defined()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        },
    }
}

/// Compare two records key by key. An empty spec treats every pair as equal.
pub fn compare(a: &Value, b: &Value, spec: &SortSpec) -> Ordering {
    for key in spec.keys() {
        let ordering = compare_resolved(
            lookup_path(a, key.segments()),
            lookup_path(b, key.segments()),
        );
        let ordering = match key.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Bottom-up merge sort. Taking from the left run on ties keeps it stable,
/// and it never panics when `compare` is not a total order (mixed-type keys).
fn merge_sort_by<T, F>(items: &mut Vec<T>, compare: F)
where
    T: Copy,
    F: Fn(&T, &T) -> Ordering,
{
    let len = items.len();
    let mut buffer = items.clone();
    let mut width = 1;

    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right, mut out) = (start, mid, start);

            while left < mid && right < end {
                if compare(&items[right], &items[left]) == Ordering::Less {
                    buffer[out] = items[right];
                    right += 1;
                } else {
                    buffer[out] = items[left];
                    left += 1;
                }
                out += 1;
            }

            let rest = mid - left;
            buffer[out..out + rest].copy_from_slice(&items[left..mid]);
            out += rest;
            buffer[out..end].copy_from_slice(&items[right..end]);

            start = end;
        }
        std::mem::swap(items, &mut buffer);
        width *= 2;
    }
}

/// Return a new, stably ordered copy of `records`.
pub fn apply(records: &[Value], spec: &SortSpec) -> Vec<Value> {
    if spec.is_empty() {
        return records.to_vec();
    }

    let mut ordered: Vec<&Value> = records.iter().collect();
    merge_sort_by(&mut ordered, |a, b| compare(a, b, spec));
    ordered.into_iter().cloned().collect()
}
