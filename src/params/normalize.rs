//! Parameter normalization rules

use super::types::{ParamValue, RequestSpec};

/// Normalize a multi-value filter parameter in place
///
/// Lists are pipe-joined into a scalar; an empty scalar or empty list
/// removes the key entirely.
pub fn normalize_list_filter(spec: &mut RequestSpec, key: &str) {
    let Some(value) = spec.remove(key) else {
        return;
    };
    if value.is_empty() {
        return;
    }
    spec.set(key, ParamValue::Scalar(value.to_wire()));
}

/// Remove every listed key from the spec
pub fn strip_keys<I, S>(spec: &mut RequestSpec, keys: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for key in keys {
        spec.remove(key.as_ref());
    }
}
