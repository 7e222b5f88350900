use std::fmt;

/// A scalar query option. `Absent` entries are left out of the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Absent,
    Int(i64),
    Text(String),
}

impl ParamValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ParamValue::Absent)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Absent => Ok(()),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ParamValue::Absent)
    }
}

/// Ordered option map for the listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Overwriting keeps the key's original position.
    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// `key=value` pairs joined with `&`, absent values skipped, values verbatim.
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .filter(|(_, v)| !v.is_absent())
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_region_is_left_out() {
        let params = QueryParameters::new()
            .with("al", 1)
            .with("region_id", None::<String>)
            .with("v", 8);

        let qs = params.to_query_string();
        assert_eq!(qs, "al=1&v=8");
        assert!(!qs.contains("region_id"));
        assert!(!qs.contains("None"));
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut params = QueryParameters::new()
            .with("region_id", ParamValue::Absent)
            .with("v", 8);
        params.set("region_id", "30749");

        assert_eq!(params.to_query_string(), "region_id=30749&v=8");
    }

    #[test]
    fn values_are_not_escaped() {
        let params = QueryParameters::new().with("sf", "1,2,3").with("uipt", "1,3");
        assert_eq!(params.to_query_string(), "sf=1,2,3&uipt=1,3");
    }

    #[test]
    fn empty_params_give_empty_string() {
        assert_eq!(QueryParameters::new().to_query_string(), "");
    }
}
