// src/domain/scope.rs

use crate::errors::AppError;

/// Where postal codes for a state come from.
pub trait ZipCodeSource {
    fn zips_for_state(&self, state: &str) -> Result<Vec<String>, AppError>;
}

/// What a batch should cover: one explicit zip, or every zip in a state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeScope {
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub limit: Option<usize>,
}

#[cfg(test)]
impl ScrapeScope {
    pub fn state(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            ..Default::default()
        }
    }

    pub fn zip(zip_code: impl Into<String>) -> Self {
        Self {
            zip_code: Some(zip_code.into()),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl ScrapeScope {
    /// Short label for logs and the run ledger.
    pub fn label(&self) -> String {
        match (&self.zip_code, &self.state) {
            (Some(z), _) => format!("zip:{z}"),
            (None, Some(s)) => format!("state:{s}"),
            (None, None) => "<none>".to_string(),
        }
    }
}

/// Expand a scope into the ordered list of zips to query.
/// An explicit zip never touches `source`.
pub fn resolve_target_units(
    scope: &ScrapeScope,
    source: &dyn ZipCodeSource,
) -> Result<Vec<String>, AppError> {
    let mut zips = match (&scope.zip_code, &scope.state) {
        (Some(zip), _) => {
            let zip = zip.trim();
            if zip.is_empty() {
                return Err(AppError::InvalidScope("empty zip code".into()));
            }
            vec![zip.to_string()]
        }
        (None, Some(state)) => {
            let state = state.trim().to_uppercase();
            if state.is_empty() {
                return Err(AppError::InvalidScope("empty state".into()));
            }
            let zips = source.zips_for_state(&state)?;
            if zips.is_empty() {
                return Err(AppError::InvalidScope(format!(
                    "no zip codes found for state {state}"
                )));
            }
            zips
        }
        (None, None) => {
            return Err(AppError::InvalidScope(
                "either a state or a zip code is required".into(),
            ))
        }
    };

    // 0 means no limit.
    if let Some(limit) = scope.limit.filter(|&n| n > 0) {
        zips.truncate(limit);
    }
    Ok(zips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        zips: Vec<String>,
        calls: Cell<usize>,
    }

    impl CountingSource {
        fn new(zips: &[&str]) -> Self {
            Self {
                zips: zips.iter().map(|z| z.to_string()).collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl ZipCodeSource for CountingSource {
        fn zips_for_state(&self, state: &str) -> Result<Vec<String>, AppError> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(state, "UT");
            Ok(self.zips.clone())
        }
    }

    #[test]
    fn explicit_zip_bypasses_source() {
        let source = CountingSource::new(&["84101"]);
        let scope = ScrapeScope {
            state: Some("UT".into()),
            zip_code: Some("84604".into()),
            limit: None,
        };
        let zips = resolve_target_units(&scope, &source).unwrap();
        assert_eq!(zips, vec!["84604"]);
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn state_is_uppercased_and_limited() {
        let source = CountingSource::new(&["84101", "84102", "84103"]);
        let zips = resolve_target_units(&ScrapeScope::state("ut").with_limit(2), &source).unwrap();
        assert_eq!(zips, vec!["84101", "84102"]);
    }

    #[test]
    fn zero_limit_means_everything() {
        let source = CountingSource::new(&["84101", "84102", "84103"]);
        let zips = resolve_target_units(&ScrapeScope::state("UT").with_limit(0), &source).unwrap();
        assert_eq!(zips.len(), 3);
    }

    #[test]
    fn missing_state_and_zip_is_invalid() {
        let source = CountingSource::new(&[]);
        let err = resolve_target_units(&ScrapeScope::default(), &source).unwrap_err();
        assert!(matches!(err, AppError::InvalidScope(_)));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn state_without_zips_is_invalid() {
        let source = CountingSource::new(&[]);
        let err = resolve_target_units(&ScrapeScope::state("UT"), &source).unwrap_err();
        assert!(matches!(err, AppError::InvalidScope(_)));
    }
}
