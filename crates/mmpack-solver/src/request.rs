//! Turning a user request list into compiled dependencies the solver can
//! consume.

use mmpack_core::error::{Error, Result};
use mmpack_index::{BinIndex, CompDep, RawDep};

/// One requested package, with an optional pinned version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgRequest {
    /// Name of the requested package.
    pub name: String,
    /// Exact version requested, or `None` for "any".
    pub version: Option<String>,
}

impl PkgRequest {
    /// A request for `name` at any version.
    #[must_use]
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// A request for `name` pinned to `version`.
    #[must_use]
    pub fn pinned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }
}

/// Compile a user request list into the `CompDep` list the solver
/// starts from. An omitted version becomes the unrestricted range
/// `("any", "any")`. Rejects the whole request, before the solver ever
/// runs, if any entry names an unknown package or resolves to zero
/// candidates.
pub fn compdeps_from_reqlist(index: &BinIndex, requests: &[PkgRequest]) -> Result<Vec<CompDep>> {
    let mut compiled = Vec::with_capacity(requests.len());
    for request in requests {
        let bound = request.version.clone().unwrap_or_else(|| "any".to_string());
        let raw = RawDep {
            name: request.name.clone(),
            min_version: bound.clone(),
            max_version: bound,
        };
        let cd = index.compile_dep(&raw)?;
        if cd.is_unsatisfiable() {
            let constraint = request
                .version
                .as_deref()
                .map_or_else(|| "any version".to_string(), |v| format!("version {v}"));
            return Err(Error::VersionNotFound {
                name: request.name.clone(),
                constraint,
            });
        }
        compiled.push(cd);
    }
    Ok(compiled)
}
