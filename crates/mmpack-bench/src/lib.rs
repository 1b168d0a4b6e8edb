//! Synthetic registry generation shared by the mmpack benchmarks.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use mmpack_core::version::Version;
use mmpack_index::{BinIndex, Pkg, RawDep};
use rand::Rng;

/// Build a synthetic [`BinIndex`] of `num_packages` packages, each with
/// `versions_per_package` versions and `deps_per_version` random
/// dependencies on other packages in the registry.
#[must_use]
pub fn generate_registry(
    num_packages: usize,
    versions_per_package: usize,
    deps_per_version: usize,
) -> BinIndex {
    let mut index = BinIndex::new();
    let mut rng = rand::thread_rng();

    let names: Vec<String> = (0..num_packages).map(|i| format!("pkg{i}")).collect();

    for (pkg_idx, name) in names.iter().enumerate() {
        for v in 0..versions_per_package {
            let version = format!("{}.{}.0", v / 10 + 1, v % 10);
            let mut deps = Vec::with_capacity(deps_per_version);
            for _ in 0..deps_per_version {
                let dep_idx = rng.gen_range(0..num_packages);
                if dep_idx == pkg_idx {
                    continue;
                }
                deps.push(RawDep {
                    name: names[dep_idx].clone(),
                    min_version: "any".to_string(),
                    max_version: "any".to_string(),
                });
            }
            index.insert(Pkg {
                name_id: 0,
                name: name.clone(),
                version: Version::new(&version),
                source: name.clone(),
                filename: format!("{name}_{version}_amd64.mpk"),
                sha256: "0".repeat(64),
                repo_index: 0,
                sysdeps: Vec::new(),
                deps,
            });
        }
    }

    index
}
