//! Feature-set dependency graph and build order.
//!
//! Edges run from a feature set to each label in its `depends_on`. The order
//! is a DFS post-order over the activation list, so independent feature sets
//! keep their declared order and every feature set follows its dependencies.

use crate::config::Config;
use crate::error::{Error, Result};
use log::debug;
use std::collections::BTreeMap;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Temp,
    Perm,
}

/// Compute the build order of the activated feature sets.
///
/// Fails with `UnknownDependency` when a dependency is not activated, and
/// with `Cycle` (carrying the full cycle path) when the graph is cyclic.
pub fn resolve_order(config: &Config) -> Result<Vec<String>> {
    let mut deps: BTreeMap<&str, &[String]> = BTreeMap::new();
    for label in &config.features_to_use {
        let spec = config
            .features
            .get(label)
            .ok_or_else(|| Error::UnknownFeatureSet(label.clone()))?;
        deps.insert(label.as_str(), &spec.depends_on);
    }

    for (label, ds) in &deps {
        for d in ds.iter() {
            if !deps.contains_key(d.as_str()) {
                let status = if config.inactive.contains(d) {
                    "defined but not activated"
                } else {
                    "not defined"
                };
                return Err(Error::UnknownDependency {
                    label: label.to_string(),
                    dependency: d.clone(),
                    status,
                });
            }
        }
    }

    topo_order(&config.features_to_use, &deps)
}

fn topo_order(roots: &[String], deps: &BTreeMap<&str, &[String]>) -> Result<Vec<String>> {
    fn dfs<'a>(
        v: &'a str,
        deps: &BTreeMap<&'a str, &'a [String]>,
        marks: &mut BTreeMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        match marks.get(v) {
            Some(Mark::Perm) => return Ok(()),
            Some(Mark::Temp) => {
                // v is on the current recursion stack
                let start = stack.iter().position(|s| *s == v).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                path.push(v.to_string());
                return Err(Error::Cycle { path });
            }
            None => {}
        }

        marks.insert(v, Mark::Temp);
        stack.push(v);

        if let Some(ds) = deps.get(v) {
            for d in ds.iter() {
                dfs(d.as_str(), deps, marks, stack, order)?;
            }
        }

        stack.pop();
        marks.insert(v, Mark::Perm);
        order.push(v.to_string());
        Ok(())
    }

    let mut marks = BTreeMap::new();
    let mut stack = Vec::new();
    let mut order = Vec::with_capacity(roots.len());
    for r in roots {
        stack.clear();
        dfs(r.as_str(), deps, &mut marks, &mut stack, &mut order)?;
    }

    debug!("build order: {}", order.join(", "));
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use pretty_assertions::assert_eq;

    fn config(activated: &[&str], features: &[(&str, &[&str])]) -> Config {
        let features: serde_json::Map<String, serde_json::Value> = features
            .iter()
            .map(|(label, deps)| {
                (
                    label.to_string(),
                    serde_json::json!({ "output": format!("{{prefix}}/{}.tsv", label), "depends_on": deps }),
                )
            })
            .collect();
        let raw: RawConfig = serde_json::from_value(serde_json::json!({
            "prefix": "p",
            "features_to_use": activated,
            "samples": "samples.txt",
            "features": features,
        }))
        .unwrap();
        raw.validate_and_build().unwrap()
    }

    #[test]
    fn dependency_comes_first() {
        let cfg = config(&["B", "A"], &[("A", &[]), ("B", &["A"])]);
        assert_eq!(resolve_order(&cfg).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn independent_sets_keep_declared_order() {
        let cfg = config(
            &["z", "m", "a", "top"],
            &[("z", &[]), ("m", &[]), ("a", &[]), ("top", &["a", "z"])],
        );
        let first = resolve_order(&cfg).unwrap();
        assert_eq!(first, vec!["z", "m", "a", "top"]);
        assert_eq!(resolve_order(&cfg).unwrap(), first);
    }

    #[test]
    fn diamond_visits_shared_dependency_once() {
        let cfg = config(
            &["d", "b", "c", "a"],
            &[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])],
        );
        assert_eq!(resolve_order(&cfg).unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn mutual_dependency_is_a_cycle() {
        let cfg = config(&["A", "B"], &[("A", &["B"]), ("B", &["A"])]);
        match resolve_order(&cfg) {
            Err(Error::Cycle { path }) => assert_eq!(path, vec!["A", "B", "A"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let cfg = config(&["A"], &[("A", &["A"])]);
        assert!(matches!(resolve_order(&cfg), Err(Error::Cycle { .. })));
    }

    #[test]
    fn inactive_dependency_is_unknown() {
        let cfg = config(&["B"], &[("A", &[]), ("B", &["A"])]);
        match resolve_order(&cfg) {
            Err(Error::UnknownDependency { label, dependency, status }) => {
                assert_eq!((label.as_str(), dependency.as_str()), ("B", "A"));
                assert_eq!(status, "defined but not activated");
            }
            other => panic!("unexpected {:?}", other),
        }

        let cfg = config(&["B"], &[("B", &["ghost"])]);
        let err = resolve_order(&cfg).unwrap_err();
        assert!(err.to_string().contains("not defined"));
    }
}
