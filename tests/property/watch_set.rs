use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use proptest::prelude::*;
use rerun::resolve::MockResolver;
use rerun::watch::build_watch_set;

/// A random import graph: for each package, whether it is read-only and the
/// indices it imports. Edges may point anywhere, so cycles are common.
#[derive(Debug, Clone)]
struct Graph {
    read_only: Vec<bool>,
    imports: Vec<Vec<usize>>,
}

fn graph_strategy(max_pkgs: usize) -> impl Strategy<Value = Graph> {
    (1..=max_pkgs).prop_flat_map(|n| {
        (
            proptest::collection::vec(proptest::bool::weighted(0.25), n),
            proptest::collection::vec(proptest::collection::vec(0..n, 0..4), n),
        )
            .prop_map(|(mut read_only, imports)| {
                // The root is the program itself.
                read_only[0] = false;
                Graph { read_only, imports }
            })
    })
}

fn name(i: usize) -> String {
    format!("ex.com/p{i}")
}

fn dir(i: usize) -> PathBuf {
    PathBuf::from(format!("/src/p{i}"))
}

fn resolver_for(graph: &Graph) -> MockResolver {
    let resolver = MockResolver::new();
    for (i, imports) in graph.imports.iter().enumerate() {
        let imports: Vec<String> = imports.iter().map(|j| name(*j)).collect();
        let imports: Vec<&str> = imports.iter().map(String::as_str).collect();
        if graph.read_only[i] {
            resolver.add_std(&name(i), &imports);
        } else {
            resolver.add_library(&name(i), dir(i), &imports);
        }
    }
    resolver
}

/// Reference reachability that stops at read-only packages.
fn expected_dirs(graph: &Graph) -> BTreeSet<PathBuf> {
    let mut seen = HashSet::new();
    let mut stack = vec![0usize];
    let mut dirs = BTreeSet::new();
    seen.insert(0);
    while let Some(i) = stack.pop() {
        if graph.read_only[i] {
            continue;
        }
        dirs.insert(dir(i));
        for &j in &graph.imports[i] {
            if seen.insert(j) {
                stack.push(j);
            }
        }
    }
    dirs
}

proptest! {
    #[test]
    fn watch_set_is_exactly_the_writable_reachable_dirs(graph in graph_strategy(12)) {
        let resolver = resolver_for(&graph);
        let set = build_watch_set(&resolver, &name(0));

        let got: BTreeSet<PathBuf> = set.dirs().map(|d| d.to_path_buf()).collect();
        prop_assert_eq!(got, expected_dirs(&graph));
    }

    #[test]
    fn each_import_path_is_resolved_at_most_once(graph in graph_strategy(12)) {
        let resolver = resolver_for(&graph);
        let _ = build_watch_set(&resolver, &name(0));

        let lookups = resolver.lookups();
        let unique: HashSet<&String> = lookups.iter().collect();
        prop_assert_eq!(unique.len(), lookups.len());
    }

    #[test]
    fn read_only_dirs_never_appear(graph in graph_strategy(12)) {
        let resolver = resolver_for(&graph);
        let set = build_watch_set(&resolver, &name(0));

        for (i, ro) in graph.read_only.iter().enumerate() {
            if *ro {
                prop_assert!(!set.contains_dir(dir(i)));
                prop_assert!(!set.contains_dir(PathBuf::from("/goroot/src").join(name(i))));
            }
        }
    }
}
