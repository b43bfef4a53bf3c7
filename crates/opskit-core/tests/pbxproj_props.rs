use opskit_core::pbxproj::{apply_add, apply_remove, verify, AddFile, AddReport, IdGen};
use opskit_core::OpsError;
use proptest::prelude::*;

const MINIMAL: &str = include_str!("fixtures/minimal.pbxproj");
const TWO_TARGETS: &str = include_str!("fixtures/two_targets.pbxproj");

/// Where a new file goes: a project plus the siblings that pick its group
/// and sources phase.
#[derive(Debug, Clone, Copy)]
struct Target {
    project: &'static str,
    group_sibling: &'static str,
    group: Option<&'static str>,
    sources_sibling: &'static str,
}

impl Target {
    fn request(&self, path: &str) -> AddFile {
        let req = AddFile::new(path, self.group_sibling, self.sources_sibling);
        match self.group {
            Some(g) => req.in_group(g),
            None => req,
        }
    }
}

fn two_target_placements() -> Vec<Target> {
    let groups = [
        ("AuthManager.swift", None),
        ("Other.swift", None),
        ("Helpers.swift", Some("App")),
        ("Helpers.swift", Some("Widget")),
    ];
    let phases = ["AuthManager.swift", "Other.swift", "Helpers.swift"];
    groups
        .iter()
        .flat_map(|&(group_sibling, group)| {
            phases.iter().map(move |&sources_sibling| Target {
                project: TWO_TARGETS,
                group_sibling,
                group,
                sources_sibling,
            })
        })
        .collect()
}

fn any_target() -> impl Strategy<Value = Target> {
    let mut all = vec![Target {
        project: MINIMAL,
        group_sibling: "AuthManager.swift",
        group: None,
        sources_sibling: "AuthManager.swift",
    }];
    all.extend(two_target_placements());
    prop::sample::select(all)
}

fn add(text: &str, target: &Target, path: &str, seed: u64) -> (String, AddReport) {
    let mut ids = IdGen::seeded(text, seed);
    apply_add(text, &target.request(path), &mut ids).unwrap()
}

fn swift_path() -> impl Strategy<Value = String> {
    (
        prop::collection::vec("[A-Z][a-z]{1,6}", 0..3),
        "Gen[A-Z][A-Za-z0-9]{0,8}(\\+[A-Z][a-z]{1,5})?( [A-Z][a-z]{1,5})?",
    )
        .prop_map(|(dirs, stem)| {
            let mut path = dirs.join("/");
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&stem);
            path.push_str(".swift");
            path
        })
}

#[test]
fn fixtures_start_clean() {
    assert!(verify(MINIMAL).is_empty());
    assert!(verify(TWO_TARGETS).is_empty());
}

proptest! {
    #[test]
    fn prop_add_preserves_invariants(t in any_target(), path in swift_path(), seed in any::<u64>()) {
        let (out, report) = add(t.project, &t, &path, seed);
        prop_assert_eq!(report.inserted, 4);
        prop_assert!(verify(&out).is_empty(), "violations: {:?}", verify(&out));
    }

    #[test]
    fn prop_add_is_idempotent(t in any_target(), path in swift_path(), seed in any::<u64>()) {
        let (once, _) = add(t.project, &t, &path, seed);
        let (twice, report) = add(&once, &t, &path, seed.wrapping_add(1));
        prop_assert_eq!(report.inserted, 0);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_same_seed_same_bytes(t in any_target(), path in swift_path(), seed in any::<u64>()) {
        prop_assert_eq!(add(t.project, &t, &path, seed).0, add(t.project, &t, &path, seed).0);
    }

    #[test]
    fn prop_untouched_lines_survive(t in any_target(), path in swift_path(), seed in any::<u64>()) {
        let (out, report) = add(t.project, &t, &path, seed);
        let kept: Vec<&str> = out
            .split_inclusive('\n')
            .filter(|l| !l.contains(&report.file_id) && !l.contains(&report.build_id))
            .collect();
        prop_assert_eq!(kept.concat(), t.project);
    }

    #[test]
    fn prop_remove_then_add_restores_invariants(
        t in any_target(),
        path in swift_path(),
        seed in any::<u64>(),
    ) {
        let (added, report) = add(t.project, &t, &path, seed);
        let (removed, _) = apply_remove(
            &added,
            &[report.file_id.clone(), report.build_id.clone()],
        )
        .unwrap();
        prop_assert!(verify(&removed).is_empty());
        let (readded, _) = add(&removed, &t, &path, seed.wrapping_add(7));
        prop_assert!(verify(&readded).is_empty());
    }

    #[test]
    fn prop_readd_elsewhere_never_breaks_invariants(
        first in prop::sample::select(two_target_placements()),
        second in prop::sample::select(two_target_placements()),
        path in swift_path(),
        seed in any::<u64>(),
    ) {
        let (once, _) = add(TWO_TARGETS, &first, &path, seed);
        let mut ids = IdGen::seeded(&once, seed.wrapping_add(1));
        match apply_add(&once, &second.request(&path), &mut ids) {
            Ok((out, _)) => prop_assert!(verify(&out).is_empty(), "violations: {:?}", verify(&out)),
            Err(OpsError::AmbiguousTarget { .. }) => {}
            Err(e) => prop_assert!(false, "unexpected error: {e}"),
        }
    }

    #[test]
    fn prop_many_distinct_files_keep_invariants(
        t in any_target(),
        stems in prop::collection::hash_set("Gen[A-Z][a-z]{2,8}", 1..6),
        seed in any::<u64>(),
    ) {
        let mut text = t.project.to_string();
        let mut ids = IdGen::seeded(&text, seed);
        for stem in &stems {
            let (next, _) = apply_add(&text, &t.request(&format!("{stem}.swift")), &mut ids).unwrap();
            text = next;
        }
        prop_assert!(verify(&text).is_empty());
        prop_assert_eq!(text.lines().count(), t.project.lines().count() + 4 * stems.len());
    }
}
