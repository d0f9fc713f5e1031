//! Proptest generators for property-based testing.

use proptest::prelude::*;

use signpost_core::{Location, Method, Role, RoleSet, SubjectId, View};

/// A record name: non-empty, no `/`.
pub fn record_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,23}".prop_map(String::from)
}

/// A well-formed `domain\name` subject.
pub fn subject_id() -> impl Strategy<Value = SubjectId> {
    ("[a-z]{1,8}", "[a-z][a-z0-9.]{0,15}").prop_map(|(domain, name)| {
        SubjectId::from_parts(&domain, &name).expect("generated parts are valid")
    })
}

/// Any method the permission layer knows.
pub fn method() -> impl Strategy<Value = Method> {
    prop::sample::select(Method::ALL.to_vec())
}

/// A role drawn mostly from the well-known ones.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![
        3 => Just(Role::admin()),
        3 => Just(Role::user()),
        1 => "[a-z]{1,8}".prop_map(Role::new),
    ]
}

/// Zero to three roles.
pub fn role_set() -> impl Strategy<Value = RoleSet> {
    prop::collection::btree_set(role(), 0..=3)
}

/// A URL-ish string.
pub fn url() -> impl Strategy<Value = String> {
    "https://[a-z]{1,12}\\.example/[a-z0-9]{0,8}".prop_map(String::from)
}

/// A valid location referencing up to four views.
pub fn location() -> impl Strategy<Value = Location> {
    (
        record_name(),
        prop::collection::vec("[a-z0-9-]{1,12}", 0..4),
        prop::collection::vec(record_name(), 0..4),
    )
        .prop_map(|(name, monitors, views)| Location {
            name,
            monitors,
            views,
        })
}

/// A valid view whose timings, when present, pair with its urls.
pub fn view() -> impl Strategy<Value = View> {
    (
        record_name(),
        prop::collection::vec((url(), 1u32..=600), 0..5),
        any::<bool>(),
        any::<bool>(),
        prop::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,12}", 0..3),
    )
        .prop_map(|(name, pages, timed, reload, cookies)| {
            let (urls, timings): (Vec<String>, Vec<u32>) = pages.into_iter().unzip();
            View {
                name,
                urls,
                timings: if timed { timings } else { Vec::new() },
                cookies,
                reload,
            }
        })
}
