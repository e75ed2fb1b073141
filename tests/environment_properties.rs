// tests/environment_properties.rs

use std::path::Path;

use proptest::prelude::*;

use devrun::config::{PathsSection, SessionSection, DEFAULT_ASSETS_PREFIX};
use devrun::env::compose::{backend_overlay, frontend_overlay};
use devrun::env::{EnvMap, ProjectLayout, ASSETS_PREFIX_VAR, DEBUG_VAR};

fn layout() -> ProjectLayout {
    ProjectLayout::new(Path::new("/proj"), Path::new("/"), &PathsSection::default())
}

fn env_strategy() -> impl Strategy<Value = EnvMap> {
    (
        prop::collection::btree_map("[A-Z_]{1,8}", "[ -~]{0,12}", 0..12),
        prop::option::of("[a-z:/.0-9]{1,20}"),
    )
        .prop_map(|(mut env, prefix)| {
            env.remove(ASSETS_PREFIX_VAR);
            if let Some(prefix) = prefix {
                env.insert(ASSETS_PREFIX_VAR.to_string(), prefix);
            }
            env
        })
}

proptest! {
    #[test]
    fn composing_twice_changes_nothing(base in env_strategy()) {
        let session = SessionSection::default();
        let layout = layout();

        for overlay in [backend_overlay(&layout, &session), frontend_overlay(&session)] {
            let once = overlay.apply(&base);
            let twice = overlay.apply(once.as_map());
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn inherited_assets_prefix_is_preserved(base in env_strategy()) {
        let session = SessionSection::default();
        let backend = backend_overlay(&layout(), &session).apply(&base);
        let frontend = frontend_overlay(&session).apply(&base);

        let expected = base
            .get(ASSETS_PREFIX_VAR)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ASSETS_PREFIX);
        prop_assert_eq!(backend.get(ASSETS_PREFIX_VAR), Some(expected));
        prop_assert_eq!(frontend.get(ASSETS_PREFIX_VAR), Some(expected));
    }

    #[test]
    fn unrelated_variables_pass_through(base in env_strategy()) {
        let session = SessionSection::default();
        let backend = backend_overlay(&layout(), &session).apply(&base);
        let frontend = frontend_overlay(&session).apply(&base);

        prop_assert_eq!(backend.get(DEBUG_VAR), Some("true"));
        for (key, value) in &base {
            prop_assert_eq!(frontend.get(key), Some(value.as_str()));
        }
        let extra = frontend.as_map().len() - base.len();
        prop_assert!(extra <= 1);
    }
}
