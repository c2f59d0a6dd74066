//! Property-based tests for profile resolution and composition.
//!
//! These tests use proptest to generate repository names and declaration
//! files and verify that resolution invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::compose::{strip_first_line, Composer};
    use crate::profile::{default_rules, parse_declarations, resolve, ProfileName, ProfileSet};
    use crate::source::MemorySource;
    use proptest::prelude::*;

    // ============================================================================
    // resolution property tests
    // ============================================================================

    proptest! {
        /// Property: base is always a member and always first
        #[test]
        fn base_is_always_first(name in ".*", decl in ".*") {
            let set = resolve(&name, &parse_declarations(&decl), &default_rules());
            let names = set.names();
            prop_assert_eq!(names[0].as_str(), "base");
            prop_assert_eq!(names.iter().filter(|n| n.as_str() == "base").count(), 1);
        }

        /// Property: a name containing a known pattern resolves to its profile
        #[test]
        fn matching_name_yields_profile(
            prefix in "[a-z0-9-]{0,12}",
            suffix in "[a-z0-9-]{0,12}",
            rule_idx in 0usize..9,
        ) {
            let rules = default_rules();
            let rule = &rules[rule_idx % rules.len()];
            let name = format!("{}{}{}", prefix, rule.pattern.to_uppercase(), suffix);
            let set = resolve(&name, &[], &rules);
            prop_assert!(set.contains(&rule.profile));
            prop_assert!(set.contains("base"));
        }

        /// Property: every non-blank, non-comment line becomes a member
        #[test]
        fn every_declared_line_is_a_member(
            lines in prop::collection::vec("[a-z][a-z0-9_-]{0,10}", 0..8),
            comments in prop::collection::vec("#[ -~]{0,20}", 0..4),
        ) {
            let mut text = String::new();
            for (i, line) in lines.iter().enumerate() {
                text.push_str(line);
                text.push('\n');
                if let Some(comment) = comments.get(i) {
                    text.push_str(comment);
                    text.push_str("\n\n");
                }
            }
            let set = resolve("unrelated", &parse_declarations(&text), &default_rules());
            for line in &lines {
                prop_assert!(set.contains(line), "missing {}", line);
            }
            for comment in &comments {
                prop_assert!(!set.contains(comment.trim()));
            }
        }

        /// Property: resolution is deterministic
        #[test]
        fn resolution_is_deterministic(name in ".*", decl in ".*") {
            let declared = parse_declarations(&decl);
            let first = resolve(&name, &declared, &default_rules());
            let second = resolve(&name, &declared, &default_rules());
            prop_assert_eq!(first, second);
        }

        /// Property: insertion order never changes iteration order
        #[test]
        fn set_order_is_independent_of_insertion_order(
            mut names in prop::collection::vec("[a-z]{1,8}", 0..8),
        ) {
            let forward: ProfileSet = names.iter().map(ProfileName::new).collect();
            names.reverse();
            let backward: ProfileSet = names.iter().map(ProfileName::new).collect();
            prop_assert_eq!(forward.names(), backward.names());
        }
    }

    // ============================================================================
    // composition property tests
    // ============================================================================

    proptest! {
        /// Property: profiles without an upstream fragment do not change the output
        #[test]
        fn missing_profiles_do_not_change_output(
            missing in prop::collection::vec("[a-z]{3,10}", 0..5),
        ) {
            let source = MemorySource::new().with_profile("base", "---\nrepos: []\n");
            let composer = Composer::new(&source);
            let requested: ProfileSet = missing.iter().map(ProfileName::new).collect();

            let with_missing = composer.compose(&requested).unwrap();
            let base_only = composer.compose(&ProfileSet::new()).unwrap();
            prop_assert_eq!(with_missing.text(), base_only.text());
        }

        /// Property: strip_first_line never keeps the first line's content
        #[test]
        fn strip_first_line_drops_header(header in "[^\n]*", body in ".*") {
            let fragment = format!("{}\n{}", header, body);
            prop_assert_eq!(strip_first_line(&fragment), body.as_str());
        }
    }
}
