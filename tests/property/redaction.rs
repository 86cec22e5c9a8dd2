//! Property-based tests for path redaction in CLI error output

use proptest::prelude::*;
use scenesmith::cli::redact_paths;

proptest! {
    #[test]
    fn absolute_paths_are_reduced_to_file_names(
        dirs in prop::collection::vec("[a-zA-Z0-9_.-]{1,12}", 1..6),
        file in "[a-z]{10}\\.py",
    ) {
        let path = format!("/{}/{}", dirs.join("/"), file);
        let text = format!("  File \"{path}\", line 3, in construct");
        let redacted = redact_paths(&text);
        prop_assert_eq!(
            redacted,
            format!("  File \"<…>/{file}\", line 3, in construct")
        );
    }

    #[test]
    fn text_without_slashes_is_unchanged(text in "[a-zA-Z0-9 ,.:()'\"\n]{0,120}") {
        prop_assert_eq!(redact_paths(&text), text);
    }
}
