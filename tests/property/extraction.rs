//! Property-based tests for fenced source extraction

use proptest::prelude::*;
use scenesmith::artifact::extract_source;
use scenesmith::error::PipelineError;

proptest! {
    /// Whatever sits between the fences comes back byte for byte.
    #[test]
    fn fenced_body_is_returned_verbatim(
        tag in "[a-z]{0,8}",
        body in "[a-zA-Z0-9 _=:()'\"\t\r\n`#]{0,200}",
    ) {
        let raw = format!("```{tag}\n{body}\n```");
        prop_assert_eq!(extract_source(&raw).unwrap(), body);
    }

    /// Trailing whitespace after the closing fence is tolerated.
    #[test]
    fn trailing_whitespace_after_fence_is_ignored(
        body in "[a-z =()\n]{0,80}",
        tail in "[ \n\t]{0,5}",
    ) {
        let raw = format!("```py\n{body}\n```{tail}");
        prop_assert_eq!(extract_source(&raw).unwrap(), body);
    }

    #[test]
    fn prose_before_the_fence_is_rejected(
        lead in "[a-zA-Z][a-zA-Z !.:]{0,40}",
        body in "[a-z =()]{0,40}",
    ) {
        let raw = format!("{lead}\n```py\n{body}\n```");
        prop_assert!(matches!(extract_source(&raw), Err(PipelineError::Format(_))));
    }

    #[test]
    fn unterminated_block_is_rejected(body in "[a-z =()]{1,60}") {
        let raw = format!("```py\n{body}");
        prop_assert!(matches!(extract_source(&raw), Err(PipelineError::Format(_))));
    }
}
