//! Property-based tests for identifiers and the output layout that embeds them

use proptest::prelude::*;
use scenesmith::artifact::{
    Identifier, IdentifierGenerator, OutputContract, OutputLayout, QualityTier,
};
use std::collections::HashSet;
use std::path::PathBuf;

fn contract(layout: OutputLayout, fps: u32) -> OutputContract {
    OutputContract {
        layout,
        media_root: PathBuf::from("/ws/manim/media"),
        video_dir: PathBuf::from("/ws/manim/videos"),
        quality: QualityTier::Medium,
        fps,
        scene_name: "SolutionAnimation".to_string(),
    }
}

proptest! {
    #[test]
    fn only_ten_lowercase_letters_parse(raw in "\\PC{0,16}") {
        let valid = raw.len() == 10 && raw.bytes().all(|b| b.is_ascii_lowercase());
        prop_assert_eq!(Identifier::parse(&raw).is_ok(), valid);
    }

    #[test]
    fn seeded_generator_output_always_parses(seed in any::<u64>()) {
        let generator = IdentifierGenerator::from_seed(seed);
        let mut seen = HashSet::new();
        for _ in 0..20 {
            let id = generator.next();
            prop_assert!(Identifier::parse(id.as_str()).is_ok());
            seen.insert(id);
        }
        // 26^10 space; 20 draws colliding would mean a broken generator
        prop_assert!(seen.len() >= 19);
    }

    /// The layout names each video after exactly the identifier it was rendered for.
    #[test]
    fn video_path_maps_back_to_its_identifier(
        raw in "[a-z]{10}",
        fps in 1u32..120,
        flat in any::<bool>(),
    ) {
        let layout = if flat { OutputLayout::Flat } else { OutputLayout::Nested };
        let contract = contract(layout, fps);
        let id = Identifier::parse(&raw).unwrap();
        let path = contract.video_path(&id);
        prop_assert_eq!(contract.identifier_of(&path), Some(raw));
    }

    #[test]
    fn nested_paths_from_other_profiles_are_not_claimed(
        raw in "[a-z]{10}",
        fps in 1u32..60,
    ) {
        let id = Identifier::parse(&raw).unwrap();
        let produced = contract(OutputLayout::Nested, fps).video_path(&id);
        let other = contract(OutputLayout::Nested, fps + 1);
        prop_assert_eq!(other.identifier_of(&produced), None);
    }
}
