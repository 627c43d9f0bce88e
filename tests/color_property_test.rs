use memphis_colors::{AssignerConfig, ColorAssigner, Dom, Page};
use proptest::prelude::*;

const DEFAULT_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("MEMPHIS_COLORS_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PROPTEST_CASES)
}

fn text_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Z0-9 ]{1,24}",
        any::<String>(),
    ]
    .boxed()
}

// Text that survives an HTML round trip unchanged.
fn markup_text_strategy() -> BoxedStrategy<String> {
    "[a-zA-Z0-9 .,!?-]{0,24}".boxed()
}

fn memphis() -> ColorAssigner {
    match ColorAssigner::new(AssignerConfig::default()) {
        Ok(assigner) => assigner,
        Err(err) => panic!("default config must be valid: {err}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn compute_color_is_deterministic(seed in text_strategy(), key in text_strategy()) {
        let assigner = memphis();
        let first = assigner.compute_color(&seed, &key).clone();
        let second = assigner.compute_color(&seed, &key).clone();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn compute_color_is_always_a_palette_token(seed in text_strategy(), key in text_strategy()) {
        let assigner = memphis();
        let token = assigner.compute_color(&seed, &key);
        prop_assert!(assigner.palette().contains(token));
        prop_assert!(token.as_str().starts_with("var(--memphis-"));
    }

    #[test]
    fn only_the_concatenation_matters(seed in text_strategy(), key in text_strategy()) {
        let assigner = memphis();
        let joined = format!("{seed}{key}");
        prop_assert_eq!(
            assigner.compute_color(&seed, &key),
            assigner.compute_color("", &joined)
        );
    }

    #[test]
    fn absent_seed_matches_empty_seed(texts in proptest::collection::vec(markup_text_strategy(), 0..6)) {
        let items = texts
            .iter()
            .enumerate()
            .map(|(idx, text)| format!(r#"<span id="t{idx}" class="memphis-element">{text}</span>"#))
            .collect::<String>();
        let assigner = memphis();

        let mut absent = Dom::parse(&format!("<body>{items}</body>")).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut empty = Dom::parse(&format!(r#"<body data-color-seed="">{items}</body>"#)).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let absent_seed = assigner.read_seed(&absent);
        let empty_seed = assigner.read_seed(&empty);
        prop_assert_eq!(&absent_seed, "");
        prop_assert_eq!(&empty_seed, "");
        prop_assert_eq!(assigner.apply_colors(&mut absent, &absent_seed), texts.len());
        prop_assert_eq!(assigner.apply_colors(&mut empty, &empty_seed), texts.len());

        for (idx, text) in texts.iter().enumerate() {
            let absent_node = absent.by_id(&format!("t{idx}")).ok_or_else(|| TestCaseError::fail("missing node"))?;
            let empty_node = empty.by_id(&format!("t{idx}")).ok_or_else(|| TestCaseError::fail("missing node"))?;
            let absent_color = absent.style_get(absent_node, "color").map_err(|e| TestCaseError::fail(e.to_string()))?;
            let empty_color = empty.style_get(empty_node, "color").map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(&absent_color, &empty_color);
            prop_assert_eq!(absent_color.as_str(), assigner.compute_color("", text).as_str());
        }
    }

    #[test]
    fn swaps_recolor_consistently(
        seed in "[a-z0-9]{0,12}",
        before in proptest::collection::vec(markup_text_strategy(), 1..4),
        after in proptest::collection::vec(markup_text_strategy(), 1..4),
    ) {
        let render = |texts: &[String]| {
            texts
                .iter()
                .enumerate()
                .map(|(idx, text)| format!(r#"<b id="e{idx}" class="memphis-element">{text}</b>"#))
                .collect::<String>()
        };
        let html = format!(r#"<body data-color-seed="{seed}"><main id="main">{}</main></body>"#, render(&before));
        let mut page = Page::from_html(&html).map_err(|e| TestCaseError::fail(e.to_string()))?;
        memphis().install(&mut page);
        page.finish_loading().map_err(|e| TestCaseError::fail(e.to_string()))?;
        page.swap("#main", &render(&after)).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let expected = memphis();
        for (idx, text) in after.iter().enumerate() {
            let color = page.style(&format!("#e{idx}"), "color").map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(color.as_str(), expected.compute_color(&seed, text).as_str());
        }
    }
}
