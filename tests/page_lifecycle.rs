use std::rc::Rc;

use memphis_colors::{
    AssignerConfig, ColorAssigner, Error, HTMX_AFTER_SWAP, Page, READY_EVENT,
};

const PROFILE_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Directory</title></head>
<body data-color-seed="abc" hx-boost="true">
  <header><h1 id="title" class="memphis-element">Hello</h1></header>
  <main id="content">
    <ul>
      <li><span id="u1" class="memphis-element user">Ada</span></li>
      <li><span id="u2" class="memphis-element user" style="font-weight: bold">Grace</span></li>
    </ul>
  </main>
</body>
</html>
"#;

fn memphis() -> memphis_colors::Result<ColorAssigner> {
    ColorAssigner::new(AssignerConfig::default())
}

fn color_of(page: &Page, selector: &str) -> memphis_colors::Result<String> {
    page.style(selector, "color")
}

#[test]
fn colors_are_applied_when_the_page_becomes_ready() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(PROFILE_PAGE)?;
    memphis()?.install(&mut page);

    assert_eq!(color_of(&page, "#title")?, "");
    page.finish_loading()?;

    page.assert_style("#title", "color", "var(--memphis-purple)")?;
    let assigner = memphis()?;
    for id in ["u1", "u2"] {
        let selector = format!("#{id}");
        let text = page.text(&selector)?;
        page.assert_style(&selector, "color", assigner.compute_color("abc", &text).as_str())?;
    }
    Ok(())
}

#[test]
fn other_inline_declarations_survive() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(PROFILE_PAGE)?;
    memphis()?.install(&mut page);
    page.finish_loading()?;

    page.assert_style("#u2", "fontWeight", "bold")?;
    assert!(color_of(&page, "#u2")?.starts_with("var(--memphis-"));
    Ok(())
}

#[test]
fn repeated_application_is_stable() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(
        r#"<body data-color-seed="abc"><b id="only" class="memphis-element">Hello</b></body>"#,
    )?;
    let assigner = memphis()?;
    for _ in 0..5 {
        assert_eq!(assigner.apply_to_page(&mut page), 1);
        page.assert_style("#only", "color", "var(--memphis-purple)")?;
    }
    assert_eq!(
        page.attr("#only", "style")?.as_deref(),
        Some("color: var(--memphis-purple);")
    );
    Ok(())
}

#[test]
fn missing_seed_attribute_behaves_like_empty_seed() -> memphis_colors::Result<()> {
    let markup = |seed_attr: &str| {
        format!(
            r#"<body {seed_attr}><i id="a" class="memphis-element">Hello</i><i id="b" class="memphis-element">World</i></body>"#
        )
    };
    let mut absent = Page::from_html(&markup(""))?;
    let mut empty = Page::from_html(&markup(r#"data-color-seed="""#))?;
    let assigner = memphis()?;
    assigner.apply_to_page(&mut absent);
    assigner.apply_to_page(&mut empty);

    for selector in ["#a", "#b"] {
        assert_eq!(color_of(&absent, selector)?, color_of(&empty, selector)?);
    }
    absent.assert_style("#a", "color", "var(--memphis-orange)")?;
    Ok(())
}

#[test]
fn page_without_targets_is_left_untouched() -> memphis_colors::Result<()> {
    let html = r#"<body data-color-seed="abc"><p id="p" style="color: red">plain</p></body>"#;
    let mut page = Page::from_html(html)?;
    let before = page.dump_dom("body")?;
    memphis()?.install(&mut page);
    page.finish_loading()?;
    page.swap("#p", "still plain")?;

    page.assert_style("#p", "color", "red")?;
    assert_eq!(
        page.dump_dom("body")?,
        before.replace("plain</p>", "still plain</p>")
    );
    Ok(())
}

#[test]
fn swapped_content_is_recolored() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(PROFILE_PAGE)?;
    memphis()?.install(&mut page);
    page.finish_loading()?;

    page.swap(
        "#content",
        r#"<p><span id="n1" class="memphis-element">Hello</span><span id="n2" class="memphis-element">Linus</span></p>"#,
    )?;

    let assigner = memphis()?;
    page.assert_style("#n1", "color", "var(--memphis-purple)")?;
    page.assert_style("#n2", "color", assigner.compute_color("abc", "Linus").as_str())?;
    // Same text as the header, same color.
    assert_eq!(color_of(&page, "#n1")?, color_of(&page, "#title")?);
    Ok(())
}

#[test]
fn swap_picks_up_a_new_seed() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(PROFILE_PAGE)?;
    memphis()?.install(&mut page);
    page.finish_loading()?;

    page.set_attribute("body", "data-color-seed", "")?;
    page.swap("#content", r#"<b id="fresh" class="memphis-element">Hello</b>"#)?;

    page.assert_style("#fresh", "color", "var(--memphis-orange)")?;
    // Elements outside the swapped region are recolored with the new seed too.
    page.assert_style("#title", "color", "var(--memphis-orange)")?;
    Ok(())
}

#[test]
fn text_changes_are_reflected_on_the_next_swap() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(
        r#"<body data-color-seed="abc"><div id="slot"></div><em id="other" class="memphis-element">x</em></body>"#,
    )?;
    memphis()?.install(&mut page);
    page.finish_loading()?;
    page.assert_style("#other", "color", "var(--memphis-orange)")?;

    let other = page.select_one("#other")?;
    page.dom_mut().set_text_content(other, "Linus")?;
    page.swap("#slot", r#"<b id="chip" class="memphis-element">x</b>"#)?;

    page.assert_style("#chip", "color", "var(--memphis-orange)")?;
    page.assert_style("#other", "color", "var(--memphis-yellow)")?;
    Ok(())
}

#[test]
fn exactly_one_swap_listener_is_registered() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(PROFILE_PAGE)?;
    let assigner = Rc::new(memphis()?);
    Rc::clone(&assigner).install_shared(&mut page);

    let document = page.document();
    let body = page.select_one("body")?;
    assert_eq!(page.listener_count(document, READY_EVENT), 1);
    assert_eq!(page.listener_count(body, HTMX_AFTER_SWAP), 0);

    page.finish_loading()?;
    assert_eq!(page.listener_count(body, HTMX_AFTER_SWAP), 1);

    // A stray second ready signal must not add another listener.
    page.dispatch_event(document, READY_EVENT)?;
    assert_eq!(page.listener_count(body, HTMX_AFTER_SWAP), 1);
    Ok(())
}

#[test]
fn installing_after_load_runs_immediately() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(PROFILE_PAGE)?;
    page.finish_loading()?;
    memphis()?.install(&mut page);

    page.assert_style("#title", "color", "var(--memphis-purple)")?;
    let body = page.select_one("body")?;
    assert_eq!(page.listener_count(body, HTMX_AFTER_SWAP), 1);
    Ok(())
}

#[test]
fn swaps_before_ready_do_not_color() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(PROFILE_PAGE)?;
    memphis()?.install(&mut page);
    page.swap("#content", r#"<b id="early" class="memphis-element">Hello</b>"#)?;
    assert_eq!(color_of(&page, "#early")?, "");

    page.finish_loading()?;
    page.assert_style("#early", "color", "var(--memphis-purple)")?;
    Ok(())
}

#[test]
fn custom_swap_event_and_seed_host() -> memphis_colors::Result<()> {
    let config = AssignerConfig::default()
        .with_seed_host("#app")
        .with_swap_event("content:replaced");
    let mut page = Page::from_html(
        r#"<body data-color-seed="ignored"><div id="app" data-color-seed="abc"><div id="view"></div></div></body>"#,
    )?;
    ColorAssigner::new(config)?.install(&mut page);
    page.finish_loading()?;

    page.swap("#view", r#"<b id="b" class="memphis-element">Hello</b>"#)?;
    assert_eq!(color_of(&page, "#b")?, "");

    page.dispatch("#view", "content:replaced")?;
    page.assert_style("#b", "color", "var(--memphis-purple)")?;
    Ok(())
}

#[test]
fn page_without_seed_host_recolors_swaps() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(r#"<main id="main"><b id="a" class="memphis-element">Hello</b></main>"#)?;
    page.enable_trace(true);
    memphis()?.install(&mut page);
    page.finish_loading()?;

    page.assert_style("#a", "color", "var(--memphis-orange)")?;
    let logs = page.take_trace_logs();
    assert!(
        logs.iter()
            .any(|line| line == "[color] no body element; listening for swaps on document"),
        "{logs:?}"
    );
    let document = page.document();
    assert_eq!(page.listener_count(document, HTMX_AFTER_SWAP), 1);

    page.swap("#main", r#"<b id="n" class="memphis-element">World</b>"#)?;
    page.assert_style("#n", "color", "var(--memphis-pink)")?;
    Ok(())
}

#[test]
fn trace_records_assignments() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(
        r#"<body data-color-seed="abc"><b id="b" class="memphis-element">Hello</b></body>"#,
    )?;
    page.enable_trace(true);
    page.set_trace_events(false);
    memphis()?.install(&mut page);
    page.finish_loading()?;

    assert_eq!(
        page.take_trace_logs(),
        vec![
            "[color] #b -> var(--memphis-purple)".to_string(),
            "[color] applied 1 with seed \"abc\"".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn assertion_failures_carry_context() -> memphis_colors::Result<()> {
    let mut page = Page::from_html(
        r#"<body data-color-seed="abc"><b id="b" class="memphis-element">Hello</b></body>"#,
    )?;
    memphis()?.apply_to_page(&mut page);
    match page.assert_style("#b", "color", "var(--memphis-green)") {
        Err(Error::AssertionFailed {
            selector, actual, ..
        }) => {
            assert_eq!(selector, "#b");
            assert_eq!(actual, "var(--memphis-purple)");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}
