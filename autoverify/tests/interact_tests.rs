use autoverify::sim::{SimNode, SimPage};
use autoverify::{
    AutomationError, Bounds, ElementQuery, Interactor, Locator, Narrator, Pacing, ThoughtKind,
};
use std::sync::Arc;
use std::time::Duration;

fn interactor(page: &Arc<SimPage>) -> (Interactor, Narrator) {
    let narrator = Narrator::new();
    let engine: Arc<dyn autoverify::PageEngine> = page.clone();
    (
        Interactor::new(engine, narrator.clone(), Pacing::instant()),
        narrator,
    )
}

#[tokio::test]
async fn click_on_missing_element_narrates_and_returns_false() {
    let page = Arc::new(SimPage::new());
    let (interactor, narrator) = interactor(&page);

    let clicked = interactor
        .click(&ElementQuery::css("button.missing"), "the save button")
        .await
        .unwrap();

    assert!(!clicked);
    let events = narrator.events();
    assert_eq!(events[0].kind, ThoughtKind::Action);
    assert!(events[0].message.contains("Clicking the save button"));
    assert!(events[1].message.contains("Could not find the save button"));
}

#[tokio::test]
async fn click_on_disabled_control_is_a_hard_failure() {
    let page = Arc::new(SimPage::new());
    page.append(
        None,
        SimNode::new("button")
            .attr("data-action", "start")
            .text("Start")
            .disabled(true),
    );
    let (interactor, narrator) = interactor(&page);

    let result = interactor
        .click(
            &ElementQuery::css("button[data-action=\"start\"]"),
            "the start button",
        )
        .await;

    assert!(matches!(result, Err(AutomationError::ElementDisabled(_))));
    // The failure is narrated before it is raised.
    assert!(narrator
        .events()
        .iter()
        .any(|e| e.message.contains("disabled")));
}

#[tokio::test]
async fn fill_types_one_character_at_a_time() {
    let page = Arc::new(SimPage::new());
    let input = page.append(None, SimNode::new("input").attr("name", "notes"));
    let (interactor, _) = interactor(&page);

    let filled = interactor
        .fill(&ElementQuery::css("input[name=\"notes\"]"), "ok!", "notes")
        .await
        .unwrap();

    assert!(filled);
    let inputs = page.events_named("input");
    assert_eq!(inputs.len(), 3);
    assert_eq!(inputs[0].detail, "o");
    assert_eq!(inputs[1].detail, "ok");
    assert_eq!(inputs[2].detail, "ok!");
    assert_eq!(page.events_named("change").len(), 1);
    assert_eq!(page.read(|dom| dom.value_of(input)), "ok!");
}

#[tokio::test]
async fn resolution_falls_back_to_text_then_patterns() {
    let page = Arc::new(SimPage::new());
    let by_text = page.append(None, SimNode::new("button").text("Save & Continue"));
    let (interactor, _) = interactor(&page);

    // Direct CSS and attribute both miss; the text rung should hit.
    let query = ElementQuery::css("button.save")
        .or_attr("data-action", "save")
        .or_text("save & continue")
        .or_pattern("button");
    assert!(interactor.click(&query, "save").await.unwrap());
    assert_eq!(page.events_named("click")[0].node, by_text);

    // With no text either, the heuristic pattern is the last resort.
    page.clear_events();
    let query = ElementQuery::css("button.save").or_pattern("button");
    assert!(interactor.click(&query, "save").await.unwrap());
    assert_eq!(page.events_named("click").len(), 1);
}

#[tokio::test]
async fn click_with_fallback_tries_alternate_locator_once() {
    let page = Arc::new(SimPage::new());
    page.append(None, SimNode::new("button").class("alt").text("Go"));
    let (interactor, _) = interactor(&page);

    let clicked = interactor
        .click_with_fallback(
            &ElementQuery::css("button.primary"),
            &ElementQuery::css("button.alt"),
            "go",
        )
        .await
        .unwrap();

    assert!(clicked);
    assert_eq!(page.events_named("click").len(), 1);
}

#[tokio::test]
async fn offscreen_target_is_scrolled_into_view_before_click() {
    let page = Arc::new(SimPage::with_viewport(800.0, 600.0));
    page.append(
        None,
        SimNode::new("button")
            .class("far")
            .text("Far away")
            .bounds(Bounds::new(10.0, 3000.0, 120.0, 30.0)),
    );
    let (interactor, narrator) = interactor(&page);

    assert!(interactor
        .click(&ElementQuery::css("button.far"), "the far button")
        .await
        .unwrap());

    assert_eq!(page.events_named("scroll").len(), 1);
    assert!(narrator
        .events()
        .iter()
        .any(|e| e.message.contains("Scrolling the far button into view")));
}

#[tokio::test]
async fn wait_times_out_with_timeout_error() {
    let page = Arc::new(SimPage::new());
    let engine: Arc<dyn autoverify::PageEngine> = page.clone();
    let locator = Locator::new(engine, ElementQuery::css("#late"));

    let result = locator.wait(Some(Duration::from_millis(300))).await;
    match result {
        Err(AutomationError::Timeout(_)) => {}
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn wait_picks_up_element_added_while_polling() {
    let page = Arc::new(SimPage::new());
    let engine: Arc<dyn autoverify::PageEngine> = page.clone();
    let locator = Locator::new(engine, ElementQuery::css("#late"));

    let page_clone = page.clone();
    let adder = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(400)).await;
        page_clone.append(None, SimNode::new("div").id("late"));
    });

    let element = locator.wait(Some(Duration::from_secs(5))).await.unwrap();
    assert_eq!(element.attribute("id").await.unwrap().as_deref(), Some("late"));
    adder.await.unwrap();
}

#[tokio::test]
async fn choose_selects_option_and_fires_change() {
    let page = Arc::new(SimPage::new());
    let select = page.append(None, SimNode::new("select").attr("name", "status"));
    page.append(
        Some(select),
        SimNode::new("option")
            .attr("value", "requires_review")
            .text("Requires Review"),
    );
    let (interactor, _) = interactor(&page);

    let chosen = interactor
        .choose(
            &ElementQuery::css("select[name=\"status\"]"),
            "Requires Review",
            "the status dropdown",
        )
        .await
        .unwrap();

    assert!(chosen);
    assert_eq!(page.read(|dom| dom.value_of(select)), "requires_review");
    assert_eq!(page.events_named("change").len(), 1);

    let missing = interactor
        .choose(
            &ElementQuery::css("select[name=\"status\"]"),
            "Nonexistent",
            "the status dropdown",
        )
        .await
        .unwrap();
    assert!(!missing);
}
