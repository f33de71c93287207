// Browser tests for the DOM host. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use gloo_timers::future::TimeoutFuture;
use greeting_card::config::HoverConfig;
use greeting_card::dom::{self, DomStage, WebAudioSynth};
use greeting_card::effects::{ConfettiPiece, HoverParticle, Shape, Tone, ToggleState};
use greeting_card::scene::{Stage, Synth};
use greeting_card::{CardError, start_card, start_card_with_config, stop_card};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Event, HtmlElement, KeyboardEvent, KeyboardEventInit};

wasm_bindgen_test_configure!(run_in_browser);

fn fixture() -> (DomStage, HtmlElement, HtmlElement) {
    let doc = dom::document().unwrap();
    let card: HtmlElement = doc.create_element("div").unwrap().dyn_into().unwrap();
    let layer: HtmlElement = doc.create_element("div").unwrap().dyn_into().unwrap();
    let body = doc.body().unwrap();
    body.append_child(&card).unwrap();
    body.append_child(&layer).unwrap();
    let stage = DomStage::new(
        doc,
        card.clone(),
        layer.clone(),
        "flipped".into(),
        HoverConfig::default(),
    );
    (stage, card, layer)
}

#[wasm_bindgen_test]
fn confetti_is_attached_and_detached() {
    let (stage, _card, layer) = fixture();
    let piece = ConfettiPiece {
        index: 0,
        left_pct: 40.0,
        color: "#667eea".into(),
        shape: Shape::Triangle,
        delay_s: 0.1,
        duration_s: 2.5,
        spawn_at_ms: 0,
    };
    let node = stage.attach_confetti(&piece).unwrap();
    assert_eq!(layer.child_element_count(), 1);
    assert!(node.class_list().contains("confetti"));
    assert_eq!(node.style().get_property_value("left").unwrap(), "40%");
    stage.detach(&node);
    assert_eq!(layer.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn particles_land_on_the_card() {
    let (stage, card, _layer) = fixture();
    let node = stage
        .attach_particle(&HoverParticle {
            left_pct: 10.0,
            top_pct: 90.0,
        })
        .unwrap();
    assert_eq!(card.child_element_count(), 1);
    assert_eq!(node.style().get_property_value("pointer-events").unwrap(), "none");
    stage.detach(&node);
    assert_eq!(card.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn flip_class_follows_state() {
    let (stage, card, _layer) = fixture();
    stage.set_flipped(true);
    assert!(card.class_list().contains("flipped"));
    stage.set_flipped(false);
    assert!(!card.class_list().contains("flipped"));
}

#[wasm_bindgen_test]
fn synth_never_panics() {
    let synth = WebAudioSynth::new();
    let tone = Tone::for_state(ToggleState::Opened, &Default::default());
    synth.play(&tone);
    synth.play(&tone);
}

// -----------------------------------------------------------------------------
// Page wiring
// -----------------------------------------------------------------------------

const PAGE: &str = r#"
    <div id="cardWrapper">
        <span id="ageNumber">25</span>
        <button id="celebrateBtn"><span id="celebrateLabel">Celebrate</span></button>
    </div>
    <div id="confettiContainer"></div>
"#;

/// Fresh copy of the card markup, with any card from an earlier test stopped.
fn page() -> HtmlElement {
    stop_card();
    let doc = dom::document().unwrap();
    if let Some(old) = doc.get_element_by_id("cardHost") {
        old.remove();
    }
    let host = doc.create_element("div").unwrap();
    host.set_id("cardHost");
    host.set_inner_html(PAGE);
    doc.body().unwrap().append_child(&host).unwrap();
    by_id("cardWrapper")
}

fn by_id(id: &str) -> HtmlElement {
    dom::document()
        .unwrap()
        .get_element_by_id(id)
        .unwrap()
        .dyn_into()
        .unwrap()
}

fn is_flipped(card: &HtmlElement) -> bool {
    card.class_list().contains("flipped")
}

fn press(target: &HtmlElement, key: &str) {
    let init = KeyboardEventInit::new();
    init.set_key(key);
    init.set_bubbles(true);
    let evt = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    target.dispatch_event(&evt).unwrap();
}

#[wasm_bindgen_test]
fn card_gets_accessibility_attributes() {
    let card = page();
    start_card().unwrap();
    assert_eq!(card.get_attribute("tabindex").as_deref(), Some("0"));
    assert_eq!(card.get_attribute("role").as_deref(), Some("button"));
    assert_eq!(card.get_attribute("aria-label").as_deref(), Some("Flip birthday card"));
    stop_card();
}

#[wasm_bindgen_test]
fn fade_keyframes_are_injected() {
    page();
    start_card().unwrap();
    let head = dom::document().unwrap().head().unwrap();
    let styles = head.get_elements_by_tag_name("style");
    let injected = (0..styles.length())
        .filter_map(|i| styles.item(i))
        .filter_map(|el| el.text_content())
        .any(|css| css.contains("@keyframes particleFade"));
    assert!(injected);
    stop_card();
}

#[wasm_bindgen_test]
fn card_click_toggles_but_celebrate_click_does_not() {
    let card = page();
    start_card().unwrap();

    card.click();
    assert!(is_flipped(&card));
    by_id("ageNumber").click();
    assert!(!is_flipped(&card), "clicks on card content still toggle");

    by_id("celebrateBtn").click();
    by_id("celebrateLabel").click();
    assert!(!is_flipped(&card));
    assert!(by_id("confettiContainer").child_element_count() > 0);
    stop_card();
}

#[wasm_bindgen_test]
fn activation_keys_need_card_focus() {
    let card = page();
    start_card().unwrap();

    card.blur().unwrap();
    press(&card, "Enter");
    assert!(!is_flipped(&card), "unfocused card ignores Enter");

    card.focus().unwrap();
    press(&card, "Enter");
    assert!(is_flipped(&card));
    press(&card, " ");
    assert!(!is_flipped(&card));
    press(&card, "a");
    press(&card, "Escape");
    press(&card, "Tab");
    assert!(!is_flipped(&card));
    stop_card();
}

#[wasm_bindgen_test]
fn second_start_is_rejected_until_stopped() {
    let card = page();
    start_card().unwrap();
    let err = start_card().unwrap_err();
    assert_eq!(err.as_string(), Some(CardError::AlreadyStarted.to_string()));

    // still exactly one click listener: one click, one flip
    card.click();
    assert!(is_flipped(&card));

    assert!(stop_card());
    assert!(!stop_card());
    card.click();
    assert!(is_flipped(&card), "listeners are gone after stop");

    // a restarted card begins closed, so its first click applies the class again
    start_card().unwrap();
    card.click();
    assert!(is_flipped(&card));
    card.click();
    assert!(!is_flipped(&card));
    stop_card();
}

#[wasm_bindgen_test]
async fn stopping_ends_hover_emission() {
    let card = page();
    start_card().unwrap();
    let baseline = card.child_element_count();

    card.dispatch_event(&Event::new("mouseenter").unwrap()).unwrap();
    TimeoutFuture::new(350).await;
    assert!(card.child_element_count() > baseline);

    stop_card();
    TimeoutFuture::new(1300).await;
    assert_eq!(card.child_element_count(), baseline, "no particles after stop");
}

#[wasm_bindgen_test]
async fn auto_flip_opens_a_closed_card() {
    let card = page();
    start_card_with_config(r#"{ "auto_flip_after_ms": 50 }"#).unwrap();
    assert!(!is_flipped(&card));
    TimeoutFuture::new(150).await;
    assert!(is_flipped(&card));
    stop_card();
}

#[wasm_bindgen_test]
async fn auto_flip_leaves_an_opened_card_alone() {
    let card = page();
    start_card_with_config(r#"{ "auto_flip_after_ms": 100 }"#).unwrap();
    card.click();
    assert!(is_flipped(&card));
    TimeoutFuture::new(200).await;
    assert!(is_flipped(&card), "auto flip must not close the card");
    stop_card();
}

#[wasm_bindgen_test]
async fn celebrate_button_springs_back() {
    page();
    start_card().unwrap();
    let button = by_id("celebrateBtn");
    button.click();
    assert_eq!(button.style().get_property_value("transform").unwrap(), "scale(0.95)");
    TimeoutFuture::new(260).await;
    assert_eq!(button.style().get_property_value("transform").unwrap(), "scale(1)");
    stop_card();
}
