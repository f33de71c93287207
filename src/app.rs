//! Page wiring: finds the card elements, installs listeners and keeps the running
//! card in a thread-local, the way the event callbacks reach it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, Node};

use crate::config::CardConfig;
use crate::dom::{self, BrowserTimers, DomStage, WebAudioSynth};
use crate::effects::celebration::{self, PRESS_RELEASE_MS, PRESS_SCALE, PULSE_DURATION_MS};
use crate::effects::hover::{FADE_KEYFRAMES, HoverEmitter};
use crate::effects::toggle::{self, CardController};
use crate::effects::{self, EffectEngine};
use crate::error::{CardError, Result};
use crate::scene::Timers;

type Engine = EffectEngine<DomStage, BrowserTimers>;

struct CardApp {
    // Distinguishes this card from an earlier one that was stopped.
    epoch: u64,
    controller: CardController<DomStage, WebAudioSynth>,
    engine: Engine,
    emitter: HoverEmitter<DomStage, BrowserTimers>,
    celebrate: HtmlElement,
    age: Option<HtmlElement>,
    // Each listener is removed from the page when dropped.
    _listeners: Vec<EventListener>,
}

thread_local! {
    static CARD: RefCell<Option<CardApp>> = const { RefCell::new(None) };
    static EPOCH: Cell<u64> = const { Cell::new(0) };
}

fn with_card(f: impl FnOnce(&mut CardApp)) {
    CARD.with(|cell| {
        if let Some(app) = cell.borrow_mut().as_mut() {
            f(app);
        }
    });
}

fn is_running() -> bool {
    CARD.with(|cell| cell.borrow().is_some())
}

/// Wire the card into the page. Fails with [`CardError::AlreadyStarted`] while a
/// card is running; call [`stop`] first to rewire.
pub fn start(config: CardConfig) -> Result<()> {
    if is_running() {
        return Err(CardError::AlreadyStarted);
    }
    config.validate()?;
    let win = dom::window()?;
    let doc = dom::document()?;
    let ids = config.elements.clone();

    let card = dom::html_element(&doc, &ids.card)?;
    let celebrate = dom::html_element(&doc, &ids.celebrate)?;
    let confetti_layer = dom::html_element(&doc, &ids.confetti_container)?;
    // The age badge is decoration; a card without one still works.
    let age = dom::html_element(&doc, &ids.age).ok();

    make_focusable(&card)?;
    install_fade_keyframes(&doc)?;
    respect_reduced_motion(&win, &doc);

    let config = Rc::new(config);
    let stage = DomStage::new(
        doc.clone(),
        card.clone(),
        confetti_layer,
        config.flipped_class.clone(),
        config.hover.clone(),
    );
    let timers = BrowserTimers;
    let engine = EffectEngine::new(
        stage.clone(),
        timers,
        effects::seeded_rng(),
        config.clone(),
    );

    if config.randomize_age {
        if let Some(age) = &age {
            let value = celebration::random_age(&mut *engine.rng().borrow_mut());
            age.set_text_content(Some(&value.to_string()));
        }
    }

    let epoch = EPOCH.with(|e| {
        e.set(e.get() + 1);
        e.get()
    });
    let app = CardApp {
        epoch,
        controller: CardController::new(stage, WebAudioSynth::new(), config.tone.clone()),
        emitter: HoverEmitter::new(engine.clone()),
        engine,
        celebrate: celebrate.clone(),
        age,
        _listeners: listeners(&doc, &card, &celebrate, &ids.celebrate),
    };
    CARD.with(|cell| *cell.borrow_mut() = Some(app));

    if let Some(delay) = config.auto_flip_after_ms {
        timers.after(
            delay,
            Box::new(move || {
                with_card(|app| {
                    if app.epoch == epoch {
                        app.controller.open();
                    }
                })
            }),
        );
    }

    tracing::info!("🎉 Happy Birthday! 🎂");
    tracing::info!("This card was made with ❤️ using modern web technologies!");
    Ok(())
}

/// Detach the running card: listeners are removed and hover emission stops.
/// Confetti and particles already on screen still expire on schedule.
/// Returns whether a card was running.
pub fn stop() -> bool {
    let app = CARD.with(|cell| cell.borrow_mut().take());
    let was_running = app.is_some();
    drop(app);
    if was_running {
        tracing::debug!("card stopped");
    }
    was_running
}

fn make_focusable(card: &HtmlElement) -> Result<()> {
    card.set_attribute("tabindex", "0")?;
    card.set_attribute("role", "button")?;
    card.set_attribute("aria-label", "Flip birthday card")?;
    Ok(())
}

fn install_fade_keyframes(doc: &Document) -> Result<()> {
    let Some(head) = doc.head() else {
        tracing::warn!("document has no <head>; hover particles will not fade");
        return Ok(());
    };
    let style = doc.create_element("style")?;
    style.set_text_content(Some(FADE_KEYFRAMES));
    head.append_child(&style)?;
    Ok(())
}

fn respect_reduced_motion(win: &web_sys::Window, doc: &Document) {
    let reduce = win
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|mq| mq.matches())
        .unwrap_or(false);
    if !reduce {
        return;
    }
    if let Some(body) = doc.body() {
        let _ = body.style().set_property("--animation-duration", "0.01s");
        tracing::debug!("reduced motion requested");
    }
}

fn listeners(
    doc: &Document,
    card: &HtmlElement,
    celebrate: &HtmlElement,
    celebrate_id: &str,
) -> Vec<EventListener> {
    // Card click flips, unless the click landed on the celebrate control.
    let selector = format!("#{celebrate_id}");
    let on_click = EventListener::new(card, "click", move |evt: &Event| {
        let on_celebrate = evt
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest(&selector).ok().flatten())
            .is_some();
        if on_celebrate {
            return;
        }
        with_card(|app| {
            app.controller.activate();
        });
    });

    // Celebrate: confetti plus button and age animations, without flipping.
    let on_celebrate = EventListener::new(celebrate, "click", |evt: &Event| {
        evt.stop_propagation();
        with_card(|app| {
            app.engine.burst();
            animate_celebration(app);
        });
    });

    // Enter / Space flip the card while it has focus.
    let card_focus = card.clone();
    let doc_focus = doc.clone();
    let on_key = EventListener::new(doc, "keydown", move |evt: &Event| {
        let Some(key) = evt.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
            return;
        };
        if !toggle::is_activation_key(&key) {
            return;
        }
        let card_node: &Node = card_focus.as_ref();
        let focused = doc_focus
            .active_element()
            .is_some_and(|el| el.is_same_node(Some(card_node)));
        if focused {
            with_card(|app| {
                app.controller.activate();
            });
        }
    });

    let on_enter = EventListener::new(card, "mouseenter", |_evt: &Event| {
        with_card(|app| app.emitter.enter());
    });
    let on_leave = EventListener::new(card, "mouseleave", |_evt: &Event| {
        with_card(|app| app.emitter.leave());
    });

    vec![on_click, on_celebrate, on_key, on_enter, on_leave]
}

fn animate_celebration(app: &CardApp) {
    let button = app.celebrate.clone();
    let _ = button
        .style()
        .set_property("transform", &celebration::scale_transform(PRESS_SCALE));
    app.engine.timers().after(
        PRESS_RELEASE_MS,
        Box::new(move || {
            let _ = button
                .style()
                .set_property("transform", &celebration::scale_transform(1.0));
        }),
    );
    if let Some(age) = &app.age {
        pulse_frame(age.clone(), None);
    }
}

/// One animation frame of the age wobble; re-arms itself until the pulse ends.
fn pulse_frame(el: HtmlElement, start: Option<f64>) {
    let Some(win) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move |ts: f64| {
        let start = start.unwrap_or(ts);
        let progress = (ts - start) / PULSE_DURATION_MS;
        let scale = celebration::pulse_scale(progress);
        let _ = el
            .style()
            .set_property("transform", &celebration::scale_transform(scale));
        if progress < 1.0 {
            pulse_frame(el, Some(start));
        }
    });
    let _ = win.request_animation_frame(callback.unchecked_ref());
}
