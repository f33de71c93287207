//! Browser host: web-sys implementations of the [`crate::scene`] traits.

use std::cell::{Cell, RefCell};

use gloo::timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, AudioContextState, Document, HtmlElement, OscillatorType, Window};

use crate::config::HoverConfig;
use crate::effects::confetti::ConfettiPiece;
use crate::effects::hover::HoverParticle;
use crate::effects::tone::{Tone, Waveform};
use crate::error::{CardError, Result};
use crate::scene::{Stage, Synth, Timers};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(CardError::NoWindow)
}

pub fn document() -> Result<Document> {
    window()?.document().ok_or(CardError::NoDocument)
}

/// Look up an element by id and view it as an `HtmlElement`.
pub fn html_element(doc: &Document, id: &str) -> Result<HtmlElement> {
    doc.get_element_by_id(id)
        .ok_or_else(|| CardError::MissingElement(id.to_string()))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| CardError::MissingElement(id.to_string()))
}

pub fn set_styles(el: &HtmlElement, decls: &[(&'static str, String)]) -> Result<()> {
    let style = el.style();
    for (name, value) in decls {
        style.set_property(name, value)?;
    }
    Ok(())
}

/// The card, its confetti layer and the DOM nodes the effects draw into.
#[derive(Clone)]
pub struct DomStage {
    document: Document,
    card: HtmlElement,
    confetti_layer: HtmlElement,
    flipped_class: String,
    hover: HoverConfig,
}

impl DomStage {
    pub fn new(
        document: Document,
        card: HtmlElement,
        confetti_layer: HtmlElement,
        flipped_class: String,
        hover: HoverConfig,
    ) -> Self {
        Self {
            document,
            card,
            confetti_layer,
            flipped_class,
            hover,
        }
    }

    fn append(
        &self,
        parent: &HtmlElement,
        class: Option<&str>,
        decls: &[(&'static str, String)],
    ) -> Result<HtmlElement> {
        let el: HtmlElement = self
            .document
            .create_element("div")?
            .dyn_into()
            .map_err(|_| CardError::Js("div is not an HtmlElement".into()))?;
        if let Some(class) = class {
            el.class_list().add_1(class)?;
        }
        set_styles(&el, decls)?;
        parent.append_child(&el)?;
        Ok(el)
    }
}

impl Stage for DomStage {
    type Node = HtmlElement;

    fn attach_confetti(&self, piece: &ConfettiPiece) -> Option<HtmlElement> {
        self.append(
            &self.confetti_layer,
            Some(ConfettiPiece::CLASS),
            &piece.style(),
        )
        .map_err(|err| tracing::warn!("confetti piece {} not shown: {err}", piece.index))
        .ok()
    }

    fn attach_particle(&self, particle: &HoverParticle) -> Option<HtmlElement> {
        self.append(&self.card, None, &particle.style(&self.hover))
            .map_err(|err| tracing::warn!("hover particle not shown: {err}"))
            .ok()
    }

    fn detach(&self, node: &HtmlElement) {
        node.remove();
    }

    fn set_flipped(&self, flipped: bool) {
        if let Err(err) = self
            .card
            .class_list()
            .toggle_with_force(&self.flipped_class, flipped)
        {
            tracing::warn!("could not toggle .{}: {err:?}", self.flipped_class);
        }
    }
}

/// `setTimeout` / `setInterval` through gloo's owned timer handles.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimers;

impl Timers for BrowserTimers {
    /// Clears the interval when dropped.
    type Interval = Interval;

    fn after(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        let _ = Timeout::new(delay_ms, task).forget();
    }

    fn every(&self, period_ms: u32, mut task: Box<dyn FnMut()>) -> Interval {
        Interval::new(period_ms, move || task())
    }

    fn cancel(&self, handle: Interval) {
        drop(handle);
    }
}

/// Web Audio synth. One `AudioContext` is created lazily and shared; every tone
/// gets its own oscillator and gain node so voices never cut each other off.
#[derive(Default)]
pub struct WebAudioSynth {
    context: RefCell<Option<AudioContext>>,
    unavailable: Cell<bool>,
}

impl WebAudioSynth {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&self) -> Option<AudioContext> {
        if self.unavailable.get() {
            return None;
        }
        let mut slot = self.context.borrow_mut();
        if slot.is_none() {
            match AudioContext::new() {
                Ok(ctx) => *slot = Some(ctx),
                Err(err) => {
                    tracing::debug!("audio unavailable, flip tones disabled: {err:?}");
                    self.unavailable.set(true);
                    return None;
                }
            }
        }
        let ctx = slot.clone()?;
        // Autoplay policy may start the context suspended until a user gesture.
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    fn voice(ctx: &AudioContext, tone: &Tone) -> std::result::Result<(), JsValue> {
        let now = ctx.current_time();
        let end = now + tone.duration_s;

        let osc = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;
        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;

        osc.set_type(oscillator_type(tone.waveform));
        osc.frequency().set_value(tone.frequency_hz as f32);

        gain.gain().set_value_at_time(tone.start_gain as f32, now)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(tone.floor_gain as f32, end)?;

        osc.start_with_when(now)?;
        osc.stop_with_when(end)?;
        Ok(())
    }
}

impl Synth for WebAudioSynth {
    fn play(&self, tone: &Tone) {
        let Some(ctx) = self.context() else {
            return;
        };
        if let Err(err) = Self::voice(&ctx, tone) {
            tracing::debug!("tone at {} Hz not played: {err:?}", tone.frequency_hz);
        }
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Triangle => OscillatorType::Triangle,
    }
}
