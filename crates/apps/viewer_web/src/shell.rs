//! Full-viewport canvas with the X-Ray control panel overlaid on it.

use layers::VisibilityMode;

pub const CANVAS_ID: &str = "atlas-canvas-3d";

pub const PANEL_ICON: &str = "🚇";
pub const PANEL_TITLE: &str = "Brussels Underground";
pub const PANEL_SUBTITLE: &str = "Google 3D Tiles";

const SURFACE_STATUS: &str = "🏙️ Photorealistic Mode. Standard exploration with Google Earth data.";
const XRAY_STATUS: &str =
    "👁️ X-Ray Mode Active. The city surface is transparent to reveal the infrastructure.";

const ROOT_STYLE: &str = "width: 100vw; height: 100vh; position: relative; overflow: hidden;";
const CANVAS_STYLE: &str = "width: 100%; height: 100%; display: block; touch-action: none;";
const PANEL_STYLE: &str = "position: absolute; top: 20px; right: 20px; z-index: 100; \
    background: rgba(15, 23, 42, 0.85); backdrop-filter: blur(12px); \
    padding: 20px; border-radius: 16px; width: 300px; color: white; \
    font-family: 'Segoe UI', Roboto, Helvetica, sans-serif; \
    box-shadow: 0 8px 32px rgba(0, 0, 0, 0.4); border: 1px solid rgba(255, 255, 255, 0.1);";
const HEADER_STYLE: &str = "display: flex; align-items: center; margin-bottom: 15px;";
const ICON_STYLE: &str = "font-size: 28px; margin-right: 12px;";
const TITLE_STYLE: &str = "margin: 0; font-size: 18px; font-weight: 700; letter-spacing: -0.5px;";
const SUBTITLE_STYLE: &str =
    "font-size: 11px; color: #94a3b8; text-transform: uppercase; letter-spacing: 1px;";
const STATUS_STYLE: &str = "margin-bottom: 20px; font-size: 13px; line-height: 1.6; color: #cbd5e1;";
const BUTTON_STYLE: &str = "color: white; border: none; padding: 14px 0; width: 100%; \
    border-radius: 10px; cursor: pointer; font-weight: 700; font-size: 14px; \
    letter-spacing: 0.5px; transition: transform 0.2s, box-shadow 0.2s; \
    box-shadow: 0 4px 12px rgba(0, 0, 0, 0.3);";

pub const HOVER_TRANSFORM: &str = "translateY(-2px)";
pub const REST_TRANSFORM: &str = "translateY(0)";

/// Everything the panel shows for one visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelView {
    pub status: &'static str,
    pub button_label: &'static str,
    pub button_background: &'static str,
}

impl PanelView {
    pub fn for_mode(mode: VisibilityMode) -> Self {
        match mode {
            VisibilityMode::Surface => Self {
                status: SURFACE_STATUS,
                button_label: "Explore Underground",
                button_background: "linear-gradient(135deg, #f43f5e 0%, #e11d48 100%)",
            },
            VisibilityMode::Underground => Self {
                status: XRAY_STATUS,
                button_label: "Back to Surface",
                button_background: "linear-gradient(135deg, #06b6d4 0%, #3b82f6 100%)",
            },
        }
    }

    pub fn button_style(&self) -> String {
        format!("{BUTTON_STYLE} background: {};", self.button_background)
    }
}

/// Callbacks wired to the panel button and canvas gestures.
pub struct ShellEvents {
    pub on_toggle: Box<dyn Fn()>,
    pub on_zoom: Box<dyn Fn(f64)>,
    pub on_look: Box<dyn Fn(f64, f64)>,
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use std::cell::Cell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, EventTarget, HtmlCanvasElement, HtmlElement};

    use super::*;

    struct Listener {
        target: EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl Listener {
        fn attach(
            target: &EventTarget,
            event: &'static str,
            handler: impl FnMut(web_sys::Event) + 'static,
        ) -> Result<Self, JsValue> {
            let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
            target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            Ok(Self {
                target: target.clone(),
                event,
                closure,
            })
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
        }
    }

    pub struct Shell {
        root: HtmlElement,
        canvas: HtmlCanvasElement,
        status: Element,
        button: HtmlElement,
        _listeners: Vec<Listener>,
    }

    impl std::fmt::Debug for Shell {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Shell")
                .field("listeners", &self._listeners.len())
                .finish_non_exhaustive()
        }
    }

    fn element(document: &Document, tag: &str, style: &str) -> Result<Element, JsValue> {
        let el = document.create_element(tag)?;
        el.set_attribute("style", style)?;
        Ok(el)
    }

    impl Shell {
        /// Build the viewport inside `container_id`, creating the container if absent.
        pub fn mount(container_id: &str, view: &PanelView, events: ShellEvents) -> Result<Shell, JsValue> {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
            let document = window
                .document()
                .ok_or_else(|| JsValue::from_str("document missing"))?;
            let body = document
                .body()
                .ok_or_else(|| JsValue::from_str("document body missing"))?;

            let root = match document.get_element_by_id(container_id) {
                Some(existing) => existing,
                None => {
                    let created = document.create_element("div")?;
                    created.set_id(container_id);
                    body.append_child(&created)?;
                    created
                }
            };
            root.set_attribute("style", ROOT_STYLE)?;
            let root: HtmlElement = root.dyn_into()?;

            let canvas: HtmlCanvasElement = element(&document, "canvas", CANVAS_STYLE)?.dyn_into()?;
            canvas.set_id(CANVAS_ID);
            root.append_child(&canvas)?;

            let panel = element(&document, "div", PANEL_STYLE)?;
            let header = element(&document, "div", HEADER_STYLE)?;
            let icon = element(&document, "span", ICON_STYLE)?;
            icon.set_text_content(Some(PANEL_ICON));
            let titles = document.create_element("div")?;
            let title = element(&document, "h3", TITLE_STYLE)?;
            title.set_text_content(Some(PANEL_TITLE));
            let subtitle = element(&document, "span", SUBTITLE_STYLE)?;
            subtitle.set_text_content(Some(PANEL_SUBTITLE));
            titles.append_child(&title)?;
            titles.append_child(&subtitle)?;
            header.append_child(&icon)?;
            header.append_child(&titles)?;

            let status = element(&document, "div", STATUS_STYLE)?;
            let button: HtmlElement = document.create_element("button")?.dyn_into()?;

            panel.append_child(&header)?;
            panel.append_child(&status)?;
            panel.append_child(&button)?;
            root.append_child(&panel)?;

            let mut listeners = Vec::new();
            let ShellEvents {
                on_toggle,
                on_zoom,
                on_look,
            } = events;

            listeners.push(Listener::attach(&button, "click", move |_| on_toggle())?);
            let lift = button.clone();
            listeners.push(Listener::attach(&button, "mouseenter", move |_| {
                let _ = lift.style().set_property("transform", HOVER_TRANSFORM);
            })?);
            let rest = button.clone();
            listeners.push(Listener::attach(&button, "mouseleave", move |_| {
                let _ = rest.style().set_property("transform", REST_TRANSFORM);
            })?);

            listeners.push(Listener::attach(&canvas, "wheel", move |event| {
                if let Some(wheel) = event.dyn_ref::<web_sys::WheelEvent>() {
                    event.prevent_default();
                    on_zoom(wheel.delta_y());
                }
            })?);

            let last: Rc<Cell<Option<(f64, f64)>>> = Rc::new(Cell::new(None));
            let down = last.clone();
            listeners.push(Listener::attach(&canvas, "pointerdown", move |event| {
                if let Some(p) = event.dyn_ref::<web_sys::PointerEvent>() {
                    down.set(Some((p.client_x() as f64, p.client_y() as f64)));
                }
            })?);
            let moving = last.clone();
            listeners.push(Listener::attach(&canvas, "pointermove", move |event| {
                let (Some(p), Some((x0, y0))) = (event.dyn_ref::<web_sys::PointerEvent>(), moving.get())
                else {
                    return;
                };
                let (x, y) = (p.client_x() as f64, p.client_y() as f64);
                moving.set(Some((x, y)));
                on_look(x - x0, y - y0);
            })?);
            for event in ["pointerup", "pointerleave", "pointercancel"] {
                let up = last.clone();
                listeners.push(Listener::attach(&canvas, event, move |_| up.set(None))?);
            }

            let shell = Shell {
                root,
                canvas,
                status,
                button,
                _listeners: listeners,
            };
            shell.apply(view)?;
            Ok(shell)
        }

        pub fn apply(&self, view: &PanelView) -> Result<(), JsValue> {
            self.status.set_text_content(Some(view.status));
            self.button.set_text_content(Some(view.button_label));
            self.button.set_attribute("style", &view.button_style())
        }

        pub fn canvas(&self) -> &HtmlCanvasElement {
            &self.canvas
        }

        /// Canvas size in device pixels, following the container.
        pub fn fit_canvas(&self) -> (u32, u32) {
            let ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            let width = (self.root.client_width() as f64 * ratio).max(1.0) as u32;
            let height = (self.root.client_height() as f64 * ratio).max(1.0) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            (width, height)
        }

        pub fn remove(self) {
            self.root.set_inner_html("");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use wasm_bindgen::prelude::JsValue;

    use super::{PanelView, ShellEvents};

    #[derive(Debug)]
    pub struct Shell {
        never: std::convert::Infallible,
    }

    impl Shell {
        pub fn mount(
            _container_id: &str,
            _view: &PanelView,
            _events: ShellEvents,
        ) -> Result<Shell, JsValue> {
            Err(JsValue::from_str("the shell is only available on wasm32 targets"))
        }

        pub fn apply(&self, _view: &PanelView) -> Result<(), JsValue> {
            Ok(())
        }

        pub fn canvas(&self) -> &web_sys::HtmlCanvasElement {
            match self.never {}
        }

        pub fn fit_canvas(&self) -> (u32, u32) {
            (1, 1)
        }

        pub fn remove(self) {}
    }
}

pub use imp::Shell;
