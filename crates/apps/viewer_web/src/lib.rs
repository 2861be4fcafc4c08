use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use layers::VisibilityMode;
use streaming::IonTileService;

pub mod config;
pub mod initializer;
mod net;
pub mod shell;
pub mod toggle;
pub mod viewer;
mod wgpu;

use config::ViewerConfig;
use initializer::{LoadOutcome, attach_tileset, load_transit};
use net::BrowserFetcher;
use shell::{PanelView, Shell, ShellEvents};
use viewer::Viewer;
use wgpu::init_wgpu_from_canvas;

#[derive(Debug, Default)]
struct AppState {
    viewer: Option<Rc<RefCell<Viewer>>>,
    shell: Option<Shell>,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();
static LOGGING_SET: OnceLock<()> = OnceLock::new();

fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&RefCell<AppState>) -> R,
    R: Default,
{
    STATE.try_with(f).unwrap_or_default()
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        set_once();
    });
}

fn init_logging() {
    LOGGING_SET.get_or_init(|| {
        #[cfg(target_arch = "wasm32")]
        tracing_wasm::set_as_global_default_with_config(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(tracing::Level::INFO)
                .build(),
        );
    });
}

fn current_viewer() -> Option<Rc<RefCell<Viewer>>> {
    with_state(|state| state.borrow().viewer.clone())
}

fn request_render() {
    log_skipped_frame(render_frame());
}

fn log_skipped_frame(result: Result<(), JsValue>) {
    if let Err(err) = result {
        debug!(error = ?err, "frame skipped");
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    init_panic_hook();
    init_logging();
    info!("viewer module loaded");
}

/// Mount the viewer with the build-time defaults.
#[wasm_bindgen]
pub fn mount() -> Result<(), JsValue> {
    mount_with(ViewerConfig::default())
}

/// Mount with overrides, given as a JSON string or a plain object.
#[wasm_bindgen]
pub fn mount_with_config(config: JsValue) -> Result<(), JsValue> {
    let json = match config.as_string() {
        Some(text) => text,
        None => js_sys::JSON::stringify(&config)
            .map(String::from)
            .unwrap_or_default(),
    };
    mount_with(ViewerConfig::from_json_or_default(&json))
}

fn mount_with(config: ViewerConfig) -> Result<(), JsValue> {
    init_panic_hook();
    init_logging();
    if current_viewer().is_some() {
        warn!("viewer already mounted");
        return Ok(());
    }

    let viewer = Rc::new(RefCell::new(Viewer::new(&config)));
    let shell = Shell::mount(
        &config.container_id,
        &PanelView::for_mode(VisibilityMode::Surface),
        ShellEvents {
            on_toggle: Box::new(|| {
                toggle_visibility();
            }),
            on_zoom: Box::new(|delta| log_skipped_frame(camera_zoom(delta))),
            on_look: Box::new(|dx, dy| log_skipped_frame(camera_look(dx, dy))),
        },
    )?;
    let (width, height) = shell.fit_canvas();
    viewer.borrow_mut().resize(width, height);
    let canvas = shell.canvas().clone();

    with_state(|state| {
        let mut s = state.borrow_mut();
        s.viewer = Some(viewer.clone());
        s.shell = Some(shell);
    });

    let surface_viewer = viewer.clone();
    spawn_local(async move {
        match init_wgpu_from_canvas(canvas).await {
            Ok(ctx) => {
                {
                    let mut v = surface_viewer.borrow_mut();
                    if v.is_destroyed() {
                        warn!("viewer released before the GPU surface was ready");
                        return;
                    }
                    v.set_surface(ctx);
                }
                request_render();
            }
            Err(err) => error!(error = ?err, "wgpu init failed"),
        }
    });

    let service = IonTileService::with_server(
        BrowserFetcher,
        config.tile_server.clone(),
        config.access_token(),
    );
    let asset_id = config.tileset_asset_id;
    let tiles_viewer = viewer.clone();
    spawn_local(async move {
        if let LoadOutcome::Attached(_) = attach_tileset(&tiles_viewer, &service, asset_id).await {
            request_render();
        }
    });

    let transit_url = config.transit_url.clone();
    spawn_local(async move {
        if let LoadOutcome::Attached(_) = load_transit(&viewer, &BrowserFetcher, &transit_url).await {
            request_render();
        }
    });

    info!(container = %config.container_id, "viewer mounted");
    Ok(())
}

/// Release the scene, the GPU surface and the panel. Safe to call twice.
#[wasm_bindgen]
pub fn unmount() {
    let (viewer, shell) = with_state(|state| {
        let mut s = state.borrow_mut();
        (s.viewer.take(), s.shell.take())
    });
    let Some(viewer) = viewer else {
        debug!("unmount without a mounted viewer");
        return;
    };
    viewer.borrow_mut().destroy();
    if let Some(shell) = shell {
        shell.remove();
    }
}

/// Flip between surface and X-Ray. Returns whether X-Ray is now active.
#[wasm_bindgen]
pub fn toggle_visibility() -> bool {
    let Some(viewer) = current_viewer() else {
        warn!("toggle without a mounted viewer");
        return false;
    };
    let mode = viewer.borrow_mut().press_toggle();
    with_state(|state| {
        if let Some(shell) = state.borrow().shell.as_ref()
            && let Err(err) = shell.apply(&PanelView::for_mode(mode))
        {
            error!(error = ?err, "panel update failed");
        }
    });
    request_render();
    mode.is_underground()
}

#[wasm_bindgen]
pub fn is_underground() -> bool {
    current_viewer().is_some_and(|viewer| viewer.borrow().mode().is_underground())
}

#[wasm_bindgen]
pub fn set_canvas_sizes(width: f64, height: f64) {
    if let Some(viewer) = current_viewer() {
        viewer.borrow_mut().resize(width as u32, height as u32);
    }
}

#[wasm_bindgen]
pub fn render_frame() -> Result<(), JsValue> {
    match current_viewer() {
        Some(viewer) => viewer.borrow_mut().render(),
        None => Ok(()),
    }
}

/// Zoom along the view direction. Intended usage: call with wheel deltaY.
#[wasm_bindgen]
pub fn camera_zoom(wheel_delta_y: f64) -> Result<(), JsValue> {
    if let Some(viewer) = current_viewer() {
        viewer.borrow_mut().zoom(wheel_delta_y);
    }
    render_frame()
}

/// Turn the camera in place. Intended usage: call with pointer delta in pixels.
#[wasm_bindgen]
pub fn camera_look(delta_x_px: f64, delta_y_px: f64) -> Result<(), JsValue> {
    if let Some(viewer) = current_viewer() {
        viewer.borrow_mut().look(delta_x_px, delta_y_px);
    }
    render_frame()
}

#[wasm_bindgen]
pub fn set_graticule_enabled(enabled: bool) -> Result<(), JsValue> {
    if let Some(viewer) = current_viewer()
        && !viewer.borrow_mut().set_graticule(enabled)
    {
        warn!("scene has no graticule");
    }
    render_frame()
}

/// Draw tileset root bounding volumes, tinted by the tileset style.
#[wasm_bindgen]
pub fn set_tile_bounds_enabled(enabled: bool) -> Result<(), JsValue> {
    if let Some(viewer) = current_viewer() {
        viewer.borrow_mut().set_tile_bounds(enabled);
    }
    render_frame()
}
