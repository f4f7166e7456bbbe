use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement, HtmlTextAreaElement, MouseEvent, PointerEvent, WheelEvent};
use yew::prelude::*;

use crate::app_core::AppCore;
use crate::app_router;
use crate::app_runtime;
use crate::boot;
use crate::boot_runtime::{self, BootState};
use crate::input::{self, DragGate, WHEEL_ZOOM_STEP};
use crate::persisted_store;
use crate::runtime::{draft_record_to_values, CoreAction};
use crate::save_runtime::{self, FetchSaveGateway};
use hivemark_core::geo::{self, LatLng};
use hivemark_core::tiles::{self, SCALE_BAR_MAX_PX};
use hivemark_core::{FieldKind, FieldSpec, Marker, MarkerId, MarkerOrigin, SavePhase, FIELD_FILE};

/// Boots the widget and mounts the view: configuration, remembered viewport,
/// seed markers, draft recovery, save transport, then render.
pub(crate) fn run() {
    boot::set_phase("config", "loading configuration");
    boot_runtime::set_boot_state(BootState::LoadingConfig);
    let mut config = app_router::load_init_config();
    if !app_router::has_view_query() {
        if let Some(record) = persisted_store::load_view_record() {
            config.center = LatLng::new(record.lat, record.lng);
            config.zoom = tiles::clamp_zoom(record.zoom);
        }
    }
    app_runtime::set_init_config(config.clone());

    let core = AppCore::new(config.center, config.zoom);

    boot::set_phase("seeds", "placing hive markers");
    boot_runtime::set_boot_state(BootState::SeedingMarkers);
    let seeds = app_router::load_seed_locations();
    #[cfg(target_arch = "wasm32")]
    gloo::console::log!("seed markers placed", seeds.len() as u32);
    core.seed_markers(&seeds);
    if let Some(record) = persisted_store::load_draft_record() {
        core.restore_draft(draft_record_to_values(&record));
    }

    save_runtime::init(core.clone(), Rc::new(FetchSaveGateway::new()));
    boot_runtime::set_boot_state(BootState::Ready);
    boot::ready();

    yew::Renderer::<App>::with_props(AppProps { core }).render();
}

#[derive(Properties)]
pub(crate) struct AppProps {
    pub(crate) core: Rc<AppCore>,
}

impl PartialEq for AppProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let core = props.core.clone();
    let config = app_runtime::init_config();
    let snapshot = use_state(|| core.snapshot());
    {
        let core = core.clone();
        let snapshot = snapshot.clone();
        use_effect_with((), move |_| {
            let subscription = core.subscribe(Rc::new({
                let core = core.clone();
                move || snapshot.set(core.snapshot())
            }));
            move || drop(subscription)
        });
    }

    let boot_ready = use_state(|| matches!(boot_runtime::boot_state(), BootState::Ready));
    {
        let boot_ready = boot_ready.clone();
        use_effect_with((), move |_| {
            let hook = Rc::new(move || {
                boot_ready.set(matches!(boot_runtime::boot_state(), BootState::Ready));
            });
            let id = boot_runtime::add_boot_state_hook(hook);
            move || boot_runtime::remove_boot_state_hook(id)
        });
    }

    let map_ref = use_node_ref();
    {
        let core = core.clone();
        let map_ref = map_ref.clone();
        use_effect_with((), move |_| {
            let measure = Rc::new(move || {
                if let Some(element) = map_ref.cast::<Element>() {
                    let rect = element.get_bounding_client_rect();
                    core.set_viewport_size(rect.width(), rect.height());
                }
            });
            measure();
            let listener = web_sys::window().map(|window| {
                let measure = measure.clone();
                EventListener::new(&window, "resize", move |_| measure())
            });
            move || drop(listener)
        });
    }

    // wheel needs a non-passive listener on the element itself; delegated
    // handlers cannot cancel the page scroll
    {
        let core = core.clone();
        let map_ref = map_ref.clone();
        use_effect_with((), move |_| {
            let listener = map_ref.cast::<Element>().map(|element| {
                let target = element.clone();
                EventListener::new_with_options(
                    &element,
                    "wheel",
                    EventListenerOptions::enable_prevent_default(),
                    move |event| {
                        let Some(event) = event.dyn_ref::<WheelEvent>() else {
                            return;
                        };
                        event.prevent_default();
                        let rect = target.get_bounding_client_rect();
                        let anchor_dx = event.client_x() as f64 - rect.left() - rect.width() / 2.0;
                        let anchor_dy = event.client_y() as f64 - rect.top() - rect.height() / 2.0;
                        let delta = if event.delta_y() < 0.0 {
                            WHEEL_ZOOM_STEP
                        } else {
                            -WHEEL_ZOOM_STEP
                        };
                        core.zoom_by(delta, anchor_dx, anchor_dy);
                    },
                )
            });
            move || drop(listener)
        });
    }

    let drag = use_mut_ref(|| None::<PanDrag>);

    let on_pointer_down = {
        let drag = drag.clone();
        Callback::from(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let x = event.client_x() as f64;
            let y = event.client_y() as f64;
            *drag.borrow_mut() = Some(PanDrag {
                gate: DragGate::new(x, y),
                last: (x, y),
            });
        })
    };
    let on_pointer_move = {
        let core = core.clone();
        let drag = drag.clone();
        Callback::from(move |event: PointerEvent| {
            let mut drag = drag.borrow_mut();
            let Some(state) = drag.as_mut() else {
                return;
            };
            let x = event.client_x() as f64;
            let y = event.client_y() as f64;
            if state.gate.update(x, y) {
                core.pan_by(x - state.last.0, y - state.last.1);
            }
            state.last = (x, y);
        })
    };
    let on_pointer_up = {
        let core = core.clone();
        let drag = drag.clone();
        Callback::from(move |_event: PointerEvent| {
            // a click on the bare map (no pan happened) dismisses the popup
            if let Some(state) = drag.borrow_mut().take() {
                if !state.gate.moved() {
                    core.close_popup();
                }
            }
        })
    };
    let on_pointer_leave = {
        let drag = drag.clone();
        Callback::from(move |_event: PointerEvent| {
            drag.borrow_mut().take();
        })
    };

    let on_double_click = {
        let core = core.clone();
        let map_ref = map_ref.clone();
        Callback::from(move |event: MouseEvent| {
            event.prevent_default();
            let Some(element) = map_ref.cast::<Element>() else {
                return;
            };
            let view = core.snapshot();
            let Some(position) = input::element_point_to_latlng(
                event.client_x() as f64,
                event.client_y() as f64,
                &element,
                view.center,
                view.zoom,
            ) else {
                return;
            };
            save_runtime::dispatch(CoreAction::PlaceMarker { position });
        })
    };

    let zoom_in = {
        let core = core.clone();
        Callback::from(move |_: MouseEvent| core.zoom_by(1.0, 0.0, 0.0))
    };
    let zoom_out = {
        let core = core.clone();
        Callback::from(move |_: MouseEvent| core.zoom_by(-1.0, 0.0, 0.0))
    };

    if !*boot_ready {
        return html! { <div class="hivemark">{ "loading map…" }</div> };
    }

    let view = (*snapshot).clone();
    let tile_imgs: Html = tiles::visible_tiles(view.center, view.zoom, view.viewport_w, view.viewport_h)
        .into_iter()
        .map(|placed| {
            let url = tiles::tile_url(&config.tile_template, placed.coord);
            let style = format!(
                "left:{:.2}px;top:{:.2}px;width:{:.2}px;height:{:.2}px",
                placed.left, placed.top, placed.size, placed.size
            );
            html! {
                <img
                    key={format!("{}/{}/{}", placed.coord.z, placed.coord.x, placed.coord.y)}
                    class="tile"
                    src={url}
                    style={style}
                    draggable="false"
                    alt=""
                />
            }
        })
        .collect();

    let pins: Html = view
        .markers
        .iter()
        .map(|marker| marker_pin(marker, &view, &core))
        .collect();

    let popup = view
        .open_popup
        .and_then(|id| view.markers.iter().find(|marker| marker.id == id))
        .map(|marker| popup_panel(marker, &view, &core))
        .unwrap_or_default();

    let bar = tiles::scale_bar(view.center.lat, view.zoom, SCALE_BAR_MAX_PX);
    let scale_style = format!("width:{:.0}px", bar.px);

    html! {
        <div class="hivemark">
            <div
                ref={map_ref}
                class="map-canvas"
                ondblclick={on_double_click}
                onpointerdown={on_pointer_down}
                onpointermove={on_pointer_move}
                onpointerup={on_pointer_up}
                onpointerleave={on_pointer_leave}
            >
                { tile_imgs }
                { pins }
                { popup }
                <div class="scale-bar" style={scale_style}>{ bar.label }</div>
                <div class="attribution">{ tiles::OSM_ATTRIBUTION }</div>
                <div class="zoom-controls">
                    <button onclick={zoom_in}>{ "+" }</button>
                    <button onclick={zoom_out}>{ "−" }</button>
                </div>
            </div>
            <div class="status-panel">
                <span class="save-message">{ &view.save_message }</span>
                <span class="status-line">{ &view.status_line }</span>
            </div>
        </div>
    }
}

struct PanDrag {
    gate: DragGate,
    last: (f64, f64),
}

fn marker_pin(marker: &Marker, view: &crate::app_core::AppSnapshot, core: &Rc<AppCore>) -> Html {
    let (dx, dy) = geo::view_offset(view.center, view.zoom, marker.position);
    let left = view.viewport_w / 2.0 + dx;
    let top = view.viewport_h / 2.0 + dy;
    let class = match marker.origin {
        MarkerOrigin::Seeded => "marker-pin marker-pin-seed",
        MarkerOrigin::UserPlaced => "marker-pin marker-pin-user",
    };
    let marker_id = marker.id;
    let onclick = {
        let core = core.clone();
        Callback::from(move |event: MouseEvent| {
            event.stop_propagation();
            core.open_popup(marker_id);
        })
    };
    // keep pin presses away from the pan gate and the dblclick placer
    let onpointerdown = Callback::from(|event: PointerEvent| event.stop_propagation());
    let ondblclick = Callback::from(|event: MouseEvent| event.stop_propagation());
    html! {
        <button
            key={marker.id}
            type="button"
            class={class}
            style={format!("left:{left:.2}px;top:{top:.2}px")}
            {onclick}
            {onpointerdown}
            {ondblclick}
        />
    }
}

fn popup_panel(marker: &Marker, view: &crate::app_core::AppSnapshot, core: &Rc<AppCore>) -> Html {
    let (dx, dy) = geo::view_offset(view.center, view.zoom, marker.position);
    let left = view.viewport_w / 2.0 + dx;
    let top = view.viewport_h / 2.0 + dy;
    let marker_id = marker.id;
    let submitting = view.save_phase == SavePhase::Submitting;

    let fields: Html = marker
        .popup
        .form
        .fields()
        .iter()
        .map(|field| form_field(field, marker_id, view, core))
        .collect();

    let embed = marker
        .popup
        .embed
        .map(|embed| {
            html! {
                <a class="popup-embed" href={embed.url} target="_blank" rel="noreferrer">
                    { embed.title }
                </a>
            }
        })
        .unwrap_or_default();

    let on_submit = Callback::from(move |event: MouseEvent| {
        event.prevent_default();
        save_runtime::dispatch(CoreAction::SubmitForm { marker_id });
    });
    let on_close = {
        let core = core.clone();
        Callback::from(move |_: MouseEvent| core.close_popup())
    };

    // interacting with the form must neither pan the map nor dismiss itself
    let onpointerdown = Callback::from(|event: PointerEvent| event.stop_propagation());
    let ondblclick = Callback::from(|event: MouseEvent| event.stop_propagation());

    html! {
        <div
            class="popup"
            style={format!("left:{left:.2}px;top:{top:.2}px")}
            {onpointerdown}
            {ondblclick}
        >
            <button type="button" class="popup-close" onclick={on_close}>{ "×" }</button>
            <form class="popup-form">
                { fields }
                { embed }
                <button type="button" class="popup-save" disabled={submitting} onclick={on_submit}>
                    { if submitting { "Saving…" } else { "Go" } }
                </button>
                if !view.save_message.is_empty() {
                    <p class="popup-status">{ &view.save_message }</p>
                }
            </form>
        </div>
    }
}

fn form_field(
    field: &FieldSpec,
    marker_id: MarkerId,
    view: &crate::app_core::AppSnapshot,
    core: &Rc<AppCore>,
) -> Html {
    let name = field.name;
    let value = view.open_draft.get(name).unwrap_or_default().to_string();
    let label = html! { <label for={name}>{ field.label }</label> };
    let input = match field.kind {
        FieldKind::Text | FieldKind::Email => {
            let oninput = {
                let core = core.clone();
                Callback::from(move |event: InputEvent| {
                    let Some(input) = event
                        .target()
                        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                    else {
                        return;
                    };
                    core.edit_field(marker_id, name, input.value());
                })
            };
            let kind = if field.kind == FieldKind::Email { "email" } else { "text" };
            html! { <input id={name} name={name} type={kind} value={value} {oninput} /> }
        }
        FieldKind::Textarea => {
            let oninput = {
                let core = core.clone();
                Callback::from(move |event: InputEvent| {
                    let Some(area) = event
                        .target()
                        .and_then(|target| target.dyn_into::<HtmlTextAreaElement>().ok())
                    else {
                        return;
                    };
                    core.edit_field(marker_id, name, area.value());
                })
            };
            html! { <textarea id={name} name={name} value={value} {oninput} /> }
        }
        FieldKind::File => {
            let onchange = {
                let core = core.clone();
                Callback::from(move |event: Event| {
                    let Some(input) = event
                        .target()
                        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                    else {
                        return;
                    };
                    let file_name = input
                        .files()
                        .and_then(|files| files.get(0))
                        .map(|file| file.name())
                        .unwrap_or_default();
                    core.edit_field(marker_id, FIELD_FILE, file_name);
                })
            };
            html! { <input id={name} name={name} type="file" {onchange} /> }
        }
    };
    html! {
        <div class="popup-field">
            { label }
            { input }
        </div>
    }
}
