use std::cell::RefCell;
use std::rc::Rc;

use crate::app_core::{AppCore, AppSubscription};
use crate::app_router;
use crate::app_runtime;
use crate::runtime::{CoreAction, LocalRecordAdapter, SaveGateway, SaveRequest};
use hivemark_core::{MarkerId, SaveOutcome};

struct SaveRuntimeState {
    core: Rc<AppCore>,
    gateway: Rc<dyn SaveGateway>,
    _subscription: AppSubscription,
}

thread_local! {
    static STATE: RefCell<Option<SaveRuntimeState>> = RefCell::new(None);
}

/// Wires a core and a transport together and starts mirroring snapshots into
/// the local records.
pub(crate) fn init(core: Rc<AppCore>, gateway: Rc<dyn SaveGateway>) {
    let records = Rc::new(RefCell::new(LocalRecordAdapter::new()));
    let subscription = core.subscribe(Rc::new({
        let core = core.clone();
        let records = records.clone();
        move || records.borrow_mut().save_if_needed(&core.snapshot())
    }));
    STATE.with(|slot| {
        *slot.borrow_mut() = Some(SaveRuntimeState {
            core,
            gateway,
            _subscription: subscription,
        });
    });
}

pub(crate) fn shutdown() {
    STATE.with(|slot| {
        slot.borrow_mut().take();
    });
}

/// Routes a UI event: submits go through the gateway, everything else lands
/// on the core directly.
pub(crate) fn dispatch(action: CoreAction) {
    match action {
        CoreAction::SubmitForm { marker_id } => submit(marker_id),
        other => {
            let core = STATE.with(|slot| slot.borrow().as_ref().map(|state| state.core.clone()));
            if let Some(core) = core {
                core.apply_action(other);
            }
        }
    }
}

/// Starts the save workflow for a marker's draft: one POST, whose outcome —
/// and nothing earlier — decides what the status display ends up showing.
pub(crate) fn submit(marker_id: MarkerId) {
    let Some((core, gateway)) = STATE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|state| (state.core.clone(), state.gateway.clone()))
    }) else {
        return;
    };
    let Some(body) = core.begin_save(marker_id) else {
        #[cfg(target_arch = "wasm32")]
        gloo::console::warn!("save refused: request already in flight or marker unknown");
        return;
    };
    let config = app_runtime::init_config();
    let request = SaveRequest {
        url: app_router::build_save_url(&config.api_base),
        body,
        content_type: hivemark_core::SAVE_CONTENT_TYPE,
        csrf_token: config.csrf_token,
    };
    #[cfg(target_arch = "wasm32")]
    gloo::console::log!("save dispatched", request.url.clone());
    gateway.submit(
        request,
        Rc::new(move |outcome: SaveOutcome| {
            #[cfg(target_arch = "wasm32")]
            match &outcome {
                SaveOutcome::Accepted { status } => {
                    gloo::console::log!("save acknowledged", *status)
                }
                SaveOutcome::Rejected { status } => gloo::console::warn!("save rejected", *status),
                SaveOutcome::TransportError { message } => {
                    gloo::console::warn!("save failed", message.clone())
                }
            }
            core.finish_save(&outcome);
        }),
    );
}

/// The browser transport: an asynchronous fetch POST with the JSON
/// content-type the endpoint expects. Off wasm it is inert.
pub(crate) struct FetchSaveGateway;

impl FetchSaveGateway {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl SaveGateway for FetchSaveGateway {
    fn submit(&self, request: SaveRequest, on_outcome: Rc<dyn Fn(SaveOutcome)>) {
        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = send_request(request).await;
                on_outcome(outcome);
            });
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (request, on_outcome);
        }
    }
}

#[cfg(target_arch = "wasm32")]
async fn send_request(request: SaveRequest) -> SaveOutcome {
    use hivemark_core::CSRF_HEADER;

    let mut builder =
        gloo::net::http::Request::post(&request.url).header("Content-Type", request.content_type);
    if let Some(token) = &request.csrf_token {
        builder = builder.header(CSRF_HEADER, token);
    }
    let outbound = match builder.body(request.body) {
        Ok(outbound) => outbound,
        Err(err) => {
            return SaveOutcome::TransportError {
                message: err.to_string(),
            }
        }
    };
    match outbound.send().await {
        Ok(response) => SaveOutcome::from_status(response.status()),
        Err(err) => SaveOutcome::TransportError {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_router::{DEFAULT_CENTER, DEFAULT_ZOOM};
    use crate::runtime::testing::ManualGateway;
    use hivemark_core::{LatLng, SavePhase, FIELD_EMAIL, FIELD_FIRSTNAME, FIELD_SURNAME};

    fn submit_ready_core() -> (Rc<AppCore>, Rc<ManualGateway>, hivemark_core::MarkerId) {
        let core = AppCore::new(DEFAULT_CENTER, DEFAULT_ZOOM);
        core.seed_markers(&[LatLng::new(62.24, 25.72)]);
        let id = core.snapshot().markers[0].id;
        core.open_popup(id);
        core.edit_field(id, FIELD_FIRSTNAME, "A".to_string());
        core.edit_field(id, FIELD_SURNAME, "B".to_string());
        core.edit_field(id, FIELD_EMAIL, "a@b.com".to_string());
        let gateway = Rc::new(ManualGateway::new());
        init(core.clone(), gateway.clone());
        (core, gateway, id)
    }

    #[test]
    fn submit_fires_exactly_one_post_to_the_save_endpoint() {
        let (_core, gateway, id) = submit_ready_core();
        submit(id);

        assert_eq!(gateway.sent(), 1);
        let request = gateway.request(0).expect("request recorded");
        assert_eq!(request.url, "/save");
        assert_eq!(request.content_type, "application/json; charset=UTF-8");
        assert_eq!(request.csrf_token, None);
        let parsed: serde_json::Value = serde_json::from_str(&request.body).expect("json body");
        assert_eq!(
            parsed,
            serde_json::json!({"firstname": "A", "surname": "B", "email": "a@b.com"})
        );
        shutdown();
    }

    #[test]
    fn confirmation_arrives_only_with_the_response() {
        let (core, gateway, id) = submit_ready_core();
        submit(id);

        // dispatched but unacknowledged: still submitting
        assert_eq!(core.snapshot().save_phase, SavePhase::Submitting);

        gateway.resolve(0, SaveOutcome::from_status(200));
        let snapshot = core.snapshot();
        assert_eq!(snapshot.save_phase, SavePhase::Confirmed);
        assert_eq!(snapshot.status_line, gateway.request(0).expect("sent").body);
        shutdown();
    }

    #[test]
    fn network_failure_surfaces_instead_of_confirming() {
        let (core, gateway, id) = submit_ready_core();
        submit(id);
        gateway.resolve(
            0,
            SaveOutcome::TransportError {
                message: "connection reset".to_string(),
            },
        );
        let snapshot = core.snapshot();
        assert_eq!(snapshot.save_phase, SavePhase::Failed);
        assert!(snapshot.save_message.contains("connection reset"));
        assert_eq!(snapshot.status_line, "");
        shutdown();
    }

    #[test]
    fn only_one_request_in_flight_at_a_time() {
        let (_core, gateway, id) = submit_ready_core();
        submit(id);
        submit(id);
        assert_eq!(gateway.sent(), 1);
        shutdown();
    }

    #[test]
    fn dispatch_routes_map_actions_to_the_core() {
        let (core, _gateway, _id) = submit_ready_core();
        let before = core.snapshot().markers.len();
        dispatch(CoreAction::PlaceMarker {
            position: LatLng::new(62.26, 25.74),
        });
        assert_eq!(core.snapshot().markers.len(), before + 1);
        shutdown();
    }
}
