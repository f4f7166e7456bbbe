#[cfg(target_arch = "wasm32")]
use base64::engine::general_purpose::STANDARD;
#[cfg(target_arch = "wasm32")]
use base64::Engine;

use crate::persisted::{DraftRecord, ViewRecord};
#[cfg(target_arch = "wasm32")]
use crate::persisted::{
    DRAFT_RECORD_KEY, DRAFT_RECORD_VERSION, VIEW_RECORD_KEY, VIEW_RECORD_VERSION,
};
#[cfg(target_arch = "wasm32")]
use hivemark_core::{decode, encode};

pub(crate) fn load_view_record() -> Option<ViewRecord> {
    #[cfg(target_arch = "wasm32")]
    {
        let record: ViewRecord = load_record(VIEW_RECORD_KEY)?;
        if record.version != VIEW_RECORD_VERSION {
            gloo::console::log!("view record: version mismatch, ignoring");
            return None;
        }
        Some(record)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

pub(crate) fn save_view_record(record: &ViewRecord) {
    #[cfg(target_arch = "wasm32")]
    {
        save_record(VIEW_RECORD_KEY, record);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = record;
    }
}

pub(crate) fn load_draft_record() -> Option<DraftRecord> {
    #[cfg(target_arch = "wasm32")]
    {
        let record: DraftRecord = load_record(DRAFT_RECORD_KEY)?;
        if record.version != DRAFT_RECORD_VERSION {
            gloo::console::log!("draft record: version mismatch, ignoring");
            return None;
        }
        Some(record)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

pub(crate) fn save_draft_record(record: &DraftRecord) {
    #[cfg(target_arch = "wasm32")]
    {
        save_record(DRAFT_RECORD_KEY, record);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = record;
    }
}

pub(crate) fn clear_draft_record() {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(storage) = local_storage() else {
            return;
        };
        let _ = storage.remove_item(DRAFT_RECORD_KEY);
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|window| window.local_storage().ok().flatten())
}

#[cfg(target_arch = "wasm32")]
fn load_record<T>(key: &str) -> Option<T>
where
    T: rkyv::Archive,
    T::Archived: for<'a> rkyv::bytecheck::CheckBytes<
            rkyv::api::high::HighValidator<'a, rkyv::rancor::Error>,
        > + rkyv::Deserialize<T, rkyv::api::high::HighDeserializer<rkyv::rancor::Error>>,
{
    let storage = local_storage()?;
    let raw = storage.get_item(key).ok()??;
    if raw.is_empty() {
        return None;
    }
    let Ok(bytes) = STANDARD.decode(raw.as_bytes()) else {
        gloo::console::warn!("persisted record: base64 decode failed", key);
        return None;
    };
    let record = decode::<T>(&bytes);
    if record.is_none() {
        gloo::console::warn!("persisted record: decode failed", key);
    }
    record
}

#[cfg(target_arch = "wasm32")]
fn save_record<T>(key: &str, record: &T)
where
    T: for<'a> rkyv::Serialize<
        rkyv::api::high::HighSerializer<
            rkyv::util::AlignedVec,
            rkyv::ser::allocator::ArenaHandle<'a>,
            rkyv::rancor::Error,
        >,
    >,
{
    let Some(bytes) = encode(record) else {
        gloo::console::warn!("persisted record: encode failed", key);
        return;
    };
    let Some(storage) = local_storage() else {
        return;
    };
    if storage.set_item(key, &STANDARD.encode(bytes)).is_err() {
        gloo::console::warn!("persisted record: storage write failed", key);
    }
}
