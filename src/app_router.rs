#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use web_sys::UrlSearchParams;

use hivemark_core::geo::{LatLng, LonLat};
use hivemark_core::tiles;

pub(crate) const DEFAULT_CENTER: LatLng = LatLng {
    lat: 62.24147,
    lng: 25.72088,
};
pub(crate) const DEFAULT_ZOOM: f64 = 15.5;

const SEEDS_GLOBAL: &str = "__HIVEMARK_SEEDS";
const BOOT_GLOBAL: &str = "__HIVEMARK_BOOT";

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct InitConfig {
    pub(crate) api_base: String,
    pub(crate) tile_template: String,
    pub(crate) center: LatLng,
    pub(crate) zoom: f64,
    pub(crate) csrf_token: Option<String>,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            tile_template: tiles::OSM_TILE_TEMPLATE.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            csrf_token: None,
        }
    }
}

pub(crate) fn load_init_config() -> InitConfig {
    let mut config = InitConfig {
        api_base: default_api_base(),
        csrf_token: load_csrf_token(),
        ..InitConfig::default()
    };
    if let Some((center, zoom)) = load_view_query() {
        if let Some(center) = center {
            config.center = center;
        }
        if let Some(zoom) = zoom {
            config.zoom = tiles::clamp_zoom(zoom);
        }
    }
    config
}

/// Base URL for the save endpoint. A compile-time override wins; otherwise
/// requests go same-origin (an empty base keeps the path relative).
pub(crate) fn default_api_base() -> String {
    if let Some(raw) = option_env!("HIVEMARK_API_BASE")
        .or(option_env!("TRUNK_PUBLIC_HIVEMARK_API_BASE"))
        .or(option_env!("TRUNK_PUBLIC_API_BASE"))
    {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.trim_end_matches('/').to_string();
        }
    }
    String::new()
}

pub(crate) fn build_save_url(api_base: &str) -> String {
    format!(
        "{}{}",
        api_base.trim_end_matches('/'),
        hivemark_core::SAVE_PATH
    )
}

/// The seed coordinates the server template injects as a literal
/// `[{lon, lat}, …]` array. Entries that do not parse are skipped.
pub(crate) fn load_seed_locations() -> Vec<LatLng> {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(raw) = read_seeds_global() else {
            gloo::console::log!("seed list: no locations injected");
            return Vec::new();
        };
        match parse_seed_entries(&raw) {
            Ok((seeds, skipped)) => {
                if skipped > 0 {
                    gloo::console::warn!("seed list: skipped malformed entries", skipped as u32);
                }
                seeds
            }
            Err(err) => {
                gloo::console::warn!("seed list: not a coordinate array", err.to_string());
                Vec::new()
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Vec::new()
    }
}

/// Parses the injected seed array, tolerating malformed entries. Returns the
/// parsed coordinates and how many entries were dropped.
fn parse_seed_entries(raw: &str) -> Result<(Vec<LatLng>, usize), serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let total = entries.len();
    let seeds: Vec<LatLng> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<LonLat>(entry).ok())
        .map(LatLng::from)
        .collect();
    let skipped = total - seeds.len();
    Ok((seeds, skipped))
}

#[cfg(target_arch = "wasm32")]
fn read_seeds_global() -> Option<String> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(SEEDS_GLOBAL)).ok()?;
    if value.is_null() || value.is_undefined() {
        return None;
    }
    if let Some(raw) = value.as_string() {
        return Some(raw);
    }
    // the template may inject the array itself rather than a JSON string
    js_sys::JSON::stringify(&value)
        .ok()
        .and_then(|raw| raw.as_string())
}

fn load_csrf_token() -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        let window = web_sys::window()?;
        let boot = js_sys::Reflect::get(&window, &JsValue::from_str(BOOT_GLOBAL)).ok()?;
        if boot.is_null() || boot.is_undefined() {
            return None;
        }
        let token = js_sys::Reflect::get(&boot, &JsValue::from_str("csrfToken")).ok()?;
        token.as_string().filter(|token| !token.trim().is_empty())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

/// Whether the page URL pins the initial viewport; a pinned viewport beats
/// the remembered one.
pub(crate) fn has_view_query() -> bool {
    load_view_query()
        .map(|(center, zoom)| center.is_some() || zoom.is_some())
        .unwrap_or(false)
}

/// Optional `?lat=&lng=&zoom=` overrides for the initial viewport.
fn load_view_query() -> Option<(Option<LatLng>, Option<f64>)> {
    #[cfg(target_arch = "wasm32")]
    {
        let window = web_sys::window()?;
        let search = window.location().search().ok()?;
        let search = search.trim();
        if search.is_empty() {
            return None;
        }
        let params = UrlSearchParams::new_with_str(search).ok()?;
        let lat = parse_coord(params.get("lat").as_deref());
        let lng = parse_coord(params.get("lng").as_deref());
        let zoom = parse_coord(params.get("zoom").as_deref());
        let center = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
            _ => None,
        };
        Some((center, zoom))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

fn parse_coord(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_url_joins_base_and_path() {
        assert_eq!(build_save_url(""), "/save");
        assert_eq!(build_save_url("https://api.example.com"), "https://api.example.com/save");
        assert_eq!(build_save_url("https://api.example.com/"), "https://api.example.com/save");
    }

    #[test]
    fn seed_array_parses_lon_lat_pairs() {
        let (seeds, skipped) =
            parse_seed_entries(r#"[{"lon":25.72,"lat":62.24},{"lon":25.73,"lat":62.25}]"#)
                .expect("valid array");
        assert_eq!(skipped, 0);
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0], LatLng::new(62.24, 25.72));
    }

    #[test]
    fn malformed_seed_entries_are_skipped() {
        let (seeds, skipped) =
            parse_seed_entries(r#"[{"lon":25.72,"lat":62.24},{"lon":"x"},42]"#).expect("array");
        assert_eq!(seeds.len(), 1);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn seed_payload_must_be_an_array() {
        assert!(parse_seed_entries(r#"{"lon":25.72,"lat":62.24}"#).is_err());
        assert!(parse_seed_entries("not json").is_err());
    }

    #[test]
    fn coord_values_reject_garbage() {
        assert_eq!(parse_coord(Some("62.25")), Some(62.25));
        assert_eq!(parse_coord(Some(" 15.5 ")), Some(15.5));
        assert_eq!(parse_coord(Some("")), None);
        assert_eq!(parse_coord(Some("north")), None);
        assert_eq!(parse_coord(Some("NaN")), None);
        assert_eq!(parse_coord(None), None);
    }
}
