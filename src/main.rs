mod app_core;
mod app_router;
mod app_runtime;
mod boot;
mod boot_runtime;
mod input;
mod persisted;
mod persisted_store;
mod runtime;
mod save_runtime;
mod yew_app;

fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        yew_app::run();
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        eprintln!("hivemark runs in the browser; build the wasm bundle with `trunk build`");
    }
}
