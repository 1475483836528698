use gloo_net::http::Request;
use wasm_bindgen_futures::spawn_local;
use web_sys::{AbortController, AbortSignal};
use wfs_map_shared::{FetchError, FetchTicket};

use crate::map_view::MapController;

/// Fetch the vector data for `ticket` in the background. The request is
/// registered with the controller so a rebuild or unmount aborts it.
pub(crate) fn spawn(controller: MapController, ticket: FetchTicket) {
    let abort = AbortController::new().ok();
    let signal = abort.as_ref().map(AbortController::signal);
    if let Some(abort) = abort {
        controller.track_fetch(&ticket, move || abort.abort());
    }

    tracing::debug!(generation = ticket.generation, url = %ticket.url, "requesting vector features");
    spawn_local(async move {
        let result = fetch_text(&ticket.url, signal.as_ref()).await;
        controller.complete_fetch(&ticket, result);
    });
}

async fn fetch_text(url: &str, signal: Option<&AbortSignal>) -> Result<String, FetchError> {
    let response = Request::get(url)
        .abort_signal(signal)
        .send()
        .await
        .map_err(|e| request_error(e, signal))?;
    check_status(response.status())?;
    response.text().await.map_err(|e| request_error(e, signal))
}

fn check_status(status: u16) -> Result<(), FetchError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::Status(status))
    }
}

fn request_error(error: gloo_net::Error, signal: Option<&AbortSignal>) -> FetchError {
    if signal.is_some_and(AbortSignal::aborted) {
        return FetchError::Aborted;
    }
    FetchError::Network(error.to_string())
}
