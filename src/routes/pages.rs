// src/routes/pages.rs
//! Hand-built HTML bodies.

use hyper::StatusCode;

use super::ALEA_IACTA_EST;

pub(super) fn titled(title: &str, body: &str) -> String {
    format!("<html><title>{title}</title><body>{body}</body></html>")
}

pub(super) fn waited(seconds: u64) -> String {
    titled(
        &format!("waiting {seconds} seconds"),
        &format!("<p>this page took {seconds} seconds to load</p>"),
    )
}

/// Clicking anywhere in the window opens the other page in a new tab.
pub(super) fn blank_target_link(port: u16) -> String {
    let url = format!("http://localhost:{port}{ALEA_IACTA_EST}");
    format!(
        r#"<html><body style="margin: 0"><a href="{url}" target="_blank"><div style="height: 100%"></div></a></body></html>"#
    )
}

/// Whole-window iframe around `src`.
pub(super) fn full_iframe(src: &str) -> String {
    format!(
        r#"<html><body style="margin: 0"><iframe height="100%" width="100%" src="{src}" /></body></html>"#
    )
}

pub(super) fn error(status: StatusCode, message: &str) -> String {
    titled(
        "Error response",
        &format!(
            "<h1>Error response</h1><p>Error code {}.</p><p>Message: {message}.</p>",
            status.as_u16()
        ),
    )
}
