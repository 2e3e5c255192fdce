// ────────────────────────────────
// src/routes/mod.rs
// Fixed route table served by the fixture.
// ────────────────────────────────
mod pages;

use hyper::{header, Body, Method, Response, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

const LOREM_IPSUM: &str = "/loremipsum";
const ALEA_IACTA_EST: &str = "/aleaiactaest";
const WAIT_PREFIX: &str = "/wait/";
const BLANK_TARGET_LINK: &str = "/blanktargetlink";
const FULL_IFRAME_WITH_BLANK_TARGET_LINK: &str = "/fulliframewithblanktargetlink";

/// Every page the fixture knows how to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    LoremIpsum,
    AleaIactaEst,
    /// Raw suffix after `/wait/`, parsed when the route is answered.
    Wait(String),
    BlankTargetLink,
    FullIframeWithBlankTargetLink,
    NotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid delay {0:?} in wait route")]
    InvalidDelay(String),

    #[error("failed to build response: {0}")]
    Response(#[from] hyper::http::Error),
}

impl Route {
    /// Pick the route for a raw request target (path plus query, as sent).
    pub fn resolve(target: &str) -> Self {
        match target {
            LOREM_IPSUM => Route::LoremIpsum,
            ALEA_IACTA_EST => Route::AleaIactaEst,
            BLANK_TARGET_LINK => Route::BlankTargetLink,
            FULL_IFRAME_WITH_BLANK_TARGET_LINK => Route::FullIframeWithBlankTargetLink,
            _ => match target.strip_prefix(WAIT_PREFIX) {
                Some(seconds) => Route::Wait(seconds.to_owned()),
                None => Route::NotFound,
            },
        }
    }

    /// Answer the route. `port` is the port the server is bound to, used by
    /// pages that link back to the fixture itself.
    pub async fn respond(&self, port: u16) -> Result<Response<Body>, RouteError> {
        match self {
            Route::LoremIpsum => html(
                StatusCode::OK,
                pages::titled("Lorem Ipsum", "<p>Lorem ipsum dolor sit amet.</p>"),
            ),
            Route::AleaIactaEst => html(
                StatusCode::OK,
                pages::titled("Alea Iacta Est", "<p>De vita Caesarum libri VIII</p>"),
            ),
            Route::Wait(raw) => {
                let seconds = parse_delay(raw)?;
                tracing::debug!(seconds, "holding wait response");
                // Holds the serve loop; no other connection is accepted meanwhile.
                sleep(Duration::from_secs(seconds)).await;
                html(StatusCode::OK, pages::waited(seconds))
            }
            Route::BlankTargetLink => html(StatusCode::OK, pages::blank_target_link(port)),
            Route::FullIframeWithBlankTargetLink => {
                html(StatusCode::OK, pages::full_iframe(BLANK_TARGET_LINK))
            }
            Route::NotFound => html(
                StatusCode::NOT_FOUND,
                pages::error(StatusCode::NOT_FOUND, "Not Found"),
            ),
        }
    }

    /// Request path that resolves to this route. `None` for [`Route::NotFound`].
    pub fn path(&self) -> Option<String> {
        let path = match self {
            Route::LoremIpsum => LOREM_IPSUM.to_owned(),
            Route::AleaIactaEst => ALEA_IACTA_EST.to_owned(),
            Route::Wait(raw) => format!("{WAIT_PREFIX}{raw}"),
            Route::BlankTargetLink => BLANK_TARGET_LINK.to_owned(),
            Route::FullIframeWithBlankTargetLink => FULL_IFRAME_WITH_BLANK_TARGET_LINK.to_owned(),
            Route::NotFound => return None,
        };
        Some(path)
    }
}

/// Answer for any method other than GET, whatever the target.
pub fn unsupported_method(method: &Method) -> Result<Response<Body>, RouteError> {
    html(
        StatusCode::NOT_IMPLEMENTED,
        pages::error(
            StatusCode::NOT_IMPLEMENTED,
            &format!("Unsupported method ('{method}')"),
        ),
    )
}

fn parse_delay(raw: &str) -> Result<u64, RouteError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| RouteError::InvalidDelay(raw.to_owned()))
}

fn html(status: StatusCode, page: String) -> Result<Response<Body>, RouteError> {
    Ok(Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/html")
        .body(Body::from(page))?)
}
