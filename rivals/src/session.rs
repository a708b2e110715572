//! The browser capability the scraper drives: a single live page whose elements are located by
//! CSS selector, plus bounded polling over it.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{error}: {message}")]
    Protocol { error: String, message: String },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Where an element search is rooted.
#[derive(Debug)]
pub enum Scope<'a, E> {
    Document,
    Within(&'a E),
}

impl<E> Clone for Scope<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Scope<'_, E> {}

/// A live, exclusively owned browser page. Element handles are only meaningful to the page that
/// produced them. Searches that match nothing yield an empty result rather than an error.
#[allow(async_fn_in_trait)]
pub trait Page {
    type Element: Clone + Debug;

    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    async fn find_all(
        &self,
        scope: Scope<'_, Self::Element>,
        css: &str,
    ) -> Result<Vec<Self::Element>, SessionError>;

    async fn find_first(
        &self,
        scope: Scope<'_, Self::Element>,
        css: &str,
    ) -> Result<Option<Self::Element>, SessionError> {
        Ok(self.find_all(scope, css).await?.into_iter().next())
    }

    async fn text(&self, element: &Self::Element) -> Result<String, SessionError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, SessionError>;

    async fn click(&self, element: &Self::Element) -> Result<(), SessionError>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), SessionError>;

    /// Releases the page and its underlying browser session.
    async fn close(self) -> Result<(), SessionError>
    where
        Self: Sized;
}

/// Repeatedly evaluates `probe` until it yields a value or `timeout` elapses, sleeping
/// `poll_interval` between attempts. The probe is always evaluated at least once. Returns `None`
/// on timeout; probe errors are returned immediately.
pub async fn wait_for<T, F, Fut>(
    timeout: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> Result<Option<T>, SessionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, SessionError>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Waits until at least one element matching `css` is present within `scope`.
pub async fn wait_for_element<P: Page>(
    page: &P,
    scope: Scope<'_, P::Element>,
    css: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<P::Element>, SessionError> {
    wait_for(timeout, poll_interval, move || page.find_first(scope, css)).await
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn wait_for_immediate() {
        let attempts = Cell::new(0);
        let found = wait_for(Duration::ZERO, Duration::from_millis(1), || {
            attempts.set(attempts.get() + 1);
            async { Ok(Some(42)) }
        })
        .await
        .unwrap();
        assert_eq!(Some(42), found);
        assert_eq!(1, attempts.get());
    }

    #[tokio::test]
    async fn wait_for_eventually() {
        let attempts = Cell::new(0);
        let found = wait_for(Duration::from_secs(5), Duration::from_millis(1), || {
            attempts.set(attempts.get() + 1);
            let attempt = attempts.get();
            async move { Ok((attempt == 3).then_some("ready")) }
        })
        .await
        .unwrap();
        assert_eq!(Some("ready"), found);
        assert_eq!(3, attempts.get());
    }

    #[tokio::test]
    async fn wait_for_times_out() {
        let found: Option<()> = wait_for(Duration::from_millis(10), Duration::from_millis(2), || async {
            Ok(None)
        })
        .await
        .unwrap();
        assert_eq!(None, found);
    }

    #[tokio::test]
    async fn wait_for_propagates_errors() {
        let result: Result<Option<()>, _> =
            wait_for(Duration::from_secs(5), Duration::from_millis(1), || async {
                Err(SessionError::Protocol {
                    error: "invalid session id".into(),
                    message: "session deleted".into(),
                })
            })
            .await;
        assert_eq!(
            "invalid session id: session deleted",
            result.unwrap_err().to_string()
        );
    }
}
