//! Opening the match-history view and waiting for it to become usable.

use tokio::time::sleep;
use tracing::info;

use crate::config::{PlayerId, ScrapeConfig};
use crate::run::ScrapeError;
use crate::session::{wait_for_element, Page, Scope};

/// Navigates to the player's match history and blocks until the match container is present,
/// then applies the settle delay. Expiry of the container wait is fatal and is not retried.
pub async fn bootstrap<P: Page>(
    page: &P,
    config: &ScrapeConfig,
    player: &PlayerId,
) -> Result<(), ScrapeError> {
    let url = config.player_url(player);
    info!("opening {url}");
    page.navigate(&url).await?;

    let timings = &config.timings;
    let container = &config.selectors.container;
    let found = wait_for_element(
        page,
        Scope::Document,
        container,
        timings.container_timeout(),
        timings.poll_interval(),
    )
    .await?;
    if found.is_none() {
        return Err(ScrapeError::ContainerTimeout {
            selector: container.clone(),
            timeout: timings.container_timeout(),
        });
    }
    info!("match container loaded; settling for {:?}", timings.settle_delay());
    sleep(timings.settle_delay()).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::{fast_config, FakeMatch, FakePage};

    use super::*;

    #[tokio::test]
    async fn container_present() {
        let page = FakePage::new(vec![FakeMatch::empty()]);
        let player = PlayerId::new("42").unwrap();
        bootstrap(&page, &fast_config(), &player).await.unwrap();
        assert_eq!(
            vec!["https://rivalsmeta.com/player/42".to_string()],
            page.navigations()
        );
    }

    #[tokio::test]
    async fn container_appears_late() {
        let page = FakePage::new(vec![]).with_container_after(3);
        let player = PlayerId::new("42").unwrap();
        bootstrap(&page, &fast_config(), &player).await.unwrap();
    }

    #[tokio::test]
    async fn container_timeout() {
        let page = FakePage::new(vec![]).without_container();
        let player = PlayerId::new("42").unwrap();
        let err = bootstrap(&page, &fast_config(), &player)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::ContainerTimeout { .. }));
        assert_eq!(
            "match container 'div.matches' not present after 20ms",
            err.to_string()
        );
    }
}
