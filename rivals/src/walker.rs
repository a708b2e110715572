//! Incremental traversal of a match list that may grow while it is being walked.

use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::session::{Page, Scope, SessionError};

/// A list of matches whose length is only known at the time it is queried.
#[allow(async_fn_in_trait)]
pub trait MatchSource {
    type Match;

    /// Re-reads the list, returning its current length.
    async fn refresh(&mut self) -> Result<usize, SessionError>;

    /// The match at a 1-based `position` as of the last refresh.
    fn at(&self, position: usize) -> Option<&Self::Match>;
}

/// The match elements currently present on a page.
pub struct LiveMatches<'a, P: Page> {
    page: &'a P,
    selector: &'a str,
    current: Vec<P::Element>,
}
impl<'a, P: Page> LiveMatches<'a, P> {
    pub fn new(page: &'a P, selector: &'a str) -> Self {
        Self {
            page,
            selector,
            current: vec![],
        }
    }
}

impl<P: Page> MatchSource for LiveMatches<'_, P> {
    type Match = P::Element;

    async fn refresh(&mut self) -> Result<usize, SessionError> {
        self.current = self.page.find_all(Scope::Document, self.selector).await?;
        Ok(self.current.len())
    }

    fn at(&self, position: usize) -> Option<&P::Element> {
        position.checked_sub(1).and_then(|index| self.current.get(index))
    }
}

#[allow(async_fn_in_trait)]
pub trait MatchVisitor<M> {
    type Error: From<SessionError>;

    async fn visit(&mut self, match_index: usize, element: &M) -> Result<(), Self::Error>;
}

pub struct Walker {
    pause: Duration,
}
impl Walker {
    /// `pause` is slept after each visited match.
    pub fn new(pause: Duration) -> Self {
        Self { pause }
    }

    /// Visits matches 1, 2, … in order, re-reading the source before each one, and stops the
    /// first time the cursor exceeds the current length. Returns the number of matches visited.
    pub async fn walk<S, V>(&self, source: &mut S, visitor: &mut V) -> Result<usize, V::Error>
    where
        S: MatchSource,
        V: MatchVisitor<S::Match>,
    {
        let mut cursor = 1;
        loop {
            let count = source.refresh().await?;
            let element = if cursor <= count {
                source.at(cursor)
            } else {
                None
            };
            let Some(element) = element else {
                info!("no more matches ({} of {count})", cursor - 1);
                return Ok(cursor - 1);
            };
            info!("match #{cursor} of {count}");
            visitor.visit(cursor, element).await?;
            cursor += 1;
            sleep(self.pause).await;
        }
    }
}
