//! An in-memory [`Page`] laid out like the match-history view, for exercising the scraper
//! without a browser.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{ScrapeConfig, Selectors, Timings};
use crate::extract::Field;
use crate::session::{Page, Scope, SessionError};

pub fn fast_config() -> ScrapeConfig {
    ScrapeConfig {
        timings: Timings::instant(),
        ..ScrapeConfig::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeElement {
    Container,
    Match(usize),
    Expander(usize),
    Row(usize, usize),
    Cell {
        match_index: usize,
        row_index: usize,
        css: String,
    },
}

/// How a match responds to expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expander {
    /// Rows are hidden until the expander is clicked.
    Reveals,
    /// There is no expander; rows are already shown.
    Missing,
    /// Clicking the expander fails; rows are already shown.
    Broken,
    /// Clicking succeeds but rows never appear.
    Stuck,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HeroImage {
    Absent,
    Src(String),
    Unreadable,
}

#[derive(Debug, Clone)]
pub struct FakeRow {
    fields: FxHashMap<String, String>,
    mvp: bool,
    hero: HeroImage,
}
impl FakeRow {
    pub fn new(kda: &str, damage: &str, damage_taken: &str, healing: &str) -> Self {
        let fields = [
            (Field::Kda, kda),
            (Field::Damage, damage),
            (Field::DamageTaken, damage_taken),
            (Field::Healing, healing),
        ]
        .into_iter()
        .map(|(field, text)| (field_css(field), text.to_string()))
        .collect();
        Self {
            fields,
            mvp: false,
            hero: HeroImage::Absent,
        }
    }

    pub fn mvp(mut self) -> Self {
        self.mvp = true;
        self
    }

    pub fn hero(mut self, src: &str) -> Self {
        self.hero = HeroImage::Src(src.into());
        self
    }

    pub fn hero_unreadable(mut self) -> Self {
        self.hero = HeroImage::Unreadable;
        self
    }

    pub fn without(mut self, field: Field) -> Self {
        self.fields.remove(&field_css(field));
        self
    }
}

fn field_css(field: Field) -> String {
    let selectors = Selectors::default();
    match field {
        Field::Kda => selectors.kda,
        Field::Damage => selectors.damage,
        Field::DamageTaken => selectors.damage_taken,
        Field::Healing => selectors.healing,
    }
}

#[derive(Debug, Clone)]
pub struct FakeMatch {
    expander: Expander,
    rows: Vec<FakeRow>,
}
impl FakeMatch {
    pub fn new(expander: Expander, rows: Vec<FakeRow>) -> Self {
        Self { expander, rows }
    }

    pub fn empty() -> Self {
        Self::new(Expander::Missing, vec![])
    }
}

fn no_such_element(element: &FakeElement) -> SessionError {
    SessionError::Protocol {
        error: "no such element".into(),
        message: format!("{element:?}"),
    }
}

struct State {
    matches: Vec<FakeMatch>,
    listing_lengths: Vec<usize>,
    listings: usize,
    failing_listing: Option<usize>,
    container_after: Option<usize>,
    container_probes: usize,
    expanded: FxHashSet<usize>,
    navigations: Vec<String>,
    scrolled: Vec<usize>,
}

impl State {
    fn rows_visible(&self, match_index: usize) -> bool {
        match self.matches[match_index - 1].expander {
            Expander::Reveals => self.expanded.contains(&match_index),
            Expander::Missing | Expander::Broken => true,
            Expander::Stuck => false,
        }
    }

    fn row(&self, match_index: usize, row_index: usize) -> &FakeRow {
        &self.matches[match_index - 1].rows[row_index - 1]
    }
}

pub struct FakePage {
    selectors: Selectors,
    state: RefCell<State>,
    closes: Rc<Cell<usize>>,
}
impl FakePage {
    /// A page whose container is present and whose match list shows every match at once.
    pub fn new(matches: Vec<FakeMatch>) -> Self {
        let listing_lengths = vec![matches.len()];
        Self {
            selectors: Selectors::default(),
            state: RefCell::new(State {
                matches,
                listing_lengths,
                listings: 0,
                failing_listing: None,
                container_after: Some(1),
                container_probes: 0,
                expanded: FxHashSet::default(),
                navigations: vec![],
                scrolled: vec![],
            }),
            closes: Rc::new(Cell::new(0)),
        }
    }

    /// The container is found on the `probes`-th check.
    pub fn with_container_after(self, probes: usize) -> Self {
        self.state.borrow_mut().container_after = Some(probes);
        self
    }

    pub fn without_container(self) -> Self {
        self.state.borrow_mut().container_after = None;
        self
    }

    /// Lengths of the match list on successive listings; the last one repeats.
    pub fn with_listing_lengths(self, lengths: Vec<usize>) -> Self {
        self.state.borrow_mut().listing_lengths = lengths;
        self
    }

    /// The `listing`-th (1-based) listing of the matches fails.
    pub fn with_failing_listing(self, listing: usize) -> Self {
        self.state.borrow_mut().failing_listing = Some(listing);
        self
    }

    pub fn match_element(&self, match_index: usize) -> FakeElement {
        FakeElement::Match(match_index)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.borrow().navigations.clone()
    }

    pub fn scrolled(&self) -> Vec<usize> {
        self.state.borrow().scrolled.clone()
    }

    pub fn listings(&self) -> usize {
        self.state.borrow().listings
    }

    /// Counts calls to [`Page::close`]; outlives the page.
    pub fn close_counter(&self) -> Rc<Cell<usize>> {
        self.closes.clone()
    }

    fn search_document(&self, state: &mut State, css: &str) -> Result<Vec<FakeElement>, SessionError> {
        if css == self.selectors.container {
            state.container_probes += 1;
            let present = state
                .container_after
                .is_some_and(|after| state.container_probes >= after);
            return Ok(if present { vec![FakeElement::Container] } else { vec![] });
        }
        if css == self.selectors.matches {
            state.listings += 1;
            if state.failing_listing == Some(state.listings) {
                return Err(SessionError::Protocol {
                    error: "unknown error".into(),
                    message: "session crashed".into(),
                });
            }
            let step = (state.listings - 1).min(state.listing_lengths.len() - 1);
            let length = state.listing_lengths[step].min(state.matches.len());
            return Ok((1..=length).map(FakeElement::Match).collect());
        }
        Ok(vec![])
    }

    fn search_within(&self, state: &State, element: &FakeElement, css: &str) -> Vec<FakeElement> {
        match *element {
            FakeElement::Match(match_index) => {
                if css == self.selectors.expander {
                    match state.matches[match_index - 1].expander {
                        Expander::Missing => vec![],
                        _ => vec![FakeElement::Expander(match_index)],
                    }
                } else if css == self.selectors.rows && state.rows_visible(match_index) {
                    (1..=state.matches[match_index - 1].rows.len())
                        .map(|row_index| FakeElement::Row(match_index, row_index))
                        .collect()
                } else {
                    vec![]
                }
            }
            FakeElement::Row(match_index, row_index) => {
                let row = state.row(match_index, row_index);
                let present = if css == self.selectors.mvp_marker {
                    row.mvp
                } else if css == self.selectors.hero_image {
                    row.hero != HeroImage::Absent
                } else {
                    row.fields.contains_key(css)
                };
                if present {
                    vec![FakeElement::Cell {
                        match_index,
                        row_index,
                        css: css.to_string(),
                    }]
                } else {
                    vec![]
                }
            }
            _ => vec![],
        }
    }
}

impl Page for FakePage {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.state.borrow_mut().navigations.push(url.into());
        Ok(())
    }

    async fn find_all(
        &self,
        scope: Scope<'_, FakeElement>,
        css: &str,
    ) -> Result<Vec<FakeElement>, SessionError> {
        let mut state = self.state.borrow_mut();
        match scope {
            Scope::Document => self.search_document(&mut state, css),
            Scope::Within(element) => Ok(self.search_within(&state, element, css)),
        }
    }

    async fn text(&self, element: &FakeElement) -> Result<String, SessionError> {
        let state = self.state.borrow();
        match element {
            FakeElement::Cell {
                match_index,
                row_index,
                css,
            } => state
                .row(*match_index, *row_index)
                .fields
                .get(css)
                .cloned()
                .ok_or_else(|| no_such_element(element)),
            _ => Ok(String::new()),
        }
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        let state = self.state.borrow();
        match element {
            FakeElement::Cell {
                match_index,
                row_index,
                css,
            } if *css == self.selectors.hero_image && name == "src" => {
                match &state.row(*match_index, *row_index).hero {
                    HeroImage::Src(src) => Ok(Some(src.clone())),
                    HeroImage::Absent => Ok(None),
                    HeroImage::Unreadable => Err(SessionError::Protocol {
                        error: "stale element reference".into(),
                        message: format!("{element:?}"),
                    }),
                }
            }
            _ => Ok(None),
        }
    }

    async fn click(&self, element: &FakeElement) -> Result<(), SessionError> {
        let mut state = self.state.borrow_mut();
        match *element {
            FakeElement::Expander(match_index) => {
                if state.matches[match_index - 1].expander == Expander::Broken {
                    return Err(SessionError::Protocol {
                        error: "element not interactable".into(),
                        message: format!("{element:?}"),
                    });
                }
                state.expanded.insert(match_index);
                Ok(())
            }
            _ => Err(no_such_element(element)),
        }
    }

    async fn scroll_into_view(&self, element: &FakeElement) -> Result<(), SessionError> {
        match *element {
            FakeElement::Match(match_index) => {
                self.state.borrow_mut().scrolled.push(match_index);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn close(self) -> Result<(), SessionError> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}
