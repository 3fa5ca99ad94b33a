//! Scripted in-memory storefront
//!
//! `FakeStorefront` implements `DomAccessor` over a declared catalog. It is
//! cheap to clone; clones share state so a test can hand one to the crawler
//! and inspect the other afterwards.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use vitrina::config::{CrawlerConfig, SiteConfig, SiteSelectors, SkuMode};
use vitrina::crawler::resolve_url;
use vitrina::dom::{DomAccessor, DomError, DomResult};

pub const HOME_URL: &str = "https://shop.test/default.aspx";

pub fn category_url(id: u64, slug: &str) -> String {
    format!("https://shop.test/category/{}-{}", id, slug)
}

pub fn product_url(id: u64, slug: &str) -> String {
    format!("https://shop.test/products/{}-{}", id, slug)
}

/// Crawler settings with no pauses and short timeouts
pub fn fast_settings() -> CrawlerConfig {
    CrawlerConfig {
        startup_timeout: 50,
        listing_timeout: 50,
        pager_stale_timeout: 50,
        stabilization_pause: 0,
        reload_pause: 0,
        max_listing_retries: 3,
        sku_timeout: 50,
        sku_mode: SkuMode::Inline,
    }
}

pub fn test_site() -> SiteConfig {
    SiteConfig::with_defaults("test", HOME_URL)
}

/// One product card on a listing page
#[derive(Debug, Clone)]
pub struct Card {
    title: Option<String>,
    price: Option<String>,
    href: Option<String>,
}

impl Card {
    pub fn new(id: u64, slug: &str, price: &str) -> Self {
        Self {
            title: Some(format!("  {}  ", slug.replace('-', " "))),
            price: Some(price.to_string()),
            href: Some(format!("/products/{}-{}", id, slug)),
        }
    }

    pub fn without_title(mut self) -> Self {
        self.title = None;
        self
    }

    /// Keeps the link element but drops its href
    pub fn without_href(mut self) -> Self {
        self.href = None;
        self
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }
}

/// Pagination controls rendered on a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pager {
    /// No pager region at all
    Absent,
    /// A pager without a "next" control
    LastPage,
    /// A working "next" control
    HasNext,
    /// A "next" control that does not change the page
    StuckNext,
}

#[derive(Debug, Clone)]
pub struct ListingPage {
    cards: Vec<Card>,
    pager: Pager,
}

impl ListingPage {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            pager: Pager::Absent,
        }
    }

    pub fn with_pager(mut self, pager: Pager) -> Self {
        self.pager = pager;
        self
    }
}

/// A category listing, page by page
#[derive(Debug, Clone, Default)]
pub struct Category {
    pages: Vec<ListingPage>,
    timeouts: HashMap<usize, u32>,
    broken_pager: bool,
    broken_next: bool,
}

impl Category {
    pub fn new(pages: Vec<ListingPage>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// The listing wait on `page` times out `times` times before succeeding
    pub fn timing_out(mut self, page: usize, times: u32) -> Self {
        self.timeouts.insert(page, times);
        self
    }

    /// Pager queries fail with a driver error
    pub fn with_broken_pager(mut self) -> Self {
        self.broken_pager = true;
        self
    }

    /// The pager is found, but looking up its "next" control fails with a
    /// driver error
    pub fn with_broken_next(mut self) -> Self {
        self.broken_next = true;
        self
    }
}

/// Element handle of the fake DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    CategoryLink(Option<String>),
    Card {
        category: String,
        page: usize,
        index: usize,
    },
    Title(String),
    Price(String),
    Link(Option<String>),
    Pager {
        generation: u64,
    },
    Next {
        generation: u64,
    },
    Sku(String),
}

#[derive(Debug, Default)]
struct State {
    selectors: SiteSelectors,
    home_links: Vec<Option<String>>,
    categories: HashMap<String, Category>,
    details: HashMap<String, String>,

    current_url: String,
    page: usize,
    generation: u64,
    isolated: Option<String>,

    navigations: Vec<String>,
    detail_visits: Vec<String>,
    listing_waits: u32,
    reloads: u32,
    clicks: u32,
    isolated_opened: u32,
    isolated_closed: u32,
    closes: u32,
}

impl State {
    fn current_page(&self) -> Option<&ListingPage> {
        self.categories
            .get(&self.current_url)
            .and_then(|category| category.pages.get(self.page))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeStorefront {
    state: Arc<Mutex<State>>,
}

fn timeout(waiting_for: &str) -> DomError {
    DomError::Timeout {
        waiting_for: waiting_for.to_string(),
        after: Duration::from_millis(50),
    }
}

fn not_found(selector: &str) -> DomError {
    DomError::NotFound {
        selector: selector.to_string(),
    }
}

impl FakeStorefront {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a home page link to a category served at the resolved href
    pub fn with_category(self, href: &str, category: Category) -> Self {
        {
            let mut state = self.lock();
            state.home_links.push(Some(href.to_string()));
            state
                .categories
                .insert(resolve_url(HOME_URL, href), category);
        }
        self
    }

    /// Adds a home page link with nothing behind it
    pub fn with_link(self, href: Option<&str>) -> Self {
        self.lock().home_links.push(href.map(str::to_string));
        self
    }

    /// Serves a detail page whose SKU element reads `sku_text`
    pub fn with_detail(self, product_url: &str, sku_text: &str) -> Self {
        self.lock()
            .details
            .insert(product_url.to_string(), sku_text.to_string());
        self
    }

    /// Primary context navigations, in order
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    /// Isolated context navigations, in order
    pub fn detail_visits(&self) -> Vec<String> {
        self.lock().detail_visits.clone()
    }

    pub fn current_url(&self) -> String {
        self.lock().current_url.clone()
    }

    pub fn current_page(&self) -> usize {
        self.lock().page
    }

    pub fn listing_waits(&self) -> u32 {
        self.lock().listing_waits
    }

    pub fn reloads(&self) -> u32 {
        self.lock().reloads
    }

    pub fn clicks(&self) -> u32 {
        self.lock().clicks
    }

    pub fn closes(&self) -> u32 {
        self.lock().closes
    }

    pub fn isolated_open(&self) -> bool {
        self.lock().isolated.is_some()
    }

    /// (opened, closed) counts of the isolated context
    pub fn isolated_contexts(&self) -> (u32, u32) {
        let state = self.lock();
        (state.isolated_opened, state.isolated_closed)
    }

    /// Positions the primary context on a URL without counting a navigation
    pub fn go_to(&self, url: &str) {
        let mut state = self.lock();
        state.current_url = url.to_string();
        state.page = 0;
        state.generation += 1;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn wait_matching(&self, selector: &str) -> DomResult<Vec<Node>> {
        let mut guard = self.lock();
        let state = &mut *guard;

        if let Some(detail_url) = &state.isolated {
            if selector == state.selectors.sku {
                if let Some(text) = state.details.get(detail_url) {
                    return Ok(vec![Node::Sku(text.clone())]);
                }
            }
            return Err(timeout(selector));
        }

        if selector == state.selectors.category {
            if state.current_url == HOME_URL && !state.home_links.is_empty() {
                return Ok(state
                    .home_links
                    .iter()
                    .cloned()
                    .map(Node::CategoryLink)
                    .collect());
            }
            return Err(timeout(selector));
        }

        if selector == state.selectors.product {
            state.listing_waits += 1;
            let url = state.current_url.clone();
            let page = state.page;

            let Some(category) = state.categories.get_mut(&url) else {
                return Err(timeout(selector));
            };
            if let Some(remaining) = category.timeouts.get_mut(&page) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(timeout(selector));
                }
            }

            let cards = category.pages.get(page).map_or(0, |p| p.cards.len());
            if cards == 0 {
                return Err(timeout(selector));
            }
            return Ok((0..cards)
                .map(|index| Node::Card {
                    category: url.clone(),
                    page,
                    index,
                })
                .collect());
        }

        Err(timeout(selector))
    }
}

#[async_trait]
impl DomAccessor for FakeStorefront {
    type Element = Node;

    async fn navigate(&self, url: &str) -> DomResult<()> {
        let mut state = self.lock();
        if state.isolated.is_some() {
            state.isolated = Some(url.to_string());
            state.detail_visits.push(url.to_string());
        } else {
            state.current_url = url.to_string();
            state.page = 0;
            state.generation += 1;
            state.navigations.push(url.to_string());
        }
        Ok(())
    }

    async fn reload(&self) -> DomResult<()> {
        let mut state = self.lock();
        if state.isolated.is_none() {
            state.generation += 1;
            state.reloads += 1;
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> DomResult<Node> {
        self.wait_matching(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| timeout(selector))
    }

    async fn wait_for_all(&self, selector: &str, _timeout: Duration) -> DomResult<Vec<Node>> {
        self.wait_matching(selector)
    }

    async fn query(&self, selector: &str) -> DomResult<Vec<Node>> {
        let state = self.lock();
        if state.isolated.is_none()
            && selector == state.selectors.category
            && state.current_url == HOME_URL
        {
            return Ok(state
                .home_links
                .iter()
                .cloned()
                .map(Node::CategoryLink)
                .collect());
        }
        Ok(Vec::new())
    }

    async fn query_one(&self, selector: &str) -> DomResult<Node> {
        let state = self.lock();
        if state.isolated.is_some() || selector != state.selectors.pager {
            return Err(not_found(selector));
        }

        if state
            .categories
            .get(&state.current_url)
            .is_some_and(|category| category.broken_pager)
        {
            return Err(DomError::Driver("connection reset by peer".to_string()));
        }

        match state.current_page().map(|page| page.pager) {
            None | Some(Pager::Absent) => Err(not_found(selector)),
            Some(_) => Ok(Node::Pager {
                generation: state.generation,
            }),
        }
    }

    async fn query_within(&self, element: &Node, selector: &str) -> DomResult<Node> {
        let state = self.lock();
        let Node::Card {
            category,
            page,
            index,
        } = element
        else {
            return Err(not_found(selector));
        };
        let card = state
            .categories
            .get(category)
            .and_then(|c| c.pages.get(*page))
            .and_then(|p| p.cards.get(*index))
            .ok_or(DomError::Stale)?;

        let selectors = &state.selectors;
        if selector == selectors.title {
            card.title.clone().map(Node::Title).ok_or_else(|| not_found(selector))
        } else if selector == selectors.price {
            card.price.clone().map(Node::Price).ok_or_else(|| not_found(selector))
        } else if selector == selectors.link {
            Ok(Node::Link(card.href.clone()))
        } else {
            Err(not_found(selector))
        }
    }

    async fn find_by_text_within(&self, element: &Node, text: &str) -> DomResult<Node> {
        let state = self.lock();
        let Node::Pager { generation } = element else {
            return Err(not_found(text));
        };

        if state
            .categories
            .get(&state.current_url)
            .is_some_and(|category| category.broken_next)
        {
            return Err(DomError::Driver("websocket closed".to_string()));
        }

        let has_next = matches!(
            state.current_page().map(|page| page.pager),
            Some(Pager::HasNext) | Some(Pager::StuckNext)
        );
        if has_next && text == state.selectors.next_page_text {
            Ok(Node::Next {
                generation: *generation,
            })
        } else {
            Err(not_found(text))
        }
    }

    async fn attribute(&self, element: &Node, name: &str) -> DomResult<Option<String>> {
        match (element, name) {
            (Node::CategoryLink(href), "href") | (Node::Link(href), "href") => Ok(href.clone()),
            _ => Ok(None),
        }
    }

    async fn text(&self, element: &Node) -> DomResult<String> {
        match element {
            Node::Title(text) | Node::Price(text) | Node::Sku(text) => Ok(text.clone()),
            _ => Ok(String::new()),
        }
    }

    async fn click(&self, element: &Node) -> DomResult<()> {
        let mut state = self.lock();
        let Node::Next { generation } = element else {
            return Ok(());
        };
        if *generation != state.generation {
            return Err(DomError::Stale);
        }

        state.clicks += 1;
        if state.current_page().map(|page| page.pager) == Some(Pager::HasNext) {
            state.page += 1;
            state.generation += 1;
        }
        Ok(())
    }

    async fn wait_for_stale(&self, element: &Node, _timeout: Duration) -> DomResult<()> {
        let state = self.lock();
        match element {
            Node::Pager { generation } if *generation == state.generation => {
                Err(timeout("pager to go stale"))
            }
            _ => Ok(()),
        }
    }

    async fn open_isolated_context(&self) -> DomResult<()> {
        let mut state = self.lock();
        if state.isolated.is_some() {
            return Err(DomError::Driver("isolated context already open".to_string()));
        }
        state.isolated = Some("about:blank".to_string());
        state.isolated_opened += 1;
        Ok(())
    }

    async fn close_isolated_context(&self) -> DomResult<()> {
        let mut state = self.lock();
        state.isolated = None;
        state.isolated_closed += 1;
        Ok(())
    }

    async fn close(&self) -> DomResult<()> {
        self.lock().closes += 1;
        Ok(())
    }
}
