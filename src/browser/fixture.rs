//! In-memory driver fixture
//!
//! A scripted [`BrowserDriver`] over a fixed set of page descriptions.
//! The test suite runs the whole engine against it; it is also handy for
//! dry-running detection heuristics without a live browser.

use super::{BrowserDriver, ElementHandle};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// What clicking an element does to the fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Nothing happens
    None,
    /// The session moves to another fixture page (by index)
    GotoPage(usize),
    /// The document grows to its next scripted height
    GrowDocument,
}

/// One scripted DOM element
#[derive(Debug, Clone)]
pub struct ElementFixture {
    selectors: Vec<String>,
    text: String,
    attrs: HashMap<String, String>,
    enabled: bool,
    on_click: ClickAction,
}

impl ElementFixture {
    /// An element matched by any of the given selector atoms
    pub fn new(selectors: &[&str]) -> Self {
        Self {
            selectors: selectors.iter().map(ToString::to_string).collect(),
            text: String::new(),
            attrs: HashMap::new(),
            enabled: true,
            on_click: ClickAction::None,
        }
    }

    /// Set the element's visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Mark the element disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set the click behavior
    #[must_use]
    pub fn on_click(mut self, action: ClickAction) -> Self {
        self.on_click = action;
        self
    }

    fn matches(&self, atom: &str) -> bool {
        self.selectors.iter().any(|s| s == atom)
    }
}

/// One scripted page
#[derive(Debug, Clone)]
pub struct PageFixture {
    url: String,
    elements: Vec<ElementFixture>,
    heights: Vec<i64>,
}

impl PageFixture {
    /// A page at the given URL with no elements and a fixed height
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            elements: Vec::new(),
            heights: vec![1000],
        }
    }

    /// Add an element
    #[must_use]
    pub fn with_element(mut self, element: ElementFixture) -> Self {
        self.elements.push(element);
        self
    }

    /// Script the document heights observed across scroll rounds; each
    /// successful scroll (or `GrowDocument` click) advances to the next one
    #[must_use]
    pub fn with_heights(mut self, heights: Vec<i64>) -> Self {
        self.heights = heights;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct HandleInfo {
    page: usize,
    element: usize,
}

#[derive(Debug, Default)]
struct Inner {
    current: usize,
    height_idx: usize,
    next_handle: u64,
    handles: HashMap<u64, HandleInfo>,
    fail_gotos: u32,
    fail_clicks: u32,
    goto_log: Vec<String>,
}

/// Scripted in-memory browser driver
#[derive(Debug)]
pub struct FixtureDriver {
    pages: Vec<PageFixture>,
    inner: Mutex<Inner>,
}

impl FixtureDriver {
    /// Build a driver over the given pages, starting at the first
    pub fn new(pages: Vec<PageFixture>) -> Self {
        assert!(!pages.is_empty(), "fixture needs at least one page");
        Self {
            pages,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// A driver with a single page
    pub fn single(page: PageFixture) -> Self {
        Self::new(vec![page])
    }

    /// Make the next `n` `goto` calls fail
    pub fn fail_next_gotos(&self, n: u32) {
        self.inner.lock().unwrap().fail_gotos = n;
    }

    /// Make the next `n` `click` calls fail
    pub fn fail_next_clicks(&self, n: u32) {
        self.inner.lock().unwrap().fail_clicks = n;
    }

    /// URLs passed to `goto`, in order
    pub fn goto_log(&self) -> Vec<String> {
        self.inner.lock().unwrap().goto_log.clone()
    }

    /// Index of the page the session is currently on
    pub fn current_page_index(&self) -> usize {
        self.inner.lock().unwrap().current
    }

    fn switch_to(&self, inner: &mut Inner, page: usize) {
        inner.current = page;
        inner.height_idx = 0;
    }

    fn resolve(&self, inner: &Inner, el: &ElementHandle) -> Result<&ElementFixture> {
        let info = inner
            .handles
            .get(&el.id())
            .ok_or_else(|| Error::browser(format!("unknown element handle {}", el.id())))?;
        if info.page != inner.current {
            return Err(Error::browser("stale element reference"));
        }
        Ok(&self.pages[info.page].elements[info.element])
    }

    fn query(&self, inner: &mut Inner, selector: &str) -> Vec<ElementHandle> {
        let page = inner.current;
        let mut handles = Vec::new();
        for atom in selector.split(',').map(str::trim) {
            for (idx, element) in self.pages[page].elements.iter().enumerate() {
                if element.matches(atom) {
                    let id = inner.next_handle;
                    inner.next_handle += 1;
                    inner.handles.insert(id, HandleInfo { page, element: idx });
                    handles.push(ElementHandle::new(id));
                }
            }
        }
        handles
    }
}

#[async_trait]
impl BrowserDriver for FixtureDriver {
    async fn current_url(&self) -> Result<String> {
        let inner = self.inner.lock().unwrap();
        Ok(self.pages[inner.current].url.clone())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let mut inner = self.inner.lock().unwrap();
        Ok(self.query(&mut inner, selector))
    }

    async fn query_one(&self, selector: &str) -> Result<Option<ElementHandle>> {
        let mut inner = self.inner.lock().unwrap();
        Ok(self.query(&mut inner, selector).into_iter().next())
    }

    async fn attr(&self, el: &ElementHandle, name: &str) -> Result<Option<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(self.resolve(&inner, el)?.attrs.get(name).cloned())
    }

    async fn text(&self, el: &ElementHandle) -> Result<String> {
        let inner = self.inner.lock().unwrap();
        Ok(self.resolve(&inner, el)?.text.clone())
    }

    async fn is_enabled(&self, el: &ElementHandle) -> Result<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(self.resolve(&inner, el)?.enabled)
    }

    async fn scroll_into_view(&self, el: &ElementHandle) -> Result<()> {
        let inner = self.inner.lock().unwrap();
        self.resolve(&inner, el)?;
        Ok(())
    }

    async fn click(&self, el: &ElementHandle) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_clicks > 0 {
            inner.fail_clicks -= 1;
            return Err(Error::browser("click intercepted"));
        }
        let action = self.resolve(&inner, el)?.on_click;
        match action {
            ClickAction::None => {}
            ClickAction::GotoPage(page) => self.switch_to(&mut inner, page),
            ClickAction::GrowDocument => {
                let page = inner.current;
                if inner.height_idx + 1 < self.pages[page].heights.len() {
                    inner.height_idx += 1;
                }
            }
        }
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.goto_log.push(url.to_string());
        if inner.fail_gotos > 0 {
            inner.fail_gotos -= 1;
            return Err(Error::browser("navigation aborted"));
        }
        let target = self
            .pages
            .iter()
            .position(|p| p.url == url)
            .ok_or_else(|| Error::browser(format!("no fixture page for {url}")))?;
        self.switch_to(&mut inner, target);
        Ok(())
    }

    async fn execute_script(&self, _script: &str) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        Ok(!self.query(&mut inner, selector).is_empty())
    }

    async fn is_stale(&self, el: &ElementHandle) -> Result<bool> {
        let inner = self.inner.lock().unwrap();
        match inner.handles.get(&el.id()) {
            Some(info) => Ok(info.page != inner.current),
            None => Ok(true),
        }
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let page = inner.current;
        if inner.height_idx + 1 < self.pages[page].heights.len() {
            inner.height_idx += 1;
        }
        Ok(())
    }

    async fn document_height(&self) -> Result<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(self.pages[inner.current].heights[inner.height_idx])
    }
}
