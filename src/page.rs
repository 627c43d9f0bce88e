use std::collections::HashMap;
use std::rc::Rc;

use crate::dom::{Dom, NodeId};
use crate::selector::SelectorGroups;
use crate::{Error, Result};

pub const READY_EVENT: &str = "DOMContentLoaded";
pub const HTMX_AFTER_SWAP: &str = "htmx:afterSwap";

const DEFAULT_TRACE_LOG_LIMIT: usize = 10_000;
const SNIPPET_CHARS: usize = 200;

/// Event listener callback. Receives the page so handlers can read and
/// mutate the document or register further listeners.
pub type Handler = Rc<dyn Fn(&mut Page, &mut Event) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: NodeId,
    propagation_stopped: bool,
}

impl Event {
    fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            propagation_stopped: false,
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[derive(Clone)]
struct Listener {
    id: ListenerId,
    handler: Handler,
}

#[derive(Default, Clone)]
struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
    next_id: u64,
}

impl ListenerStore {
    fn add(&mut self, node_id: NodeId, event: &str, handler: Handler) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default()
            .push(Listener { id, handler });
        id
    }

    fn remove(&mut self, node_id: NodeId, event: &str, id: ListenerId) -> bool {
        let Some(events) = self.map.get_mut(&node_id) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event) else {
            return false;
        };

        let Some(pos) = listeners.iter().position(|listener| listener.id == id) else {
            return false;
        };
        listeners.remove(pos);
        if listeners.is_empty() {
            events.remove(event);
        }
        if events.is_empty() {
            self.map.remove(&node_id);
        }
        true
    }

    fn get(&self, node_id: NodeId, event: &str) -> Vec<Handler> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .map(|listener| Rc::clone(&listener.handler))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn count(&self, node_id: NodeId, event: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map_or(0, Vec::len)
    }
}

/// A loaded page: document tree, listeners, and the load/swap lifecycle.
///
/// Events dispatch synchronously. Listeners run in registration order on
/// each node, target first, then bubbling up through ancestors to the
/// document.
pub struct Page {
    dom: Dom,
    listeners: ListenerStore,
    loaded: bool,
    trace: bool,
    trace_events: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
}

impl Page {
    /// Parses the markup. The ready event has not fired yet; call
    /// [`Page::finish_loading`] once setup is done.
    pub fn from_html(html: &str) -> Result<Self> {
        Ok(Self {
            dom: Dom::parse(html)?,
            listeners: ListenerStore::default(),
            loaded: false,
            trace: false,
            trace_events: true,
            trace_logs: Vec::new(),
            trace_log_limit: DEFAULT_TRACE_LOG_LIMIT,
        })
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn document(&self) -> NodeId {
        self.dom.root()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fires the ready event on the document. Only the first call does
    /// anything; it returns whether the event fired.
    pub fn finish_loading(&mut self) -> Result<bool> {
        if self.loaded {
            return Ok(false);
        }
        self.loaded = true;
        self.dispatch_event(self.document(), READY_EVENT)?;
        Ok(true)
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        if self.trace_logs.len() > max_entries {
            let overflow = self.trace_logs.len() - max_entries;
            self.trace_logs.drain(..overflow);
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn is_tracing(&self) -> bool {
        self.trace
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if !self.trace {
            return;
        }
        log::debug!(target: "memphis_colors", "{line}");
        if self.trace_logs.len() >= self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        self.trace_logs.push(line);
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace_events {
            self.trace_line(line);
        }
    }

    pub fn add_event_listener(
        &mut self,
        node_id: NodeId,
        event: &str,
        handler: Handler,
    ) -> ListenerId {
        self.listeners.add(node_id, event, handler)
    }

    pub fn remove_event_listener(&mut self, node_id: NodeId, event: &str, id: ListenerId) -> bool {
        self.listeners.remove(node_id, event, id)
    }

    pub fn listener_count(&self, node_id: NodeId, event: &str) -> usize {
        self.listeners.count(node_id, event)
    }

    pub fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub fn select_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    pub(crate) fn first_match(&self, groups: &SelectorGroups) -> Option<NodeId> {
        self.dom.query_parsed(groups).into_iter().next()
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)?;
        Ok(())
    }

    pub fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<Event> {
        let mut event = Event::new(event_type, target);

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }

        for node in path {
            event.current_target = node;
            self.invoke_listeners(node, &mut event)?;
            if event.propagation_stopped {
                self.trace_event_done(&event, "propagation_stopped");
                return Ok(event);
            }
        }

        self.trace_event_done(&event, "completed");
        Ok(event)
    }

    fn invoke_listeners(&mut self, node_id: NodeId, event: &mut Event) -> Result<()> {
        let handlers = self.listeners.get(node_id, &event.event_type);
        for handler in handlers {
            if self.trace {
                let target_label = self.dom.node_label(event.target);
                let current_label = self.dom.node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={}",
                    event.event_type, target_label, current_label
                ));
            }
            handler(self, event)?;
        }
        Ok(())
    }

    fn trace_event_done(&mut self, event: &Event, outcome: &str) {
        if !self.trace {
            return;
        }
        let target_label = self.dom.node_label(event.target);
        self.trace_event_line(format!(
            "[event] done {} target={} outcome={}",
            event.event_type, target_label, outcome
        ));
    }

    /// Replaces the children of the first element matching `selector` and
    /// fires `htmx:afterSwap` at it, the way htmx reports a completed swap.
    pub fn swap(&mut self, selector: &str, html: &str) -> Result<()> {
        self.swap_with_event(selector, html, HTMX_AFTER_SWAP)
    }

    pub fn swap_with_event(&mut self, selector: &str, html: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dom.set_inner_html(target, html)?;
        if self.trace {
            let label = self.dom.node_label(target);
            self.trace_line(format!("[swap] {label} <- {} bytes", html.len()));
        }
        self.dispatch_event(target, event)?;
        Ok(())
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dom.set_attr(target, name, value)
    }

    pub fn remove_attribute(&mut self, selector: &str, name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dom.remove_attr(target, name)
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.style_get(target, property)
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, &actual));
        }
        Ok(())
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.style_get(target, property)?;
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, &actual));
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn assertion_failed(&self, selector: &str, target: NodeId, expected: &str, actual: &str) -> Error {
        Error::AssertionFailed {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            dom_snippet: truncate_chars(&self.dom.dump_node(target), SNIPPET_CHARS),
        }
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
