use std::cell::Cell;
use std::rc::Rc;

use crate::config::AssignerConfig;
use crate::dom::{Dom, NodeId};
use crate::page::{Event, Handler, Page, READY_EVENT};
use crate::palette::{ColorToken, Palette};
use crate::seedrandom::{Arc4Random, SeedRandom};
use crate::selector::{SelectorGroups, parse_selector_groups};
use crate::Result;

/// Gives every marked element a palette color chosen from the page seed
/// and the element's text.
///
/// The mapping is a pure function of `(seed, text)`: the same pair always
/// lands on the same token, and different pairs may collide.
pub struct ColorAssigner<R = Arc4Random> {
    config: AssignerConfig,
    random: R,
    marker: SelectorGroups,
    seed_host: SelectorGroups,
    swap_listener_installed: Cell<bool>,
}

impl ColorAssigner<Arc4Random> {
    pub fn new(config: AssignerConfig) -> Result<Self> {
        Self::with_random(config, Arc4Random)
    }
}

impl<R: SeedRandom> ColorAssigner<R> {
    /// Builds an assigner with a custom generator. Fails only on invalid
    /// configuration; nothing afterwards can fail.
    pub fn with_random(config: AssignerConfig, random: R) -> Result<Self> {
        config.validate()?;
        let marker = parse_selector_groups(&config.marker_selector())?;
        let seed_host = parse_selector_groups(&config.seed_host)?;
        Ok(Self {
            config,
            random,
            marker,
            seed_host,
            swap_listener_installed: Cell::new(false),
        })
    }

    pub fn config(&self) -> &AssignerConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.config.palette
    }

    /// Color for `seed + element_key`. Empty inputs are fine.
    pub fn compute_color(&self, seed: &str, element_key: &str) -> &ColorToken {
        let mut combined = String::with_capacity(seed.len() + element_key.len());
        combined.push_str(seed);
        combined.push_str(element_key);
        self.config.palette.pick(self.random.unit(&combined))
    }

    /// The seed attribute on the seed host, or `""` when either is missing.
    pub fn read_seed(&self, dom: &Dom) -> String {
        dom.query_parsed(&self.seed_host)
            .first()
            .and_then(|host| dom.attr(*host, &self.config.seed_attribute))
            .unwrap_or_default()
    }

    pub fn element_key(&self, dom: &Dom, node_id: NodeId) -> String {
        self.config
            .key_normalization
            .apply(dom.text_content(node_id))
    }

    pub fn targets(&self, dom: &Dom) -> Vec<NodeId> {
        dom.query_parsed(&self.marker)
    }

    /// Colors every current target with `seed`, keeping their other inline
    /// declarations. Returns how many elements were colored.
    pub fn apply_colors(&self, dom: &mut Dom, seed: &str) -> usize {
        self.assign(dom, seed).len()
    }

    /// Reads the seed from the page and colors its targets.
    pub fn apply_to_page(&self, page: &mut Page) -> usize {
        let seed = self.read_seed(page.dom());
        let assigned = self.assign(page.dom_mut(), &seed);
        if page.is_tracing() {
            for (node, token) in &assigned {
                let label = page.dom().node_label(*node);
                page.trace_line(format!("[color] {label} -> {token}"));
            }
            page.trace_line(format!(
                "[color] applied {} with seed {seed:?}",
                assigned.len()
            ));
        }
        assigned.len()
    }

    fn assign(&self, dom: &mut Dom, seed: &str) -> Vec<(NodeId, ColorToken)> {
        let mut assigned = Vec::new();
        for node in self.targets(dom) {
            let key = self.element_key(dom, node);
            let token = self.compute_color(seed, &key).clone();
            if dom
                .style_set(node, &self.config.style_property, token.as_str())
                .is_ok()
            {
                assigned.push((node, token));
            }
        }
        assigned
    }
}

impl<R: SeedRandom + 'static> ColorAssigner<R> {
    /// Hooks the assigner into the page lifecycle: color on ready, then
    /// recolor whenever the swap event reaches the seed host. If the page
    /// is already loaded the ready step runs immediately.
    pub fn install(self, page: &mut Page) {
        Rc::new(self).install_shared(page);
    }

    pub fn install_shared(self: Rc<Self>, page: &mut Page) {
        if page.is_loaded() {
            Self::on_ready(&self, page);
            return;
        }

        let assigner = Rc::clone(&self);
        let ready: Handler = Rc::new(move |page: &mut Page, _: &mut Event| -> Result<()> {
            Self::on_ready(&assigner, page);
            Ok(())
        });
        let document = page.document();
        page.add_event_listener(document, READY_EVENT, ready);
    }

    fn on_ready(this: &Rc<Self>, page: &mut Page) {
        this.apply_to_page(page);

        if this.swap_listener_installed.get() {
            return;
        }
        // Swap events bubble to the document, so it stands in for a missing
        // host. The seed then reads as empty.
        let host = match page.first_match(&this.seed_host) {
            Some(host) => host,
            None => {
                page.trace_line(format!(
                    "[color] no {} element; listening for swaps on document",
                    this.config.seed_host
                ));
                page.document()
            }
        };

        let assigner = Rc::clone(this);
        let on_swap: Handler = Rc::new(move |page: &mut Page, _: &mut Event| -> Result<()> {
            assigner.apply_to_page(page);
            Ok(())
        });
        page.add_event_listener(host, &this.config.swap_event, on_swap);
        this.swap_listener_installed.set(true);
    }
}
