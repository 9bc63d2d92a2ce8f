//! The `vlist(config).use(feature).build()` pipeline (spec §4.8).

use std::collections::HashMap;

use web_sys::window;

use crate::config::{Container, ListConfig};
use crate::context::{BuilderContext, HandlerSlots, ResolvedConfig};
use crate::data_manager::InMemoryDataManager;
use crate::dom;
use crate::element_pool::{default_row_reset, ElementPool};
use crate::error::ConfigError;
use crate::feature::Feature;
use crate::list::VList;
use crate::render_loop;
use crate::renderer::Renderer;
use crate::scroll_controller::ScrollController;
use crate::size_cache::SizeCache;
use crate::viewport_state::ViewportState;

/// Entry point: start a builder from `config`.
pub fn vlist<T: 'static>(config: ListConfig<T>) -> VlistBuilder<T> {
    VlistBuilder { config, features: Vec::new() }
}

/// Accumulates features before `build()` assembles everything.
pub struct VlistBuilder<T> {
    config: ListConfig<T>,
    features: Vec<Box<dyn Feature<T>>>,
}

impl<T> std::fmt::Debug for VlistBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VlistBuilder")
            .field("config", &self.config)
            .field("feature_count", &self.features.len())
            .finish()
    }
}

impl<T: 'static> VlistBuilder<T> {
    /// Record a feature to be applied during `build()`.
    pub fn use_feature(mut self, feature: Box<dyn Feature<T>>) -> Self {
        self.features.push(feature);
        self
    }

    /// Resolve the container, construct the DOM scaffold, assemble the
    /// builder context, apply features in priority order, run the initial
    /// render, and return the public handle.
    pub fn build(self) -> Result<VList<T>, ConfigError> {
        let VlistBuilder { config, mut features } = self;

        if !matches!(config.orientation, crate::viewport_state::Orientation::Vertical | crate::viewport_state::Orientation::Horizontal) {
            return Err(ConfigError::InvalidOrientation("unrecognized orientation".into()));
        }

        check_conflicts(&features)?;
        features.sort_by_key(|f| f.priority());

        let document = window()
            .and_then(|w| w.document())
            .ok_or_else(|| ConfigError::NoContainer("no document available".into()))?;

        let scaffold = dom::build_scaffold(
            &document,
            config.container,
            &config.class_prefix,
            config.aria_label.as_deref(),
            config.orientation,
        )?;

        let item_count = config.items.len();
        let size_cache = SizeCache::new(config.item.size, item_count);
        let scroll_controller = ScrollController::new(
            scaffold.viewport.clone(),
            size_cache.total_size(),
            config.scroll.wrap,
            config.scroll.fine_motion_band,
        );
        let data_manager = Box::new(InMemoryDataManager::new(config.items));

        let pool = ElementPool::new(
            document.clone(),
            "div",
            config.pool.max_size,
            default_row_reset(&config.class_prefix),
        );
        let template = config.item.template;
        let get_id = config.item.get_id;
        let renderer = Renderer::new(
            document,
            scaffold.items.clone(),
            pool,
            config.class_prefix.clone(),
            config.orientation,
            Box::new(move |item: &T| get_id(item)),
            Box::new(move |item: &T, index: usize| template(item, index)),
        );

        let mut ctx = BuilderContext {
            dom: scaffold,
            state: ViewportState::new(config.orientation),
            emitter: crate::emitter::Emitter::new(),
            methods: HashMap::new(),
            resolved_config: ResolvedConfig {
                overscan: config.overscan,
                class_prefix: config.class_prefix,
                reverse: config.reverse,
                wheel_enabled: config.scroll.wheel,
                idle_timeout_ms: config.scroll.idle_timeout_ms,
                scrollbar: config.scroll.scrollbar,
            },
            size_cache,
            scroll_controller,
            data_manager,
            renderer,
            handlers: HandlerSlots::default(),
            range_fn: None,
            force_render_flag: true,
            pending_force: std::rc::Rc::new(std::cell::Cell::new(false)),
            frame_counter: 0,
            last_scroll_position: f64::NAN,
            last_container_size: f64::NAN,
            external_scroll: std::rc::Rc::new(std::cell::Cell::new(None)),
            last_selection: (std::rc::Rc::new(std::collections::HashSet::new()), None),
        };

        for mut feature in features {
            feature.setup(&mut ctx);
            // Keep each feature's `destroy` callback reachable without
            // forcing implementers to push it onto the slot themselves.
            let mut feature = feature;
            ctx.handlers
                .destroy_handlers
                .push(Box::new(move |ctx| feature.destroy(ctx)));
        }

        let container_size = dom::client_size(&ctx.dom.viewport, ctx.state.orientation);
        render_loop::render_if_needed(&mut ctx, ctx.scroll_controller.get_scroll_top(), container_size);

        Ok(VList::new(ctx))
    }
}

fn check_conflicts<T>(features: &[Box<dyn Feature<T>>]) -> Result<(), ConfigError> {
    for i in 0..features.len() {
        for j in (i + 1)..features.len() {
            let a = features[i].as_ref();
            let b = features[j].as_ref();
            if a.conflicts().contains(&b.name()) || b.conflicts().contains(&a.name()) {
                return Err(ConfigError::Conflict { a: a.name().to_string(), b: b.name().to_string() });
            }
        }
    }
    Ok(())
}
