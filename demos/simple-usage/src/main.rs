use std::rc::Rc;

use vlist::builder::vlist;
use vlist::config::{Container, ItemConfig, ListConfig};
use vlist::renderer::TemplateOutput;
use vlist::size_cache::SizeSource;
use wasm_bindgen::prelude::wasm_bindgen;

#[wasm_bindgen(start)]
pub fn run() {
    vlist::init_panic_hook();

    let item = ItemConfig::new(
        SizeSource::Fixed(30.0),
        Rc::new(|item: &String, _index: usize| TemplateOutput::Html(format!("<div class=\"item\">{item}</div>"))),
    );

    let config = ListConfig::new(Container::Selector("#list".into()), item)
        .with_items((0..100).map(|i| format!("Item {i}")).collect())
        .with_class_prefix("scrollbar");

    let list = vlist(config).build().expect("#list must exist in the page");
    // Leaked deliberately: the list lives for the page's lifetime, same as
    // a top-level framework root would.
    std::mem::forget(list);
}
