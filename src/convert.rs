use crate::bus::Sink;
use crate::dom::{self, Surface};
use crate::intent::intents;
use crate::lookup::RateLookup;
use crate::store::{model, ConverterModel};
use crate::stream::Stream;
use crate::view::{container, switch, Child, VElement, VNode};
use futures::executor::LocalPool;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Widget configuration — content, not mechanism.
///
/// The catalogue of selectable currencies and the initial values are
/// supplied by the host; nothing in the state or reconciliation logic knows
/// the concrete set. Deserializable so hosts can load it from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Currency the entered amount is denominated in.
    pub base_currency: String,
    /// Initial amount; reset restores it.
    pub initial_amount: f64,
    /// Initially selected target currency; reset restores it.
    pub initial_currency: String,
    /// Ordered catalogue of selectable target currencies.
    pub currencies: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            base_currency: "GBP".to_string(),
            initial_amount: 1.0,
            initial_currency: "EUR".to_string(),
            currencies: vec!["EUR".to_string(), "JPY".to_string(), "CHF".to_string()],
        }
    }
}

/// The closed set of user actions, one typed sink per kind.
pub struct ConverterEvents {
    pub amount_changed: Sink<String>,
    pub currency_changed: Sink<String>,
    pub increment_clicked: Sink<()>,
    pub decrement_clicked: Sink<()>,
    pub reset_clicked: Sink<()>,
}

impl ConverterEvents {
    pub fn new() -> Self {
        ConverterEvents {
            amount_changed: Sink::new(),
            currency_changed: Sink::new(),
            increment_clicked: Sink::new(),
            decrement_clicked: Sink::new(),
            reset_clicked: Sink::new(),
        }
    }
}

impl Default for ConverterEvents {
    fn default() -> Self {
        ConverterEvents::new()
    }
}

// Editable values print without a trailing ".0"; the converted total is
// formatted separately, always with two decimals.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Pure construction of the widget's tree-snapshot stream from the state
/// slices.
///
/// The outermost container emits its first snapshot once every nested stream
/// has a value, then re-emits on any state change.
pub fn view(
    events: &ConverterEvents,
    model: &ConverterModel,
    config: &ConverterConfig,
) -> Stream<VNode> {
    let amount_input = {
        let binding = events.amount_changed.binding("input");
        model.amount.map(move |amount| {
            VNode::Element(
                VElement::new("input")
                    .attr("type", "text")
                    .attr("value", format_number(*amount))
                    .on(binding.clone()),
            )
        })
    };

    let currency_select = {
        let binding = events.currency_changed.binding("change");
        let currencies = config.currencies.clone();
        model.currency.map(move |selected: &String| {
            let mut select = VElement::new("select").on(binding.clone());
            for code in &currencies {
                let mut option = VElement::new("option").child(VNode::text(code.as_str()));
                if code == selected {
                    option = option.attr("selected", "selected");
                }
                select = select.child(option);
            }
            VNode::Element(select)
        })
    };

    let rate_display = container(
        VElement::new("span").attr("class", "rate"),
        vec![
            Child::from(format!("rate: 1 {} = ", config.base_currency)),
            Child::from(model.rate.map(|rate| VNode::text(format_number(*rate)))),
            Child::from(" "),
            Child::from(
                model
                    .rate_currency
                    .map(|code: &String| VNode::text(code.clone())),
            ),
        ],
    );

    // While a lookup is outstanding, a placeholder; afterwards the rate
    // paired with the currency it was fetched for, not the possibly newer
    // current selection.
    let rate_or_loading = switch(&model.loading, move |loading| {
        if *loading {
            Child::Node(VNode::Element(
                VElement::new("span")
                    .attr("class", "rate")
                    .child(VNode::text("loading rate…")),
            ))
        } else {
            Child::Stream(rate_display.clone())
        }
    });

    let amount_label = container(
        VElement::new("label"),
        vec![
            Child::from(
                VElement::new("span")
                    .attr("class", "label")
                    .child(VNode::text("Amount")),
            ),
            Child::from(amount_input),
            Child::from(format!(" {}", config.base_currency)),
            Child::from(
                VElement::new("button")
                    .attr("class", "modifier")
                    .attr("type", "button")
                    .on(events.increment_clicked.binding("click"))
                    .child(VNode::text("+")),
            ),
            Child::from(
                VElement::new("button")
                    .attr("class", "modifier")
                    .attr("type", "button")
                    .on(events.decrement_clicked.binding("click"))
                    .child(VNode::text("-")),
            ),
        ],
    );

    let currency_label = container(
        VElement::new("label"),
        vec![
            Child::from(
                VElement::new("span")
                    .attr("class", "label")
                    .child(VNode::text("Currency")),
            ),
            Child::from(currency_select),
            Child::from(" "),
            Child::from(rate_or_loading),
        ],
    );

    let form = container(
        VElement::new("form"),
        vec![Child::from(amount_label), Child::from(currency_label)],
    );

    let converted_line = container(
        VElement::new("div").attr("class", "converted"),
        vec![
            Child::from(
                VElement::new("span")
                    .attr("class", "label")
                    .child(VNode::text("Converted")),
            ),
            Child::from(model.converted.map(|value| VNode::text(format!("{value:.2}")))),
            Child::from(" "),
            Child::from(
                model
                    .rate_currency
                    .map(|code: &String| VNode::text(code.clone())),
            ),
        ],
    );

    container(
        VElement::new("main"),
        vec![
            Child::from(form),
            Child::from(converted_line),
            Child::from(
                VElement::new("button")
                    .attr("class", "reset")
                    .attr("type", "button")
                    .on(events.reset_clicked.binding("click"))
                    .child(VNode::text("Reset")),
            ),
        ],
    )
}

/// A mounted widget: the full event → intent → state → view → patch pipeline
/// wired over a host-provided surface.
///
/// Nothing is process-global; every sink, slice, and the executor live in
/// this value.
pub struct Converter {
    pub events: ConverterEvents,
    pub model: ConverterModel,
    surface: Rc<RefCell<Surface>>,
    pool: LocalPool,
}

impl Converter {
    /// Wire the widget over the surface.
    ///
    /// The surface's existing subtree is virtualized once; afterwards only
    /// incremental patches are issued. The first full snapshot appears once
    /// every state slice has a value, which requires the initial rate lookup
    /// to settle — drive it with [`turn`](Converter::turn).
    pub fn mount(
        config: ConverterConfig,
        lookup: Rc<dyn RateLookup>,
        surface: Rc<RefCell<Surface>>,
    ) -> Converter {
        let pool = LocalPool::new();
        let events = ConverterEvents::new();
        let mapped = intents(&events, &config);
        let model = model(mapped, lookup, &pool.spawner(), &config);
        let tree = view(&events, &model, &config);
        dom::render(&tree, &surface);
        Converter {
            events,
            model,
            surface,
            pool,
        }
    }

    /// Drive spawned lookups until no further progress is possible without
    /// new input. Stream processing itself is synchronous; only the
    /// asynchronous lookup boundary needs turning.
    pub fn turn(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Deliver a surface event to the bindings at `path`, as the hosting
    /// environment's callbacks would. Returns whether any binding fired.
    pub fn dispatch(&self, path: &[usize], event: &str, value: &str) -> bool {
        dom::dispatch(&self.surface, path, event, value)
    }

    /// The displayed surface this widget renders into.
    pub fn surface(&self) -> Rc<RefCell<Surface>> {
        Rc::clone(&self.surface)
    }
}
