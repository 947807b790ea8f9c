//! Drive the converter widget headlessly and print each rendered frame.

use foldview::{Converter, ConverterConfig, FixedRates, Surface, VElement, VNode};
use std::cell::RefCell;
use std::rc::Rc;

fn main() {
    let rates = FixedRates::new([("EUR", 1.36), ("JPY", 184.0), ("CHF", 1.47)]);
    let surface = Rc::new(RefCell::new(Surface::new(VNode::Element(
        VElement::new("div").attr("id", "out"),
    ))));

    let mut converter = Converter::mount(
        ConverterConfig::default(),
        Rc::new(rates),
        Rc::clone(&surface),
    );

    // The initial EUR lookup settles on the first turn; that completes the
    // first full snapshot.
    converter.turn();
    println!("initial:\n  {}\n", surface.borrow().root());

    // [0,0,3] is the "+" button, [0,1,1] the currency select, [2] reset.
    converter.dispatch(&[0, 0, 3], "click", "");
    converter.dispatch(&[0, 0, 3], "click", "");
    println!("after two increments:\n  {}\n", surface.borrow().root());

    converter.dispatch(&[0, 1, 1], "change", "JPY");
    println!("while the JPY rate loads:\n  {}\n", surface.borrow().root());

    converter.turn();
    println!("after the JPY quote:\n  {}\n", surface.borrow().root());

    converter.dispatch(&[2], "click", "");
    converter.turn();
    println!("after reset:\n  {}\n", surface.borrow().root());

    println!(
        "patch operations applied in total: {}",
        surface.borrow().patches_applied()
    );
}
