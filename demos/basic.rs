//! End-to-end analysis of a small broadcast trace.
//!
//! Run with: cargo run --example basic

use eptoscope::{
    aggregate_delay_distribution, check_delivery_orders, message_delay_distributions,
    rate_histogram, DeliveryIndex, MessageId, RateOptions, TraceEvent,
};

fn main() {
    let m = |r: &str| r.parse::<MessageId>().unwrap();

    // A trace records parsed protocol events in log order. Three actors;
    // actor_0 broadcasts two messages, everyone delivers them in the same
    // relative order.
    let events = vec![
        TraceEvent::broadcast("actor_0", 100, 1, m("actor_0:1")),
        TraceEvent::delivered("actor_0", 104, 2, m("actor_0:1")),
        TraceEvent::delivered("actor_1", 106, 2, m("actor_0:1")),
        TraceEvent::delivered("actor_2", 106, 2, m("actor_0:1")),
        TraceEvent::broadcast("actor_0", 110, 3, m("actor_0:2")),
        TraceEvent::delivered("actor_0", 114, 4, m("actor_0:2")),
        TraceEvent::delivered("actor_1", 118, 4, m("actor_0:2")),
    ];

    let index = DeliveryIndex::from_events(events);

    println!("Actors: {}", index.num_actors());
    println!("Messages: {}", index.num_messages());
    if let Some(epoch) = index.epoch() {
        println!("Epoch: {}..={}", epoch.min_seq, epoch.max_seq);
    }

    // Are the delivery orders mutually consistent with one global order?
    match check_delivery_orders(index.orders()) {
        Ok(()) => println!("Delivery orders: consistent"),
        Err(e) => println!("Delivery orders: {e}"),
    }

    // Delay distribution averaged across all messages.
    let per_message = message_delay_distributions(&index);
    let aggregate = aggregate_delay_distribution(per_message.values());
    println!("\nAggregate delay distribution:");
    for (delay, fraction) in &aggregate {
        println!("  delay {delay:>3}: {fraction:.3}");
    }

    // Compressed coverage histogram.
    println!("\nCoverage histogram:");
    for bin in rate_histogram(&index, index.num_actors(), &RateOptions::default()) {
        println!("  {:>7}: {:.3}", bin.label, bin.value);
    }

    // Now a trace where two actors disagree on the order of two messages.
    println!("\n--- Inconsistent trace ---\n");

    let bad_events = vec![
        TraceEvent::broadcast("actor_0", 100, 1, m("actor_0:1")),
        TraceEvent::broadcast("actor_1", 101, 1, m("actor_1:1")),
        TraceEvent::delivered("actor_0", 105, 2, m("actor_0:1")),
        TraceEvent::delivered("actor_0", 106, 2, m("actor_1:1")),
        TraceEvent::delivered("actor_1", 105, 2, m("actor_1:1")),
        TraceEvent::delivered("actor_1", 106, 2, m("actor_0:1")),
    ];

    let bad_index = DeliveryIndex::from_events(bad_events);
    let verdict = check_delivery_orders(bad_index.orders());
    assert!(verdict.is_err());

    if let Err(witness) = verdict {
        println!("{witness}");
        println!(
            "  pair: ({}, {})  messages: {} / {}",
            witness.actor_a, witness.actor_b, witness.first, witness.second
        );
    }

    println!("\nDone!");
}
