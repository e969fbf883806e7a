//! Walk through an in-memory history: guarded pushes, back navigation that
//! the user may refuse, and listeners reporting every commit.
//!
//! Run with `RUST_LOG=debug cargo run --example memory_history` to see the
//! session's own diagnostics.

use navigation_history::{
    create_memory_history, info_log, BeforeHook, HistoryOptions, HookOutcome, PartialLocation,
};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

fn main() {
    env_logger::init();
    info_log!("Starting memory history demo");

    // Pretend the user refuses the first prompt and accepts the rest.
    let refused_once = Rc::new(Cell::new(false));
    let refused = Rc::clone(&refused_once);
    let history = match create_memory_history(
        HistoryOptions::new()
            .entries(["/", "/inbox"])
            .user_confirmation(move |message, answer| {
                let accept = refused.replace(true);
                println!("  confirm: {message} -> {}", if accept { "ok" } else { "cancel" });
                answer.complete(accept);
            }),
    ) {
        Ok(history) => history,
        Err(err) => {
            eprintln!("failed to create history: {err}");
            return;
        }
    };

    history.listen(|location| {
        println!(
            "{:<7} {:<24} key={} state={}",
            location.action,
            location.path(),
            location.key,
            location.state.as_ref().map_or_else(|| "-".to_string(), |state| state.to_string())
        );
    });

    // Leaving the editor needs confirmation.
    history.listen_before(BeforeHook::sync(|location| {
        if location.pathname.starts_with("/compose") {
            HookOutcome::Proceed
        } else {
            HookOutcome::defer("Discard the draft?")
        }
    }));

    history.push(
        PartialLocation::new()
            .pathname("/compose")
            .search("?to=team")
            .state(json!({ "draft": "Hello" })),
    );
    history.push("/inbox");
    history.push("/inbox");

    if let Err(err) = history.go(-2) {
        eprintln!("go failed: {err}");
    }
    history.go(10).ok();

    println!(
        "\nfinal: {} (entry {} of {})",
        history.committed_location().path(),
        history.current_index() + 1,
        history.len()
    );
}
