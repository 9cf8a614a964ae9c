//! Counter - proto-react demo
//!
//! Mounts a small app with a toggle and a counter, then drives it frame by
//! frame: each frame gives the scheduler a wall-clock budget, and a
//! scripted click is dispatched whenever the renderer goes idle.
//!
//! Usage: `counter [--frames N] [--budget-us N]`. Set `RUST_LOG=debug` to
//! watch the scheduler and commit logs.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use proto_react_core::{h, handler, ClockDeadline, Component, Renderer, StepOutcome, SystemClock};
use proto_react_dom::{Document, Event, EventType};
use proto_react_hooks::{use_effect, use_state, Cleanup, HooksRuntime};

/// Counter and toggle app driven frame by frame by the proto-react scheduler.
#[derive(Parser, Debug)]
#[command(name = "counter", version, about)]
struct Cli {
    /// Frames to run before giving up.
    #[arg(long, default_value_t = 32)]
    frames: usize,

    /// Wall-clock budget of each frame, in microseconds.
    #[arg(long, default_value_t = 500)]
    budget_us: u64,
}

fn counter() -> Component {
    Component::new("Counter", |scope, _| {
        let (count, set_count) = use_state(scope, 0i64)?;
        use_effect(scope, (), || {
            log::info!("Counter mounted");
            Some(Box::new(|| log::info!("Counter unmounted")) as Cleanup)
        })?;
        use_effect(scope, [count], move || {
            log::info!("count is now {}", count);
            None
        })?;

        let increment = handler(move |_| set_count.update(|n| n + 1));
        h!("section", {}, [
            h!("button", { "id" => "increment", "onClick" => increment }, ["+1"]),
            h!("span", { "class" => "count" }, [count]),
        ])
    })
}

fn app(counter: Component) -> Component {
    Component::new("App", move |scope, _| {
        let (show, set_show) = use_state(scope, true)?;
        let toggle = handler(move |_| set_show.update(|shown| !shown));
        h!("div", { "class" => "app" }, [
            h!("button", { "id" => "toggle", "onClick" => toggle }, ["Toggle"]),
            h!("hr"),
            show.then(|| h!(&counter)),
        ])
    })
}

/// Button clicked each time the renderer goes idle.
const SCRIPT: &[&str] = &["increment", "increment", "toggle", "toggle", "increment"];

fn run(cli: &Cli) -> proto_react_core::Result<()> {
    let mut doc = Document::new();
    let container = doc.create_element("div");
    doc.append_child(doc.root(), container)?;

    let mut renderer = Renderer::new(doc);
    HooksRuntime::install(&mut renderer);
    renderer.render(h!(&app(counter()))?, container)?;

    let clock = SystemClock::new();
    let budget = Duration::from_micros(cli.budget_us);
    let mut script = SCRIPT.iter();
    for frame in 0..cli.frames {
        let deadline = ClockDeadline::new(clock, budget);
        match renderer.step(&deadline)? {
            StepOutcome::Yielded { units } => {
                log::debug!("frame {}: yielded after {} units", frame, units);
            }
            StepOutcome::Committed { units, report } => {
                println!(
                    "frame {:>3}: {} units, {} created, {} updated, {} deleted",
                    frame, units, report.created, report.updated, report.deleted
                );
                println!("           {}", renderer.document().to_html(container));
            }
            StepOutcome::Idle => {
                let Some(id) = script.next() else {
                    log::info!("script finished after {} frames", frame);
                    return Ok(());
                };
                match renderer.document().get_element_by_id(id) {
                    Some(target) => {
                        println!("frame {:>3}: click #{}", frame, id);
                        renderer.dispatch_event(Event::new(EventType::Click, target))?;
                    }
                    None => log::warn!("frame {}: no #{} to click", frame, id),
                }
            }
        }
    }
    log::info!("frame limit reached");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
