//! Scenario suites
//!
//! Each scenario mounts a fresh renderer, drives one or more render cycles
//! and checks the host tree through the assertion helpers.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use proto_react_core::prelude::*;
use proto_react_core::{Operation, SchedulerConfig};
use proto_react_dom::MutationRecord;
use proto_react_hooks::{use_effect, use_state, FiberHooks, HookKind};

use crate::assertions::*;
use crate::fixtures::{self, EffectLog, Mounted};
use crate::harness::TestBuilder;
use crate::{TestContext, TestSuite};

/// Every suite, in run order.
pub fn all_suites() -> Vec<TestSuite> {
    vec![
        reconciliation_suite(),
        scheduling_suite(),
        hooks_suite(),
        events_suite(),
        errors_suite(),
    ]
}

/// Positional diffing against the committed tree.
pub fn reconciliation_suite() -> TestSuite {
    let mut suite = TestSuite::new("reconciliation");
    suite.add_test(
        TestBuilder::new("rerender_is_idempotent")
            .description("Rendering an equal tree twice touches nothing")
            .tag("reconcile")
            .scenario(rerender_is_idempotent),
    );
    suite.add_test(
        TestBuilder::new("type_change_replaces_node")
            .tag("reconcile")
            .scenario(type_change_replaces_node),
    );
    suite.add_test(
        TestBuilder::new("shrinking_list_deletes_tail")
            .tag("reconcile")
            .scenario(shrinking_list_deletes_tail),
    );
    suite.add_test(
        TestBuilder::new("growing_list_appends")
            .tag("reconcile")
            .scenario(growing_list_appends),
    );
    suite.add_test(
        TestBuilder::new("conditional_child_keeps_order")
            .description("A child appearing mid-list lands between its siblings")
            .tag("reconcile")
            .scenario(conditional_child_keeps_order),
    );
    suite
}

fn rerender_is_idempotent(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    check(m.render(ctx, check(fixtures::list(&["a", "b"]))?))?;
    m.renderer.document_mut().take_mutations();

    let report = check(m.render(ctx, check(fixtures::list(&["a", "b"]))?))?;
    assert_no_mutations(&mut m.renderer)?;
    assert_eq(report.created, 0)?;
    assert_eq(report.deleted, 0)?;
    assert_html(m.renderer.document(), m.app, "<div><ul><li>a</li><li>b</li></ul></div>")
}

fn type_change_replaces_node(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    check(m.render(ctx, check(h!("div", {}, [h!("p", {}, ["x"])]))?))?;
    let p = nodes_by_tag(m.renderer.document(), "p")[0];
    m.renderer.document_mut().take_mutations();

    let report = check(m.render(ctx, check(h!("div", {}, [h!("section", {}, ["x"])]))?))?;
    assert_html(m.renderer.document(), m.app, "<div><div><section>x</section></div></div>")?;
    assert_true(!m.renderer.document().contains(p), "old <p> still in the document")?;
    assert_eq(report.deleted, 1)?;
    assert_eq(report.created, 2)?;

    let records = m.renderer.document_mut().take_mutations();
    assert_eq(
        count_mutations(&records, |r| matches!(r, MutationRecord::Release { node } if *node == p)),
        1,
    )
}

fn shrinking_list_deletes_tail(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    check(m.render(ctx, check(fixtures::list(&["A", "B", "C"]))?))?;
    let before = nodes_by_tag(m.renderer.document(), "li");
    assert_eq(before.len(), 3)?;

    let report = check(m.render(ctx, check(fixtures::list(&["A", "B"]))?))?;
    assert_html(m.renderer.document(), m.app, "<div><ul><li>A</li><li>B</li></ul></div>")?;
    assert_eq(report.deleted, 1)?;
    assert_eq(report.created, 0)?;

    // survivors keep their host nodes
    let after = nodes_by_tag(m.renderer.document(), "li");
    assert_eq(&after[..], &before[..2])?;
    assert_true(!m.renderer.document().contains(before[2]), "third <li> not released")
}

fn growing_list_appends(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    check(m.render(ctx, check(fixtures::list(&["A"]))?))?;
    let first = nodes_by_tag(m.renderer.document(), "li")[0];

    // two <li> plus their text
    let report = check(m.render(ctx, check(fixtures::list(&["A", "B", "C"]))?))?;
    assert_eq(report.created, 4)?;
    assert_eq(nodes_by_tag(m.renderer.document(), "li")[0], first)?;
    assert_html(
        m.renderer.document(),
        m.app,
        "<div><ul><li>A</li><li>B</li><li>C</li></ul></div>",
    )
}

fn conditional_child_keeps_order(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let view = |show: bool| {
        h!("nav", {}, [
            h!("button"),
            show.then(|| h!("p", {}, ["shown"])),
            h!("hr"),
        ])
    };

    check(m.render(ctx, check(view(false))?))?;
    assert_html(m.renderer.document(), m.app, "<div><nav><button></button><hr></hr></nav></div>")?;
    check(m.render(ctx, check(view(true))?))?;
    assert_html(
        m.renderer.document(),
        m.app,
        "<div><nav><button></button><p>shown</p><hr></hr></nav></div>",
    )?;
    check(m.render(ctx, check(view(false))?))?;
    assert_html(m.renderer.document(), m.app, "<div><nav><button></button><hr></hr></nav></div>")
}

/// Interruptible work loop.
pub fn scheduling_suite() -> TestSuite {
    let mut suite = TestSuite::new("scheduling");
    suite.add_test(
        TestBuilder::new("sliced_render_matches_full_run")
            .description("One unit per slice commits the same DOM as an unbounded run")
            .tag("scheduler")
            .scenario(sliced_render_matches_full_run),
    );
    suite.add_test(
        TestBuilder::new("abandoned_render_releases_nodes")
            .tag("scheduler")
            .scenario(abandoned_render_releases_nodes),
    );
    suite.add_test(
        TestBuilder::new("abandoned_render_keeps_nodes_when_disabled")
            .tag("scheduler")
            .scenario(abandoned_render_keeps_nodes_when_disabled),
    );
    suite.add_test(
        TestBuilder::new("clicks_during_traversal_are_not_lost")
            .tag("scheduler")
            .tag("hooks")
            .scenario(clicks_during_traversal_are_not_lost),
    );
    suite.add_test(
        TestBuilder::new("host_render_survives_click_mid_traversal")
            .description("A state change during a host render keeps the host's new tree")
            .tag("scheduler")
            .tag("hooks")
            .scenario(host_render_survives_click_mid_traversal),
    );
    suite
}

fn app_tree(counter: &Component) -> proto_react_core::Result<Element> {
    h!("main", {}, [
        h!("h1", {}, ["Tally"]),
        h!(counter, { "start" => 3 }),
        fixtures::list(&["x", "y"]),
    ])
}

fn sliced_render_matches_full_run(ctx: &mut TestContext) -> AssertResult {
    let counter = fixtures::counter();

    let mut full = Mounted::new();
    check(full.render(ctx, check(app_tree(&counter))?))?;

    let mut sliced = Mounted::new();
    check(sliced.renderer.render(check(app_tree(&counter))?, sliced.app))?;
    let mut yields = 0;
    loop {
        match check(sliced.renderer.step(&UnitBudget::new(1)))? {
            StepOutcome::Yielded { units } => {
                assert_eq(units, 1)?;
                assert_html(sliced.renderer.document(), sliced.app, "<div></div>")?;
                yields += 1;
            }
            StepOutcome::Committed { .. } => break,
            StepOutcome::Idle => return Err(String::from("went idle before committing")),
        }
    }
    ctx.committed();
    ctx.note(&format!("{} yields before commit", yields));

    assert_true(yields > 5, "render was not sliced")?;
    assert_eq(sliced.html(), full.html())?;
    assert_eq(sliced.html(), String::from(
        "<div><main><h1>Tally</h1><div><button>+</button><span>3</span></div><ul><li>x</li><li>y</li></ul></main></div>",
    ))
}

fn abandoned_render_releases_nodes(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let base = m.renderer.document().len();

    check(m.renderer.render(check(fixtures::list(&["a", "b"]))?, m.app))?;
    // root, then <ul>
    check(m.renderer.step(&UnitBudget::new(2)))?;
    assert_eq(m.renderer.document().len(), base + 1)?;

    check(m.renderer.render(check(h!("p"))?, m.app))?;
    assert_eq(m.renderer.document().len(), base)?;
    check(m.flush(ctx))?;
    assert_html(m.renderer.document(), m.app, "<div><p></p></div>")?;
    assert_eq(m.renderer.document().len(), base + 1)
}

fn abandoned_render_keeps_nodes_when_disabled(ctx: &mut TestContext) -> AssertResult {
    let config = SchedulerConfig {
        dispose_abandoned_nodes: false,
        ..Default::default()
    };
    let mut m = Mounted::with_config(config);
    let base = m.renderer.document().len();

    check(m.renderer.render(check(fixtures::list(&["a", "b"]))?, m.app))?;
    check(m.renderer.step(&UnitBudget::new(2)))?;
    check(m.renderer.render(check(h!("p"))?, m.app))?;
    // the detached <ul> stays behind
    assert_eq(m.renderer.document().len(), base + 1)?;
    check(m.flush(ctx))?;
    assert_eq(m.renderer.document().len(), base + 2)?;
    assert_html(m.renderer.document(), m.app, "<div><p></p></div>")
}

fn clicks_during_traversal_are_not_lost(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let counter = fixtures::counter();
    check(m.render(ctx, check(h!(&counter))?))?;
    let button = nodes_by_tag(m.renderer.document(), "button")[0];

    click(&mut m, button)?;
    match check(m.renderer.step(&UnitBudget::new(1)))? {
        StepOutcome::Yielded { .. } => {}
        other => return Err(format!("expected a yield, got {:?}", other)),
    }
    // the committed listener is still the one wired to the button
    click(&mut m, button)?;
    check(m.flush(ctx))?;
    assert_eq(m.text(), String::from("+2"))?;
    assert_true(!m.renderer.has_pending_work(), "work left after flush")
}

fn host_render_survives_click_mid_traversal(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let counter = fixtures::counter();
    let tree = |items: &[&str]| h!("section", {}, [h!(&counter), fixtures::list(items)]);
    check(m.render(ctx, check(tree(&["a"]))?))?;
    let button = nodes_by_tag(m.renderer.document(), "button")[0];

    check(m.renderer.render(check(tree(&["a", "b"]))?, m.app))?;
    match check(m.renderer.step(&UnitBudget::new(1)))? {
        StepOutcome::Yielded { .. } => {}
        other => return Err(format!("expected a yield, got {:?}", other)),
    }
    click(&mut m, button)?;
    check(m.flush(ctx))?;

    assert_eq(m.text(), String::from("+1ab"))?;
    assert_eq(nodes_by_tag(m.renderer.document(), "li").len(), 2)?;
    assert_true(!m.renderer.has_pending_work(), "work left after flush")
}

fn click(m: &mut Mounted, target: NodeId) -> AssertResult {
    m.renderer
        .dispatch_event(Event::new(EventType::Click, target))
        .map(|_| ())
        .map_err(|e| format!("dispatch failed: {}", e))
}

/// State and effect hooks.
pub fn hooks_suite() -> TestSuite {
    let mut suite = TestSuite::new("hooks");
    suite.add_test(
        TestBuilder::new("hook_order_is_stable")
            .description("Two states and an effect keep their slots across renders")
            .tag("hooks")
            .scenario(hook_order_is_stable),
    );
    suite.add_test(
        TestBuilder::new("effect_dependencies")
            .tag("hooks")
            .scenario(effect_dependencies),
    );
    suite.add_test(
        TestBuilder::new("cleanups_run_on_unmount")
            .tag("hooks")
            .scenario(cleanups_run_on_unmount),
    );
    suite
}

fn component_hooks(renderer: &Renderer) -> Option<(Vec<HookKind>, Option<Operation>)> {
    let fiber = renderer.fibers().iter().find(|f| f.is_component())?;
    let hooks = fiber.hooks.as_ref()?.downcast_ref::<FiberHooks>()?;
    Some((hooks.kinds(), fiber.operation))
}

fn hook_order_is_stable(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let profile = fixtures::profile();

    // the mount effect bumps visits, which renders once more
    check(m.render(ctx, check(h!(&profile, { "name" => "ada" }))?))?;
    assert_eq(m.text(), String::from("ada 1"))?;

    // the name prop only seeds the initial state
    check(m.render(ctx, check(h!(&profile, { "name" => "grace" }))?))?;
    assert_eq(m.text(), String::from("ada 1"))?;

    let (kinds, operation) = component_hooks(&m.renderer)
        .ok_or_else(|| String::from("no hook frame on the committed component"))?;
    assert_eq(kinds, vec![HookKind::State, HookKind::State, HookKind::Effect])?;
    assert_eq(operation, Some(Operation::Update))
}

fn effect_dependencies(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let log: EffectLog = Rc::new(RefCell::new(Vec::new()));
    let tracker = fixtures::tracker(&log);

    for value in [1, 1, 2, 2] {
        check(m.render(ctx, check(h!(&tracker, { "value" => value }))?))?;
    }
    assert_eq(m.text(), String::from("2"))?;
    let logged = log.borrow().clone();
    assert_eq(
        logged,
        vec![
            String::from("keyed 1"),
            String::from("mounted"),
            String::from("keyed cleanup 1"),
            String::from("keyed 2"),
        ],
    )
}

fn cleanups_run_on_unmount(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let log: EffectLog = Rc::new(RefCell::new(Vec::new()));
    let tracker = fixtures::tracker(&log);

    check(m.render(ctx, check(h!("section", {}, [h!(&tracker, { "value" => 7 })]))?))?;
    log.borrow_mut().clear();

    check(m.render(ctx, check(h!("section", {}, [h!("p")]))?))?;
    assert_html(m.renderer.document(), m.app, "<div><section><p></p></section></div>")?;
    let logged = log.borrow().clone();
    assert_eq(
        logged,
        vec![String::from("keyed cleanup 7"), String::from("unmounted")],
    )
}

/// Host events feeding state updates.
pub fn events_suite() -> TestSuite {
    let mut suite = TestSuite::new("events");
    suite.add_test(
        TestBuilder::new("counter_click_updates_text")
            .description("Clicking the button increments the rendered count")
            .tag("events")
            .tag("hooks")
            .scenario(counter_click_updates_text),
    );
    suite.add_test(
        TestBuilder::new("handler_swap_rewires_listener")
            .tag("events")
            .scenario(handler_swap_rewires_listener),
    );
    suite
}

fn counter_click_updates_text(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let counter = fixtures::counter();
    check(m.render(ctx, check(h!(&counter))?))?;
    assert_html(
        m.renderer.document(),
        m.app,
        "<div><div><button>+</button><span>0</span></div></div>",
    )?;
    let button = nodes_by_tag(m.renderer.document(), "button")[0];

    click(&mut m, button)?;
    assert_true(m.renderer.has_pending_work(), "click did not request a render")?;
    check(m.flush(ctx))?;
    assert_eq(m.text(), String::from("+1"))?;

    click(&mut m, button)?;
    click(&mut m, button)?;
    check(m.flush(ctx))?;
    assert_eq(m.text(), String::from("+3"))?;

    // same button node, one listener
    assert_eq(nodes_by_tag(m.renderer.document(), "button"), vec![button])?;
    assert_eq(m.renderer.document().listener_count(button), 1)
}

fn handler_swap_rewires_listener(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let hits = Rc::new(Cell::new(0u32));
    let first = {
        let hits = hits.clone();
        handler(move |_| hits.set(hits.get() + 1))
    };
    let second = {
        let hits = hits.clone();
        handler(move |_| hits.set(hits.get() + 10))
    };

    check(m.render(ctx, check(h!("button", { "onClick" => first.clone() }))?))?;
    let button = nodes_by_tag(m.renderer.document(), "button")[0];
    m.renderer.document_mut().take_mutations();

    // the same handler is not re-registered
    check(m.render(ctx, check(h!("button", { "onClick" => first }))?))?;
    assert_no_mutations(&mut m.renderer)?;

    check(m.render(ctx, check(h!("button", { "onClick" => second }))?))?;
    let records = m.renderer.document_mut().take_mutations();
    assert_eq(
        count_mutations(&records, |r| matches!(r, MutationRecord::RemoveListener { .. })),
        1,
    )?;
    assert_eq(
        count_mutations(&records, |r| matches!(r, MutationRecord::AddListener { .. })),
        1,
    )?;

    click(&mut m, button)?;
    assert_eq(hits.get(), 10)?;
    assert_eq(m.renderer.document().listener_count(button), 1)
}

/// Error taxonomy surfaced to callers.
pub fn errors_suite() -> TestSuite {
    let mut suite = TestSuite::new("errors");
    suite.add_test(
        TestBuilder::new("invalid_elements_are_rejected")
            .tag("errors")
            .scenario(invalid_elements_are_rejected),
    );
    suite.add_test(
        TestBuilder::new("missing_container")
            .tag("errors")
            .scenario(missing_container),
    );
    suite.add_test(
        TestBuilder::new("hooks_without_runtime")
            .tag("errors")
            .scenario(hooks_without_runtime),
    );
    suite.add_test(
        TestBuilder::new("hook_order_mismatch_keeps_committed_tree")
            .tag("errors")
            .tag("hooks")
            .scenario(hook_order_mismatch_keeps_committed_tree),
    );
    suite.add_test(
        TestBuilder::new("component_error_then_recovery")
            .tag("errors")
            .scenario(component_error_then_recovery),
    );
    suite
}

fn invalid_elements_are_rejected(_ctx: &mut TestContext) -> AssertResult {
    assert_error(&h!("not a tag"), "InvalidElementShape")?;
    assert_error(&h!(""), "InvalidElementShape")?;
    assert_error(&h!("div", { "children" => "x" }), "InvalidElementShape")?;
    assert_error(&h!("button", { "onClick" => "alert" }), "UnsupportedPropType")?;
    assert_error(&h!("button", { "title" => handler(|_| {}) }), "UnsupportedPropType")?;

    // an invalid child fails the whole element
    let nested = h!("ul", {}, [h!("li"), h!("li!")]);
    assert_error(&nested, "InvalidElementShape")
}

fn missing_container(_ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let element = check(h!("p"))?;
    let result = m.renderer.render(element, 9999);
    assert_error(&result, "ContainerNotFound")?;
    assert_true(!m.renderer.has_pending_work(), "failed render scheduled work")
}

fn hooks_without_runtime(_ctx: &mut TestContext) -> AssertResult {
    let mut doc = Document::new();
    let app = doc.create_element("div");
    let mut renderer = Renderer::new(doc);
    let bare = Component::new("Bare", |scope, _| {
        let (n, _) = use_state(scope, 0)?;
        h!("b", {}, [n])
    });

    check(renderer.render(check(h!(&bare))?, app))?;
    let result = renderer.run_until_idle();
    assert_error(&result, "HookCalledOutsideRender")?;
    assert_true(renderer.committed_root().is_none(), "a failed first render committed")
}

fn hook_order_mismatch_keeps_committed_tree(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let with_effect = Rc::new(Cell::new(false));
    let flag = with_effect.clone();
    let shifty = Component::new("Shifty", move |scope, _| {
        if flag.get() {
            use_effect(scope, (), || None)?;
        }
        let (n, _) = use_state(scope, 5i32)?;
        h!("b", {}, [n])
    });

    check(m.render(ctx, check(h!("div", {}, [h!(&shifty)]))?))?;
    with_effect.set(true);
    check(m.renderer.render(check(h!("div", {}, [h!(&shifty)]))?, m.app))?;
    let result = m.renderer.run_until_idle();
    assert_error(&result, "HookOrderMismatch")?;
    if let Err(err) = &result {
        assert_error_mentions(err, "<Shifty>")?;
        assert_error_mentions(err, "hook #0")?;
    }
    assert_html(m.renderer.document(), m.app, "<div><div><b>5</b></div></div>")?;
    assert_true(m.renderer.wip_root().is_none(), "aborted tree left in progress")
}

fn component_error_then_recovery(ctx: &mut TestContext) -> AssertResult {
    let mut m = Mounted::new();
    let fail = Rc::new(Cell::new(false));
    let flag = fail.clone();
    let fragile = Component::new("Fragile", move |_, props| {
        if flag.get() {
            return Err(ReactError::component("Fragile", "refused to render"));
        }
        h!("em", {}, [props.get_str("label").unwrap_or("")])
    });

    check(m.render(ctx, check(h!(&fragile, { "label" => "one" }))?))?;
    let fibers_after_commit = m.renderer.fibers().len();

    fail.set(true);
    check(m.renderer.render(check(h!(&fragile, { "label" => "two" }))?, m.app))?;
    assert_error(&m.renderer.run_until_idle(), "ComponentError")?;
    assert_eq(m.text(), String::from("one"))?;
    assert_eq(m.renderer.fibers().len(), fibers_after_commit)?;

    fail.set(false);
    check(m.render(ctx, check(h!(&fragile, { "label" => "three" }))?))?;
    ctx.note("recovered after a component error");
    assert_html(m.renderer.document(), m.app, "<div><em>three</em></div>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestStatus;

    #[test]
    fn test_suites_are_populated() {
        let suites = all_suites();
        let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["reconciliation", "scheduling", "hooks", "events", "errors"]);
        assert!(suites.iter().all(|s| s.test_count() >= 2));
    }

    #[test]
    fn test_scenario_failure_is_reported() {
        let case = TestBuilder::new("broken").scenario(|_| assert_eq(1, 2));
        let mut ctx = TestContext::new(String::from("broken"));
        let result = (case.test_fn)(&mut ctx);
        assert_eq!(result.status, TestStatus::Failed);
    }

    #[test]
    fn test_unexpected_error_is_reported_as_error() {
        let case = TestBuilder::new("erroring").scenario(|_| {
            check(Err::<(), _>(ReactError::HookCalledOutsideRender))?;
            Ok(())
        });
        let mut ctx = TestContext::new(String::from("erroring"));
        assert_eq!((case.test_fn)(&mut ctx).status, TestStatus::Error);
    }
}
