use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};
use weave_core::{HostAdapter, Node, NodeFactory, Props, RemovalCompletion, Renderer};

mod mock_host_;
use mock_host_::{MockHandle, MockHost};

type Factory = NodeFactory<MockHandle>;

fn mounted(tree: Rc<Node<MockHandle>>) -> (Renderer<MockHost>, MockHandle) {
	mock_host_::init_logging();
	let container = MockHost.create_element("root");
	let renderer = Renderer::mount(MockHost, tree, container.clone());
	(renderer, container)
}

#[test]
fn mounts_plain_text() {
	let nodes = Factory::new();
	let tree = nodes.h("div", None, "Hello Weave").unwrap();

	let (renderer, container) = mounted(tree);
	assert_eq!(container.visible_text(), "Hello Weave");
	assert_eq!(container.child_count(), 1);
	assert_eq!(container.child(0).name(), "div");
	assert_eq!(renderer.tracked_nodes(), 1);
}

#[test]
fn text_update_preserves_host_identity() {
	let nodes = Factory::new();
	let tree = nodes.h("div", None, vec![nodes.h("span", None, "Hello").unwrap()]).unwrap();

	let (mut renderer, container) = mounted(tree);
	let div = container.child(0);
	let span = div.child(0);

	renderer.update(nodes.h("div", None, vec![nodes.h("span", None, "World").unwrap()]).unwrap());
	assert!(container.child(0).same_node(&div));
	assert!(div.child(0).same_node(&span));
	assert_eq!(container.visible_text(), "World");
}

fn keyed_list(nodes: &Factory, keys: &[&str]) -> Rc<Node<MockHandle>> {
	nodes
		.h(
			"ul",
			None,
			keys.iter()
				.map(|key| nodes.h("li", Props::new().key(*key), key.to_uppercase()).unwrap())
				.collect::<Vec<_>>(),
		)
		.unwrap()
}

#[test]
fn keyed_permutation_preserves_host_nodes() {
	let nodes = Factory::new();
	let (mut renderer, container) = mounted(keyed_list(&nodes, &["a", "b", "c"]));
	let list = container.child(0);
	let (li_a, li_b, li_c) = (list.child(0), list.child(1), list.child(2));

	renderer.update(keyed_list(&nodes, &["c", "a", "b"]));
	assert_eq!(list.visible_text(), "CAB");
	assert_eq!(list.child_count(), 3);
	assert!(list.child(0).same_node(&li_c));
	assert!(list.child(1).same_node(&li_a));
	assert!(list.child(2).same_node(&li_b));
}

#[test]
fn keyed_removal_leaves_survivors_untouched() {
	let nodes = Factory::new();
	let (mut renderer, container) = mounted(keyed_list(&nodes, &["a", "b", "c"]));
	let list = container.child(0);
	let (li_a, li_c) = (list.child(0), list.child(2));

	renderer.update(keyed_list(&nodes, &["a", "c"]));
	assert_eq!(list.visible_text(), "AC");
	assert_eq!(list.child_count(), 2);
	assert!(list.child(0).same_node(&li_a));
	assert!(list.child(1).same_node(&li_c));
	assert_eq!(renderer.tracked_nodes(), 3);
}

#[test]
fn keyed_type_change_replaces_the_host_node() {
	let nodes = Factory::new();
	let tree = nodes
		.h("div", None, vec![nodes.h("span", Props::new().key("a"), "Hello").unwrap()])
		.unwrap();

	let (mut renderer, container) = mounted(tree);
	let outer = container.child(0);
	let span = outer.child(0);

	renderer.update(
		nodes
			.h("div", None, vec![nodes.h("div", Props::new().key("a"), "Hello").unwrap()])
			.unwrap(),
	);
	assert!(container.child(0).same_node(&outer));
	assert!(!outer.child(0).same_node(&span));
	assert!(!span.is_attached());
	assert_eq!(outer.child(0).name(), "div");
	assert_eq!(container.visible_text(), "Hello");
}

#[test]
fn prop_changes_reach_the_host() {
	let nodes = Factory::new();
	let (mut renderer, container) = mounted(nodes.h("div", Props::new().value("class", "old"), ()).unwrap());
	let div = container.child(0);
	assert_eq!(div.prop("class"), Some("old".to_owned()));

	renderer.update(nodes.h("div", Props::new().value("id", "only"), ()).unwrap());
	assert_eq!(div.prop("class"), None);
	assert_eq!(div.prop("id"), Some("only".to_owned()));
}

#[test]
fn removal_defers_until_the_hook_finishes() {
	let nodes = Factory::new();
	let pending: Rc<RefCell<Option<RemovalCompletion>>> = Rc::new(RefCell::new(None));
	let parked = Rc::clone(&pending);

	let tree = nodes
		.h(
			"div",
			None,
			vec![
				nodes
					.h(
						"span",
						Props::new().key("bye").on_remove(move |_, completion| {
							parked.borrow_mut().replace(completion);
						}),
						"Bye",
					)
					.unwrap(),
				nodes.h("span", Props::new().key("stay"), "Stay").unwrap(),
			],
		)
		.unwrap();

	let (mut renderer, container) = mounted(tree);
	let div = container.child(0);
	assert_eq!(renderer.tracked_nodes(), 3);

	renderer.update(
		nodes
			.h("div", None, vec![nodes.h("span", Props::new().key("stay"), "Stay").unwrap()])
			.unwrap(),
	);
	// The hook has the completion; the leaving node stays visible until it finishes.
	assert_eq!(div.child_count(), 2);
	assert_eq!(div.visible_text(), "ByeStay");
	assert_eq!(renderer.tracked_nodes(), 3);

	pending.borrow_mut().take().expect("remove hook was not invoked").finish();
	assert_eq!(div.child_count(), 1);
	assert_eq!(div.visible_text(), "Stay");
	assert_eq!(renderer.tracked_nodes(), 2);
}

#[test]
fn hooks_fire_across_the_lifecycle() {
	let nodes = Factory::new();
	let live = Rc::new(Cell::new(0));
	let updated = Rc::new(Cell::new(0));

	let item = |nodes: &Factory, text: &str| {
		let created = Rc::clone(&live);
		let removed = Rc::clone(&live);
		let touched = Rc::clone(&updated);
		nodes
			.h(
				"span",
				Props::new()
					.key("item")
					.on_create(move |_| created.set(created.get() + 1))
					.on_update(move |previous, next, _| {
						assert_ne!(previous.id(), next.id());
						touched.set(touched.get() + 1);
					})
					.on_remove(move |_, completion| {
						removed.set(removed.get() - 1);
						completion.finish();
					}),
				text,
			)
			.unwrap()
	};

	let (mut renderer, container) = mounted(nodes.h("div", None, vec![item(&nodes, "Hello")]).unwrap());
	assert_eq!(live.get(), 1);
	assert_eq!(updated.get(), 0);

	renderer.update(nodes.h("div", None, vec![item(&nodes, "Hello")]).unwrap());
	assert_eq!(live.get(), 1);
	assert_eq!(updated.get(), 1);

	renderer.update(nodes.h("div", None, ()).unwrap());
	assert_eq!(live.get(), 0);
	assert_eq!(container.visible_text(), "");
	assert_eq!(renderer.tracked_nodes(), 1);
}

#[test]
fn unmount_is_idempotent() {
	let nodes = Factory::new();
	let (mut renderer, container) = mounted(nodes.h("div", None, "Hello Weave").unwrap());
	assert_eq!(container.child_count(), 1);

	renderer.unmount();
	assert_eq!(container.child_count(), 0);
	assert_eq!(renderer.tracked_nodes(), 0);

	renderer.unmount();
	assert_eq!(container.child_count(), 0);
}

#[test]
fn completion_after_unmount_skips_the_host() {
	let nodes = Factory::new();
	let pending: Rc<RefCell<Option<RemovalCompletion>>> = Rc::new(RefCell::new(None));
	let parked = Rc::clone(&pending);

	let tree = nodes
		.h(
			"div",
			None,
			vec![nodes
				.h(
					"span",
					Props::new().key("bye").on_remove(move |_, completion| {
						parked.borrow_mut().replace(completion);
					}),
					"Bye",
				)
				.unwrap()],
		)
		.unwrap();

	let (mut renderer, container) = mounted(tree);
	renderer.update(nodes.h("div", None, ()).unwrap());
	renderer.unmount();
	assert_eq!(container.child_count(), 0);

	// Finalizing after the root is gone only drops stale bookkeeping.
	pending.borrow_mut().take().expect("remove hook was not invoked").finish();
	assert_eq!(renderer.tracked_nodes(), 0);
	assert_eq!(container.child_count(), 0);
}
