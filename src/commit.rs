use crate::{
	diff::diff,
	host::HostAdapter,
	identity_map::IdentityMap,
	node::{Children, Node, NodeId},
	patch::Patch,
};
use core::fmt;
use std::{cell::RefCell, rc::Rc};
use tracing::{instrument, trace, trace_span, warn};

/// Finalizes one pending removal. Handed to a node's `remove` hook together with the host node.
///
/// The host removal and the identity-map deletion for the removed subtree happen only when
/// [`finish`](RemovalCompletion::finish) is called, synchronously from inside the hook or on
/// whatever later schedule the hook chooses. Other commits on the same root are tolerated in the
/// interim. `finish` consumes the completion, so a removal cannot be finalized twice; a
/// completion that is never finished leaks its host node and identity-map entries indefinitely,
/// which is the documented contract (there is no cancellation primitive).
pub struct RemovalCompletion(Option<Box<dyn FnOnce()>>);
impl RemovalCompletion {
	fn new(finalize: impl FnOnce() + 'static) -> Self {
		Self(Some(Box::new(finalize)))
	}

	/// Detaches the host node and drops the removed subtree's identity-map entries.
	pub fn finish(mut self) {
		if let Some(finalize) = self.0.take() {
			finalize();
		}
	}
}
impl Drop for RemovalCompletion {
	fn drop(&mut self) {
		if self.0.is_some() {
			warn!("Removal completion dropped without finishing. Its host node is leaked.");
		}
	}
}
impl fmt::Debug for RemovalCompletion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RemovalCompletion({})", if self.0.is_some() { "pending" } else { "finished" })
	}
}

struct RootState<A: HostAdapter> {
	current: Option<Rc<Node<A::Handle>>>,
	root: Option<A::Handle>,
	nodes: IdentityMap<NodeId, A::Handle>,
}

/// The commit engine for one mounted root.
///
/// Holds the currently-rendered tree, the root host node and the identity map (node id → host
/// handle), and applies the [`diff`] engine's patch sequences against the [`HostAdapter`]:
/// strictly once each, in order, never reordered or batched across calls.
///
/// State is shared behind `Rc<RefCell<_>>` solely so that pending removal completions can
/// outlive the `update` call that created them; everything runs on one thread.
pub struct Renderer<A: HostAdapter> {
	adapter: Rc<A>,
	container: A::Handle,
	state: Rc<RefCell<RootState<A>>>,
}
impl<A: HostAdapter> fmt::Debug for Renderer<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Renderer").field("container", &self.container).finish()
	}
}
impl<A> Renderer<A>
where
	A: HostAdapter + 'static,
{
	/// Materializes `node` into `container` and returns the controller for the mounted root.
	#[must_use]
	#[instrument(skip(adapter, node, container))]
	pub fn mount(adapter: A, node: Rc<Node<A::Handle>>, container: A::Handle) -> Self {
		let renderer = Self {
			adapter: Rc::new(adapter),
			container,
			state: Rc::new(RefCell::new(RootState {
				current: None,
				root: None,
				nodes: IdentityMap::new(),
			})),
		};
		renderer.commit(diff(None, Some(&node)));
		renderer.state.borrow_mut().current = Some(node);
		renderer
	}

	/// Diffs the current tree against `next`, applies the patches, and adopts `next` as
	/// current.
	#[instrument(skip(self, next))]
	pub fn update(&mut self, next: Rc<Node<A::Handle>>) {
		let patches = diff(self.state.borrow().current.as_ref(), Some(&next));
		self.commit(patches);
		self.state.borrow_mut().current = Some(next);
	}

	/// Removes the root host node and clears all per-root state. Idempotent.
	#[instrument(skip(self))]
	pub fn unmount(&mut self) {
		let root = self.state.borrow_mut().root.take();
		if let Some(root) = root {
			self.adapter.remove(&root);
		}
		let mut state = self.state.borrow_mut();
		if !state.nodes.is_empty() {
			trace!("Dropping {} identity map entries on unmount.", state.nodes.len());
		}
		state.nodes.clear();
		state.current = None;
	}

	/// Number of live identity-map entries, including subtrees whose removal is still pending.
	#[must_use]
	pub fn tracked_nodes(&self) -> usize {
		self.state.borrow().nodes.len()
	}

	fn commit(&self, patches: Vec<Patch<A::Handle>>) {
		for patch in patches {
			self.apply(patch);
		}
		trace!("Identity map size: {}", self.state.borrow().nodes.len());
	}

	/// Patches referencing ids no longer in the identity map are skipped: an earlier patch in
	/// the same batch already invalidated that subtree.
	fn apply(&self, patch: Patch<A::Handle>) {
		match patch {
			Patch::Replace(next) => self.apply_replace(next),
			Patch::UpdateText { target, text } => match self.handle_of(&target) {
				Some(handle) => self.adapter.set_text(&handle, &text),
				None => trace!("Skipping text update of unmapped node {}.", target.id()),
			},
			Patch::SetProp { target, name, value } => match self.handle_of(&target) {
				Some(handle) => self.adapter.set_prop(&handle, &name, &value),
				None => trace!("Skipping prop update of unmapped node {}.", target.id()),
			},
			Patch::RemoveProp { target, name } => match self.handle_of(&target) {
				Some(handle) => self.adapter.remove_prop(&handle, &name),
				None => trace!("Skipping prop removal of unmapped node {}.", target.id()),
			},
			Patch::Insert { parent, node, index } => match self.handle_of(&parent) {
				Some(parent_handle) => {
					let handle = self.materialize(&node);
					self.adapter.insert(&parent_handle, &handle, index);
				}
				None => trace!("Skipping insert below unmapped parent {}.", parent.id()),
			},
			Patch::Remove { parent: _, node } => self.apply_remove(&node),
			Patch::Move { parent, node, from, to } => {
				let handles = (self.handle_of(&parent), self.handle_of(&node));
				match handles {
					(Some(parent_handle), Some(handle)) => {
						// Detach first: host insert primitives are not move-safe
						// for an already attached node.
						self.adapter.remove(&handle);
						self.adapter.insert(&parent_handle, &handle, to);
						trace!("Moved node {} from {} to {}.", node.id(), from, to);
					}
					_ => trace!("Skipping move of unmapped node {}.", node.id()),
				}
			}
			Patch::Update { previous, next } => {
				let handle = {
					let mut state = self.state.borrow_mut();
					if state.nodes.rekey(&previous.id(), next.id()) {
						state.nodes.get(&next.id()).cloned()
					} else {
						None
					}
				};
				match handle {
					Some(handle) => {
						if let Some(update) = &next.hooks().update {
							update(&previous, &next, &handle);
						}
					}
					None => warn!("Skipping update of unmapped node {}.", previous.id()),
				}
			}
		}
	}

	fn apply_replace(&self, next: Option<Rc<Node<A::Handle>>>) {
		let span = trace_span!("Replacing root");
		let _enter = span.enter();

		let old_root = {
			let mut state = self.state.borrow_mut();
			state.nodes.clear();
			state.root.take()
		};
		if let Some(old_root) = old_root {
			self.adapter.remove(&old_root);
		}
		if let Some(next) = next {
			let handle = self.materialize(&next);
			self.adapter.insert(&self.container, &handle, 0);
			self.state.borrow_mut().root = Some(handle);
		}
	}

	fn apply_remove(&self, node: &Rc<Node<A::Handle>>) {
		let handle = match self.handle_of(node) {
			Some(handle) => handle,
			None => return trace!("Skipping removal of unmapped node {}.", node.id()),
		};
		match &node.hooks().remove {
			Some(remove) => {
				let completion = self.removal_completion(Rc::clone(node), handle.clone());
				remove(&handle, completion);
			}
			None => {
				self.adapter.remove(&handle);
				unregister_subtree(&mut self.state.borrow_mut().nodes, node);
			}
		}
	}

	/// Pending removals are independent of each other and of later commits: each completion
	/// captures its own node and handle, and re-checks the identity map when it fires, so a
	/// completion arriving after its subtree was replaced or unmounted only drops stale map
	/// entries without touching the host again.
	fn removal_completion(&self, node: Rc<Node<A::Handle>>, handle: A::Handle) -> RemovalCompletion {
		let state = Rc::clone(&self.state);
		let adapter = Rc::clone(&self.adapter);
		RemovalCompletion::new(move || {
			let live = {
				let mut state = state.borrow_mut();
				let live = state.nodes.contains(&node.id());
				unregister_subtree(&mut state.nodes, &node);
				live
			};
			if live {
				adapter.remove(&handle);
			} else {
				trace!("Removal of node {} finalized after its subtree was already gone.", node.id());
			}
		})
	}

	fn handle_of(&self, node: &Node<A::Handle>) -> Option<A::Handle> {
		self.state.borrow().nodes.get(&node.id()).cloned()
	}

	/// Creates the host subtree for `node`: host node, props (hooks excluded), children, then
	/// the identity-map entry and the `create` hook, so hooks fire bottom-up, each after its
	/// subtree is complete but before the node is attached to its parent.
	fn materialize(&self, node: &Rc<Node<A::Handle>>) -> A::Handle {
		let handle = self.adapter.create_element(node.name());
		for (name, value) in node.props() {
			self.adapter.set_prop(&handle, name, value);
		}
		match node.children() {
			Some(Children::Text(text)) => {
				let text_handle = self.adapter.create_text(text);
				self.adapter.insert(&handle, &text_handle, 0);
			}
			Some(Children::Nodes(children)) => {
				for (index, child) in children.iter().enumerate() {
					let child_handle = self.materialize(child);
					self.adapter.insert(&handle, &child_handle, index);
				}
			}
			None => (),
		}
		self.state.borrow_mut().nodes.insert(node.id(), handle.clone());
		if let Some(create) = &node.hooks().create {
			create(&handle);
		}
		handle
	}
}

fn unregister_subtree<H>(nodes: &mut IdentityMap<NodeId, H>, node: &Node<H>) {
	nodes.remove(&node.id());
	if let Some(Children::Nodes(children)) = node.children() {
		for child in children {
			unregister_subtree(nodes, child);
		}
	}
}
