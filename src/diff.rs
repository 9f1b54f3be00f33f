use crate::{
	node::{Children, Key, Node, NodeId},
	patch::Patch,
};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::trace_span;

/// Computes the ordered patch sequence that turns `previous` into `next`.
///
/// Pure and deterministic, with no host access and no dependency on the commit engine. Applying the
/// result strictly in sequence against the tree `previous` describes yields the tree `next`
/// describes, using only "insert before the node currently at the target index" semantics.
///
/// Absent trees describe mount and unmount transitions: `diff(None, Some(_))` is a single
/// full-subtree [`Patch::Replace`], `diff(Some(_), None)` a single `Replace(None)`. A root type
/// change short-circuits to `Replace` as well; incompatible subtrees are never reconciled.
#[must_use]
pub fn diff<H>(previous: Option<&Rc<Node<H>>>, next: Option<&Rc<Node<H>>>) -> Vec<Patch<H>> {
	let mut patches = Vec::new();
	match (previous, next) {
		(None, None) => (),
		(None, Some(next)) => patches.push(Patch::Replace(Some(Rc::clone(next)))),
		(Some(_), None) => patches.push(Patch::Replace(None)),
		(Some(previous), Some(next)) => {
			if previous.name() == next.name() {
				diff_node(previous, next, &mut patches);
			} else {
				patches.push(Patch::Replace(Some(Rc::clone(next))));
			}
		}
	}
	patches
}

/// One subtree comparison. `previous` and `next` are known to share a type.
///
/// Ends with the unconditional trailing [`Patch::Update`]: even a visually unchanged node must
/// re-key the identity map from the previous id to the next one and offer the next node's
/// `update` hook a chance to run.
fn diff_node<H>(previous: &Rc<Node<H>>, next: &Rc<Node<H>>, patches: &mut Vec<Patch<H>>) {
	let span = trace_span!("Diffing node", tag = previous.name(), from = %previous.id(), to = %next.id());
	let _enter = span.enter();

	// Text fast path: no prop or children diffing below a text-only node.
	if let (Some(Children::Text(t_1)), Some(Children::Text(t_2))) = (previous.children(), next.children()) {
		if t_1 != t_2 {
			patches.push(Patch::UpdateText {
				target: Rc::clone(previous),
				text: t_2.clone(),
			});
		}
		patches.push(Patch::Update {
			previous: Rc::clone(previous),
			next: Rc::clone(next),
		});
		return;
	}

	diff_props(previous, next, patches);
	diff_children(previous, next, patches);
	patches.push(Patch::Update {
		previous: Rc::clone(previous),
		next: Rc::clone(next),
	});
}

fn diff_props<H>(previous: &Rc<Node<H>>, next: &Rc<Node<H>>, patches: &mut Vec<Patch<H>>) {
	for (name, value) in next.props() {
		if previous.prop(name) != Some(value.as_str()) {
			patches.push(Patch::SetProp {
				target: Rc::clone(previous),
				name: name.clone(),
				value: value.clone(),
			});
		}
	}
	for (name, _) in previous.props() {
		if next.prop(name).is_none() {
			patches.push(Patch::RemoveProp {
				target: Rc::clone(previous),
				name: name.clone(),
			});
		}
	}
}

fn child_list<H>(node: &Node<H>) -> &[Rc<Node<H>>] {
	match node.children() {
		Some(Children::Nodes(nodes)) => nodes,
		_ => &[],
	}
}

fn diff_children<H>(previous: &Rc<Node<H>>, next: &Rc<Node<H>>, patches: &mut Vec<Patch<H>>) {
	let a = child_list(previous);

	// Text on exactly one side (text × text is the fast path above): clear or set the text
	// content and diff the list side against an empty list, so host text children never
	// survive a representation change.
	if let Some(Children::Text(text)) = next.children() {
		for removed in a {
			patches.push(Patch::Remove {
				parent: Rc::clone(previous),
				node: Rc::clone(removed),
			});
		}
		patches.push(Patch::UpdateText {
			target: Rc::clone(previous),
			text: text.clone(),
		});
		return;
	}
	if let Some(Children::Text(_)) = previous.children() {
		patches.push(Patch::UpdateText {
			target: Rc::clone(previous),
			text: String::new(),
		});
	}

	let b = child_list(next);
	if a.iter().chain(b).any(|child| child.key().is_some()) {
		diff_keyed(previous, a, b, patches);
	} else {
		diff_indexed(previous, a, b, patches);
	}
}

/// Positional reconciliation for unkeyed sibling lists.
fn diff_indexed<H>(parent: &Rc<Node<H>>, a: &[Rc<Node<H>>], b: &[Rc<Node<H>>], patches: &mut Vec<Patch<H>>) {
	let span = trace_span!("Diffing children by index", previous = a.len(), next = b.len());
	let _enter = span.enter();

	for i in 0..a.len().max(b.len()) {
		match (a.get(i), b.get(i)) {
			(Some(p), Some(n)) if p.name() == n.name() => diff_node(p, n, patches),
			// Never reuse a host node across a type change.
			(Some(p), Some(n)) => {
				patches.push(Patch::Remove {
					parent: Rc::clone(parent),
					node: Rc::clone(p),
				});
				patches.push(Patch::Insert {
					parent: Rc::clone(parent),
					node: Rc::clone(n),
					index: i,
				});
			}
			(None, Some(n)) => patches.push(Patch::Insert {
				parent: Rc::clone(parent),
				node: Rc::clone(n),
				index: i,
			}),
			(Some(p), None) => patches.push(Patch::Remove {
				parent: Rc::clone(parent),
				node: Rc::clone(p),
			}),
			(None, None) => (),
		}
	}
}

/// Two-phase, identity-first reconciliation for keyed sibling lists.
///
/// Matching happens up front; stale previous children leave before the next-order walk so that
/// every target index is final by the time the walk reaches it. A matched child is moved only
/// when it is out of place relative to the already-finalized prefix, which keeps pure removals
/// move-free and permutations remove-free.
fn diff_keyed<H>(parent: &Rc<Node<H>>, a: &[Rc<Node<H>>], b: &[Rc<Node<H>>], patches: &mut Vec<Patch<H>>) {
	let span = trace_span!("Diffing keyed children", previous = a.len(), next = b.len());
	let _enter = span.enter();

	// Key collisions resolve first-occurrence-wins; a duplicate key is left unmatched and
	// falls through to removal or insertion.
	let mut by_key: HashMap<&Key, usize> = HashMap::new();
	for (i, child) in a.iter().enumerate() {
		if let Some(key) = child.key() {
			by_key.entry(key).or_insert(i);
		}
	}

	let mut matched: Vec<Option<usize>> = vec![None; b.len()];
	let mut used = vec![false; a.len()];
	for (j, child) in b.iter().enumerate() {
		if let Some(key) = child.key() {
			if let Some(&i) = by_key.get(key) {
				// Type compatibility dominates key identity: a matching key on a
				// different type is no match at all.
				if !used[i] && a[i].name() == child.name() {
					used[i] = true;
					matched[j] = Some(i);
				}
			}
		}
	}

	for (i, child) in a.iter().enumerate() {
		if !used[i] {
			patches.push(Patch::Remove {
				parent: Rc::clone(parent),
				node: Rc::clone(child),
			});
		}
	}

	// Walk next children in order over a simulation of the surviving host order. The linear
	// rescan per moved child is quadratic in the worst case; sibling lists are short.
	let mut order: Vec<NodeId> = a
		.iter()
		.enumerate()
		.filter(|(i, _)| used[*i])
		.map(|(_, child)| child.id())
		.collect();
	for (j, child) in b.iter().enumerate() {
		match matched[j] {
			Some(i) => {
				let source = &a[i];
				if order.get(j).copied() != Some(source.id()) {
					if let Some(at) = order.iter().position(|id| *id == source.id()) {
						order.remove(at);
						order.insert(j, source.id());
						patches.push(Patch::Move {
							parent: Rc::clone(parent),
							node: Rc::clone(source),
							from: i,
							to: j,
						});
					}
				}
				diff_node(source, child, patches);
			}
			None => {
				patches.push(Patch::Insert {
					parent: Rc::clone(parent),
					node: Rc::clone(child),
					index: j,
				});
				order.insert(j, child.id());
			}
		}
	}
}
