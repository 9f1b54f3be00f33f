use crate::node::Node;
use core::fmt;
use std::rc::Rc;

/// One atomic change instruction, produced by [`diff`](crate::diff::diff) and interpreted by the
/// [`Renderer`](crate::commit::Renderer).
///
/// Patches address nodes by identity: they carry strong references to the [`Node`] values they
/// target, and the commit engine resolves those to host nodes through its identity map. The only
/// positional data is what is structurally required: [`Insert`](Patch::Insert)'s insertion index
/// and [`Move`](Patch::Move)'s target index. `Move`'s `from` is a diagnostic hint; the operation
/// itself is an identity-based relocation.
///
/// A patch sequence is transient: applied strictly once, in order, then discarded.
pub enum Patch<H> {
	/// Tear down the current root subtree (if any) and materialize a new one, or unmount when
	/// `None`.
	Replace(Option<Rc<Node<H>>>),
	/// Set the text content of `target`'s host node.
	UpdateText { target: Rc<Node<H>>, text: String },
	/// Materialize `node` and insert it below `parent` at `index`.
	Insert {
		parent: Rc<Node<H>>,
		node: Rc<Node<H>>,
		index: usize,
	},
	/// Remove `node`'s host subtree from below `parent`.
	Remove { parent: Rc<Node<H>>, node: Rc<Node<H>> },
	SetProp {
		target: Rc<Node<H>>,
		name: String,
		value: String,
	},
	RemoveProp { target: Rc<Node<H>>, name: String },
	/// Detach `node`'s host node and re-insert it below `parent` at `to`.
	Move {
		parent: Rc<Node<H>>,
		node: Rc<Node<H>>,
		from: usize,
		to: usize,
	},
	/// Re-key the identity map entry from `previous` to `next` and give `next`'s `update` hook a
	/// chance to run. Emitted for every matched pair, even without visible changes.
	Update { previous: Rc<Node<H>>, next: Rc<Node<H>> },
}
impl<H> fmt::Debug for Patch<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Patch::Replace(Some(node)) => write!(f, "Replace(<{}> {})", node.name(), node.id()),
			Patch::Replace(None) => write!(f, "Replace(none)"),
			Patch::UpdateText { target, text } => write!(f, "UpdateText({}, {:?})", target.id(), text),
			Patch::Insert { parent, node, index } => {
				write!(f, "Insert(<{}> {} below {} at {})", node.name(), node.id(), parent.id(), index)
			}
			Patch::Remove { parent, node } => write!(f, "Remove({} below {})", node.id(), parent.id()),
			Patch::SetProp { target, name, value } => write!(f, "SetProp({}, {} = {:?})", target.id(), name, value),
			Patch::RemoveProp { target, name } => write!(f, "RemoveProp({}, {})", target.id(), name),
			Patch::Move { parent, node, from, to } => {
				write!(f, "Move({} below {}, {} -> {})", node.id(), parent.id(), from, to)
			}
			Patch::Update { previous, next } => write!(f, "Update({} -> {})", previous.id(), next.id()),
		}
	}
}
