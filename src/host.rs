use core::fmt;

/// The capability set the [`Renderer`](crate::commit::Renderer) needs from a concrete platform.
///
/// Implementations take `&self` and are expected to use interior mutability where the platform
/// requires it; handles are cheap clones referring to one host node each, the way DOM references
/// do. The commit engine assumes nothing beyond what is documented per operation.
pub trait HostAdapter {
	/// Cheaply cloneable reference to one host node.
	type Handle: Clone + fmt::Debug + 'static;

	/// Creates a host element node from a type name.
	fn create_element(&self, name: &str) -> Self::Handle;

	/// Creates a host text node.
	fn create_text(&self, text: &str) -> Self::Handle;

	/// Replaces the text content of `node`. Only issued for nodes whose children are text
	/// (and to clear text when that representation changes), so implementations may replace
	/// all children with a single text node, as DOM `textContent` does.
	fn set_text(&self, node: &Self::Handle, text: &str);

	/// Sets a named property/attribute/listener. Idempotent when repeated with the same
	/// arguments.
	fn set_prop(&self, node: &Self::Handle, name: &str, value: &str);

	/// Removes a named property/attribute/listener. Idempotent.
	fn remove_prop(&self, node: &Self::Handle, name: &str);

	/// Inserts `child` below `parent` at `index`. Insertion is stable and 0-based.
	fn insert(&self, parent: &Self::Handle, child: &Self::Handle, index: usize);

	/// Detaches `node` from its parent, without requiring a parent reference. Detaching an
	/// already detached node is a no-op.
	fn remove(&self, node: &Self::Handle);
}
