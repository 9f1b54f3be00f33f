use crate::commit::RemovalCompletion;
use core::{cell::Cell, fmt, marker::PhantomData};
use std::rc::Rc;
use thiserror::Error;

/// Identity of one constructed [`Node`], unique per [`NodeFactory`].
///
/// Assigned once, monotonically, and never reused. Two structurally identical nodes from separate
/// construction calls carry distinct ids; it is the commit engine's identity map, not structural
/// comparison, that decides which host node a [`Node`] currently describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u64);
impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Reconciliation key of a child within one sibling list.
///
/// Used exclusively to match children across two sibling lists during keyed reconciliation, never
/// for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
	Str(String),
	Num(i64),
}
impl From<&str> for Key {
	fn from(key: &str) -> Self {
		Key::Str(key.to_owned())
	}
}
impl From<String> for Key {
	fn from(key: String) -> Self {
		Key::Str(key)
	}
}
impl From<i64> for Key {
	fn from(key: i64) -> Self {
		Key::Num(key)
	}
}
impl From<i32> for Key {
	fn from(key: i32) -> Self {
		Key::Num(key.into())
	}
}
impl From<u32> for Key {
	fn from(key: u32) -> Self {
		Key::Num(key.into())
	}
}
impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Str(key) => write!(f, "{:?}", key),
			Key::Num(key) => write!(f, "{}", key),
		}
	}
}

/// Optional lifecycle callbacks attached to a [`Node`], invoked by the commit engine.
///
/// Observational only: hooks never influence diffing, and the reserved slot they occupy is
/// excluded from prop diffing. `update` receives the previous node, the next node and the host
/// node; `remove` receives the host node and a [`RemovalCompletion`] that finalizes the removal
/// whenever the hook sees fit.
pub struct Hooks<H> {
	pub create: Option<Rc<dyn Fn(&H)>>,
	pub update: Option<Rc<dyn Fn(&Node<H>, &Node<H>, &H)>>,
	pub remove: Option<Rc<dyn Fn(&H, RemovalCompletion)>>,
}
impl<H> Default for Hooks<H> {
	fn default() -> Self {
		Self {
			create: None,
			update: None,
			remove: None,
		}
	}
}
impl<H> Clone for Hooks<H> {
	fn clone(&self) -> Self {
		Self {
			create: self.create.clone(),
			update: self.update.clone(),
			remove: self.remove.clone(),
		}
	}
}
impl<H> fmt::Debug for Hooks<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Hooks")
			.field("create", &self.create.is_some())
			.field("update", &self.update.is_some())
			.field("remove", &self.remove.is_some())
			.finish()
	}
}

/// Properties passed to [`NodeFactory::h`].
///
/// `values` is the ordered, opaque name→value mapping handed through to the host adapter; the
/// core never interprets it. `key` and `hooks` are extracted onto the [`Node`] itself during
/// construction and do not appear among the renderable props.
pub struct Props<H> {
	pub key: Option<Key>,
	pub hooks: Hooks<H>,
	pub values: Vec<(String, String)>,
}
impl<H> Default for Props<H> {
	fn default() -> Self {
		Self {
			key: None,
			hooks: Hooks::default(),
			values: Vec::new(),
		}
	}
}
impl<H> Props<H> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	#[must_use]
	pub fn value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.values.push((name.into(), value.into()));
		self
	}

	#[must_use]
	pub fn on_create(mut self, hook: impl Fn(&H) + 'static) -> Self {
		self.hooks.create = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_update(mut self, hook: impl Fn(&Node<H>, &Node<H>, &H) + 'static) -> Self {
		self.hooks.update = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_remove(mut self, hook: impl Fn(&H, RemovalCompletion) + 'static) -> Self {
		self.hooks.remove = Some(Rc::new(hook));
		self
	}
}

/// Canonical children of a [`Node`]: text or an ordered list of elements, never both.
pub enum Children<H> {
	Text(String),
	Nodes(Vec<Rc<Node<H>>>),
}
impl<H> Clone for Children<H> {
	fn clone(&self) -> Self {
		match self {
			Children::Text(text) => Children::Text(text.clone()),
			Children::Nodes(nodes) => Children::Nodes(nodes.clone()),
		}
	}
}
impl<H> fmt::Debug for Children<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Children::Text(text) => f.debug_tuple("Text").field(text).finish(),
			Children::Nodes(nodes) => write!(f, "Nodes(len = {})", nodes.len()),
		}
	}
}

/// One heterogeneous child argument to [`NodeFactory::h`], before normalization.
///
/// Conversions cover the shapes a view function produces: nodes, text, stringified numbers,
/// discarded booleans/unit/`None`, and arbitrarily nested lists of all of these.
pub enum Child<H> {
	Empty,
	Text(String),
	Element(Rc<Node<H>>),
	List(Vec<Child<H>>),
}
impl<H> From<()> for Child<H> {
	fn from(_: ()) -> Self {
		Child::Empty
	}
}
impl<H> From<bool> for Child<H> {
	fn from(_: bool) -> Self {
		Child::Empty
	}
}
impl<'a, H> From<&'a str> for Child<H> {
	fn from(text: &'a str) -> Self {
		Child::Text(text.to_owned())
	}
}
impl<H> From<String> for Child<H> {
	fn from(text: String) -> Self {
		Child::Text(text)
	}
}
impl<H> From<Rc<Node<H>>> for Child<H> {
	fn from(node: Rc<Node<H>>) -> Self {
		Child::Element(node)
	}
}
impl<'a, H> From<&'a Rc<Node<H>>> for Child<H> {
	fn from(node: &'a Rc<Node<H>>) -> Self {
		Child::Element(Rc::clone(node))
	}
}
impl<H, C: Into<Child<H>>> From<Option<C>> for Child<H> {
	fn from(child: Option<C>) -> Self {
		match child {
			Some(child) => child.into(),
			None => Child::Empty,
		}
	}
}
impl<H, C: Into<Child<H>>> From<Vec<C>> for Child<H> {
	fn from(children: Vec<C>) -> Self {
		Child::List(children.into_iter().map(Into::into).collect())
	}
}
macro_rules! stringified_child {
	($($number:ty),*$(,)?) => {$(
		impl<H> From<$number> for Child<H> {
			fn from(number: $number) -> Self {
				Child::Text(number.to_string())
			}
		}
	)*};
}
stringified_child!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

/// Immutable description of one tree position.
///
/// Constructed only through a [`NodeFactory`]; all fields are fixed at construction. A "changed"
/// node is a new value with a new [`NodeId`].
pub struct Node<H> {
	id: NodeId,
	name: String,
	key: Option<Key>,
	hooks: Hooks<H>,
	props: Vec<(String, String)>,
	children: Option<Children<H>>,
}
impl<H> Node<H> {
	#[must_use]
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// The host type name, e.g. an element tag.
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		self.key.as_ref()
	}

	#[must_use]
	pub fn hooks(&self) -> &Hooks<H> {
		&self.hooks
	}

	/// The renderable props, in declaration order. Key and hooks are not among them.
	#[must_use]
	pub fn props(&self) -> &[(String, String)] {
		&self.props
	}

	#[must_use]
	pub fn children(&self) -> Option<&Children<H>> {
		self.children.as_ref()
	}

	pub(crate) fn prop(&self, name: &str) -> Option<&str> {
		self.props.iter().find(|(n, _)| n.as_str() == name).map(|(_, v)| v.as_str())
	}
}
impl<H> fmt::Debug for Node<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("key", &self.key)
			.field("props", &self.props)
			.field("children", &self.children)
			.finish()
	}
}

/// Raised when child normalization finds text and element children mixed at one position.
///
/// Text content and a child list are mutually exclusive representations (the diff engine's text
/// fast path depends on this), so the mixture is rejected at construction rather than resolved.
#[derive(Debug, Error)]
#[error("mixed text and element children under <{name}>")]
pub struct MixedChildrenError {
	pub name: String,
}

/// Produces [`Node`]s and owns their identity counter.
///
/// Each factory numbers its nodes independently, so separate mounted roots (and separate test
/// runs) share no state and start from the same ids. Build the previous and the next tree of one
/// root from the same factory.
pub struct NodeFactory<H> {
	next_id: Cell<u64>,
	_host: PhantomData<fn() -> H>,
}
impl<H> Default for NodeFactory<H> {
	fn default() -> Self {
		Self::new()
	}
}
impl<H> NodeFactory<H> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			next_id: Cell::new(1),
			_host: PhantomData,
		}
	}

	/// Constructs a [`Node`], normalizing `children` into exactly one of text, an element list,
	/// or nothing.
	///
	/// Empty, unit, boolean and `None` children are discarded; numbers are stringified;
	/// nested lists are flattened; surviving text fragments collapse into a single string.
	///
	/// # Errors
	///
	/// [`MixedChildrenError`] when both text and element children survive normalization at this
	/// position.
	pub fn h(
		&self,
		name: impl Into<String>,
		props: impl Into<Option<Props<H>>>,
		children: impl Into<Child<H>>,
	) -> Result<Rc<Node<H>>, MixedChildrenError> {
		let name = name.into();
		let Props { key, hooks, values } = props.into().unwrap_or_default();
		let children = normalize(children.into(), &name)?;
		let id = NodeId(self.next_id.replace(self.next_id.get() + 1));
		Ok(Rc::new(Node {
			id,
			name,
			key,
			hooks,
			props: values,
			children,
		}))
	}
}

fn normalize<H>(children: Child<H>, name: &str) -> Result<Option<Children<H>>, MixedChildrenError> {
	let mut text = String::new();
	let mut has_text = false;
	let mut nodes = Vec::new();
	flatten(children, &mut text, &mut has_text, &mut nodes);
	match (has_text, nodes.is_empty()) {
		(false, true) => Ok(None),
		(true, true) => Ok(Some(Children::Text(text))),
		(false, false) => Ok(Some(Children::Nodes(nodes))),
		(true, false) => Err(MixedChildrenError { name: name.to_owned() }),
	}
}

fn flatten<H>(child: Child<H>, text: &mut String, has_text: &mut bool, nodes: &mut Vec<Rc<Node<H>>>) {
	match child {
		Child::Empty => (),
		Child::Text(fragment) => {
			*has_text = true;
			text.push_str(&fragment);
		}
		Child::Element(node) => nodes.push(node),
		Child::List(children) => {
			for child in children {
				flatten(child, text, has_text, nodes);
			}
		}
	}
}
