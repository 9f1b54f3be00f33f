#![allow(dead_code)]

use std::{
	cell::RefCell,
	fmt,
	rc::{Rc, Weak},
	sync::Once,
};
use weave_core::HostAdapter;

pub fn init_logging() {
	static INIT: Once = Once::new();
	INIT.call_once(|| {
		tracing_subscriber::fmt()
			.with_max_level(tracing::Level::TRACE)
			.with_test_writer()
			.init();
	});
}

/// Scripted in-memory host: a tree of reference-counted nodes, so tests can assert visible
/// order, prop state and host-node reference identity across commits.
pub struct MockHost;

enum MockKind {
	Element { name: String },
	Text,
}

struct MockNode {
	kind: MockKind,
	text: RefCell<String>,
	props: RefCell<Vec<(String, String)>>,
	children: RefCell<Vec<MockHandle>>,
	parent: RefCell<Weak<MockNode>>,
}

#[derive(Clone)]
pub struct MockHandle(Rc<MockNode>);
impl MockHandle {
	fn new(kind: MockKind, text: &str) -> Self {
		Self(Rc::new(MockNode {
			kind,
			text: RefCell::new(text.to_owned()),
			props: RefCell::new(Vec::new()),
			children: RefCell::new(Vec::new()),
			parent: RefCell::new(Weak::new()),
		}))
	}

	pub fn name(&self) -> &str {
		match &self.0.kind {
			MockKind::Element { name } => name,
			MockKind::Text => "#text",
		}
	}

	pub fn same_node(&self, other: &MockHandle) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub fn is_attached(&self) -> bool {
		self.0.parent.borrow().upgrade().is_some()
	}

	pub fn child_count(&self) -> usize {
		self.0.children.borrow().len()
	}

	pub fn child(&self, index: usize) -> MockHandle {
		self.0.children.borrow()[index].clone()
	}

	pub fn prop(&self, name: &str) -> Option<String> {
		self.0.props.borrow().iter().find(|(n, _)| n == name).map(|(_, v)| v.clone())
	}

	/// Concatenated text content of the subtree, in visible order.
	pub fn visible_text(&self) -> String {
		match &self.0.kind {
			MockKind::Text => self.0.text.borrow().clone(),
			MockKind::Element { .. } => self.0.children.borrow().iter().map(MockHandle::visible_text).collect(),
		}
	}
}
impl fmt::Debug for MockHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.0.kind {
			MockKind::Element { name } => write!(f, "<{}>", name),
			MockKind::Text => write!(f, "#text({:?})", self.0.text.borrow()),
		}
	}
}

impl HostAdapter for MockHost {
	type Handle = MockHandle;

	fn create_element(&self, name: &str) -> MockHandle {
		MockHandle::new(
			MockKind::Element { name: name.to_owned() },
			"",
		)
	}

	fn create_text(&self, text: &str) -> MockHandle {
		MockHandle::new(MockKind::Text, text)
	}

	fn set_text(&self, node: &MockHandle, text: &str) {
		match &node.0.kind {
			MockKind::Text => *node.0.text.borrow_mut() = text.to_owned(),
			// Like DOM `textContent`: all children are replaced by a single text node.
			MockKind::Element { .. } => {
				for child in node.0.children.borrow_mut().drain(..) {
					*child.0.parent.borrow_mut() = Weak::new();
				}
				if !text.is_empty() {
					let child = self.create_text(text);
					*child.0.parent.borrow_mut() = Rc::downgrade(&node.0);
					node.0.children.borrow_mut().push(child);
				}
			}
		}
	}

	fn set_prop(&self, node: &MockHandle, name: &str, value: &str) {
		let mut props = node.0.props.borrow_mut();
		match props.iter_mut().find(|(n, _)| n == name) {
			Some((_, v)) => *v = value.to_owned(),
			None => props.push((name.to_owned(), value.to_owned())),
		}
	}

	fn remove_prop(&self, node: &MockHandle, name: &str) {
		node.0.props.borrow_mut().retain(|(n, _)| n != name);
	}

	fn insert(&self, parent: &MockHandle, child: &MockHandle, index: usize) {
		parent.0.children.borrow_mut().insert(index, child.clone());
		*child.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
	}

	fn remove(&self, node: &MockHandle) {
		let parent = node.0.parent.borrow().upgrade();
		if let Some(parent) = parent {
			parent.children.borrow_mut().retain(|child| !Rc::ptr_eq(&child.0, &node.0));
		}
		*node.0.parent.borrow_mut() = Weak::new();
	}
}
