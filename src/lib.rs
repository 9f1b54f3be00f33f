#![doc(html_root_url = "https://docs.rs/weave-core/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod commit;
pub mod diff;
pub mod host;
mod identity_map;
pub mod node;
pub mod patch;

pub use commit::{RemovalCompletion, Renderer};
pub use diff::diff;
pub use host::HostAdapter;
pub use node::{Child, Children, Hooks, Key, MixedChildrenError, Node, NodeFactory, NodeId, Props};
pub use patch::Patch;
