use crate::{err, Result};

use indexmap::IndexMap;

/// Sequence of relation names leading from the root of a [`JoinTree`].
pub type Path = Vec<String>;

/// A tree of joined tables keyed by relation path.
///
/// Nodes and edges are arbitrary labels so the same tree can describe the
/// relations a request touches, then the aliased tables, then the rendered
/// joins. Transformations consume the tree and return a new one.
#[derive(Debug, Clone)]
pub struct JoinTree<N, E> {
    entries: IndexMap<Path, Entry<N, E>>,
}

#[derive(Debug, Clone)]
struct Entry<N, E> {
    node: N,

    /// Index of the parent entry and the edge leading from it
    edge: Option<(usize, E)>,
}

impl<N, E> JoinTree<N, E> {
    pub fn new(root: N) -> JoinTree<N, E> {
        let mut entries = IndexMap::new();
        entries.insert(vec![], Entry { node: root, edge: None });
        JoinTree { entries }
    }

    /// Adds `node` below `parent` under `segment`.
    ///
    /// Returns `false` and leaves the tree untouched when the path is already
    /// present; the first insertion wins.
    pub fn insert(
        &mut self,
        parent: &[String],
        segment: impl Into<String>,
        edge: E,
        node: N,
    ) -> Result<bool> {
        let Some(parent_index) = self.entries.get_index_of(parent) else {
            return Err(err!("join tree has no node at {parent:?}"));
        };

        let mut path = parent.to_vec();
        path.push(segment.into());

        if self.entries.contains_key(&path) {
            return Ok(false);
        }

        self.entries.insert(
            path,
            Entry {
                node,
                edge: Some((parent_index, edge)),
            },
        );
        Ok(true)
    }

    pub fn root(&self) -> &N {
        &self.entries[0].node
    }

    pub fn get(&self, path: &[String]) -> Option<&N> {
        self.entries.get(path).map(|entry| &entry.node)
    }

    pub fn contains(&self, path: &[String]) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in pre-order. The root comes first and has no edge.
    pub fn iter(&self) -> impl Iterator<Item = (&[String], Option<&E>, &N)> + '_ {
        self.preorder().into_iter().filter_map(move |index| {
            let (path, entry) = self.entries.get_index(index)?;
            Some((
                path.as_slice(),
                entry.edge.as_ref().map(|(_, edge)| edge),
                &entry.node,
            ))
        })
    }

    /// Relabels every node. The closure receives the node's pre-order index.
    pub fn map_nodes<M>(self, mut f: impl FnMut(usize, N) -> M) -> JoinTree<M, E> {
        let positions = self.positions();

        let entries = self
            .entries
            .into_iter()
            .zip(positions)
            .map(|((path, entry), position)| {
                (
                    path,
                    Entry {
                        node: f(position, entry.node),
                        edge: entry.edge,
                    },
                )
            })
            .collect();

        JoinTree { entries }
    }

    /// Relabels every edge. The closure sees the parent and child nodes.
    pub fn map_edges<F>(self, mut f: impl FnMut(&N, E, &N) -> F) -> JoinTree<N, F> {
        let mut paths = Vec::with_capacity(self.entries.len());
        let mut nodes = Vec::with_capacity(self.entries.len());
        let mut edges = Vec::with_capacity(self.entries.len());

        for (path, entry) in self.entries {
            paths.push(path);
            nodes.push(entry.node);
            edges.push(entry.edge);
        }

        let edges = edges
            .into_iter()
            .enumerate()
            .map(|(index, edge)| {
                edge.map(|(parent, edge)| (parent, f(&nodes[parent], edge, &nodes[index])))
            })
            .collect::<Vec<_>>();

        let entries = paths
            .into_iter()
            .zip(nodes)
            .zip(edges)
            .map(|((path, node), edge)| (path, Entry { node, edge }))
            .collect();

        JoinTree { entries }
    }

    /// Places `subtree` below a new root.
    ///
    /// The subtree's root is reached through the empty segment, so every path
    /// of the subtree gains a leading `""`.
    pub fn graft(root: N, edge: E, subtree: JoinTree<N, E>) -> JoinTree<N, E> {
        let mut entries = IndexMap::with_capacity(subtree.entries.len() + 1);
        entries.insert(vec![], Entry { node: root, edge: None });

        for (path, entry) in subtree.entries {
            let mut grafted = Vec::with_capacity(path.len() + 1);
            grafted.push(String::new());
            grafted.extend(path);

            let edge = match entry.edge {
                // Indices shift by one to make room for the new root
                Some((parent, edge)) => Some((parent + 1, edge)),
                None => None,
            };

            entries.insert(
                grafted,
                Entry {
                    node: entry.node,
                    edge,
                },
            );
        }

        // The old root is now at index 1 and hangs off the new root
        let mut tree = JoinTree { entries };
        if let Some((_, entry)) = tree.entries.get_index_mut(1) {
            entry.edge = Some((0, edge));
        }
        tree
    }

    /// Entry indices in pre-order. Children keep insertion order.
    fn preorder(&self) -> Vec<usize> {
        let mut children = vec![vec![]; self.entries.len()];
        for (index, entry) in self.entries.values().enumerate() {
            if let Some((parent, _)) = &entry.edge {
                children[*parent].push(index);
            }
        }

        let mut order = Vec::with_capacity(self.entries.len());
        let mut stack = vec![0];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(children[index].iter().rev());
        }
        order
    }

    /// Pre-order position of each entry, indexed by entry index.
    fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.entries.len()];
        for (position, index) in self.preorder().into_iter().enumerate() {
            positions[index] = position;
        }
        positions
    }
}
