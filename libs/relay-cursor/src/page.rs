//! Connection result types: edges and page info.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    /// Cursor of the first edge, `None` for an empty page
    pub start_cursor: Option<String>,
    /// Cursor of the last edge, `None` for an empty page
    pub end_cursor: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge<N> {
    pub node: N,
    pub cursor: String,
}

impl<N> Edge<N> {
    pub fn map<M>(self, f: impl FnOnce(N) -> M) -> Edge<M> {
        Edge {
            node: f(self.node),
            cursor: self.cursor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
}

impl<N> Connection<N> {
    /// Convert every node, keeping cursors and page info.
    pub fn map_nodes<M>(self, mut f: impl FnMut(N) -> M) -> Connection<M> {
        Connection {
            edges: self.edges.into_iter().map(|e| e.map(&mut f)).collect(),
            page_info: self.page_info,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.iter().map(|e| &e.node)
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<N> {
        self.edges.into_iter().map(|e| e.node).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
