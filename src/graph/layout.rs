use serde::{Deserialize, Serialize};

/// Fixed geometry of the vertical step column.
///
/// Step `i` sits at `base_y + i * (node_height + gap)`; insert-affordance
/// nodes sit halfway between their neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphLayout {
    pub x: f64,
    pub base_y: f64,
    pub node_height: f64,
    pub gap: f64,
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self {
            x: 250.0,
            base_y: 50.0,
            node_height: 80.0,
            gap: 60.0,
        }
    }
}

impl GraphLayout {
    pub fn builder() -> GraphLayoutBuilder {
        GraphLayoutBuilder::default()
    }

    /// Distance between two consecutive step rows.
    pub fn stride(&self) -> f64 {
        self.node_height + self.gap
    }

    pub fn row_y(&self, index: usize) -> f64 {
        self.base_y + index as f64 * self.stride()
    }

    /// Midpoint between row `index` and row `index + 1`.
    pub fn gap_y(&self, index: usize) -> f64 {
        self.row_y(index) + self.stride() / 2.0
    }
}

#[derive(Debug, Default)]
pub struct GraphLayoutBuilder {
    layout: GraphLayout,
}

impl GraphLayoutBuilder {
    pub fn with_x(mut self, x: f64) -> Self {
        self.layout.x = x;
        self
    }

    pub fn with_base_y(mut self, base_y: f64) -> Self {
        self.layout.base_y = base_y;
        self
    }

    pub fn with_node_height(mut self, node_height: f64) -> Self {
        self.layout.node_height = node_height;
        self
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.layout.gap = gap;
        self
    }

    pub fn build(self) -> GraphLayout {
        self.layout
    }
}
