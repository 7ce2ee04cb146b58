use crate::{
    util::unit::Color3,
    world::{
        grid::{check_bounds, GridError},
        point::{GridPoint, GridPointSet},
    },
};
use log::debug;

/// Colored overlays on top of the terrain, e.g. movement range or attack
/// targets. There are any number of layers, each with a color and a set of
/// cells. A cell can be in several layers at once. When it is, the layer
/// with the **lowest** index wins, and that's the only color the cell shows.
#[derive(Clone, Debug)]
pub struct HighlightLayers {
    width: usize,
    height: usize,
    layers: Vec<HighlightLayer>,
}

#[derive(Clone, Debug)]
struct HighlightLayer {
    color: Color3,
    cells: GridPointSet,
}

impl HighlightLayers {
    /// Create an empty set of layers (with no layers at all) for a
    /// `width × height` grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
        }
    }

    /// Define the layers, one per color, in priority order. Layers that
    /// already exist keep their cells and take the new color. Any existing
    /// layers past the end of the list are dropped, along with their cells.
    pub fn set_colors_for_layers(
        &mut self,
        colors: impl IntoIterator<Item = Color3>,
    ) {
        let mut old_layers = std::mem::take(&mut self.layers).into_iter();
        self.layers = colors
            .into_iter()
            .map(|color| HighlightLayer {
                color,
                cells: old_layers
                    .next()
                    .map(|layer| layer.cells)
                    .unwrap_or_default(),
            })
            .collect();
        debug!("Highlights now have {} layers", self.layers.len());
    }

    /// Number of layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Get the color of a layer
    pub fn layer_color(&self, layer: usize) -> anyhow::Result<Color3> {
        Ok(self.layer(layer)?.color)
    }

    /// Add a cell to a layer. Returns `true` if it wasn't already there.
    /// Returns an error if the layer or the cell doesn't exist.
    pub fn highlight(
        &mut self,
        pos: GridPoint,
        layer: usize,
    ) -> anyhow::Result<bool> {
        check_bounds(pos, self.width, self.height)?;
        Ok(self.layer_mut(layer)?.cells.insert(pos))
    }

    /// Remove a cell from a layer. Returns `true` if it was there. Returns an
    /// error if the layer doesn't exist.
    pub fn unhighlight(
        &mut self,
        pos: GridPoint,
        layer: usize,
    ) -> anyhow::Result<bool> {
        Ok(self.layer_mut(layer)?.cells.remove(&pos))
    }

    /// Remove every cell from one layer
    pub fn clear_layer(&mut self, layer: usize) -> anyhow::Result<()> {
        self.layer_mut(layer)?.cells.clear();
        Ok(())
    }

    /// Remove every cell from every layer. The layers themselves stay.
    pub fn clear_all(&mut self) {
        for layer in &mut self.layers {
            layer.cells.clear();
        }
    }

    /// Get all the cells in one layer, in no particular order
    pub fn cells_in_layer(
        &self,
        layer: usize,
    ) -> anyhow::Result<impl Iterator<Item = GridPoint> + '_> {
        Ok(self.layer(layer)?.cells.iter().copied())
    }

    /// Is the cell in any layer?
    pub fn is_highlighted(&self, pos: GridPoint) -> bool {
        self.active_layer(pos).is_some()
    }

    /// Index of the layer that controls how a cell looks, i.e. the lowest
    /// layer it's in
    pub fn active_layer(&self, pos: GridPoint) -> Option<usize> {
        self.layers
            .iter()
            .position(|layer| layer.cells.contains(&pos))
    }

    /// The color a cell should be drawn with, if it's highlighted at all
    pub fn active_color(&self, pos: GridPoint) -> Option<Color3> {
        self.active_layer(pos).map(|layer| self.layers[layer].color)
    }

    fn layer(&self, layer: usize) -> anyhow::Result<&HighlightLayer> {
        let layers = self.layers.len();
        self.layers
            .get(layer)
            .ok_or_else(|| GridError::InvalidLayer { layer, layers }.into())
    }

    fn layer_mut(
        &mut self,
        layer: usize,
    ) -> anyhow::Result<&mut HighlightLayer> {
        let layers = self.layers.len();
        self.layers
            .get_mut(layer)
            .ok_or_else(|| GridError::InvalidLayer { layer, layers }.into())
    }
}
