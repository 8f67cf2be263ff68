//! Brush swatches and the single active selection.

use crate::{
    config::{BrushConfig, Swatch},
    DoodleError, Result, Rgba,
};

/// Fixed set of brush swatches with exactly one marked active.
#[derive(Debug, Clone)]
pub struct BrushPalette {
    swatches: Vec<Swatch>,
    active: usize,
}

impl BrushPalette {
    pub fn new(swatches: Vec<Swatch>, active: usize) -> Result<Self> {
        if swatches.is_empty() {
            return Err(DoodleError::invalid("brush palette must not be empty"));
        }
        let mut palette = Self {
            swatches,
            active: 0,
        };
        palette.select(active)?;
        Ok(palette)
    }

    pub fn from_config(config: &BrushConfig) -> Result<Self> {
        Self::new(config.swatches.clone(), config.active)
    }

    /// Moves the active marker to `index` and returns the swatch color. An
    /// unknown index leaves the current selection untouched.
    pub fn select(&mut self, index: usize) -> Result<Rgba> {
        let swatch = self.swatches.get(index).ok_or_else(|| {
            DoodleError::invalid(format!(
                "brush {index} does not exist ({} available)",
                self.swatches.len()
            ))
        })?;
        self.active = index;
        Ok(swatch.color)
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_swatch(&self) -> &Swatch {
        &self.swatches[self.active]
    }

    pub fn active_color(&self) -> Rgba {
        self.active_swatch().color
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active == index
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Iterates over `(index, swatch, is_active)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Swatch, bool)> + '_ {
        self.swatches
            .iter()
            .enumerate()
            .map(move |(index, swatch)| (index, swatch, index == self.active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> BrushPalette {
        BrushPalette::from_config(&BrushConfig::default()).unwrap()
    }

    #[test]
    fn starts_on_configured_brush() {
        let palette = palette();
        assert_eq!(palette.active(), 0);
        assert_eq!(palette.active_color(), Rgba::opaque(0, 0, 0xff));
    }

    #[test]
    fn exactly_one_swatch_is_active_after_each_selection() {
        let mut palette = palette();
        for index in [2, 1, 3, 3, 0] {
            let color = palette.select(index).unwrap();
            assert_eq!(color, palette.active_color());

            let active: Vec<usize> = palette
                .iter()
                .filter(|(_, _, active)| *active)
                .map(|(i, _, _)| i)
                .collect();
            assert_eq!(active, vec![index]);
        }
    }

    #[test]
    fn unknown_brush_keeps_selection() {
        let mut palette = palette();
        palette.select(1).unwrap();

        let err = palette.select(17).unwrap_err();
        assert!(matches!(err, DoodleError::InvalidInput(_)));
        assert!(palette.is_active(1));
    }

    #[test]
    fn rejects_empty_or_misindexed_palettes() {
        assert!(BrushPalette::new(Vec::new(), 0).is_err());
        let swatches = vec![Swatch::new("only", Rgba::WHITE)];
        assert!(BrushPalette::new(swatches, 1).is_err());
    }
}
