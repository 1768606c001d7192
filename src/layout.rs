//! Mapping between chapter positions and the (configuration, contrast) grid.
//!
//! Solver runs are generated contrast-major: for every contrast value, all
//! configurations run in order. The chapter at position `index` therefore belongs to
//! configuration `index % n_configurations` and contrast `index / n_configurations`.
//! The log format itself carries no key, so this convention lives here and nowhere else.

use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};
use crate::history::{Chapter, Dataset};

/// Explicit identity of one chapter in the figure grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChapterKey {
    /// Configuration label, e.g. `(a)`.
    pub configuration: String,
    /// Coefficient contrast of the inclusions.
    pub contrast: f64,
}

/// Grid of configurations (rows) and contrasts (columns).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    configurations: Vec<String>,
    contrasts: Vec<f64>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(["(a)", "(b)", "(c)"], [0.01, 0.1, 10.0, 100.0])
    }
}

impl GridLayout {
    pub fn new<S: Into<String>>(
        configurations: impl IntoIterator<Item = S>,
        contrasts: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            configurations: configurations.into_iter().map(Into::into).collect(),
            contrasts: contrasts.into_iter().collect(),
        }
    }

    pub fn configurations(&self) -> &[String] {
        &self.configurations
    }

    pub fn contrasts(&self) -> &[f64] {
        &self.contrasts
    }

    /// Grid shape as `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.configurations.len(), self.contrasts.len())
    }

    /// Number of chapters every dataset must provide.
    pub fn panel_count(&self) -> usize {
        self.configurations.len() * self.contrasts.len()
    }

    /// Chapter position of configuration `config` under contrast `contrast`.
    pub fn index_of(&self, config: usize, contrast: usize) -> usize {
        contrast * self.configurations.len() + config
    }

    /// Inverse of [`index_of`](Self::index_of).
    pub fn key_of(&self, index: usize) -> Option<ChapterKey> {
        if index >= self.panel_count() {
            return None;
        }
        let n = self.configurations.len();
        Some(ChapterKey {
            configuration: self.configurations[index % n].clone(),
            contrast: self.contrasts[index / n],
        })
    }

    /// Looks up the chapter for a grid cell.
    pub fn chapter<'a>(
        &self,
        dataset: &'a Dataset,
        config: usize,
        contrast: usize,
    ) -> Option<&'a Chapter> {
        if config >= self.configurations.len() || contrast >= self.contrasts.len() {
            return None;
        }
        dataset.get(self.index_of(config, contrast))
    }

    /// Pairs each chapter covered by the grid with its key.
    pub fn keyed<'a>(
        &'a self,
        dataset: &'a Dataset,
    ) -> impl Iterator<Item = (ChapterKey, &'a Chapter)> + 'a {
        dataset
            .iter()
            .enumerate()
            .filter_map(move |(index, chapter)| self.key_of(index).map(|key| (key, chapter)))
    }

    /// Fails unless `dataset` covers every cell of the grid.
    pub fn require(&self, dataset: &Dataset, solver: &str) -> Result<()> {
        let required = self.panel_count();
        if dataset.len() < required {
            return Err(HistoryError::MissingChapter {
                solver: solver.to_string(),
                required,
                available: dataset.len(),
            });
        }
        if dataset.len() > required {
            log::warn!(
                "solver `{solver}` provides {} chapters, only the first {required} are plotted",
                dataset.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn dataset_with(chapters: usize) -> Dataset {
        let text: String = (0..chapters)
            .map(|i| format!("=====\nrelative={}.0?\nhomoCoeffZ\n", i + 1))
            .collect();
        parse_str(&text).unwrap()
    }

    #[test]
    fn index_mapping_is_contrast_major() {
        let layout = GridLayout::default();
        assert_eq!(layout.shape(), (3, 4));
        assert_eq!(layout.panel_count(), 12);
        assert_eq!(layout.index_of(0, 0), 0);
        assert_eq!(layout.index_of(2, 0), 2);
        assert_eq!(layout.index_of(1, 2), 7);
        assert_eq!(layout.index_of(2, 3), 11);
    }

    #[test]
    fn key_of_inverts_index_of() {
        let layout = GridLayout::default();
        for config in 0..3 {
            for contrast in 0..4 {
                let key = layout.key_of(layout.index_of(config, contrast)).unwrap();
                assert_eq!(key.configuration, layout.configurations()[config]);
                assert_eq!(key.contrast, layout.contrasts()[contrast]);
            }
        }
        assert!(layout.key_of(12).is_none());
    }

    #[test]
    fn chapter_lookup_follows_grid() {
        let layout = GridLayout::default();
        let dataset = dataset_with(12);
        let chapter = layout.chapter(&dataset, 1, 2).unwrap();
        assert_eq!(chapter.to_vec(), vec![1.0, 8.0]);
        assert!(layout.chapter(&dataset, 3, 0).is_none());

        let keys: Vec<_> = layout.keyed(&dataset).map(|(key, _)| key).collect();
        assert_eq!(keys.len(), 12);
        assert_eq!(keys[7].configuration, "(b)");
        assert_eq!(keys[7].contrast, 10.0);
    }

    #[test]
    fn short_dataset_is_rejected() {
        let layout = GridLayout::default();
        let err = layout.require(&dataset_with(11), "ICC").unwrap_err();
        assert!(matches!(
            err,
            HistoryError::MissingChapter {
                required: 12,
                available: 11,
                ..
            }
        ));
        assert!(layout.require(&dataset_with(13), "ICC").is_ok());
    }
}
