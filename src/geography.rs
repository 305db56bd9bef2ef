// src/geography.rs

//! Geography specs and the partitioned output layout derived from them.
//!
//! A spec is an ordered list of level names, e.g. `["state", "county",
//! "tract"]`. The last level is the leaf: it names the output file. Every
//! earlier level becomes a directory segment, with `state` and `county`
//! rendered Hive-style as `state={code}` / `county={code}`.

use anyhow::{ensure, Result};
use std::path::{Path, PathBuf};

/// Selector meaning "all instances at this level".
pub const WILDCARD: &str = "*";

/// The traversal strategy for one geography spec, computed once up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoShape {
    /// No state expansion: a single all-wildcard fetch.
    Flat,
    /// Expand per state; no county level present.
    StateOnly,
    /// Expand per state; county is the leaf, left wildcarded in the fetch.
    StateCounty,
    /// Expand per state and per county within it.
    StateCountyPlus,
}

/// An ordered, non-empty list of geography level names for one granularity
/// supported by a dataset and vintage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeographySpec {
    levels: Vec<String>,
}

impl GeographySpec {
    pub fn new(levels: Vec<String>) -> Result<Self> {
        ensure!(!levels.is_empty(), "geography spec has no levels");
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// The last level. Its name becomes the output file's base name.
    pub fn leaf(&self) -> &str {
        self.levels.last().expect("spec is never empty")
    }

    /// Output file name for this spec: `{leaf}.csv`.
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.leaf())
    }

    fn intermediates(&self) -> &[String] {
        &self.levels[..self.levels.len() - 1]
    }

    fn has(&self, level: &str) -> bool {
        self.levels.iter().any(|l| l == level)
    }

    /// Classify which of the four traversal strategies applies.
    pub fn shape(&self) -> GeoShape {
        if !self.has("state") || self.levels.len() == 1 {
            GeoShape::Flat
        } else if self.has("county") && self.levels.len() > 2 {
            GeoShape::StateCountyPlus
        } else if self.has("county") {
            GeoShape::StateCounty
        } else {
            GeoShape::StateOnly
        }
    }

    /// Initial request bindings: every level wildcarded, leaf last.
    ///
    /// Order is significant downstream: the final pair maps to the API's
    /// `for` parameter, the rest to `in` parameters.
    pub fn wildcard_bindings(&self) -> Vec<(String, String)> {
        self.levels
            .iter()
            .map(|level| (level.clone(), WILDCARD.to_string()))
            .collect()
    }

    /// Directory that holds this spec's output file, given which expansion
    /// codes are in play.
    ///
    /// Expanded levels render as partition segments (`state=01`,
    /// `county=001`); other intermediate levels render as bare segments; the
    /// leaf never becomes a directory. Levels already represented by a
    /// partition segment are skipped when appending intermediates.
    pub fn partition_dir(
        &self,
        root: &Path,
        state: Option<&str>,
        county: Option<&str>,
    ) -> PathBuf {
        let mut dir = root.to_path_buf();
        match (state, county) {
            (Some(state), Some(county)) => {
                dir.push(format!("state={state}"));
                dir.push(format!("county={county}"));
                for level in self.intermediates() {
                    if level != "state" && level != "county" {
                        dir.push(level);
                    }
                }
            }
            (Some(state), None) => {
                dir.push(format!("state={state}"));
                for level in self.intermediates() {
                    if level != "state" {
                        dir.push(level);
                    }
                }
            }
            (None, _) => {
                for level in self.intermediates() {
                    dir.push(level);
                }
            }
        }
        dir
    }
}

/// Set `level` to a concrete selector in place, wherever it appears.
pub fn bind(bindings: &mut [(String, String)], level: &str, value: &str) {
    for (name, selector) in bindings.iter_mut() {
        if name == level {
            *selector = value.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::STATES_DC_AND_PR;
    use std::collections::HashSet;

    fn spec(levels: &[&str]) -> GeographySpec {
        GeographySpec::new(levels.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn empty_spec_is_rejected() {
        assert!(GeographySpec::new(Vec::new()).is_err());
    }

    #[test]
    fn shapes() {
        assert_eq!(spec(&["us"]).shape(), GeoShape::Flat);
        assert_eq!(spec(&["region"]).shape(), GeoShape::Flat);
        // A lone state level gets a single wildcard fetch, not 52.
        assert_eq!(spec(&["state"]).shape(), GeoShape::Flat);
        assert_eq!(spec(&["division", "state"]).shape(), GeoShape::StateOnly);
        assert_eq!(spec(&["state", "place"]).shape(), GeoShape::StateOnly);
        assert_eq!(spec(&["state", "county"]).shape(), GeoShape::StateCounty);
        assert_eq!(
            spec(&["state", "county", "tract"]).shape(),
            GeoShape::StateCountyPlus
        );
        assert_eq!(
            spec(&["state", "county", "county subdivision", "subminor civil division"]).shape(),
            GeoShape::StateCountyPlus
        );
    }

    #[test]
    fn flat_path_keeps_every_intermediate_segment() {
        let s = spec(&["metropolitan statistical area", "principal city"]);
        let dir = s.partition_dir(Path::new("/out"), None, None);
        assert_eq!(
            dir,
            Path::new("/out").join("metropolitan statistical area")
        );
        assert_eq!(s.file_name(), "principal city.csv");

        let single = spec(&["us"]);
        assert_eq!(
            single.partition_dir(Path::new("/out"), None, None),
            Path::new("/out")
        );
        assert_eq!(single.file_name(), "us.csv");
    }

    #[test]
    fn state_path_skips_the_state_level() {
        let s = spec(&["state", "place"]);
        let dir = s.partition_dir(Path::new("/out"), Some("06"), None);
        assert_eq!(dir, Path::new("/out").join("state=06"));
        assert_eq!(s.file_name(), "place.csv");
    }

    #[test]
    fn county_leaf_stays_out_of_the_directory() {
        let s = spec(&["state", "county"]);
        let dir = s.partition_dir(Path::new("/out"), Some("01"), None);
        assert_eq!(dir, Path::new("/out").join("state=01"));
        assert_eq!(s.file_name(), "county.csv");
    }

    #[test]
    fn county_path_uses_partition_segments_for_both_expansions() {
        let s = spec(&["state", "county", "tract"]);
        let dir = s.partition_dir(Path::new("/out"), Some("01"), Some("001"));
        assert_eq!(dir, Path::new("/out").join("state=01").join("county=001"));
        assert_eq!(s.file_name(), "tract.csv");
    }

    #[test]
    fn deep_county_path_keeps_other_intermediates_as_bare_segments() {
        let s = spec(&["state", "county", "county subdivision", "subminor civil division"]);
        let dir = s.partition_dir(Path::new("/out"), Some("72"), Some("127"));
        assert_eq!(
            dir,
            Path::new("/out")
                .join("state=72")
                .join("county=127")
                .join("county subdivision")
        );
        assert_eq!(s.file_name(), "subminor civil division.csv");
    }

    #[test]
    fn per_state_outputs_are_distinct_and_cover_every_jurisdiction() {
        let s = spec(&["state", "place"]);
        let files: HashSet<PathBuf> = STATES_DC_AND_PR
            .iter()
            .copied()
            .map(|state| {
                s.partition_dir(Path::new("/out"), Some(state), None)
                    .join(s.file_name())
            })
            .collect();
        assert_eq!(files.len(), STATES_DC_AND_PR.len());
        assert!(files.contains(&PathBuf::from("/out/state=72/place.csv")));
    }

    #[test]
    fn wildcard_bindings_preserve_level_order() {
        let s = spec(&["state", "county", "tract"]);
        let mut bindings = s.wildcard_bindings();
        assert_eq!(
            bindings,
            vec![
                ("state".to_string(), "*".to_string()),
                ("county".to_string(), "*".to_string()),
                ("tract".to_string(), "*".to_string()),
            ]
        );

        bind(&mut bindings, "state", "01");
        bind(&mut bindings, "county", "001");
        assert_eq!(bindings[0].1, "01");
        assert_eq!(bindings[1].1, "001");
        assert_eq!(bindings[2].1, "*");
    }
}
