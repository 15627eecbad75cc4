//! Loading and saving the catalog as pipe-delimited records.
//!
//! Loading runs in three passes so composites may reference foods that
//! appear later in the file:
//! 1. basic records are inserted,
//! 2. composite records are inserted as empty shells,
//! 3. each composite's component names are resolved against the catalog.

use std::fmt;
use std::io::{BufRead, Write};

use super::{CatalogError, FoodCatalog};
use crate::food::{parse_record, Component, Food, ParsedRecord, RecordError};

const HEADER: &str = "# YADA Food Database - Format: TYPE|NAME|KEYWORDS|...";

/// A recoverable problem found while loading. The affected line or
/// reference is skipped and loading continues.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// The line could not be parsed.
    Malformed { line: usize, error: RecordError },
    /// A second record used an already loaded name.
    DuplicateName { line: usize, name: String },
    /// A composite referenced a food that is not in the catalog.
    UnresolvedComponent { composite: String, component: String },
    /// A composite reference would have made a food contain itself.
    CyclicComponent { composite: String, component: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::Malformed { line, error } => {
                write!(f, "line {}: skipped malformed record: {}", line, error)
            }
            LoadWarning::DuplicateName { line, name } => {
                write!(f, "line {}: skipped duplicate food '{}'", line, name)
            }
            LoadWarning::UnresolvedComponent {
                composite,
                component,
            } => write!(
                f,
                "composite '{}': dropped unknown component '{}'",
                composite, component
            ),
            LoadWarning::CyclicComponent {
                composite,
                component,
            } => write!(
                f,
                "composite '{}': dropped component '{}' (would contain itself)",
                composite, component
            ),
        }
    }
}

/// Summary of a catalog load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub basic: usize,
    pub composite: usize,
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.basic + self.composite
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, warning: LoadWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

impl FoodCatalog {
    /// Replaces the catalog contents with the records read from `source`.
    ///
    /// Blank lines and `#` comments are ignored. Malformed lines, duplicate
    /// names, and unresolvable or cyclic component references are skipped
    /// and reported in the returned [`LoadReport`], as are lines that are
    /// not valid UTF-8. Only a read failure of `source` is an error, in
    /// which case the catalog is left unchanged.
    pub fn load<R: BufRead>(&mut self, source: R) -> Result<LoadReport, CatalogError> {
        let lines = source.split(b'\n').collect::<Result<Vec<_>, _>>()?;

        self.clear();
        let mut report = LoadReport::default();
        let mut shells = Vec::new();

        // Pass 1: basic foods. Composite records are parsed here too but only
        // inserted once every basic food is present.
        for (i, bytes) in lines.iter().enumerate() {
            let line_no = i + 1;
            let Ok(line) = std::str::from_utf8(bytes) else {
                report.warn(LoadWarning::Malformed {
                    line: line_no,
                    error: RecordError::InvalidUtf8,
                });
                continue;
            };
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_record(line) {
                Ok(ParsedRecord::Basic(food)) => {
                    let name = food.name.clone();
                    if self.insert(Food::Basic(food)) {
                        report.basic += 1;
                    } else {
                        report.warn(LoadWarning::DuplicateName {
                            line: line_no,
                            name,
                        });
                    }
                }
                Ok(ParsedRecord::Composite { food, components }) => {
                    shells.push((line_no, food, components));
                }
                Err(error) => report.warn(LoadWarning::Malformed {
                    line: line_no,
                    error,
                }),
            }
        }

        // Pass 2: composite shells with no components yet.
        let mut pending = Vec::new();
        for (line_no, food, components) in shells {
            let name = food.name.clone();
            if self.insert(Food::Composite(food)) {
                report.composite += 1;
                pending.push((name, components));
            } else {
                report.warn(LoadWarning::DuplicateName {
                    line: line_no,
                    name,
                });
            }
        }

        // Pass 3
        self.resolve_references(pending, &mut report);

        self.dirty = false;
        tracing::info!(
            "Loaded {} basic and {} composite food(s), {} warning(s)",
            report.basic,
            report.composite,
            report.warnings.len()
        );
        Ok(report)
    }

    /// Attaches each pending component to its composite once the referenced
    /// food is known to exist.
    fn resolve_references(
        &mut self,
        pending: Vec<(String, Vec<Component>)>,
        report: &mut LoadReport,
    ) {
        for (composite, components) in pending {
            for component in components {
                if self.find_by_name(&component.food).is_none() {
                    report.warn(LoadWarning::UnresolvedComponent {
                        composite: composite.clone(),
                        component: component.food,
                    });
                    continue;
                }
                if self.creates_cycle(&composite, &component.food) {
                    report.warn(LoadWarning::CyclicComponent {
                        composite: composite.clone(),
                        component: component.food,
                    });
                    continue;
                }
                if let Ok(Food::Composite(food)) = self.find_mut(&composite) {
                    food.components.push(component);
                }
            }
        }
    }

    /// Renders the catalog file: a header comment, every basic food, then
    /// every composite food, each group in insertion order.
    pub fn to_records(&self) -> String {
        let mut out = String::new();
        out.push_str(HEADER);
        out.push('\n');

        let basics = self.foods.iter().filter(|f| !f.is_composite());
        let composites = self.foods.iter().filter(|f| f.is_composite());
        for food in basics.chain(composites) {
            out.push_str(&food.to_record());
            out.push('\n');
        }
        out
    }

    /// Writes the full catalog to `sink` in one call and clears the dirty
    /// flag on success.
    pub fn save<W: Write>(&mut self, mut sink: W) -> Result<(), CatalogError> {
        let content = self.to_records();
        sink.write_all(content.as_bytes())?;
        sink.flush()?;
        self.mark_saved();
        Ok(())
    }

    pub(crate) fn mark_saved(&mut self) {
        self.dirty = false;
    }
}
