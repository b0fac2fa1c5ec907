use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::panels::mapping::{ColumnAliases, ColumnRole};
use crate::panels::{AntigenCatalog, CatalogError};

/// Catalog plus the column alias table the normalizer should use with it.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub catalog: AntigenCatalog,
    pub aliases: ColumnAliases,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog: AntigenCatalog::builtin(),
            aliases: ColumnAliases::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    antigens: Vec<String>,
    #[serde(default)]
    pairs: Vec<[String; 2]>,
    #[serde(default)]
    allowed_heterozygous: Vec<String>,
    #[serde(default)]
    column_aliases: BTreeMap<String, ColumnRole>,
}

pub fn parse_catalog_config(text: &str) -> Result<CatalogConfig, CatalogError> {
    let file: CatalogFile = toml::from_str(text)?;
    let pairs: Vec<(String, String)> = file
        .pairs
        .into_iter()
        .map(|[a, b]| (a, b))
        .collect();
    let catalog = AntigenCatalog::new(&file.antigens, &pairs, &file.allowed_heterozygous)?;

    let mut aliases = ColumnAliases::default();
    for (alias, role) in &file.column_aliases {
        aliases.insert(alias, *role);
    }

    Ok(CatalogConfig { catalog, aliases })
}

pub fn load_catalog_config(path: &Path) -> Result<CatalogConfig, CatalogError> {
    let text = std::fs::read_to_string(path)?;
    let config = parse_catalog_config(&text)?;
    crate::info!(
        "loaded antigen catalog {}: {} antigens, {} pairs, {} allowed heterozygous",
        path.display(),
        config.catalog.len(),
        config.catalog.pairs().len(),
        config.catalog.allowed_heterozygous().len()
    );
    Ok(config)
}
