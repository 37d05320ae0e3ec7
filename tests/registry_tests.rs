//! Integration tests for loading several configuration files into a registry.

use enderalib::config::{
    ConfigManager, ConfigSchema, LibConfig, ManagedConfig, SchemaField, load_all,
};
use enderalib::error::Stage;
use serde::{Deserialize, Serialize};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DatabaseConfig {
    url: String,
    pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "jdbc:h2:./data/plugin".to_string(),
            pool_size: 10,
        }
    }
}

impl ConfigSchema for DatabaseConfig {
    const FIELDS: &'static [SchemaField] = &[
        SchemaField::new("url").doc("JDBC connection string."),
        SchemaField::new("pool_size"),
    ];
}

#[test]
fn load_all_registers_each_document_type() {
    let temp = TempDir::new().unwrap();
    let lib = ConfigManager::in_data_dir(temp.path(), "config.yml", LibConfig::default());
    let db = ConfigManager::in_data_dir(temp.path(), "database.yml", DatabaseConfig::default());
    fs::write(db.path(), "url: jdbc:mysql://localhost/plugin\n").unwrap();

    let managers: [&dyn ManagedConfig; 2] = [&lib, &db];
    let registry = load_all(&managers).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(*registry.get::<LibConfig>().unwrap(), LibConfig::default());
    let database = registry.get::<DatabaseConfig>().unwrap();
    assert_eq!(database.url, "jdbc:mysql://localhost/plugin");
    assert_eq!(database.pool_size, 10);

    assert!(lib.path().exists());
    assert!(fs::read_to_string(db.path()).unwrap().contains("pool-size: 10"));
}

#[test]
fn load_all_stops_at_first_fatal_error() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let ok = ConfigManager::in_data_dir(temp.path(), "config.yml", LibConfig::default());
    let broken = ConfigManager::in_data_dir(blocker.join("sub"), "database.yml", DatabaseConfig::default());
    let managers: [&dyn ManagedConfig; 2] = [&ok, &broken];

    let err = load_all(&managers).unwrap_err();
    assert_eq!(err.stage(), Stage::CreateDirectory);
    assert!(ok.path().exists());
    assert_eq!(ManagedConfig::path(&broken), blocker.join("sub").join("database.yml"));
}
